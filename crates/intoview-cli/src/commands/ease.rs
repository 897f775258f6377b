use anyhow::{bail, Context, Result};

use intoview_core::{CubicBezier, EasingPreset};

/// Parse a preset name or an `x1,y1,x2,y2` control point list
fn parse_curve(curve: &str) -> Result<CubicBezier> {
    if !curve.contains(',') {
        let preset: EasingPreset = curve.parse().with_context(|| {
            let names: Vec<_> = EasingPreset::ALL.iter().map(|p| p.name()).collect();
            format!("Expected one of: {}", names.join(", "))
        })?;
        return Ok(preset.curve());
    }

    let points = curve
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid control point: {}", part))
        })
        .collect::<Result<Vec<_>>>()?;
    let &[x1, y1, x2, y2] = points.as_slice() else {
        bail!("Expected four control points, got {}", points.len());
    };
    Ok(CubicBezier::new(x1, y1, x2, y2)?)
}

pub fn run(curve: &str, samples: usize) -> Result<()> {
    if samples < 2 {
        bail!("At least two samples are needed");
    }
    let bezier = parse_curve(curve)?;
    let (x1, y1, x2, y2) = bezier.control_points();
    println!("cubic-bezier({}, {}, {}, {})\n", x1, y1, x2, y2);

    let last = (samples - 1) as f64;
    for i in 0..samples {
        let x = i as f64 / last;
        println!("  {:.4} -> {:.4}", x, bezier.ease(x));
    }

    Ok(())
}
