//! Easing curves for scroll animations
//!
//! Maps linear progress in [0, 1] to eased progress. Every curve is a cubic
//! Bezier; the five CSS-style presets are built through the same factory as
//! custom curves.

mod bezier;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use bezier::{make_cubic_bezier_easing, CubicBezier};

/// Shared easing function, resolved once when an animation starts
pub type EasingFn = Rc<dyn Fn(f64) -> f64>;

/// Named timing curves, mirroring the CSS keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingPreset {
    /// `cubic-bezier(0.25, 0.1, 0.25, 1)`
    #[default]
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    /// `cubic-bezier(0, 0, 1, 1)`
    Linear,
}

impl EasingPreset {
    pub const ALL: [EasingPreset; 5] = [
        EasingPreset::Ease,
        EasingPreset::EaseIn,
        EasingPreset::EaseOut,
        EasingPreset::EaseInOut,
        EasingPreset::Linear,
    ];

    /// Control points `(x1, y1, x2, y2)` of the preset
    pub fn control_points(self) -> (f64, f64, f64, f64) {
        match self {
            EasingPreset::Ease => (0.25, 0.1, 0.25, 1.0),
            EasingPreset::EaseIn => (0.42, 0.0, 1.0, 1.0),
            EasingPreset::EaseOut => (0.0, 0.0, 0.58, 1.0),
            EasingPreset::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            EasingPreset::Linear => (0.0, 0.0, 1.0, 1.0),
        }
    }

    pub fn curve(self) -> CubicBezier {
        let (x1, y1, x2, y2) = self.control_points();
        CubicBezier::new_unchecked(x1, y1, x2, y2)
    }

    pub fn name(self) -> &'static str {
        match self {
            EasingPreset::Ease => "ease",
            EasingPreset::EaseIn => "easeIn",
            EasingPreset::EaseOut => "easeOut",
            EasingPreset::EaseInOut => "easeInOut",
            EasingPreset::Linear => "linear",
        }
    }
}

impl fmt::Display for EasingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEasingName(pub String);

impl fmt::Display for UnknownEasingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown easing function: {}", self.0)
    }
}

impl std::error::Error for UnknownEasingName {}

impl FromStr for EasingPreset {
    type Err = UnknownEasingName;

    /// Accepts the camelCase names (`easeIn`) as well as CSS spelling (`ease-in`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ease" => Ok(EasingPreset::Ease),
            "easeIn" | "ease-in" => Ok(EasingPreset::EaseIn),
            "easeOut" | "ease-out" => Ok(EasingPreset::EaseOut),
            "easeInOut" | "ease-in-out" => Ok(EasingPreset::EaseInOut),
            "linear" => Ok(EasingPreset::Linear),
            other => Err(UnknownEasingName(other.to_string())),
        }
    }
}

/// Easing selection for an animation
///
/// A name is only looked up when the animation starts; an unknown name logs a
/// warning and falls back to [`EasingPreset::Ease`].
#[derive(Clone)]
pub enum Easing {
    Preset(EasingPreset),
    Named(String),
    Custom(EasingFn),
}

impl Easing {
    pub fn named(name: impl Into<String>) -> Self {
        Easing::Named(name.into())
    }

    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Easing::Custom(Rc::new(f))
    }

    /// Look a name up once, so later reuse neither repeats the lookup nor
    /// the fallback warning
    pub fn resolved(&self) -> Easing {
        match self {
            Easing::Named(_) => Easing::Custom(self.resolve()),
            other => other.clone(),
        }
    }

    /// Resolve to a callable easing function
    pub fn resolve(&self) -> EasingFn {
        let preset = match self {
            Easing::Custom(f) => return Rc::clone(f),
            Easing::Preset(preset) => *preset,
            Easing::Named(name) => name.parse::<EasingPreset>().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {}", e, EasingPreset::default());
                EasingPreset::default()
            }),
        };
        let curve = preset.curve();
        Rc::new(move |x| curve.ease(x))
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Preset(EasingPreset::default())
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Preset(preset) => f.debug_tuple("Preset").field(preset).finish(),
            Easing::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<EasingPreset> for Easing {
    fn from(preset: EasingPreset) -> Self {
        Easing::Preset(preset)
    }
}

impl From<CubicBezier> for Easing {
    fn from(curve: CubicBezier) -> Self {
        Easing::custom(move |x| curve.ease(x))
    }
}
