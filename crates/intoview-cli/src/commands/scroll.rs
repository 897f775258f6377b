use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;

use intoview_core::animation::FrameScheduler;
use intoview_core::fixture::NodeScroll;
use intoview_core::{scroll_into_view, FixtureTree, PropagationMode, ScrollConfig};

/// Flags of the `scroll` subcommand
#[derive(Debug, Clone, Default)]
pub struct ScrollArgs {
    pub fixture: PathBuf,
    pub target: String,
    pub stop_at: Option<String>,
    pub no_center: bool,
    pub animate: bool,
    pub duration_ms: Option<u64>,
    pub easing: Option<String>,
    pub sequential: bool,
    pub json: bool,
}

impl ScrollArgs {
    /// Config values with command-line overrides applied
    fn resolve(&self, config: &ScrollConfig) -> ScrollConfig {
        let mut resolved = config.clone();
        if self.animate {
            resolved.smooth_enabled = true;
        }
        if self.no_center {
            resolved.center_if_needed = false;
        }
        if let Some(ms) = self.duration_ms {
            resolved.duration_ms = ms;
        }
        if let Some(easing) = &self.easing {
            resolved.easing = easing.clone();
        }
        if self.sequential {
            resolved.propagation = PropagationMode::Sequential;
        }
        resolved
    }
}

pub async fn run(args: &ScrollArgs, config: &ScrollConfig) -> Result<()> {
    let settings = args.resolve(config);
    let tree = Rc::new(RefCell::new(FixtureTree::load(&args.fixture)?));
    let (target, stop_at) = {
        let tree = tree.borrow();
        let target = tree.node(&args.target)?;
        let stop_at = args.stop_at.as_deref().map(|name| tree.node(name)).transpose()?;
        (target, stop_at)
    };

    let frames = match settings.animation() {
        Some(options) => {
            let scheduler = Rc::new(FrameScheduler::new());
            let options = options.with_scheduler(scheduler.clone());
            scroll_into_view(&tree, Some(target), settings.center_if_needed, Some(options), stop_at)?;

            let mut interval = tokio::time::interval(settings.frame_interval());
            let mut frames = 0usize;
            while !scheduler.is_idle() {
                interval.tick().await;
                frames += scheduler.tick();
            }
            frames
        }
        None => {
            scroll_into_view(&tree, Some(target), settings.center_if_needed, None, stop_at)?;
            0
        }
    };
    tracing::info!(target_node = %args.target, frames, "Scrolled into view");

    let snapshot = tree.borrow().snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_table(&snapshot);
    }

    Ok(())
}

fn print_table(snapshot: &[NodeScroll]) {
    let width = snapshot.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for node in snapshot {
        println!(
            "  {:<width$}  left {:>8.2}  top {:>8.2}",
            node.name,
            node.scroll_left,
            node.scroll_top,
            width = width
        );
    }
}
