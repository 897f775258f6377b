pub mod animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod fixture;
pub mod scroll;

pub use animation::{animate, AnimateOptions, AnimationHandle, Scheduler, TweenValues};
pub use config::{AppConfig, GeneralConfig, ScrollConfig};
pub use easing::{make_cubic_bezier_easing, CubicBezier, Easing, EasingPreset};
pub use error::{Error, Result};
pub use fixture::{FixtureNode, FixtureTree, NodeId};
pub use scroll::{scroll_into_view, GeometryProvider, PropagationMode, ScrollOptions};
