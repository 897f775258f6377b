//! Scroll a chain of nested containers so an element becomes visible
//!
//! The walk starts at the element and climbs its containment chain. At each
//! container the element's box is re-expressed in that container's client
//! space, a scroll offset is chosen per axis, the offset is applied (directly
//! or through a tween), and the box is shifted by the scroll that was applied
//! before moving on to the next container.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bounds::{ScrollRequest, Viewport};
use super::geometry::{relative_from_to, Rect};
use super::provider::{GeometryProvider, ScrollPosition};
use crate::animation::{animate, default_scheduler, AnimateOptions, Scheduler};
use crate::easing::Easing;
use crate::{Error, Result};

/// How animated levels hand over to the next container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// Start every level's tween right away and correct the geometry with the
    /// requested offsets. Outer levels are computed before inner tweens
    /// settle, so a clamped inner scroll leaves outer levels slightly off.
    #[default]
    Eager,
    /// Wait for each level's tween to finish, then correct the geometry with
    /// the offsets the container actually reached.
    Sequential,
}

/// Animation settings for [`scroll_into_view`]
///
/// Passing options at all turns animation on.
#[derive(Clone, Default)]
pub struct ScrollOptions {
    /// Overrides the positional `center_if_needed` argument when set
    pub center_if_needed: Option<bool>,
    /// Defaults to 400 ms
    pub duration: Option<Duration>,
    pub easing: Easing,
    /// Shared by every level; defaults to [`default_scheduler`]
    pub scheduler: Option<Rc<dyn Scheduler>>,
    pub propagation: PropagationMode,
}

impl ScrollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_center_if_needed(mut self, center: bool) -> Self {
        self.center_if_needed = Some(center);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    pub fn with_scheduler(mut self, scheduler: Rc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_propagation(mut self, propagation: PropagationMode) -> Self {
        self.propagation = propagation;
        self
    }
}

impl fmt::Debug for ScrollOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollOptions")
            .field("center_if_needed", &self.center_if_needed)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("scheduler", &self.scheduler.as_ref().map(|_| ".."))
            .field("propagation", &self.propagation)
            .finish()
    }
}

/// Scroll every container between `element` and `stop_at` so that `element`
/// becomes visible
///
/// With `center_if_needed`, a box that is out of reach is centered in the
/// viewport instead of being brought just to the nearest edge. With
/// `options`, each container's scroll is tweened on the options' scheduler.
///
/// The walk ends at the first parent that is not an element, or once the
/// current node is `stop_at`; `stop_at` itself is scrolled, nothing above it
/// is.
///
/// Fails with [`Error::MissingElement`] when `element` is `None`.
pub fn scroll_into_view<P>(
    provider: &Rc<RefCell<P>>,
    element: Option<P::Node>,
    center_if_needed: bool,
    options: Option<ScrollOptions>,
    stop_at: Option<P::Node>,
) -> Result<()>
where
    P: GeometryProvider + 'static,
{
    let element = element.ok_or(Error::MissingElement)?;
    let center_if_needed = options
        .as_ref()
        .and_then(|o| o.center_if_needed)
        .unwrap_or(center_if_needed);
    let animation = options.map(|mut options| {
        options.easing = options.easing.resolved();
        let scheduler = options.scheduler.clone().unwrap_or_else(default_scheduler);
        LevelAnimation { options, scheduler }
    });

    let rect = provider.borrow().offset_rect(element);
    debug!(
        element = ?element,
        center_if_needed,
        animated = animation.is_some(),
        "Scrolling element into view"
    );

    Propagation {
        provider: Rc::clone(provider),
        current: element,
        rect,
        center_if_needed,
        stop_at,
        animation,
    }
    .run();
    Ok(())
}

#[derive(Clone)]
struct LevelAnimation {
    options: ScrollOptions,
    scheduler: Rc<dyn Scheduler>,
}

/// One container's worth of work
#[derive(Debug, Clone, Copy)]
struct Level<N> {
    container: N,
    origin_left: f64,
    origin_top: f64,
    /// Target box in the container's client coordinates
    rect: Rect,
    request: ScrollRequest,
}

struct Propagation<P: GeometryProvider> {
    provider: Rc<RefCell<P>>,
    current: P::Node,
    /// Target box relative to `current`'s offset parent
    rect: Rect,
    center_if_needed: bool,
    stop_at: Option<P::Node>,
    animation: Option<LevelAnimation>,
}

impl<P: GeometryProvider + 'static> Propagation<P> {
    fn run(mut self) {
        while let Some(level) = self.next_level() {
            let Some(animation) = self.animation.clone() else {
                let realized = {
                    let mut provider = self.provider.borrow_mut();
                    provider.set_scroll_left(level.container, level.request.scroll_left);
                    provider.set_scroll_top(level.container, level.request.scroll_top);
                    ScrollRequest::read(&*provider, level.container)
                };
                self.finish_level(&level, realized);
                continue;
            };

            let source = Rc::new(RefCell::new(ScrollPosition::new(
                Rc::clone(&self.provider),
                level.container,
            )));
            let mut tween = AnimateOptions::new()
                .with_easing(animation.options.easing.clone())
                .with_scheduler(Rc::clone(&animation.scheduler));
            tween.duration = animation.options.duration;

            match animation.options.propagation {
                PropagationMode::Eager => {
                    animate(source, &level.request.to_values(), tween);
                    self.finish_level(&level, level.request);
                }
                PropagationMode::Sequential => {
                    let tween = tween.on_done(move |position: &ScrollPosition<P>| {
                        let realized =
                            ScrollRequest::read(&*self.provider.borrow(), position.node());
                        self.finish_level(&level, realized);
                        self.run();
                    });
                    animate(source, &level.request.to_values(), tween);
                    return;
                }
            }
        }
        debug!("Scroll propagation complete");
    }

    /// Plan the next container, or `None` when the walk is over
    fn next_level(&self) -> Option<Level<P::Node>> {
        if self.stop_at == Some(self.current) {
            return None;
        }
        let provider = self.provider.borrow();
        let container = provider.parent_node(self.current)?;
        if !provider.is_element(container) {
            return None;
        }

        let origin_left = provider.offset_left(container) + provider.client_left(container);
        let origin_top = provider.offset_top(container) + provider.client_top(container);
        let rect = relative_from_to(&*provider, self.rect, self.current, container)
            .translate(-origin_left, -origin_top);
        let request = ScrollRequest::for_rect(
            &rect,
            &Viewport::of(&*provider, container),
            self.center_if_needed,
        );

        debug!(
            container = ?container,
            scroll_left = request.scroll_left,
            scroll_top = request.scroll_top,
            "Scrolling container"
        );
        Some(Level {
            container,
            origin_left,
            origin_top,
            rect,
            request,
        })
    }

    /// Shift the box by the scroll applied at `level` and climb to it
    fn finish_level(&mut self, level: &Level<P::Node>, applied: ScrollRequest) {
        if applied != level.request {
            debug!(
                container = ?level.container,
                scroll_left = applied.scroll_left,
                scroll_top = applied.scroll_top,
                "Container clamped scroll"
            );
        }
        self.rect = level.rect.translate(
            level.origin_left - applied.scroll_left,
            level.origin_top - applied.scroll_top,
        );
        self.current = level.container;
    }
}
