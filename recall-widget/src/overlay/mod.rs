//! Suggestion overlay.
//!
//! The overlay is a floating list anchored below the input. Unlike the
//! input itself it is purely a view: the suggestion field decides when it is
//! shown and what it lists, and the presenter works out where it goes, how
//! far along its animation is, and which row a tap landed on.
//!
//! Showing and hiding are two-phase. `show` enters `Entering` and `tick`
//! promotes it to `Visible` once the animation has run; `hide` enters
//! `Dismissing` and the overlay is only removed (`Hidden`) after the fade
//! out completes. Both are idempotent, so there is never more than one
//! overlay per field.

mod item;

pub use item::{DefaultItemRenderer, ItemContext, ItemRenderer, SuggestionItem};

use std::time::{Duration, Instant};

use crate::config::SuggestionConfig;
use crate::geometry::Rect;
use crate::transitions::{Easing, progress};

/// Vertical distance the list slides while appearing.
const SLIDE_DISTANCE: f32 = 8.0;

/// Actions the overlay reports back to the suggestion field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// A suggestion row was tapped.
    Select(usize),
    /// A row's remove affordance was tapped.
    Remove(usize),
    /// The backdrop outside the list was tapped.
    DismissOutside,
}

/// Lifecycle of the overlay entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// Not in the overlay layer.
    #[default]
    Hidden,
    /// Animating in since the given instant.
    Entering(Instant),
    /// Fully shown.
    Visible,
    /// Animating out since the given instant; removed when done.
    Dismissing(Instant),
}

/// What a point on screen hits while the overlay is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A suggestion row.
    Item(usize),
    /// The remove affordance of a row.
    RemoveButton(usize),
    /// The tap-catcher beneath the list.
    Backdrop,
}

impl Hit {
    /// The event this hit triggers.
    pub fn event(self) -> OverlayEvent {
        match self {
            Hit::Item(index) => OverlayEvent::Select(index),
            Hit::RemoveButton(index) => OverlayEvent::Remove(index),
            Hit::Backdrop => OverlayEvent::DismissOutside,
        }
    }
}

/// Placement of the list for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    /// Visible list area.
    pub area: Rect,
    /// Total height of all rows.
    pub content_height: f32,
    /// Whether the list scrolls (content taller than the cap).
    pub scrollable: bool,
    /// Height of one row.
    pub item_height: f32,
}

/// Animation values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,
    /// Vertical offset to apply to the list; negative is up.
    pub offset_y: f32,
}

/// A renderable overlay frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView<T> {
    pub layout: OverlayLayout,
    /// Full-surface tap-catcher drawn beneath the list.
    pub backdrop: Rect,
    pub frame: AnimationFrame,
    pub scroll_offset: f32,
    /// Rendered rows, top to bottom.
    pub items: Vec<T>,
    /// Whether rows carry a remove affordance.
    pub removable: bool,
}

impl<T> OverlayView<T> {
    /// Work out what a tap at `(x, y)` hits.
    ///
    /// Points inside the list map to a row (or its remove affordance, the
    /// square at the row's right edge); anything else on the backdrop is a
    /// tap outside. Points off the backdrop hit nothing.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Hit> {
        let area = self.layout.area;
        if area.contains(x, y) && self.layout.item_height > 0.0 {
            let row = ((y - area.y + self.scroll_offset) / self.layout.item_height) as usize;
            if row < self.items.len() {
                let button_left = area.right() - self.layout.item_height;
                if self.removable && x >= button_left {
                    return Some(Hit::RemoveButton(row));
                }
                return Some(Hit::Item(row));
            }
        }
        self.backdrop.contains(x, y).then_some(Hit::Backdrop)
    }
}

/// Presents the suggestion list for one field.
#[derive(Debug, Clone)]
pub struct OverlayPresenter {
    phase: OverlayPhase,
    /// Rows currently shown; kept while dismissing so the list can fade out.
    entries: Vec<String>,
    scroll_offset: f32,
    render_requested: bool,
    duration: Duration,
    easing: Easing,
    item_height: f32,
    max_height: f32,
    box_margin: f32,
    horizontal_margin: f32,
    removable: bool,
}

impl OverlayPresenter {
    /// Create a hidden presenter using the config's metrics.
    pub fn new(config: &SuggestionConfig) -> Self {
        Self {
            phase: OverlayPhase::Hidden,
            entries: Vec::new(),
            scroll_offset: 0.0,
            render_requested: false,
            duration: config.animation_duration,
            easing: Easing::default(),
            item_height: config.item_height,
            max_height: config.max_suggestions_height,
            box_margin: config.suggestion_box_margin,
            horizontal_margin: config.horizontal_margin,
            removable: config.show_remove_button,
        }
    }

    /// Use a different easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether the overlay is in the overlay layer (including while
    /// animating out).
    pub fn is_mounted(&self) -> bool {
        self.phase != OverlayPhase::Hidden
    }

    /// Whether the overlay is shown or appearing.
    pub fn is_shown(&self) -> bool {
        matches!(self.phase, OverlayPhase::Entering(_) | OverlayPhase::Visible)
    }

    /// Rows currently presented.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Show `entries`, or update the rows if already shown.
    ///
    /// Only starts the enter animation when the overlay is not already
    /// shown; a dismissal in progress is reversed.
    pub fn present(&mut self, entries: Vec<String>, now: Instant) {
        if entries != self.entries {
            self.scroll_offset = 0.0;
        }
        self.entries = entries;
        self.render_requested = true;
        if !self.is_shown() {
            log::debug!("Overlay entering with {} rows", self.entries.len());
            self.phase = OverlayPhase::Entering(now);
        }
    }

    /// Replace the rows in place, without replaying the animation.
    pub fn update(&mut self, entries: Vec<String>) {
        self.entries = entries;
        self.clamp_scroll();
        self.render_requested = true;
    }

    /// Start dismissing. No-op if already hidden or dismissing.
    pub fn dismiss(&mut self, now: Instant) {
        if self.is_shown() {
            log::debug!("Overlay dismissing");
            self.phase = OverlayPhase::Dismissing(now);
            self.render_requested = true;
        }
    }

    /// Drop the overlay immediately, skipping the animation.
    pub fn remove(&mut self) {
        self.phase = OverlayPhase::Hidden;
        self.entries.clear();
        self.scroll_offset = 0.0;
        self.render_requested = true;
    }

    /// Advance the animation. Returns `true` while a frame is still
    /// animating or a re-render was requested.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            OverlayPhase::Entering(since) if self.elapsed(since, now) >= 1.0 => {
                self.phase = OverlayPhase::Visible;
                self.render_requested = true;
            }
            OverlayPhase::Dismissing(since) if self.elapsed(since, now) >= 1.0 => {
                log::debug!("Overlay removed");
                self.remove();
            }
            _ => {}
        }
        let animating = matches!(
            self.phase,
            OverlayPhase::Entering(_) | OverlayPhase::Dismissing(_)
        );
        std::mem::take(&mut self.render_requested) || animating
    }

    /// Animation values at `now`.
    pub fn frame(&self, now: Instant) -> AnimationFrame {
        let shown = match self.phase {
            OverlayPhase::Hidden => 0.0,
            OverlayPhase::Visible => 1.0,
            OverlayPhase::Entering(since) => self.easing.apply(self.elapsed(since, now)),
            OverlayPhase::Dismissing(since) => 1.0 - self.easing.apply(self.elapsed(since, now)),
        };
        AnimationFrame {
            opacity: shown,
            offset_y: -(1.0 - shown) * SLIDE_DISTANCE,
        }
    }

    /// Place the list for `count` rows below `anchor`.
    ///
    /// Returns `None` when the anchor has not been laid out yet.
    pub fn layout(
        &self,
        anchor: Option<Rect>,
        viewport: Rect,
        count: usize,
    ) -> Option<OverlayLayout> {
        let anchor = anchor?;
        let content_height = count as f32 * self.item_height;
        let height = content_height.min(self.max_height);
        let width = (viewport.width - 2.0 * self.horizontal_margin).max(0.0);
        let area = Rect::new(
            viewport.x + self.horizontal_margin,
            anchor.bottom() + self.box_margin,
            width,
            height,
        );
        Some(OverlayLayout {
            area,
            content_height,
            scrollable: content_height > self.max_height,
            item_height: self.item_height,
        })
    }

    /// Scroll the list by `delta`; ignored unless the list is scrollable.
    pub fn scroll_by(&mut self, delta: f32) {
        if self.max_scroll() > 0.0 {
            self.scroll_offset += delta;
            self.clamp_scroll();
            self.render_requested = true;
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Build the frame to draw, or `None` when nothing should be drawn
    /// (hidden, no rows, or the anchor isn't laid out).
    pub fn render<R: ItemRenderer>(
        &self,
        anchor: Option<Rect>,
        viewport: Rect,
        now: Instant,
        query: &str,
        renderer: &R,
    ) -> Option<OverlayView<R::Output>> {
        if !self.is_mounted() || self.entries.is_empty() {
            return None;
        }
        let Some(layout) = self.layout(anchor, viewport, self.entries.len()) else {
            log::debug!("Overlay anchor not laid out yet, skipping frame");
            return None;
        };

        let items = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, text)| {
                renderer.render(&ItemContext {
                    index,
                    text,
                    query,
                    on_select: OverlayEvent::Select(index),
                    on_remove: self.removable.then_some(OverlayEvent::Remove(index)),
                })
            })
            .collect();

        Some(OverlayView {
            layout,
            backdrop: viewport,
            frame: self.frame(now),
            scroll_offset: self.scroll_offset,
            items,
            removable: self.removable,
        })
    }

    fn elapsed(&self, since: Instant, now: Instant) -> f32 {
        progress(now.saturating_duration_since(since), self.duration)
    }

    fn max_scroll(&self) -> f32 {
        let content = self.entries.len() as f32 * self.item_height;
        (content - self.max_height).max(0.0)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll());
    }
}
