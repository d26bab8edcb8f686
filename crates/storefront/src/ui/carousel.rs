//! Carousel/slider state machine.
//!
//! Pure state: index, autoplay interval and the deadline of the next
//! automatic advance. Time is passed in explicitly so the machine can be
//! driven by HTMX polling in production and by fixed instants in tests.

use std::time::{Duration, Instant};

use serde::Deserialize;

/// Navigation requested by a carousel control or the autoplay poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nav {
    Prev,
    Next,
    /// Autoplay poll: advance only if autoplay is enabled.
    Auto,
}

/// Index state for a rotating list of `len` slides.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: usize,
    autoplay: Option<Duration>,
    deadline: Option<Instant>,
    mounted: bool,
}

impl Carousel {
    /// Create a mounted carousel at index 0. Autoplay is ignored for fewer
    /// than two slides.
    #[must_use]
    pub fn new(len: usize, autoplay: Option<Duration>, now: Instant) -> Self {
        let mut carousel = Self {
            len,
            index: 0,
            autoplay: autoplay.filter(|interval| !interval.is_zero()),
            deadline: None,
            mounted: true,
        };
        carousel.reschedule(now);
        carousel
    }

    /// Create a carousel positioned at `index` (taken modulo `len`).
    #[must_use]
    pub fn at(len: usize, index: usize, autoplay: Option<Duration>, now: Instant) -> Self {
        let mut carousel = Self::new(len, autoplay, now);
        carousel.index = if len == 0 { 0 } else { index % len };
        carousel
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Prev/next controls are shown only when there is somewhere to go.
    #[must_use]
    pub const fn controls_visible(&self) -> bool {
        self.len > 1
    }

    /// Effective autoplay interval, `None` when disabled.
    #[must_use]
    pub fn autoplay(&self) -> Option<Duration> {
        self.autoplay.filter(|_| self.controls_visible() && self.mounted)
    }

    /// Move forward one slide, wrapping, and restart the timer phase.
    pub fn next(&mut self, now: Instant) {
        if self.can_move() {
            self.index = (self.index + 1) % self.len;
            self.reschedule(now);
        }
    }

    /// Move back one slide, wrapping, and restart the timer phase.
    pub fn prev(&mut self, now: Instant) {
        if self.can_move() {
            self.index = (self.index + self.len - 1) % self.len;
            self.reschedule(now);
        }
    }

    /// Jump to `index` (modulo `len`) and restart the timer phase.
    pub fn go_to(&mut self, index: usize, now: Instant) {
        if self.can_move() {
            self.index = index % self.len;
            self.reschedule(now);
        }
    }

    /// Apply a control action.
    pub fn navigate(&mut self, nav: Nav, now: Instant) {
        match nav {
            Nav::Prev => self.prev(now),
            Nav::Next => self.next(now),
            Nav::Auto => {
                if self.autoplay().is_some() {
                    self.next(now);
                }
            }
        }
    }

    /// Indices of up to `per_view` slides starting at the current one,
    /// wrapping around. Never repeats a slide.
    #[must_use]
    pub fn window(&self, per_view: usize) -> Vec<usize> {
        (0..per_view.min(self.len))
            .map(|offset| (self.index + offset) % self.len)
            .collect()
    }

    /// Index reached by one step backwards or forwards, for link targets.
    #[must_use]
    pub const fn neighbours(&self) -> (usize, usize) {
        if self.len < 2 {
            return (self.index, self.index);
        }
        (
            (self.index + self.len - 1) % self.len,
            (self.index + 1) % self.len,
        )
    }

    const fn can_move(&self) -> bool {
        self.mounted && self.len > 1
    }

    fn reschedule(&mut self, now: Instant) {
        self.deadline = self
            .autoplay()
            .and_then(|interval| now.checked_add(interval));
    }
}

/// Wall-clock timing. Served pages carry it in markup: the carousel root
/// polls with `hx-trigger="every {ms}ms"` and removing the element stops
/// the poll. These methods model that behaviour.
#[cfg_attr(not(test), allow(dead_code))]
impl Carousel {
    #[must_use]
    pub(crate) const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// When the next automatic advance is due.
    #[must_use]
    pub(crate) const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Advance if the autoplay deadline has passed. Returns whether it did.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.mounted && now >= deadline => {
                self.next(now);
                true
            }
            _ => false,
        }
    }

    /// Stop the timer. Every later operation is a no-op.
    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_SECS: Duration = Duration::from_secs(5);

    #[test]
    fn test_next_cycles_modulo_len() {
        let now = Instant::now();
        let mut c = Carousel::new(3, None, now);
        let mut seen = vec![c.index()];
        for _ in 0..6 {
            c.next(now);
            seen.push(c.index());
        }
        assert_eq!(seen, [0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_prev_wraps() {
        let now = Instant::now();
        let mut c = Carousel::new(4, None, now);
        c.prev(now);
        assert_eq!(c.index(), 3);
        c.go_to(9, now);
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn test_single_or_empty_disables_everything() {
        let now = Instant::now();
        for len in [0, 1] {
            let mut c = Carousel::new(len, Some(FIVE_SECS), now);
            c.next(now);
            c.prev(now);
            c.navigate(Nav::Auto, now);
            assert_eq!(c.index(), 0);
            assert!(!c.controls_visible());
            assert!(c.autoplay().is_none());
            assert!(c.deadline().is_none());
            assert!(!c.tick(now + FIVE_SECS * 2));
        }
    }

    #[test]
    fn test_tick_advances_after_deadline() {
        let start = Instant::now();
        let mut c = Carousel::new(3, Some(FIVE_SECS), start);

        assert!(!c.tick(start + Duration::from_secs(4)));
        assert_eq!(c.index(), 0);

        assert!(c.tick(start + FIVE_SECS));
        assert_eq!(c.index(), 1);
        assert_eq!(c.deadline(), Some(start + FIVE_SECS * 2));
    }

    #[test]
    fn test_manual_navigation_resets_phase() {
        let start = Instant::now();
        let mut c = Carousel::new(3, Some(FIVE_SECS), start);

        let clicked = start + Duration::from_secs(4);
        c.next(clicked);
        assert_eq!(c.deadline(), Some(clicked + FIVE_SECS));

        // The original deadline has passed but the reset one has not.
        assert!(!c.tick(start + Duration::from_secs(6)));
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn test_unmount_stops_updates() {
        let start = Instant::now();
        let mut c = Carousel::new(3, Some(FIVE_SECS), start);
        c.unmount();

        assert!(c.deadline().is_none());
        assert!(!c.tick(start + FIVE_SECS * 10));
        c.next(start);
        c.go_to(2, start);
        assert_eq!(c.index(), 0);
        assert!(!c.is_mounted());
    }

    #[test]
    fn test_auto_nav_requires_autoplay() {
        let now = Instant::now();
        let mut manual = Carousel::new(3, None, now);
        manual.navigate(Nav::Auto, now);
        assert_eq!(manual.index(), 0);

        let mut auto = Carousel::new(3, Some(FIVE_SECS), now);
        auto.navigate(Nav::Auto, now);
        assert_eq!(auto.index(), 1);
    }

    #[test]
    fn test_window_wraps_without_repeats() {
        let now = Instant::now();
        let c = Carousel::at(5, 3, None, now);
        assert_eq!(c.window(3), [3, 4, 0]);
        assert_eq!(c.window(8), [3, 4, 0, 1, 2]);
        assert_eq!(c.neighbours(), (2, 4));
    }

    #[test]
    fn test_at_clamps_stale_index() {
        let c = Carousel::at(2, 7, None, Instant::now());
        assert_eq!(c.index(), 1);
        let empty = Carousel::at(0, 7, None, Instant::now());
        assert_eq!(empty.index(), 0);
        assert!(empty.window(4).is_empty());
    }
}
