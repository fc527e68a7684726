// Pointer gesture classification and burst coalescing
use egui::{Pos2, Vec2};
use std::time::{Duration, Instant};

use crate::config::TouchConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchThresholds {
    pub min_swipe_distance: f32,
    pub max_tap_duration: Duration,
    pub max_tap_distance: f32,
}

impl From<&TouchConfig> for TouchThresholds {
    fn from(config: &TouchConfig) -> Self {
        Self {
            min_swipe_distance: config.min_swipe_distance,
            max_tap_duration: Duration::from_millis(config.max_tap_duration_ms),
            max_tap_distance: config.max_tap_distance,
        }
    }
}

impl Default for TouchThresholds {
    fn default() -> Self {
        Self::from(&TouchConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    Scroll,
}

/// A tap is short and nearly stationary; anything else is a scroll or drag
pub fn classify(duration: Duration, travel: f32, thresholds: &TouchThresholds) -> Gesture {
    if duration < thresholds.max_tap_duration && travel < thresholds.max_tap_distance {
        Gesture::Tap
    } else {
        Gesture::Scroll
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Content dragged to the left
    Next,
    /// Content dragged to the right
    Prev,
}

/// Map a drag to navigation. Drags shorter than the swipe threshold and
/// mostly-vertical drags are ignored.
pub fn classify_swipe(delta: Vec2, thresholds: &TouchThresholds) -> Option<Swipe> {
    if delta.x.abs() <= thresholds.min_swipe_distance || delta.y.abs() > delta.x.abs() {
        return None;
    }
    if delta.x < 0.0 {
        Some(Swipe::Next)
    } else {
        Some(Swipe::Prev)
    }
}

/// Where and when a press began; `time` is in seconds (egui input time)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub started_at: f64,
    pub origin: Pos2,
}

impl PointerPress {
    pub fn begin(time: f64, origin: Pos2) -> Self {
        Self { started_at: time, origin }
    }

    pub fn finish(&self, time: f64, position: Pos2, thresholds: &TouchThresholds) -> Gesture {
        let duration = Duration::from_secs_f64((time - self.started_at).max(0.0));
        classify(duration, self.origin.distance(position), thresholds)
    }

    pub fn swipe(&self, position: Pos2, thresholds: &TouchThresholds) -> Option<Swipe> {
        classify_swipe(position - self.origin, thresholds)
    }
}

/// Collapses a burst of events into one firing after a quiet window
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, last_event: None }
    }

    /// Record an event in the burst
    pub fn poke(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// True exactly once, after the quiet window has passed since the last poke
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.duration_since(last) >= self.quiet => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn short_stationary_press_is_a_tap() {
        let t = TouchThresholds::default();
        assert_eq!(classify(Duration::from_millis(150), 3.0, &t), Gesture::Tap);
    }

    #[test]
    fn travel_or_duration_over_threshold_is_a_scroll() {
        let t = TouchThresholds::default();
        assert_eq!(classify(Duration::from_millis(150), 40.0, &t), Gesture::Scroll);
        assert_eq!(classify(Duration::from_millis(450), 2.0, &t), Gesture::Scroll);
        assert_eq!(classify(Duration::from_millis(300), 2.0, &t), Gesture::Scroll);
    }

    #[test]
    fn press_measures_euclidean_travel() {
        let t = TouchThresholds::default();
        let press = PointerPress::begin(10.0, pos2(100.0, 100.0));
        assert_eq!(press.finish(10.15, pos2(103.0, 100.0), &t), Gesture::Tap);
        assert_eq!(press.finish(10.15, pos2(100.0, 140.0), &t), Gesture::Scroll);
        assert_eq!(press.finish(10.15, pos2(106.0, 108.0), &t), Gesture::Scroll);
    }

    #[test]
    fn horizontal_swipes_map_to_navigation() {
        let t = TouchThresholds::default();
        assert_eq!(classify_swipe(vec2(-80.0, 5.0), &t), Some(Swipe::Next));
        assert_eq!(classify_swipe(vec2(80.0, -5.0), &t), Some(Swipe::Prev));
    }

    #[test]
    fn short_or_vertical_swipes_are_ignored() {
        let t = TouchThresholds::default();
        assert_eq!(classify_swipe(vec2(-30.0, 0.0), &t), None);
        assert_eq!(classify_swipe(vec2(-60.0, 120.0), &t), None);
    }

    #[test]
    fn debouncer_fires_once_after_quiet_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        let start = Instant::now();
        assert!(!debouncer.fire(start));

        debouncer.poke(start);
        debouncer.poke(start + Duration::from_millis(100));
        assert!(!debouncer.fire(start + Duration::from_millis(200)));
        assert!(debouncer.fire(start + Duration::from_millis(400)));
        assert!(!debouncer.fire(start + Duration::from_millis(800)));
    }
}
