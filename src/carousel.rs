// Featured carousel - index-based strip navigation
use std::time::{Duration, Instant};

use crate::catalog::{ItemId, MediaItem};
use crate::config::{Breakpoints, CarouselMetrics, TileMetrics};
use crate::gesture::Swipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Wide,
}

impl DeviceClass {
    pub fn for_width(width: f32, breakpoints: &Breakpoints) -> Self {
        if width >= breakpoints.desktop {
            DeviceClass::Wide
        } else if width >= breakpoints.tablet {
            DeviceClass::Desktop
        } else if width >= breakpoints.mobile {
            DeviceClass::Tablet
        } else {
            DeviceClass::Mobile
        }
    }

    /// Pointer-driven layouts translate the strip; touch layouts scroll it
    pub fn translates(&self) -> bool {
        matches!(self, DeviceClass::Desktop | DeviceClass::Wide)
    }

    pub fn tile(&self, metrics: &CarouselMetrics) -> TileMetrics {
        match self {
            DeviceClass::Mobile => metrics.mobile,
            DeviceClass::Tablet => metrics.tablet,
            DeviceClass::Desktop => metrics.desktop,
            DeviceClass::Wide => metrics.wide,
        }
    }
}

/// How the strip is placed for the current index
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StripPosition {
    /// Horizontal offset applied to the strip (non-positive)
    Translate(f32),
    /// Scroll offset of the strip's viewport
    ScrollTo(f32),
}

impl StripPosition {
    pub fn for_index(index: usize, class: DeviceClass, metrics: &CarouselMetrics) -> Self {
        let offset = index as f32 * class.tile(metrics).stride();
        if class.translates() {
            StripPosition::Translate(-offset)
        } else {
            StripPosition::ScrollTo(offset)
        }
    }
}

/// Everything that can move the carousel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselInput {
    Next,
    Prev,
    Indicator(usize),
    Swipe(Swipe),
    /// Wheel delta, positive when scrolling down
    Wheel(f32),
    ArrowLeft,
    ArrowRight,
    /// Timer step; past the last tile it starts over at the first
    Autoplay,
}

/// Fixed-order strip of featured items.
///
/// User navigation clamps at both ends; unlike the modal it never wraps.
/// Only the autoplay timer returns from the last tile to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselState {
    items: Vec<ItemId>,
    index: usize,
}

impl CarouselState {
    pub fn new(featured: &[&MediaItem]) -> Self {
        let mut state = Self::default();
        state.render(featured);
        state
    }

    /// Replace the strip contents and return to the first tile
    pub fn render(&mut self, featured: &[&MediaItem]) {
        self.items = featured.iter().map(|item| item.id).collect();
        self.index = 0;
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<ItemId> {
        self.items.get(self.index).copied()
    }

    pub fn is_indicator_active(&self, indicator: usize) -> bool {
        !self.items.is_empty() && indicator == self.index
    }

    /// Clamp into `[0, len-1]` and move there
    pub fn go_to(&mut self, index: usize) -> usize {
        self.index = index.min(self.items.len().saturating_sub(1));
        self.index
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.index + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.index.saturating_sub(1))
    }

    /// Funnel any input source into `go_to`
    pub fn apply(&mut self, input: CarouselInput) -> usize {
        match input {
            CarouselInput::Next | CarouselInput::ArrowRight | CarouselInput::Swipe(Swipe::Next) => self.next(),
            CarouselInput::Prev | CarouselInput::ArrowLeft | CarouselInput::Swipe(Swipe::Prev) => self.prev(),
            CarouselInput::Indicator(i) => self.go_to(i),
            CarouselInput::Wheel(delta) if delta > 0.0 => self.next(),
            CarouselInput::Wheel(delta) if delta < 0.0 => self.prev(),
            CarouselInput::Wheel(_) => self.index,
            CarouselInput::Autoplay if self.index + 1 >= self.items.len() => self.go_to(0),
            CarouselInput::Autoplay => self.next(),
        }
    }

    pub fn position(&self, class: DeviceClass, metrics: &CarouselMetrics) -> StripPosition {
        StripPosition::for_index(self.index, class, metrics)
    }
}

/// Advances the strip on a fixed interval while nobody is using it.
///
/// A held timer (pointer over the strip, a press in progress, a carousel
/// video playing) restarts its countdown, as does any manual navigation.
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    /// `None` when autoplay is disabled
    interval: Option<Duration>,
    since: Instant,
}

impl AutoAdvance {
    /// A zero interval disables autoplay
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval: (!interval.is_zero()).then_some(interval),
            since: now,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.since = now;
    }

    /// The input to apply when the interval elapsed unheld
    pub fn tick(&mut self, now: Instant, held: bool, len: usize) -> Option<CarouselInput> {
        let interval = self.interval?;
        if held || len <= 1 {
            self.since = now;
            return None;
        }
        if now.duration_since(self.since) < interval {
            return None;
        }
        self.since = now;
        Some(CarouselInput::Autoplay)
    }

    /// Time left until the next step could fire
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.interval
            .map(|interval| interval.saturating_sub(now.duration_since(self.since)))
    }
}
