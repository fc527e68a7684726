// Lightbox modal - single-item viewer state machine
use std::sync::Arc;

use crate::catalog::{ItemId, MediaCatalog, MediaItem};
use crate::gesture::{classify_swipe, Swipe, TouchThresholds};
use crate::playback::{MediaElement, PlaybackCoordinator, PlaybackError, SurfaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open { index: usize },
}

/// Identifies one media load. Outcomes carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub index: usize,
    pub generation: u64,
}

/// Display state of the modal's media area
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalMedia {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Space,
    F,
    M,
}

/// What a key press or gesture did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Ignored,
    Closed,
    /// Moved to a new catalog index; its media must be loaded
    Navigated(usize),
    PlaybackToggled,
    ToggleFullscreen,
    MuteToggled(bool),
}

/// Lightbox over the full catalog.
///
/// Prev/next wrap around the whole catalog, independent of the gallery's
/// current filter. Opening a video loads it paused.
pub struct ModalController {
    catalog: Arc<MediaCatalog>,
    state: ModalState,
    media: ModalMedia,
    generation: u64,
    muted: bool,
}

impl ModalController {
    pub fn new(catalog: Arc<MediaCatalog>) -> Self {
        Self {
            catalog,
            state: ModalState::Closed,
            media: ModalMedia::Empty,
            generation: 0,
            muted: true,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            ModalState::Open { index } => Some(index),
            ModalState::Closed => None,
        }
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.current_index().and_then(|index| self.catalog.get(index))
    }

    pub fn media(&self) -> &ModalMedia {
        &self.media
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Ticket for the media currently expected, if open
    pub fn ticket(&self) -> Option<LoadTicket> {
        self.current_index().map(|index| LoadTicket {
            index,
            generation: self.generation,
        })
    }

    /// "3 / 21"
    pub fn counter_text(&self) -> Option<String> {
        self.current_index()
            .map(|index| format!("{} / {}", index + 1, self.catalog.len()))
    }

    /// Open at `index`, clamped into the catalog. No-op on an empty catalog.
    pub fn open<E: MediaElement>(&mut self, index: usize, playback: &mut PlaybackCoordinator<E>) -> Option<usize> {
        if self.catalog.is_empty() {
            return None;
        }
        let index = index.min(self.catalog.len() - 1);
        tracing::debug!("Opening modal at {}", index);
        Some(self.show(index, playback))
    }

    pub fn next<E: MediaElement>(&mut self, playback: &mut PlaybackCoordinator<E>) -> Option<usize> {
        let index = self.current_index()?;
        let next = (index + 1) % self.catalog.len();
        Some(self.show(next, playback))
    }

    pub fn prev<E: MediaElement>(&mut self, playback: &mut PlaybackCoordinator<E>) -> Option<usize> {
        let index = self.current_index()?;
        let len = self.catalog.len();
        let prev = (index + len - 1) % len;
        Some(self.show(prev, playback))
    }

    /// Pause and release the modal video and hide. Safe to call when closed.
    pub fn close<E: MediaElement>(&mut self, playback: &mut PlaybackCoordinator<E>) {
        self.release(playback);
        if self.is_open() {
            tracing::debug!("Closing modal");
        }
        self.state = ModalState::Closed;
        self.media = ModalMedia::Empty;
        self.generation += 1;
    }

    /// Toggle the modal video. Ignored for images.
    pub fn toggle_playback<E: MediaElement>(
        &mut self,
        playback: &mut PlaybackCoordinator<E>,
    ) -> Result<(), PlaybackError> {
        if !self.current_item().is_some_and(MediaItem::is_video) {
            return Ok(());
        }
        playback.toggle(SurfaceId::Modal)
    }

    pub fn toggle_mute<E: MediaElement>(&mut self, playback: &mut PlaybackCoordinator<E>) -> bool {
        self.muted = !self.muted;
        if let Some(element) = playback.surface_mut(SurfaceId::Modal) {
            element.set_muted(self.muted);
        }
        self.muted
    }

    /// Keyboard shortcuts. Only active while open.
    pub fn handle_key<E: MediaElement>(&mut self, key: ModalKey, playback: &mut PlaybackCoordinator<E>) -> ModalEvent {
        if !self.is_open() {
            return ModalEvent::Ignored;
        }

        match key {
            ModalKey::Escape => {
                self.close(playback);
                ModalEvent::Closed
            }
            ModalKey::ArrowLeft => self.prev(playback).map_or(ModalEvent::Ignored, ModalEvent::Navigated),
            ModalKey::ArrowRight => self.next(playback).map_or(ModalEvent::Ignored, ModalEvent::Navigated),
            ModalKey::Space => {
                if !self.current_item().is_some_and(MediaItem::is_video) {
                    return ModalEvent::Ignored;
                }
                // A rejection is already recorded on the surface
                let _ = self.toggle_playback(playback);
                ModalEvent::PlaybackToggled
            }
            ModalKey::F => ModalEvent::ToggleFullscreen,
            ModalKey::M => ModalEvent::MuteToggled(self.toggle_mute(playback)),
        }
    }

    /// Horizontal swipes navigate; vertical ones are ignored
    pub fn handle_swipe<E: MediaElement>(
        &mut self,
        delta: egui::Vec2,
        thresholds: &TouchThresholds,
        playback: &mut PlaybackCoordinator<E>,
    ) -> ModalEvent {
        if !self.is_open() {
            return ModalEvent::Ignored;
        }
        let moved = match classify_swipe(delta, thresholds) {
            Some(Swipe::Next) => self.next(playback),
            Some(Swipe::Prev) => self.prev(playback),
            None => None,
        };
        moved.map_or(ModalEvent::Ignored, ModalEvent::Navigated)
    }

    /// Media for `ticket` finished loading. Stale tickets are ignored.
    pub fn media_loaded(&mut self, ticket: LoadTicket) -> bool {
        if self.ticket() != Some(ticket) {
            return false;
        }
        self.media = ModalMedia::Ready;
        true
    }

    /// Media for `ticket` failed. The modal stays open on the same index.
    pub fn media_failed(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if self.ticket() != Some(ticket) {
            return false;
        }
        self.media = ModalMedia::Failed(message.into());
        true
    }

    /// Route a finished still load to the load the modal is waiting for.
    ///
    /// Returns `None` when `pending` is not waiting for `id`, otherwise
    /// whether the outcome was applied. `pending` is cleared either way.
    pub fn resolve_load(
        &mut self,
        pending: &mut Option<LoadTicket>,
        id: ItemId,
        result: Result<(), String>,
    ) -> Option<bool> {
        let ticket = pending.filter(|t| t.index == id)?;
        *pending = None;
        Some(match result {
            Ok(()) => self.media_loaded(ticket),
            Err(reason) => self.media_failed(ticket, reason),
        })
    }

    /// Item ids adjacent to the current one, for preloading
    pub fn neighbours(&self) -> Option<(ItemId, ItemId)> {
        let index = self.current_index()?;
        let len = self.catalog.len();
        Some(((index + len - 1) % len, (index + 1) % len))
    }

    fn show<E: MediaElement>(&mut self, index: usize, playback: &mut PlaybackCoordinator<E>) -> usize {
        self.release(playback);
        self.state = ModalState::Open { index };
        self.media = ModalMedia::Loading;
        self.generation += 1;
        index
    }

    /// Drop the modal's video element, pausing it first if it was playing
    fn release<E: MediaElement>(&mut self, playback: &mut PlaybackCoordinator<E>) {
        playback.request_pause(SurfaceId::Modal);
        playback.unregister(SurfaceId::Modal);
    }
}
