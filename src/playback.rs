// Playback coordinator - at most one playing video across the whole window
use std::collections::{HashMap, HashSet};

use crate::catalog::ItemId;
pub use crate::error::PlaybackError;

/// A video element that can play: a gallery tile, a carousel tile or the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Gallery(ItemId),
    Carousel(ItemId),
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing(SurfaceId),
}

/// The native side of a surface.
///
/// Components never call these directly; every play/pause goes through
/// [`PlaybackCoordinator`].
pub trait MediaElement {
    /// Start playback. An error means the element is not playing.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Move the playhead back to the start
    fn rewind(&mut self);
    fn is_playing(&self) -> bool;
    /// True once playback ran to the end of the stream
    fn has_ended(&self) -> bool;
    /// True when the element stopped on its own because decoding broke
    fn has_errored(&self) -> bool {
        false
    }
    fn set_muted(&mut self, _muted: bool) {}
}

/// Owns every registered surface and the single active-playback slot
pub struct PlaybackCoordinator<E> {
    state: PlaybackState,
    surfaces: HashMap<SurfaceId, E>,
    /// Surfaces whose last play request was rejected
    failed: HashSet<SurfaceId>,
}

impl<E: MediaElement> PlaybackCoordinator<E> {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            surfaces: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self, id: SurfaceId) -> bool {
        self.state == PlaybackState::Playing(id)
    }

    pub fn has_failed(&self, id: SurfaceId) -> bool {
        self.failed.contains(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&E> {
        self.surfaces.get(&id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut E> {
        self.surfaces.get_mut(&id)
    }

    /// Attach an element to a surface, replacing (and pausing) any previous one
    pub fn register(&mut self, id: SurfaceId, element: E) {
        self.unregister(id);
        self.surfaces.insert(id, element);
    }

    /// Detach a surface. If it was playing it is paused first.
    pub fn unregister(&mut self, id: SurfaceId) -> Option<E> {
        if self.is_active(id) {
            self.state = PlaybackState::Idle;
        }
        self.failed.remove(&id);

        let mut element = self.surfaces.remove(&id)?;
        if element.is_playing() {
            element.pause();
        }
        Some(element)
    }

    /// Detach every surface matching the predicate
    pub fn unregister_where(&mut self, mut predicate: impl FnMut(SurfaceId) -> bool) {
        let doomed: Vec<SurfaceId> = self.surfaces.keys().copied().filter(|id| predicate(*id)).collect();
        for id in doomed {
            self.unregister(id);
        }
    }

    /// Play `id`, pausing the previously active surface first.
    ///
    /// On rejection the coordinator is left idle and the surface is flagged
    /// as failed until its next successful start.
    pub fn request_play(&mut self, id: SurfaceId) -> Result<(), PlaybackError> {
        if !self.surfaces.contains_key(&id) {
            return Err(PlaybackError::UnknownSurface(id));
        }

        if let PlaybackState::Playing(active) = self.state {
            if active == id && self.surfaces.get(&id).is_some_and(|e| e.is_playing()) {
                return Ok(());
            }
            if let Some(element) = self.surfaces.get_mut(&active) {
                element.pause();
            }
            self.state = PlaybackState::Idle;
        }

        let Some(element) = self.surfaces.get_mut(&id) else {
            return Err(PlaybackError::UnknownSurface(id));
        };

        match element.play() {
            Ok(()) => {
                self.failed.remove(&id);
                self.state = PlaybackState::Playing(id);
                tracing::debug!("Playing {:?}", id);
                Ok(())
            }
            Err(e) => {
                if element.is_playing() {
                    element.pause();
                }
                self.failed.insert(id);
                tracing::warn!("Playback of {:?} rejected: {}", id, e);
                Err(e)
            }
        }
    }

    /// Pause `id` if it is the active surface; otherwise nothing happens
    pub fn request_pause(&mut self, id: SurfaceId) {
        if !self.is_active(id) {
            return;
        }
        if let Some(element) = self.surfaces.get_mut(&id) {
            element.pause();
        }
        self.state = PlaybackState::Idle;
    }

    /// Play when paused, pause when playing
    pub fn toggle(&mut self, id: SurfaceId) -> Result<(), PlaybackError> {
        if self.is_active(id) {
            self.request_pause(id);
            Ok(())
        } else {
            self.request_play(id)
        }
    }

    /// End of stream: rewind so the next play starts from zero
    pub fn notify_ended(&mut self, id: SurfaceId) {
        if let Some(element) = self.surfaces.get_mut(&id) {
            element.pause();
            element.rewind();
        }
        if self.is_active(id) {
            self.state = PlaybackState::Idle;
        }
    }

    /// Check whether the active surface reached its end; returns it if so
    pub fn poll_ended(&mut self) -> Option<SurfaceId> {
        let PlaybackState::Playing(id) = self.state else {
            return None;
        };
        let ended = self.surfaces.get(&id).is_some_and(|e| e.has_ended());
        if ended {
            self.notify_ended(id);
            Some(id)
        } else {
            None
        }
    }

    /// Check whether the active surface died mid-playback. It is flagged as
    /// failed and the coordinator goes idle.
    pub fn poll_errored(&mut self) -> Option<SurfaceId> {
        let PlaybackState::Playing(id) = self.state else {
            return None;
        };
        let element = self.surfaces.get_mut(&id)?;
        if !element.has_errored() {
            return None;
        }
        element.pause();
        self.failed.insert(id);
        self.state = PlaybackState::Idle;
        tracing::warn!("Playback of {:?} stopped on a decode error", id);
        Some(id)
    }

    /// Pause everything and go idle
    pub fn stop_all(&mut self) {
        for element in self.surfaces.values_mut() {
            if element.is_playing() {
                element.pause();
            }
        }
        if self.state != PlaybackState::Idle {
            tracing::debug!("Stopped all playback");
        }
        self.state = PlaybackState::Idle;
    }

    /// Stop and drop every surface. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.stop_all();
        self.surfaces.clear();
        self.failed.clear();
    }

    /// Number of elements currently playing; never more than one
    pub fn playing_count(&self) -> usize {
        self.surfaces.values().filter(|e| e.is_playing()).count()
    }
}

impl<E: MediaElement> Default for PlaybackCoordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The active tile surface, if it was not drawn on screen this frame.
/// The modal is never off screen.
pub fn offscreen_tile(state: PlaybackState, visible: &HashSet<SurfaceId>) -> Option<SurfaceId> {
    let PlaybackState::Playing(active) = state else {
        return None;
    };
    let tile = matches!(active, SurfaceId::Gallery(_) | SurfaceId::Carousel(_));
    (tile && !visible.contains(&active)).then_some(active)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Element double recording its playing flag
    #[derive(Debug, Default)]
    pub(crate) struct FakeElement {
        pub playing: bool,
        pub ended: bool,
        pub errored: bool,
        pub reject: bool,
        pub position: f64,
        pub muted: bool,
        pub play_calls: usize,
    }

    impl FakeElement {
        pub(crate) fn rejecting() -> Self {
            Self {
                reject: true,
                ..Self::default()
            }
        }
    }

    impl MediaElement for FakeElement {
        fn play(&mut self) -> Result<(), PlaybackError> {
            self.play_calls += 1;
            if self.reject {
                return Err(PlaybackError::Rejected("autoplay blocked".to_string()));
            }
            self.playing = true;
            self.ended = false;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }

        fn rewind(&mut self) {
            self.position = 0.0;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn has_ended(&self) -> bool {
            self.ended
        }

        fn has_errored(&self) -> bool {
            self.errored
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    const A: SurfaceId = SurfaceId::Gallery(1);
    const B: SurfaceId = SurfaceId::Carousel(2);

    fn coordinator() -> PlaybackCoordinator<FakeElement> {
        let mut playback = PlaybackCoordinator::new();
        playback.register(A, FakeElement::default());
        playback.register(B, FakeElement::default());
        playback.register(SurfaceId::Modal, FakeElement::default());
        playback
    }

    fn playing(playback: &PlaybackCoordinator<FakeElement>, id: SurfaceId) -> bool {
        playback.surface(id).is_some_and(|e| e.playing)
    }

    #[test]
    fn second_play_pauses_the_first() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        assert!(playing(&playback, A));

        playback.request_play(B).expect("play B");
        assert!(!playing(&playback, A));
        assert!(playing(&playback, B));
        assert_eq!(playback.state(), PlaybackState::Playing(B));
        assert_eq!(playback.playing_count(), 1);
    }

    #[test]
    fn rejected_play_leaves_coordinator_idle() {
        let mut playback = coordinator();
        playback.register(A, FakeElement::rejecting());

        let result = playback.request_play(A);
        assert!(matches!(result, Err(PlaybackError::Rejected(_))));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(!playing(&playback, A));
        assert!(playback.has_failed(A));
    }

    #[test]
    fn rejected_play_still_pauses_the_previous_surface() {
        let mut playback = coordinator();
        playback.request_play(B).expect("play B");
        playback.register(A, FakeElement::rejecting());

        assert!(playback.request_play(A).is_err());
        assert_eq!(playback.playing_count(), 0);
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn failure_flag_clears_on_successful_play() {
        let mut playback = coordinator();
        playback.register(A, FakeElement::rejecting());
        let _ = playback.request_play(A);

        if let Some(element) = playback.surface_mut(A) {
            element.reject = false;
        }
        playback.request_play(A).expect("retry");
        assert!(!playback.has_failed(A));
    }

    #[test]
    fn pausing_a_non_active_surface_is_a_no_op() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        playback.request_pause(B);
        assert_eq!(playback.state(), PlaybackState::Playing(A));
        assert!(playing(&playback, A));

        playback.request_pause(A);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(!playing(&playback, A));
    }

    #[test]
    fn ended_surface_rewinds_and_goes_idle() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        if let Some(element) = playback.surface_mut(A) {
            element.position = 12.5;
            element.ended = true;
        }

        assert_eq!(playback.poll_ended(), Some(A));
        assert_eq!(playback.state(), PlaybackState::Idle);
        let element = playback.surface(A).expect("surface");
        assert_eq!(element.position, 0.0);
        assert!(!element.playing);
        assert_eq!(playback.poll_ended(), None);
    }

    #[test]
    fn decode_error_mid_playback_goes_idle_and_flags_the_surface() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        assert_eq!(playback.poll_errored(), None);

        // The element still claims to be playing when its decoder dies
        if let Some(element) = playback.surface_mut(A) {
            element.errored = true;
        }
        assert_eq!(playback.poll_errored(), Some(A));
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(playback.has_failed(A));
        assert!(!playing(&playback, A));
        assert_eq!(playback.poll_errored(), None);
    }

    #[test]
    fn only_an_offscreen_tile_is_reported() {
        let mut visible = HashSet::new();
        assert_eq!(offscreen_tile(PlaybackState::Idle, &visible), None);
        assert_eq!(offscreen_tile(PlaybackState::Playing(A), &visible), Some(A));
        assert_eq!(offscreen_tile(PlaybackState::Playing(B), &visible), Some(B));
        assert_eq!(offscreen_tile(PlaybackState::Playing(SurfaceId::Modal), &visible), None);

        visible.insert(A);
        assert_eq!(offscreen_tile(PlaybackState::Playing(A), &visible), None);
    }

    #[test]
    fn toggle_alternates_play_and_pause() {
        let mut playback = coordinator();
        playback.toggle(SurfaceId::Modal).expect("play");
        assert!(playback.is_active(SurfaceId::Modal));
        playback.toggle(SurfaceId::Modal).expect("pause");
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn stop_all_goes_idle_unconditionally() {
        let mut playback = coordinator();
        playback.stop_all();
        assert_eq!(playback.state(), PlaybackState::Idle);

        playback.request_play(B).expect("play B");
        playback.stop_all();
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.playing_count(), 0);
    }

    #[test]
    fn unregistering_the_active_surface_pauses_it() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        let element = playback.unregister(A).expect("element");
        assert!(!element.playing);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(matches!(playback.request_play(A), Err(PlaybackError::UnknownSurface(_))));
    }

    #[test]
    fn unregister_where_only_touches_matching_surfaces() {
        let mut playback = coordinator();
        playback.request_play(B).expect("play B");
        playback.unregister_where(|id| matches!(id, SurfaceId::Gallery(_)));
        assert!(!playback.contains(A));
        assert!(playback.contains(B));
        assert!(playback.is_active(B));
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut playback = coordinator();
        playback.request_play(A).expect("play A");
        playback.teardown();
        playback.teardown();
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert!(!playback.contains(A));
    }
}
