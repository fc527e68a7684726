// Short-lived playback notices over tile videos
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::playback::{PlaybackError, SurfaceId};

/// How long a notice stays fully visible
const HOLD: Duration = Duration::from_millis(1500);
/// Fade-out after the hold
const FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Playing,
    Paused,
    Completed,
}

/// At most one notice per surface; a new one replaces the old
#[derive(Debug, Default)]
pub struct NoticeBoard {
    posted: HashMap<SurfaceId, (Notice, Instant)>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, surface: SurfaceId, notice: Notice, now: Instant) {
        self.posted.insert(surface, (notice, now));
    }

    /// Record a play/pause toggle. Rejections get the failure badge instead.
    pub fn toggled(&mut self, surface: SurfaceId, result: &Result<(), PlaybackError>, playing: bool, now: Instant) {
        if result.is_err() {
            self.posted.remove(&surface);
            return;
        }
        let notice = if playing { Notice::Playing } else { Notice::Paused };
        self.post(surface, notice, now);
    }

    /// The notice on `surface` and its opacity, 1 while held then fading to 0
    pub fn current(&self, surface: SurfaceId, now: Instant) -> Option<(Notice, f32)> {
        let (notice, posted_at) = self.posted.get(&surface)?;
        let age = now.saturating_duration_since(*posted_at);
        if age < HOLD {
            Some((*notice, 1.0))
        } else if age < HOLD + FADE {
            let faded = (age - HOLD).as_secs_f32() / FADE.as_secs_f32();
            Some((*notice, 1.0 - faded))
        } else {
            None
        }
    }

    /// Drop expired notices. True while any are still showing.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.posted
            .retain(|_, (_, posted_at)| now.saturating_duration_since(*posted_at) < HOLD + FADE);
        !self.posted.is_empty()
    }

    pub fn clear(&mut self) {
        self.posted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: SurfaceId = SurfaceId::Carousel(2);

    #[test]
    fn notice_holds_then_fades_then_expires() {
        let start = Instant::now();
        let mut board = NoticeBoard::new();
        board.post(TILE, Notice::Completed, start);

        assert_eq!(board.current(TILE, start + Duration::from_millis(1000)), Some((Notice::Completed, 1.0)));

        let (notice, opacity) = board
            .current(TILE, start + Duration::from_millis(1650))
            .expect("fading");
        assert_eq!(notice, Notice::Completed);
        assert!(opacity > 0.4 && opacity < 0.6);

        assert_eq!(board.current(TILE, start + Duration::from_millis(1900)), None);
        assert!(board.tick(start + Duration::from_millis(1700)));
        assert!(!board.tick(start + Duration::from_millis(1900)));
    }

    #[test]
    fn toggles_post_playing_or_paused_and_rejections_clear() {
        let start = Instant::now();
        let mut board = NoticeBoard::new();

        board.toggled(TILE, &Ok(()), true, start);
        assert_eq!(board.current(TILE, start), Some((Notice::Playing, 1.0)));

        board.toggled(TILE, &Ok(()), false, start);
        assert_eq!(board.current(TILE, start), Some((Notice::Paused, 1.0)));

        board.toggled(TILE, &Err(PlaybackError::Rejected("blocked".to_string())), false, start);
        assert_eq!(board.current(TILE, start), None);
    }

    #[test]
    fn notices_are_per_surface() {
        let start = Instant::now();
        let mut board = NoticeBoard::new();
        board.post(TILE, Notice::Playing, start);
        assert_eq!(board.current(SurfaceId::Gallery(2), start), None);

        board.clear();
        assert_eq!(board.current(TILE, start), None);
    }
}
