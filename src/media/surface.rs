// Video surface - the MediaElement backing every tile and the modal
use std::path::PathBuf;

use super::player::{VideoFrame, VideoPlayer};
use crate::playback::{MediaElement, PlaybackError};

/// A video element that opens its player on first play.
///
/// Nothing is decoded until playback is requested, so loading a surface
/// never autoplays. Only video is decoded; `muted` is the state the mute
/// affordance shows.
pub struct VideoSurface {
    path: PathBuf,
    player: Option<VideoPlayer>,
    muted: bool,
}

impl VideoSurface {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            player: None,
            muted: true,
        }
    }

    /// Newest frame decoded since the last call
    pub fn latest_frame(&mut self) -> Option<VideoFrame> {
        self.player.as_mut().and_then(VideoPlayer::latest_frame)
    }

    /// Playback progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        self.player.as_ref().map_or(0.0, VideoPlayer::current_position)
    }

    pub fn times(&self) -> (f64, f64) {
        self.player
            .as_ref()
            .map_or((0.0, 0.0), |p| (p.current_time(), p.duration()))
    }

    pub fn seek(&mut self, position: f64) {
        if let Some(player) = &mut self.player {
            player.seek(position);
        }
    }
}

impl MediaElement for VideoSurface {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.player.is_none() {
            let player = VideoPlayer::new(&self.path).map_err(|e| PlaybackError::Rejected(e.to_string()))?;
            self.player = Some(player);
        }

        match &mut self.player {
            Some(player) => player.play().map_err(|e| PlaybackError::Rejected(e.to_string())),
            None => Err(PlaybackError::Rejected("player unavailable".to_string())),
        }
    }

    fn pause(&mut self) {
        if let Some(player) = &mut self.player {
            player.pause();
        }
    }

    fn rewind(&mut self) {
        self.seek(0.0);
    }

    fn is_playing(&self) -> bool {
        self.player.as_ref().is_some_and(VideoPlayer::is_playing)
    }

    fn has_ended(&self) -> bool {
        self.player.as_ref().is_some_and(VideoPlayer::has_ended)
    }

    fn has_errored(&self) -> bool {
        self.player.as_ref().is_some_and(VideoPlayer::has_failed)
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_rejects_and_stays_paused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut surface = VideoSurface::new(dir.path().join("esmeralda.mp4"));

        assert!(matches!(surface.play(), Err(PlaybackError::Rejected(_))));
        assert!(!surface.is_playing());
        assert!(!surface.has_ended());
        assert!(!surface.has_errored());
        assert!(surface.latest_frame().is_none());
    }

    #[test]
    fn unopened_surface_is_idle() {
        let mut surface = VideoSurface::new(PathBuf::from("video/esmeralda.mp4"));
        surface.pause();
        surface.rewind();
        surface.set_muted(false);
        assert!(!surface.muted);
        assert_eq!(surface.progress(), 0.0);
        assert_eq!(surface.times(), (0.0, 0.0));
    }
}
