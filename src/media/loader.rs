// Background media loader - keeps image and poster decoding off the UI thread
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use super::decoder::{decode_image, decode_poster, DecodedImage};
use crate::catalog::MediaKind;
use crate::error::MediaError;

/// One still to decode. `key` names the texture the result belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub key: String,
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Request sent to the background decode thread
enum LoaderMessage {
    Load(LoadRequest),
    Stop,
}

/// Response from the background decode thread
pub struct LoadedMedia {
    pub key: String,
    pub result: Result<DecodedImage, MediaError>,
}

/// Background loader that never blocks the UI thread
///
/// Architecture:
/// - UI sends load requests via channel (non-blocking)
/// - Background thread decodes images and video posters in request order
/// - UI polls for results via try_recv and decides whether they are still wanted
pub struct MediaLoader {
    request_tx: Sender<LoaderMessage>,
    response_rx: Receiver<LoadedMedia>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MediaLoader {
    pub fn new() -> Self {
        let (request_tx, request_rx) = unbounded();
        let (response_tx, response_rx) = unbounded();

        let thread_handle = thread::spawn(move || {
            load_thread_main(request_rx, response_tx);
        });

        Self {
            request_tx,
            response_rx,
            thread_handle: Some(thread_handle),
        }
    }

    /// Queue a decode (non-blocking)
    pub fn request(&self, request: LoadRequest) {
        if self.request_tx.send(LoaderMessage::Load(request)).is_err() {
            tracing::warn!("Media loader thread is gone; request dropped");
        }
    }

    /// Poll for a finished decode (non-blocking)
    pub fn poll(&self) -> Option<LoadedMedia> {
        match self.response_rx.try_recv() {
            Ok(loaded) => Some(loaded),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Stop the thread. Repeated calls are harmless.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(LoaderMessage::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for MediaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MediaLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Background thread main loop
fn load_thread_main(request_rx: Receiver<LoaderMessage>, response_tx: Sender<LoadedMedia>) {
    while let Ok(message) = request_rx.recv() {
        let request = match message {
            LoaderMessage::Load(request) => request,
            LoaderMessage::Stop => break,
        };

        let result = match request.kind {
            MediaKind::Image => decode_image(&request.path),
            MediaKind::Video => decode_poster(&request.path),
        };

        if let Err(e) = &result {
            tracing::warn!("Failed to load {}: {}", request.key, e);
        }

        // Ignore send errors - the UI may be shutting down
        let _ = response_tx.send(LoadedMedia {
            key: request.key,
            result,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(loader: &MediaLoader) -> LoadedMedia {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(loaded) = loader.poll() {
                return loaded;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn decodes_images_in_the_background() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gema.png");
        image::RgbaImage::new(8, 4).save(&path).expect("save");

        let loader = MediaLoader::new();
        loader.request(LoadRequest {
            key: "tile:0".to_string(),
            path,
            kind: MediaKind::Image,
        });

        let loaded = wait_for(&loader);
        assert_eq!(loaded.key, "tile:0");
        let image = loaded.result.expect("decoded");
        assert_eq!((image.width, image.height), (8, 4));
    }

    #[test]
    fn failures_come_back_keyed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = MediaLoader::new();
        loader.request(LoadRequest {
            key: "modal:3".to_string(),
            path: dir.path().join("missing.mp4"),
            kind: MediaKind::Video,
        });

        let loaded = wait_for(&loader);
        assert_eq!(loaded.key, "modal:3");
        assert!(matches!(loaded.result, Err(MediaError::NotFound(_))));
    }

    #[test]
    fn shutdown_twice_is_harmless() {
        let mut loader = MediaLoader::new();
        loader.shutdown();
        loader.shutdown();
        assert!(loader.poll().is_none());
    }
}
