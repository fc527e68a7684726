// Media backend
// Contains: still decoding, background loading, ffmpeg playback, video surfaces

mod decoder;
mod loader;
mod player;
mod surface;

pub use decoder::DecodedImage;
pub use loader::{LoadRequest, LoadedMedia, MediaLoader};
pub use player::VideoFrame;
pub use surface::VideoSurface;
