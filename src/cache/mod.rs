mod media_textures;
mod texture_cache;

pub use media_textures::{MediaTextures, StillOutcome};
pub use texture_cache::{TextureCache, TextureStatus};
