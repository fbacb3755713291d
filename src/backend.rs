use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Image Decode Error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Archive Error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("texture {name} not found in any configured source")]
    NotFound { name: String },

    #[error("GPU Error: {0}")]
    Gpu(String),
}

/// Backing-storage and logical-source dimensions of a loaded texture.
///
/// Compressed texture packs pad non-power-of-two images onto power-of-two
/// storage, so the two pairs can differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDimensions {
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl TextureDimensions {
    /// NPOT scale factors: source size over backing size.
    pub fn scale_factors(&self) -> (f32, f32) {
        (
            self.source_width as f32 / self.width as f32,
            self.source_height as f32 / self.height as f32,
        )
    }
}

pub struct LoadedTexture<T> {
    pub texture: T,
    /// `None` when the backend created the resource but could not probe its
    /// dimensions; the cache then keeps scale factors at 1.0 instead of
    /// failing the load.
    pub dimensions: Option<TextureDimensions>,
}

/// Platform texture backend: decode plus GPU upload and release.
///
/// One implementation per target graphics API; the cache never touches the
/// graphics driver itself. A released texture must be freed exactly once
/// per successful load.
pub trait TextureBackend {
    type Texture;

    fn load_from_memory(&mut self, bytes: &[u8])
        -> Result<LoadedTexture<Self::Texture>, BackendError>;

    fn load_from_file(&mut self, path: &Path)
        -> Result<LoadedTexture<Self::Texture>, BackendError>;

    fn release(&mut self, texture: Self::Texture);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factors_are_source_over_backing() {
        let dims = TextureDimensions {
            width: 64,
            height: 32,
            source_width: 60,
            source_height: 20,
        };
        assert_eq!(dims.scale_factors(), (0.9375, 0.625));
    }

    #[test]
    fn pot_source_has_unit_scale() {
        let dims = TextureDimensions {
            width: 128,
            height: 128,
            source_width: 128,
            source_height: 128,
        };
        assert_eq!(dims.scale_factors(), (1.0, 1.0));
    }
}
