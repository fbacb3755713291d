//! OpenGL texture backend.
//!
//! Decodes with the `image` crate and uploads through `glow`. Sources with
//! non-power-of-two dimensions are blitted onto power-of-two storage; the
//! cache corrects sampling with the resulting scale factors.

use std::path::Path;
use std::rc::Rc;

use glow::HasContext;
use image::GenericImageView;
use log::debug;

use crate::backend::{BackendError, LoadedTexture, TextureBackend, TextureDimensions};

pub struct GlowBackend {
    gl: Rc<glow::Context>,
}

impl GlowBackend {
    pub fn new(gl: Rc<glow::Context>) -> Self {
        Self { gl }
    }

    fn upload(
        &self,
        img: image::DynamicImage,
    ) -> Result<LoadedTexture<glow::Texture>, BackendError> {
        let (source_width, source_height) = img.dimensions();
        let rgba = img.to_rgba8();
        let (data, width, height) = pad_to_pot(rgba.as_raw(), source_width, source_height);

        let texture = unsafe {
            let tex = self.gl.create_texture().map_err(BackendError::Gpu)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            // Clamp, not repeat: sampling past the source edge of a padded
            // texture must not wrap into the blank padding.
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );

            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(data.as_slice()),
            );

            self.gl.bind_texture(glow::TEXTURE_2D, None);
            tex
        };

        debug!(
            "Uploaded {}x{} texture on {}x{} storage",
            source_width, source_height, width, height
        );

        Ok(LoadedTexture {
            texture,
            dimensions: Some(TextureDimensions {
                width,
                height,
                source_width,
                source_height,
            }),
        })
    }
}

impl TextureBackend for GlowBackend {
    type Texture = glow::Texture;

    fn load_from_memory(
        &mut self,
        bytes: &[u8],
    ) -> Result<LoadedTexture<Self::Texture>, BackendError> {
        let img = image::load_from_memory(bytes)?;
        self.upload(img)
    }

    fn load_from_file(
        &mut self,
        path: &Path,
    ) -> Result<LoadedTexture<Self::Texture>, BackendError> {
        let img = image::open(path)?;
        self.upload(img)
    }

    fn release(&mut self, texture: Self::Texture) {
        unsafe {
            self.gl.delete_texture(texture);
        }
    }
}

/// Copies an RGBA image into the top-left corner of a buffer whose sides
/// are rounded up to the next power of two. Returns the buffer untouched
/// when the source already is power-of-two sized.
fn pad_to_pot(rgba: &[u8], source_width: u32, source_height: u32) -> (Vec<u8>, u32, u32) {
    let width = source_width.next_power_of_two();
    let height = source_height.next_power_of_two();
    if (width, height) == (source_width, source_height) {
        return (rgba.to_vec(), width, height);
    }

    let mut padded = vec![0u8; (width * height * 4) as usize];
    let src_stride = (source_width * 4) as usize;
    let dst_stride = (width * 4) as usize;
    for row in 0..source_height as usize {
        let src = row * src_stride;
        let dst = row * dst_stride;
        padded[dst..dst + src_stride].copy_from_slice(&rgba[src..src + src_stride]);
    }
    (padded, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pot_source_is_untouched() {
        let rgba = vec![7u8; 4 * 4 * 4];
        let (data, width, height) = pad_to_pot(&rgba, 4, 4);
        assert_eq!((width, height), (4, 4));
        assert_eq!(data, rgba);
    }

    #[test]
    fn npot_source_lands_in_top_left_corner() {
        // 3x2 image of solid 0xAB bytes on 4x2 storage.
        let rgba = vec![0xAB; 3 * 2 * 4];
        let (data, width, height) = pad_to_pot(&rgba, 3, 2);
        assert_eq!((width, height), (4, 2));
        assert_eq!(data.len(), 4 * 2 * 4);

        for row in 0..2 {
            let start = row * 4 * 4;
            assert!(data[start..start + 3 * 4].iter().all(|&b| b == 0xAB));
            assert!(data[start + 3 * 4..start + 4 * 4].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn dimensions_round_up_independently() {
        let rgba = vec![1u8; 5 * 9 * 4];
        let (data, width, height) = pad_to_pot(&rgba, 5, 9);
        assert_eq!((width, height), (8, 16));
        assert_eq!(data.len(), 8 * 16 * 4);
    }
}
