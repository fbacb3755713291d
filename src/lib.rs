// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

//! Reference-counted texture cache.
//!
//! Keeps each texture file resident in graphics memory at most once no
//! matter how many sprites request it, tracks per-texture instance counts,
//! and frees the GPU resource when the last user releases its slot. Also
//! handles the NPOT scaling quirk of compressed texture packs: scale
//! factors are derived from source vs. backing dimensions and can be
//! overridden per texture from external `scalefactors.txt` files.

pub mod backend;
pub mod config;
pub mod glow_backend;
pub mod loader;
pub mod scale_factors;
pub mod texture;
pub mod texture_system;

pub use backend::{BackendError, LoadedTexture, TextureBackend, TextureDimensions};
pub use config::{ArchiveSource, ConfigError, TextureConfig};
pub use glow_backend::GlowBackend;
pub use texture::{TextureIndex, TextureSlot};
pub use texture_system::{TextureError, TextureSystem};
