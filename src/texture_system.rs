// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

//! The reference-counted texture cache itself.
//!
//! Sprites acquire textures by filename and get back a stable slot index;
//! duplicate acquisitions of a resident texture only bump its instance
//! count. The backing GPU resource is freed when the last acquirer
//! releases its slot, and `shutdown` mops up whatever long-lived owners
//! never released.

use std::collections::HashMap;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::backend::{BackendError, LoadedTexture, TextureBackend};
use crate::config::TextureConfig;
use crate::loader::{self, TextureSource};
use crate::scale_factors::{self, ScaleOverrides};
use crate::texture::{TextureIndex, TextureSlot};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("empty texture filename")]
    EmptyFilename,

    #[error("failed to load texture {name}: {source}")]
    LoadFailed {
        name: String,
        /// The slot stays allocated for the name; a later `acquire` of the
        /// same name retries the load into it.
        index: TextureIndex,
        source: BackendError,
    },
}

pub struct TextureSystem<B: TextureBackend> {
    slots: Vec<TextureSlot<B::Texture>>,
    name_index: HashMap<String, usize>,
    scale_overrides: ScaleOverrides,
    sources: Vec<TextureSource>,
    config: TextureConfig,
    backend: B,
}

impl<B: TextureBackend> TextureSystem<B> {
    pub fn new(backend: B, config: TextureConfig) -> Self {
        let mut sources = Vec::new();
        if let Some(archive) = config.archive.clone() {
            sources.push(TextureSource::Archive(archive));
        }
        sources.push(TextureSource::Directory(config.textures_dir.clone()));

        Self {
            slots: Vec::new(),
            name_index: HashMap::new(),
            scale_overrides: ScaleOverrides::new(),
            sources,
            config,
            backend,
        }
    }

    /// Reads the NPOT scale override files configured under the texture
    /// directory. Call this before the first `acquire` that needs them:
    /// overrides are resolved at load time and never re-applied to textures
    /// that are already resident.
    pub fn load_scale_overrides(&mut self) {
        scale_factors::read_scale_factors_files(
            &self.config.textures_dir,
            &self.config.format_subdirs,
            &mut self.scale_overrides,
        );
    }

    /// Acquires a reference to the texture `name`, loading it if it is not
    /// resident. Returns the stable slot index for the texture.
    ///
    /// On a load failure the slot stays empty but remains allocated under
    /// the name, so the returned error carries the index and a later
    /// `acquire` retries into the same slot.
    pub fn acquire(&mut self, name: &str) -> Result<TextureIndex, TextureError> {
        if name.is_empty() {
            return Err(TextureError::EmptyFilename);
        }

        let idx = match self.name_index.get(name) {
            Some(&idx) => idx,
            None => {
                // First time this name is seen; its slot outlives any
                // number of load/unload cycles.
                self.slots.push(TextureSlot::default());
                let idx = self.slots.len() - 1;
                self.name_index.insert(name.to_string(), idx);
                idx
            }
        };

        if self.slots[idx].instances > 0 {
            // Already resident, no storage or GPU work.
            self.slots[idx].instances += 1;
            debug!(
                "Prevented loading of duplicate texture: {}, total references: {}",
                name, self.slots[idx].instances
            );
            return Ok(TextureIndex(idx));
        }

        let loaded = match self.load_slot(name) {
            Ok(loaded) => loaded,
            Err(source) => {
                error!("Error loading texture {}: {}", name, source);
                return Err(TextureError::LoadFailed {
                    name: name.to_string(),
                    index: TextureIndex(idx),
                    source,
                });
            }
        };
        info!("Texture {} loaded successfully", name);

        let slot = &mut self.slots[idx];
        slot.instances = 1;
        match loaded.dimensions {
            Some(dims) => {
                let (scale_x, scale_y) = dims.scale_factors();
                slot.scale_x = scale_x;
                slot.scale_y = scale_y;
            }
            None => {
                warn!(
                    "Could not determine dimensions of texture {}; scale factors default to 1.0",
                    name
                );
                slot.scale_x = 1.0;
                slot.scale_y = 1.0;
            }
        }
        slot.texture = Some(loaded.texture);

        if let Some(&(scale_x, scale_y)) = self
            .scale_overrides
            .get(scale_factors::strip_extension(name))
        {
            debug!(
                "Using external NPOT scale factors {} {} for texture {}",
                scale_x, scale_y, name
            );
            let slot = &mut self.slots[idx];
            slot.scale_x = scale_x;
            slot.scale_y = scale_y;
        }

        Ok(TextureIndex(idx))
    }

    /// Runs the configured sources in order and loads the first one that
    /// produces the texture. An archive failure other than "entry not
    /// found" still falls through to the filesystem, but is logged louder.
    fn load_slot(&mut self, name: &str) -> Result<LoadedTexture<B::Texture>, BackendError> {
        let Self {
            sources, backend, ..
        } = self;

        let mut last_error = None;
        for source in sources.iter() {
            match source {
                TextureSource::Archive(archive) => {
                    match loader::read_archive_entry(
                        &archive.path,
                        name,
                        archive.password.as_deref(),
                    ) {
                        Ok(Some(bytes)) => match backend.load_from_memory(&bytes) {
                            Ok(loaded) => return Ok(loaded),
                            Err(e) => {
                                warn!(
                                    "Error loading texture {} from archive {}: {}; trying elsewhere",
                                    name,
                                    archive.path.display(),
                                    e
                                );
                                last_error = Some(e);
                            }
                        },
                        Ok(None) => {
                            debug!(
                                "Texture {} not present in archive {}",
                                name,
                                archive.path.display()
                            );
                        }
                        Err(e) => {
                            warn!(
                                "Archive {} unreadable while looking for {}: {}; trying elsewhere",
                                archive.path.display(),
                                name,
                                e
                            );
                            last_error = Some(e.into());
                        }
                    }
                }
                TextureSource::Directory(dir) => {
                    let path = dir.join(name);
                    if !path.is_file() {
                        debug!("Texture file {} not found", path.display());
                        continue;
                    }
                    match backend.load_from_file(&path) {
                        Ok(loaded) => return Ok(loaded),
                        Err(e) => last_error = Some(e),
                    }
                }
            }
        }

        Err(last_error.unwrap_or(BackendError::NotFound {
            name: name.to_string(),
        }))
    }

    /// Drops one reference to the slot. Frees the GPU resource when the
    /// count reaches zero. Out-of-range indices and releases of an already
    /// empty slot are tolerated no-ops, since sprite destructors release
    /// unconditionally.
    pub fn release(&mut self, index: TextureIndex) {
        let Some(slot) = self.slots.get_mut(index.0) else {
            return;
        };
        if slot.instances == 0 {
            return;
        }

        slot.instances -= 1;
        if slot.instances == 0 {
            if let Some(texture) = slot.texture.take() {
                self.backend.release(texture);
                debug!("Texture in slot {} released", index.0);
            }
        }
    }

    /// Force-releases every texture still resident, each exactly once
    /// regardless of how many owners still believe they hold references.
    /// Owners of member sprites of global objects are destroyed in no
    /// guaranteed order, so this must run before any of them go away.
    /// Idempotent; a second call finds every count at zero.
    pub fn shutdown(&mut self) {
        for idx in 0..self.slots.len() {
            if self.slots[idx].instances > 0 {
                self.slots[idx].instances = 1;
                self.release(TextureIndex(idx));
            }
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: TextureIndex) -> Option<&TextureSlot<B::Texture>> {
        self.slots.get(index.0)
    }

    /// Live acquirer count of a slot; zero for out-of-range indices.
    pub fn instances(&self, index: TextureIndex) -> u32 {
        self.slots.get(index.0).map_or(0, |slot| slot.instances)
    }

    pub fn scale_factors(&self, index: TextureIndex) -> Option<(f32, f32)> {
        self.slots.get(index.0).map(TextureSlot::scale_factors)
    }

    pub fn texture(&self, index: TextureIndex) -> Option<&B::Texture> {
        self.slots.get(index.0).and_then(TextureSlot::texture)
    }

    /// Slot previously assigned to `name`, if any. The mapping survives
    /// full release of the texture.
    pub fn index_of(&self, name: &str) -> Option<TextureIndex> {
        self.name_index.get(name).copied().map(TextureIndex)
    }
}

impl<B: TextureBackend> Drop for TextureSystem<B> {
    fn drop(&mut self) {
        let resident = self.slots.iter().filter(|slot| slot.is_resident()).count();
        if resident > 0 {
            warn!(
                "TextureSystem dropped with {} texture(s) still resident; call shutdown() before teardown",
                resident
            );
        }
    }
}
