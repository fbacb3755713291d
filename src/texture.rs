/// Stable handle into the texture slot store.
///
/// Once issued for a filename, the index stays valid for the lifetime of
/// the cache, even across full release and reload of the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureIndex(pub(crate) usize);

impl TextureIndex {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// One entry in the slot store: the backend resource (present only while
/// `instances > 0`), the live acquirer count, and the NPOT scale factors.
#[derive(Debug)]
pub struct TextureSlot<T> {
    pub(crate) texture: Option<T>,
    pub(crate) instances: u32,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
}

impl<T> Default for TextureSlot<T> {
    fn default() -> Self {
        Self {
            texture: None,
            instances: 0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl<T> TextureSlot<T> {
    pub fn instances(&self) -> u32 {
        self.instances
    }

    pub fn scale_factors(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    pub fn is_resident(&self) -> bool {
        self.instances > 0
    }
}
