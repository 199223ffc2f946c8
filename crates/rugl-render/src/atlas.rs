//! Texture atlas over a [`RectanglePacker`].
//!
//! The atlas owns the packing and the pixel staging only. Pixels are queued
//! until the caller either drains them with
//! [`take_pending_uploads`](TextureAtlas::take_pending_uploads) or writes them
//! to a GPU texture with [`upload`](TextureAtlas::upload). Geometry that
//! samples the atlas uses [`TextureAtlas::state`] and each entry's `uv_rect`.
//!
//! # Example
//!
//! ```ignore
//! let mut atlas = TextureAtlas::new(TextureId(1), 512, 512, 4);
//!
//! let key = AtlasKey::new("icon");
//! if let Some(entry) = atlas.insert(key, &pixels, 32, 32) {
//!     println!("Inserted at UV: {:?}", entry.uv_rect);
//! }
//!
//! atlas.upload(&queue, &texture);
//! ```

use ahash::HashMap;
use rugl_core::geometry::Rect;

use crate::packer::{PackId, RectanglePacker};
use crate::{State, TextureId};

/// Unique key for an atlas entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasKey(u64);

impl AtlasKey {
    /// Create a new atlas key from a string.
    pub fn new(s: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        Self(hasher.finish())
    }

    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// An entry in the texture atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasEntry {
    /// Rectangle in pixel coordinates within the atlas.
    pub rect: Rect<u32>,
    /// Rectangle in normalized UV coordinates (0.0 to 1.0).
    pub uv_rect: Rect<f32>,
}

impl AtlasEntry {
    pub fn new(rect: Rect<u32>, atlas_width: u32, atlas_height: u32) -> Self {
        let (w, h) = (atlas_width as f32, atlas_height as f32);
        let uv_rect = Rect::new(
            rect.x as f32 / w,
            rect.y as f32 / h,
            rect.width as f32 / w,
            rect.height as f32 / h,
        );
        Self { rect, uv_rect }
    }
}

/// Pixels waiting to be copied into the atlas texture.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub key: AtlasKey,
    pub rect: Rect<u32>,
    pub data: Vec<u8>,
}

struct Slot {
    entry: AtlasEntry,
    pack: PackId,
}

/// Keyed sub-image allocator for one texture.
pub struct TextureAtlas {
    texture: TextureId,
    packer: RectanglePacker,
    bytes_per_pixel: u32,
    entries: HashMap<AtlasKey, Slot>,
    pending: Vec<PendingUpload>,
}

impl TextureAtlas {
    /// Create an atlas for the `width x height` texture registered as `texture`.
    pub fn new(texture: TextureId, width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        Self {
            texture,
            packer: RectanglePacker::new(width, height),
            bytes_per_pixel,
            entries: HashMap::default(),
            pending: Vec::new(),
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.packer.width()
    }

    pub fn height(&self) -> u32 {
        self.packer.height()
    }

    /// Render state that samples this atlas.
    pub fn state(&self) -> State {
        State::new().with_texture(self.texture)
    }

    /// Insert an image into the atlas.
    ///
    /// Returns the existing entry if `key` is already present. Returns `None`
    /// if `pixels` does not hold exactly `width * height` pixels or if there is
    /// no space left.
    pub fn insert(
        &mut self,
        key: AtlasKey,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Option<AtlasEntry> {
        if let Some(slot) = self.entries.get(&key) {
            return Some(slot.entry);
        }

        let expected = width as usize * height as usize * self.bytes_per_pixel as usize;
        if pixels.len() != expected {
            tracing::warn!(
                "Atlas image {:?} has {} bytes, expected {} for {}x{}",
                key,
                pixels.len(),
                expected,
                width,
                height
            );
            return None;
        }

        let Some(packed) = self.packer.insert(width, height) else {
            tracing::debug!(
                "Atlas {:?} is full ({:.0}% used), cannot fit {}x{}",
                self.texture,
                self.packer.occupancy() * 100.0,
                width,
                height
            );
            return None;
        };

        let entry = AtlasEntry::new(packed.rect, self.width(), self.height());
        self.entries.insert(
            key,
            Slot {
                entry,
                pack: packed.id,
            },
        );
        self.pending.push(PendingUpload {
            key,
            rect: packed.rect,
            data: pixels.to_vec(),
        });

        Some(entry)
    }

    /// Remove an entry, freeing its space. Pixels still pending are dropped.
    pub fn remove(&mut self, key: &AtlasKey) -> Option<AtlasEntry> {
        let slot = self.entries.remove(key)?;
        self.packer.remove(slot.pack);
        self.pending.retain(|upload| upload.key != *key);
        Some(slot.entry)
    }

    pub fn get(&self, key: &AtlasKey) -> Option<&AtlasEntry> {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    pub fn contains(&self, key: &AtlasKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn has_pending_uploads(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hand the queued pixels to the caller.
    pub fn take_pending_uploads(&mut self) -> Vec<PendingUpload> {
        std::mem::take(&mut self.pending)
    }

    /// Write all queued pixels into `texture`.
    pub fn upload(&mut self, queue: &wgpu::Queue, texture: &wgpu::Texture) {
        for upload in self.take_pending_uploads() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: upload.rect.x,
                        y: upload.rect.y,
                        z: 0,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &upload.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(upload.rect.width * self.bytes_per_pixel),
                    rows_per_image: Some(upload.rect.height),
                },
                wgpu::Extent3d {
                    width: upload.rect.width,
                    height: upload.rect.height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Fraction of the atlas area in use.
    pub fn occupancy(&self) -> f32 {
        self.packer.occupancy()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries from the atlas.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.packer.clear();
    }
}
