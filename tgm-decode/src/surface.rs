//! Surface deduplication
//!
//! Primitives sharing `(kind, texture, flags)` are batched into one surface.
//! Lookup goes through a bucket per texture id (`texture_id + 1`, so the
//! "no texture" id -1 lands in bucket 0). Each bucket heads a singly linked
//! chain of hash entries keyed by `(kind code << 16) | flags`. New entries
//! are pushed onto the head of their chain.
//!
//! Surface id 0 is never handed out; ids run from 1 to `max_surfaces`.

use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::primitive::PrimitiveKind;

/// A deduplicated rendering batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub id: u16,
    pub kind: PrimitiveKind,
    /// -1 for untextured surfaces
    pub texture_id: i16,
    pub flags: u16,
    pub has_alpha: bool,
}

/// Link in a texture bucket's collision chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHashEntry {
    pub search_key: u32,
    pub surface_id: u16,
    pub next_entry: Option<usize>,
}

impl SurfaceHashEntry {
    pub fn search_key(kind: PrimitiveKind, flags: u16) -> u32 {
        (u32::from(kind.code()) << 16) | u32::from(flags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceSlot {
    Free,
    /// Id handed out, parameters not yet written
    Allocated,
    Active(Surface),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStatistics {
    pub allocated_surfaces: usize,
    pub hash_entries: usize,
    /// Texture buckets with at least one surface
    pub used_buckets: usize,
    pub max_textures: u16,
    pub max_surfaces: u16,
}

/// Owns the bucket table, hash entries and surface table for one decode session
#[derive(Debug, Clone)]
pub struct SurfaceGenerator {
    max_textures: u16,
    max_surfaces: u16,
    bucket_heads: Vec<Option<usize>>,
    entries: Vec<SurfaceHashEntry>,
    /// Indexed by surface id; slot 0 stays free
    slots: Vec<SurfaceSlot>,
    next_surface_id: u32,
}

impl SurfaceGenerator {
    pub fn new(max_textures: u16, max_surfaces: u16) -> Self {
        Self {
            max_textures,
            max_surfaces,
            bucket_heads: vec![None; usize::from(max_textures) + 1],
            entries: Vec::new(),
            slots: vec![SurfaceSlot::Free; usize::from(max_surfaces) + 1],
            next_surface_id: 1,
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.max_textures, config.max_surfaces)
    }

    pub fn max_textures(&self) -> u16 {
        self.max_textures
    }

    pub fn max_surfaces(&self) -> u16 {
        self.max_surfaces
    }

    /// Drop every surface and hash entry.
    pub fn reset(&mut self) {
        self.bucket_heads.fill(None);
        self.entries.clear();
        self.slots.fill(SurfaceSlot::Free);
        self.next_surface_id = 1;
    }

    /// Texture ids must lie in `[-1, max_textures)`
    pub fn is_valid_texture_id(&self, texture_id: i16) -> bool {
        texture_id >= -1 && i32::from(texture_id) < i32::from(self.max_textures)
    }

    fn bucket_index(&self, texture_id: i16) -> DecodeResult<usize> {
        if !self.is_valid_texture_id(texture_id) {
            return Err(DecodeError::InvalidTextureId {
                texture_id,
                max_textures: self.max_textures,
            });
        }
        Ok((i32::from(texture_id) + 1) as usize)
    }

    /// Find the surface for a key without creating it.
    pub fn get_surface_hash(
        &self,
        kind: PrimitiveKind,
        texture_id: i16,
        flags: u16,
    ) -> DecodeResult<Option<u16>> {
        let bucket = self.bucket_index(texture_id)?;
        let search_key = SurfaceHashEntry::search_key(kind, flags);

        let mut cursor = self.bucket_heads[bucket];
        while let Some(index) = cursor {
            let entry = self.entries[index];
            if entry.search_key == search_key {
                return Ok(Some(entry.surface_id));
            }
            cursor = entry.next_entry;
        }
        Ok(None)
    }

    /// Return the surface for a key, allocating it on first use.
    pub fn get_or_create_surface(
        &mut self,
        kind: PrimitiveKind,
        texture_id: i16,
        flags: u16,
    ) -> DecodeResult<u16> {
        if let Some(id) = self.get_surface_hash(kind, texture_id, flags)? {
            self.update_alpha_flag(id)?;
            return Ok(id);
        }

        let id = self.new_surface()?;
        self.set_surface_info(id, kind, texture_id, flags)?;
        self.add_surface_hash(id)?;
        tracing::trace!(id, %kind, texture_id, flags, "new surface");
        Ok(id)
    }

    /// Hand out the next surface id.
    pub fn new_surface(&mut self) -> DecodeResult<u16> {
        if self.next_surface_id > u32::from(self.max_surfaces) {
            return Err(DecodeError::SurfaceLimitExceeded {
                max_surfaces: self.max_surfaces,
            });
        }
        let id = self.next_surface_id as u16;
        let slot = &mut self.slots[usize::from(id)];
        if *slot != SurfaceSlot::Free {
            return Err(DecodeError::SurfaceAlreadyAllocated(id));
        }
        *slot = SurfaceSlot::Allocated;
        self.next_surface_id += 1;
        Ok(id)
    }

    /// Write the key of an allocated surface.
    pub fn set_surface_info(
        &mut self,
        id: u16,
        kind: PrimitiveKind,
        texture_id: i16,
        flags: u16,
    ) -> DecodeResult<()> {
        let Some(slot) = self
            .slot_mut(id)
            .filter(|slot| **slot != SurfaceSlot::Free)
        else {
            return Err(DecodeError::SurfaceNotAllocated(id));
        };
        *slot = SurfaceSlot::Active(Surface {
            id,
            kind,
            texture_id,
            flags,
            has_alpha: false,
        });
        self.update_alpha_flag(id)
    }

    /// Link an active surface into its texture bucket.
    pub fn add_surface_hash(&mut self, id: u16) -> DecodeResult<()> {
        let surface = *self.surface(id)?;
        let bucket = self.bucket_index(surface.texture_id)?;

        let index = self.entries.len();
        self.entries.push(SurfaceHashEntry {
            search_key: SurfaceHashEntry::search_key(surface.kind, surface.flags),
            surface_id: id,
            next_entry: self.bucket_heads[bucket],
        });
        self.bucket_heads[bucket] = Some(index);
        Ok(())
    }

    /// Recompute the alpha flag; only triangle strips are treated as transparent.
    pub fn update_alpha_flag(&mut self, id: u16) -> DecodeResult<()> {
        match self.slot_mut(id) {
            Some(SurfaceSlot::Active(surface)) => {
                surface.has_alpha = surface.kind == PrimitiveKind::TriangleStrip;
                Ok(())
            }
            _ => Err(DecodeError::SurfaceNotAllocated(id)),
        }
    }

    pub fn surface(&self, id: u16) -> DecodeResult<&Surface> {
        match self.slots.get(usize::from(id)) {
            Some(SurfaceSlot::Active(surface)) if id != 0 => Ok(surface),
            _ => Err(DecodeError::SurfaceNotAllocated(id)),
        }
    }

    /// Active surfaces in id order
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.slots.iter().filter_map(|slot| match slot {
            SurfaceSlot::Active(surface) => Some(surface),
            _ => None,
        })
    }

    /// Chain of hash entries for a texture bucket, head first
    pub fn bucket_chain(&self, texture_id: i16) -> DecodeResult<Vec<SurfaceHashEntry>> {
        let mut chain = Vec::new();
        let mut cursor = self.bucket_heads[self.bucket_index(texture_id)?];
        while let Some(index) = cursor {
            chain.push(self.entries[index]);
            cursor = self.entries[index].next_entry;
        }
        Ok(chain)
    }

    pub fn statistics(&self) -> SurfaceStatistics {
        SurfaceStatistics {
            allocated_surfaces: (self.next_surface_id - 1) as usize,
            hash_entries: self.entries.len(),
            used_buckets: self.bucket_heads.iter().filter(|h| h.is_some()).count(),
            max_textures: self.max_textures,
            max_surfaces: self.max_surfaces,
        }
    }

    fn slot_mut(&mut self, id: u16) -> Option<&mut SurfaceSlot> {
        if id == 0 {
            return None;
        }
        self.slots.get_mut(usize::from(id))
    }
}

impl Default for SurfaceGenerator {
    fn default() -> Self {
        Self::from_config(&DecoderConfig::default())
    }
}
