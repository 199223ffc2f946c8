//! Greedy binary-partition rectangle packing.
//!
//! Each insertion walks a tree of regions. A free region that is larger than
//! the request is split in two along the axis with the most slack, and the
//! request goes into the first half. Removing a rectangle frees its region and
//! merges freed siblings back together so the space can be reused.

use rugl_core::geometry::Rect;

/// Identifier of a packed rectangle, unique within one packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackId(pub u32);

/// A successful allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    pub id: PackId,
    pub rect: Rect<u32>,
}

#[derive(Debug, Clone)]
enum PackerNode {
    Empty {
        rect: Rect<u32>,
    },
    Filled {
        rect: Rect<u32>,
        id: PackId,
    },
    Split {
        rect: Rect<u32>,
        left: Box<PackerNode>,
        right: Box<PackerNode>,
    },
}

impl PackerNode {
    fn new(rect: Rect<u32>) -> Self {
        Self::Empty { rect }
    }

    fn insert(&mut self, id: PackId, width: u32, height: u32) -> Option<Rect<u32>> {
        match self {
            PackerNode::Empty { rect } => {
                let rect = *rect;
                if width > rect.width || height > rect.height {
                    return None;
                }

                if width == rect.width && height == rect.height {
                    *self = PackerNode::Filled { rect, id };
                    return Some(rect);
                }

                let (left_rect, right_rect) = if rect.width - width > rect.height - height {
                    (
                        Rect::new(rect.x, rect.y, width, rect.height),
                        Rect::new(rect.x + width, rect.y, rect.width - width, rect.height),
                    )
                } else {
                    (
                        Rect::new(rect.x, rect.y, rect.width, height),
                        Rect::new(rect.x, rect.y + height, rect.width, rect.height - height),
                    )
                };

                let mut left = Box::new(PackerNode::new(left_rect));
                let right = Box::new(PackerNode::new(right_rect));
                let result = left.insert(id, width, height);

                *self = PackerNode::Split { rect, left, right };
                result
            }
            PackerNode::Filled { .. } => None,
            PackerNode::Split { left, right, .. } => left
                .insert(id, width, height)
                .or_else(|| right.insert(id, width, height)),
        }
    }

    /// Free the region holding `id`. Returns `true` if it was found.
    fn remove(&mut self, id: PackId) -> bool {
        match self {
            PackerNode::Empty { .. } => false,
            PackerNode::Filled { rect, id: filled } => {
                if *filled != id {
                    return false;
                }
                *self = PackerNode::Empty { rect: *rect };
                true
            }
            PackerNode::Split { rect, left, right } => {
                let removed = left.remove(id) || right.remove(id);
                if removed && left.is_empty() && right.is_empty() {
                    *self = PackerNode::Empty { rect: *rect };
                }
                removed
            }
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, PackerNode::Empty { .. })
    }

    fn used_area(&self) -> u64 {
        match self {
            PackerNode::Empty { .. } => 0,
            PackerNode::Filled { rect, .. } => rect.width as u64 * rect.height as u64,
            PackerNode::Split { left, right, .. } => left.used_area() + right.used_area(),
        }
    }
}

/// Packs rectangles into a fixed `width x height` area.
///
/// ```
/// use rugl_render::RectanglePacker;
///
/// let mut packer = RectanglePacker::new(64, 64);
/// let a = packer.insert(32, 32).unwrap();
/// assert_eq!((a.rect.x, a.rect.y), (0, 0));
/// assert!(packer.insert(128, 1).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RectanglePacker {
    width: u32,
    height: u32,
    root: PackerNode,
    next_id: u32,
    len: usize,
}

impl RectanglePacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            root: PackerNode::new(Rect::new(0, 0, width, height)),
            next_id: 0,
            len: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Allocate a `width x height` region.
    ///
    /// Returns `None` when the rectangle does not fit anywhere (or has zero
    /// area).
    pub fn insert(&mut self, width: u32, height: u32) -> Option<PackedRect> {
        if width == 0 || height == 0 {
            return None;
        }
        let id = PackId(self.next_id);
        let rect = self.root.insert(id, width, height)?;
        self.next_id += 1;
        self.len += 1;
        Some(PackedRect { id, rect })
    }

    /// Free a previously packed rectangle.
    pub fn remove(&mut self, id: PackId) -> bool {
        let removed = self.root.remove(id);
        if removed {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.root = PackerNode::new(Rect::new(0, 0, self.width, self.height));
        self.len = 0;
    }

    /// Fraction of the area currently allocated, in `0.0..=1.0`.
    pub fn occupancy(&self) -> f32 {
        let total = self.width as u64 * self.height as u64;
        if total == 0 {
            return 0.0;
        }
        self.root.used_area() as f32 / total as f32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: Rect<u32>, b: Rect<u32>) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn test_packer_insertion() {
        let mut packer = RectanglePacker::new(256, 256);
        assert!(packer.insert(64, 64).is_some());
        assert!(packer.insert(32, 32).is_some());
        assert!(packer.insert(512, 512).is_none());
        assert!(packer.insert(0, 10).is_none());
        assert_eq!(packer.len(), 2);
    }

    #[test]
    fn test_packed_rects_do_not_overlap() {
        let mut packer = RectanglePacker::new(128, 128);
        let mut rects = Vec::new();
        for (w, h) in [(40, 20), (16, 16), (64, 8), (8, 64), (30, 30), (50, 10)] {
            rects.push(packer.insert(w, h).unwrap().rect);
        }
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x + a.width <= 128 && a.y + a.height <= 128);
            for b in &rects[i + 1..] {
                assert!(!overlaps(*a, *b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_remove_frees_space() {
        let mut packer = RectanglePacker::new(64, 64);
        let full = packer.insert(64, 64).unwrap();
        assert!(packer.insert(1, 1).is_none());
        assert_eq!(packer.occupancy(), 1.0);

        assert!(packer.remove(full.id));
        assert!(!packer.remove(full.id));
        assert_eq!(packer.occupancy(), 0.0);

        let again = packer.insert(64, 64).unwrap();
        assert_ne!(again.id, full.id);
    }

    #[test]
    fn test_freed_siblings_merge() {
        let mut packer = RectanglePacker::new(64, 64);
        let a = packer.insert(32, 64).unwrap();
        let b = packer.insert(32, 64).unwrap();
        assert!(packer.insert(64, 64).is_none());

        packer.remove(a.id);
        packer.remove(b.id);
        assert!(packer.is_empty());
        assert!(packer.insert(64, 64).is_some());
    }

    #[test]
    fn test_clear() {
        let mut packer = RectanglePacker::new(32, 32);
        packer.insert(16, 16);
        packer.clear();
        assert!(packer.is_empty());
        assert_eq!(packer.occupancy(), 0.0);
    }
}
