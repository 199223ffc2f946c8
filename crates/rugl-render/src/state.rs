//! Render state: the bundle of fixed-function settings a batch is drawn with.
//!
//! A [`State`] is a plain value. Two states that compare equal are
//! interchangeable, which is what lets the [`StatePool`](crate::StatePool)
//! collapse them onto one batch. States are totally ordered; the field order
//! below is the sort order, so facets that are expensive to switch come first
//! and batches that share them end up next to each other.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::BlendMode;

/// Handle of a texture registered with a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u32);

/// Comparison used by depth and alpha tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

impl CompareFunction {
    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }

    /// Code understood by the batch shader's alpha test.
    pub(crate) fn shader_code(self) -> u32 {
        match self {
            CompareFunction::Always => 0,
            CompareFunction::Never => 1,
            CompareFunction::Less => 2,
            CompareFunction::LessEqual => 3,
            CompareFunction::Equal => 4,
            CompareFunction::Greater => 5,
            CompareFunction::GreaterEqual => 6,
            CompareFunction::NotEqual => 7,
        }
    }
}

/// Depth buffer test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepthTest {
    pub function: CompareFunction,
    pub write: bool,
}

impl DepthTest {
    pub const DISABLED: DepthTest = DepthTest {
        function: CompareFunction::Always,
        write: false,
    };

    pub const LESS_EQUAL: DepthTest = DepthTest {
        function: CompareFunction::LessEqual,
        write: true,
    };

    pub fn is_enabled(&self) -> bool {
        *self != Self::DISABLED
    }
}

impl Default for DepthTest {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Discard fragments whose alpha fails `function` against `reference`.
#[derive(Debug, Clone, Copy)]
pub struct AlphaTest {
    pub function: CompareFunction,
    pub reference: f32,
}

impl AlphaTest {
    pub fn greater(reference: f32) -> Self {
        Self {
            function: CompareFunction::Greater,
            reference,
        }
    }
}

impl PartialEq for AlphaTest {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AlphaTest {}

impl PartialOrd for AlphaTest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AlphaTest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.function
            .cmp(&other.function)
            .then_with(|| self.reference.total_cmp(&other.reference))
    }
}

impl Hash for AlphaTest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function.hash(state);
        self.reference.to_bits().hash(state);
    }
}

/// Depth offset applied to coplanar geometry (decals, outlines).
#[derive(Debug, Clone, Copy)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

impl PolygonOffset {
    pub fn to_depth_bias(self) -> wgpu::DepthBiasState {
        wgpu::DepthBiasState {
            constant: self.units as i32,
            slope_scale: self.factor,
            clamp: 0.0,
        }
    }
}

impl PartialEq for PolygonOffset {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PolygonOffset {}

impl PartialOrd for PolygonOffset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PolygonOffset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.factor
            .total_cmp(&other.factor)
            .then_with(|| self.units.total_cmp(&other.units))
    }
}

impl Hash for PolygonOffset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.factor.to_bits().hash(state);
        self.units.to_bits().hash(state);
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy)]
pub struct Fog {
    /// Packed RGBA, red in the lowest byte.
    pub colour: u32,
    pub start: f32,
    pub end: f32,
}

impl PartialEq for Fog {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fog {}

impl PartialOrd for Fog {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fog {
    fn cmp(&self, other: &Self) -> Ordering {
        self.colour
            .cmp(&other.colour)
            .then_with(|| self.start.total_cmp(&other.start))
            .then_with(|| self.end.total_cmp(&other.end))
    }
}

impl Hash for Fog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.colour.hash(state);
        self.start.to_bits().hash(state);
        self.end.to_bits().hash(state);
    }
}

/// Rasterisation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DrawMode {
    #[default]
    Fill,
    /// Triangle edges only. Backends without line rasterisation fall back to fill.
    Wireframe,
}

bitflags! {
    /// Channels written by a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct WriteMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const DEPTH = 1 << 4;
        const COLOUR = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

impl WriteMask {
    pub fn to_color_writes(self) -> wgpu::ColorWrites {
        let mut writes = wgpu::ColorWrites::empty();
        if self.contains(WriteMask::RED) {
            writes |= wgpu::ColorWrites::RED;
        }
        if self.contains(WriteMask::GREEN) {
            writes |= wgpu::ColorWrites::GREEN;
        }
        if self.contains(WriteMask::BLUE) {
            writes |= wgpu::ColorWrites::BLUE;
        }
        if self.contains(WriteMask::ALPHA) {
            writes |= wgpu::ColorWrites::ALPHA;
        }
        writes
    }
}

impl Default for WriteMask {
    fn default() -> Self {
        WriteMask::all()
    }
}

bitflags! {
    /// Facets that differ between two states.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Facets: u8 {
        const BLEND = 1 << 0;
        const DEPTH = 1 << 1;
        const WRITE_MASK = 1 << 2;
        const DRAW_MODE = 1 << 3;
        const POLYGON_OFFSET = 1 << 4;
        const ALPHA_TEST = 1 << 5;
        const FOG = 1 << 6;
        const TEXTURE = 1 << 7;
        /// Facets baked into a GPU pipeline object.
        const PIPELINE = Self::BLEND.bits()
            | Self::DEPTH.bits()
            | Self::WRITE_MASK.bits()
            | Self::DRAW_MODE.bits()
            | Self::POLYGON_OFFSET.bits();
    }
}

/// An immutable bundle of render settings.
///
/// ```
/// use rugl_render::{BlendMode, State, TextureId};
///
/// let a = State::new().with_blend(BlendMode::Additive).with_texture(TextureId(3));
/// let b = State::new().with_texture(TextureId(3)).with_blend(BlendMode::Additive);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct State {
    pub blend: BlendMode,
    pub depth: DepthTest,
    pub write_mask: WriteMask,
    pub draw_mode: DrawMode,
    pub polygon_offset: Option<PolygonOffset>,
    pub alpha_test: Option<AlphaTest>,
    pub fog: Option<Fog>,
    pub texture: Option<TextureId>,
}

impl State {
    /// Alpha blended, untextured, no depth test.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_depth(mut self, depth: DepthTest) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_write_mask(mut self, mask: WriteMask) -> Self {
        self.write_mask = mask;
        self
    }

    pub fn with_draw_mode(mut self, mode: DrawMode) -> Self {
        self.draw_mode = mode;
        self
    }

    pub fn with_polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset = Some(PolygonOffset { factor, units });
        self
    }

    pub fn with_alpha_test(mut self, test: AlphaTest) -> Self {
        self.alpha_test = Some(test);
        self
    }

    pub fn with_fog(mut self, fog: Fog) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn without_texture(mut self) -> Self {
        self.texture = None;
        self
    }

    /// Facets that must be re-applied when switching from `previous` to `self`.
    pub fn changes_from(&self, previous: &State) -> Facets {
        let mut changes = Facets::empty();
        changes.set(Facets::BLEND, self.blend != previous.blend);
        changes.set(Facets::DEPTH, self.depth != previous.depth);
        changes.set(Facets::WRITE_MASK, self.write_mask != previous.write_mask);
        changes.set(Facets::DRAW_MODE, self.draw_mode != previous.draw_mode);
        changes.set(
            Facets::POLYGON_OFFSET,
            self.polygon_offset != previous.polygon_offset,
        );
        changes.set(Facets::ALPHA_TEST, self.alpha_test != previous.alpha_test);
        changes.set(Facets::FOG, self.fog != previous.fog);
        changes.set(Facets::TEXTURE, self.texture != previous.texture);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        let a = State::new().with_alpha_test(AlphaTest::greater(0.5));
        let b = State::new().with_alpha_test(AlphaTest::greater(0.5));
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_ordering_groups_by_blend_first() {
        let replace_tex = State::new()
            .with_blend(BlendMode::Replace)
            .with_texture(TextureId(9));
        let alpha_plain = State::new().with_blend(BlendMode::Alpha);
        assert!(replace_tex < alpha_plain);
    }

    #[test]
    fn test_changes_from() {
        let base = State::new();
        assert!(base.changes_from(&base).is_empty());

        let textured = base.with_texture(TextureId(1));
        assert_eq!(textured.changes_from(&base), Facets::TEXTURE);

        let fogged = textured.with_fog(Fog {
            colour: 0xFF00_0000,
            start: 1.0,
            end: 10.0,
        });
        let changes = fogged.changes_from(&base);
        assert!(changes.contains(Facets::TEXTURE | Facets::FOG));
        assert!(!changes.intersects(Facets::PIPELINE));
    }

    #[test]
    fn test_write_mask_to_color_writes() {
        assert_eq!(WriteMask::all().to_color_writes(), wgpu::ColorWrites::ALL);
        assert_eq!(WriteMask::DEPTH.to_color_writes(), wgpu::ColorWrites::empty());
    }

    #[test]
    fn test_depth_test_enabled() {
        assert!(!DepthTest::default().is_enabled());
        assert!(DepthTest::LESS_EQUAL.is_enabled());
    }
}
