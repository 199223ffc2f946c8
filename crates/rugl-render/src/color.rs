/// An RGBA color with `f32` components in the `0.0..=1.0` range.
///
/// Shapes and the renderer carry per-vertex colours in packed form (one `u32`
/// per vertex, red in the lowest byte) so they can be copied straight into the
/// vertex buffer. Convert with [`Color::to_packed`] and [`Color::from_packed`]:
///
/// ```
/// use rugl_render::Color;
///
/// let orange = Color::from_hex(0xFF8800);
/// let packed = orange.to_packed();
/// assert_eq!(packed & 0xFF, 0xFF);
/// assert_eq!(Color::from_packed(packed), orange);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from RGB components with full opacity (alpha = 1.0).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit RGBA values (0–255 mapped to 0.0–1.0).
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create a color from a 24-bit RGB hex value (e.g. `0xFF8800`).
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as u8;
        let g = ((hex >> 8) & 0xFF) as u8;
        let b = (hex & 0xFF) as u8;
        Self::from_rgba_u8(r, g, b, 255)
    }

    /// Unpack a per-vertex colour (red in the lowest byte).
    pub fn from_packed(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_le_bytes();
        Self::from_rgba_u8(r, g, b, a)
    }

    /// Pack into the per-vertex colour format (red in the lowest byte).
    pub fn to_packed(self) -> u32 {
        u32::from_le_bytes([
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b),
            to_byte(self.a),
        ])
    }

    /// Same color with alpha scaled by `factor`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Convert to an `[r, g, b, a]` array.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scale the alpha byte of a packed colour.
pub fn scale_packed_alpha(packed: u32, factor: f32) -> u32 {
    let alpha = (packed >> 24) as f32 * factor.clamp(0.0, 1.0);
    (packed & 0x00FF_FFFF) | ((alpha.round() as u32) << 24)
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from(arr: [f32; 4]) -> Self {
        Self {
            r: arr[0],
            g: arr[1],
            b: arr[2],
            a: arr[3],
        }
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout() {
        assert_eq!(Color::RED.to_packed(), 0xFF00_00FF);
        assert_eq!(Color::BLUE.to_packed(), 0xFFFF_0000);
        assert_eq!(Color::TRANSPARENT.to_packed(), 0);
    }

    #[test]
    fn test_packed_clamps() {
        let packed = Color::rgba(2.0, -1.0, 0.5, 1.0).to_packed();
        assert_eq!(packed.to_le_bytes(), [255, 0, 128, 255]);
    }

    #[test]
    fn test_scale_packed_alpha() {
        let packed = Color::WHITE.to_packed();
        let faded = scale_packed_alpha(packed, 0.5);
        assert_eq!(faded & 0x00FF_FFFF, 0x00FF_FFFF);
        assert_eq!(faded >> 24, 128);
    }
}
