use std::ops::Mul;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect<f32> {
    /// An inverted rectangle that any point expands.
    pub const EMPTY: Rect<f32> = Rect {
        x: f32::INFINITY,
        y: f32::INFINITY,
        width: f32::NEG_INFINITY,
        height: f32::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        !(self.width >= 0.0 && self.height >= 0.0)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Rect {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    /// Grow the rectangle to include `point`.
    pub fn union_point(self, point: Vec2) -> Self {
        if self.is_empty() {
            return Rect::from_min_max(point, point);
        }
        Rect::from_min_max(self.min().min(point), self.max().max(point))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_empty()
            && point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union() {
        let rect = Rect::EMPTY
            .union_point(Vec2::new(1.0, 2.0))
            .union_point(Vec2::new(-1.0, 5.0));
        assert_eq!(rect, Rect::new(-1.0, 2.0, 2.0, 3.0));
        assert!(rect.contains(Vec2::new(0.0, 3.0)));
        assert!(!rect.contains(Vec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::EMPTY.is_empty());
        assert!(!Rect::EMPTY.contains(Vec2::ZERO));
    }

    #[test]
    fn test_size_scale() {
        assert_eq!(Size::new(2u32, 3u32) * 2, Size::new(4, 6));
    }
}
