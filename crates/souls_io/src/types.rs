//! Small aggregates built from primitives.

pub use glam::{Vec2, Vec3, Vec4};

/// An 8-bit per channel color
///
/// Formats disagree on channel order, so the reader and writer expose one method per layout
/// (`rgba`, `argb`, `bgra`, `abgr`) and this type stays layout-agnostic.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgba(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub const fn from_argb(bytes: [u8; 4]) -> Self {
        Self::new(bytes[1], bytes[2], bytes[3], bytes[0])
    }

    pub const fn from_bgra(bytes: [u8; 4]) -> Self {
        Self::new(bytes[2], bytes[1], bytes[0], bytes[3])
    }

    pub const fn from_abgr(bytes: [u8; 4]) -> Self {
        Self::new(bytes[3], bytes[2], bytes[1], bytes[0])
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn to_argb(self) -> [u8; 4] {
        [self.a, self.r, self.g, self.b]
    }

    pub const fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    pub const fn to_abgr(self) -> [u8; 4] {
        [self.a, self.b, self.g, self.r]
    }
}
