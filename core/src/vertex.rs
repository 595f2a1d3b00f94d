//! Vertex records shared by the examples.
//!
//! Every record is `#[repr(C)]` and `Pod`, so a slice of them can be uploaded
//! as raw bytes. Field offsets and sizes are asserted at compile time and
//! mirrored by each type's [`Vertex::ATTRIBUTES`] table, which the runner
//! turns into a pipeline vertex layout.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    Float,
    Float2,
    Float3,
    Float4,
    /// Four 8-bit unsigned integers, normalized to 0.0-1.0.
    Unorm8x4,
}

impl VertexAttributeFormat {
    pub fn size(&self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::Unorm8x4 => 4,
        }
    }
}

/// One attribute: shader location, format and byte offset in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexAttributeFormat,
    pub offset: u32,
}

impl VertexAttribute {
    pub const fn new(location: u32, format: VertexAttributeFormat, offset: usize) -> Self {
        Self {
            location,
            format,
            offset: offset as u32,
        }
    }
}

/// A record with a fixed memory layout.
pub trait Vertex: Pod {
    /// Attributes in location order.
    const ATTRIBUTES: &'static [VertexAttribute];

    /// Byte distance between consecutive records.
    const STRIDE: u32 = size_of::<Self>() as u32;
}

/// Position only.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PositionVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Position with an 8-bit RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PositionColorVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PositionColorVertex {
    pub const fn new(x: f32, y: f32, z: f32, [r, g, b, a]: [u8; 4]) -> Self {
        Self {
            x,
            y,
            z,
            r,
            g,
            b,
            a,
        }
    }
}

/// Position with a texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PositionTextureVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    pub v: f32,
}

impl PositionTextureVertex {
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self { x, y, z, u, v }
    }
}

/// Homogeneous position, texture coordinate and float color, 16-byte aligned
/// for storage buffer use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PositionTextureColorVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub u: f32,
    pub v: f32,
    pub padding_a: f32,
    pub padding_b: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Per-sprite data consumed by compute-driven sprite batching.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ComputeSpriteInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotation: f32,
    pub w: f32,
    pub h: f32,
    pub padding_a: f32,
    pub padding_b: f32,
    pub tex_u: f32,
    pub tex_v: f32,
    pub tex_w: f32,
    pub tex_h: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

const_assert_eq!(size_of::<PositionVertex>(), 12);

const_assert_eq!(size_of::<PositionColorVertex>(), 16);
const_assert_eq!(offset_of!(PositionColorVertex, r), 12);

const_assert_eq!(size_of::<PositionTextureVertex>(), 20);
const_assert_eq!(offset_of!(PositionTextureVertex, u), 12);

const_assert_eq!(size_of::<PositionTextureColorVertex>(), 48);
const_assert_eq!(offset_of!(PositionTextureColorVertex, u), 16);
const_assert_eq!(offset_of!(PositionTextureColorVertex, r), 32);

const_assert_eq!(size_of::<ComputeSpriteInstance>(), 64);
const_assert_eq!(offset_of!(ComputeSpriteInstance, rotation), 12);
const_assert_eq!(offset_of!(ComputeSpriteInstance, w), 16);
const_assert_eq!(offset_of!(ComputeSpriteInstance, tex_u), 32);
const_assert_eq!(offset_of!(ComputeSpriteInstance, r), 48);

use self::VertexAttributeFormat::{Float, Float2, Float3, Float4, Unorm8x4};

impl Vertex for PositionVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[VertexAttribute::new(0, Float3, 0)];
}

impl Vertex for PositionColorVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, Float3, 0),
        VertexAttribute::new(1, Unorm8x4, offset_of!(PositionColorVertex, r)),
    ];
}

impl Vertex for PositionTextureVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, Float3, 0),
        VertexAttribute::new(1, Float2, offset_of!(PositionTextureVertex, u)),
    ];
}

impl Vertex for PositionTextureColorVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, Float4, 0),
        VertexAttribute::new(1, Float2, offset_of!(PositionTextureColorVertex, u)),
        VertexAttribute::new(2, Float4, offset_of!(PositionTextureColorVertex, r)),
    ];
}

impl Vertex for ComputeSpriteInstance {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::new(0, Float3, 0),
        VertexAttribute::new(1, Float, offset_of!(ComputeSpriteInstance, rotation)),
        VertexAttribute::new(2, Float2, offset_of!(ComputeSpriteInstance, w)),
        VertexAttribute::new(3, Float4, offset_of!(ComputeSpriteInstance, tex_u)),
        VertexAttribute::new(4, Float4, offset_of!(ComputeSpriteInstance, r)),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_attributes_fit<V: Vertex>() {
        let mut last_end = 0;
        for (i, attribute) in V::ATTRIBUTES.iter().enumerate() {
            assert_eq!(attribute.location, i as u32);
            assert!(attribute.offset >= last_end, "overlapping attribute {i}");
            last_end = attribute.offset + attribute.format.size();
        }
        assert!(last_end <= V::STRIDE);
    }

    #[test]
    fn test_attribute_tables_match_layouts() {
        assert_attributes_fit::<PositionVertex>();
        assert_attributes_fit::<PositionColorVertex>();
        assert_attributes_fit::<PositionTextureVertex>();
        assert_attributes_fit::<PositionTextureColorVertex>();
        assert_attributes_fit::<ComputeSpriteInstance>();
    }

    #[test]
    fn test_strides() {
        assert_eq!(PositionColorVertex::STRIDE, 16);
        assert_eq!(PositionTextureVertex::STRIDE, 20);
        assert_eq!(ComputeSpriteInstance::STRIDE, 64);
    }

    #[test]
    fn test_color_bytes_follow_position() {
        let vertex = PositionColorVertex::new(1.0, 2.0, 3.0, [10, 20, 30, 255]);
        let bytes = bytemuck::bytes_of(&vertex);
        assert_eq!(&bytes[12..], &[10, 20, 30, 255]);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
    }
}
