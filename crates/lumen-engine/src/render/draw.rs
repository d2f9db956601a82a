use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// One 2D drawing call, in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawCommand {
    Line { from: Vec2, to: Vec2, color: Color, width: f32 },
    Fill { rect: Rect, color: Color },
    /// Resets the area to the frame's clear color.
    Clear { rect: Rect },
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SolidVertex {
    pub pos: [f32; 2],
    pub color: [f32; 4],
}

impl SolidVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SolidVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Expands commands into a triangle list, appending to `out`.
///
/// Lines become quads of the given width centered on the segment. Colors are
/// converted to linear space when `linear_output` is set (sRGB swapchains).
pub fn tessellate(
    commands: &[DrawCommand],
    clear: Color,
    linear_output: bool,
    out: &mut Vec<SolidVertex>,
) {
    let convert = |c: Color| {
        if linear_output {
            [srgb_to_linear(c.r), srgb_to_linear(c.g), srgb_to_linear(c.b), c.a]
        } else {
            c.to_array()
        }
    };

    for cmd in commands {
        match *cmd {
            DrawCommand::Line { from, to, color, width } => {
                let d = to - from;
                let len = d.length();
                if len <= f32::EPSILON || width <= 0.0 {
                    continue;
                }
                let n = Vec2::new(-d.y, d.x) * (0.5 * width / len);
                push_quad(out, [from + n, to + n, from - n, to - n], convert(color));
            }
            DrawCommand::Fill { rect, color } => push_rect(out, rect, convert(color)),
            DrawCommand::Clear { rect } => push_rect(out, rect, convert(clear)),
        }
    }
}

fn push_rect(out: &mut Vec<SolidVertex>, rect: Rect, color: [f32; 4]) {
    let r = rect.normalized();
    if r.is_empty() {
        return;
    }
    let max = r.max();
    push_quad(
        out,
        [
            r.origin,
            Vec2::new(max.x, r.origin.y),
            Vec2::new(r.origin.x, max.y),
            max,
        ],
        color,
    );
}

/// `[a, b, c, d]` = top-left, top-right, bottom-left, bottom-right.
fn push_quad(out: &mut Vec<SolidVertex>, [a, b, c, d]: [Vec2; 4], color: [f32; 4]) {
    for p in [a, b, c, b, c, d] {
        out.push(SolidVertex { pos: [p.x, p.y], color });
    }
}

fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
