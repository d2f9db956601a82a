use crate::coords::Vec2;
use crate::host::{CanvasElement, GlSource};
use crate::paint::Color;

use super::{GlBackend, GpuContext, GpuError, ShaderProgram, VertexBuffer};

/// Maps pixel positions (top-left origin) to clip space.
pub const FLAT_VERTEX_SHADER: &str = "#version 300 es
in vec2 a_position;
uniform vec2 u_resolution;
void main() {
  vec2 clip_space = a_position / u_resolution * 2.0 - 1.0;
  gl_Position = vec4(clip_space * vec2(1, -1), 0, 1);
}
";

pub const FLAT_FRAGMENT_SHADER: &str = "#version 300 es
precision highp float;
uniform vec4 u_color;
out vec4 outColor;
void main() {
  outColor = u_color;
}
";

const POSITION: &str = "a_position";
const RESOLUTION: &str = "u_resolution";
const COLOR: &str = "u_color";

type Uniform<E> = <<E as GlSource>::Gl as GlBackend>::UniformLocation;

/// Program drawing flat-colored triangle lists given in backing-store pixels.
///
/// Fed with [`Triangle`](crate::shapes::Triangle) /
/// [`Rectangle`](crate::shapes::Rectangle) payloads. The vertex buffer is
/// created on the first draw and reused afterwards.
pub struct FlatShapeProgram<E: GlSource> {
    program: ShaderProgram<E::Gl>,
    resolution: Uniform<E>,
    color: Uniform<E>,
    buffer: Option<VertexBuffer<E::Gl>>,
}

impl<E: GlSource> FlatShapeProgram<E> {
    /// Compiles and links the flat shaders and resolves their inputs.
    pub fn new(ctx: &GpuContext<E>) -> Result<Self, GpuError> {
        let program = ctx.create_program(FLAT_VERTEX_SHADER, FLAT_FRAGMENT_SHADER)?;

        let lookups = ctx.attribute_location(&program, POSITION).and_then(|_| {
            Ok((
                ctx.uniform_location(&program, RESOLUTION)?,
                ctx.uniform_location(&program, COLOR)?,
            ))
        });

        match lookups {
            Ok((resolution, color)) => Ok(Self {
                program,
                resolution,
                color,
                buffer: None,
            }),
            Err(e) => {
                ctx.delete_program(program);
                Err(e)
            }
        }
    }

    /// Draws `positions` (`[x, y, …]`, three vertices per triangle) in `color`
    /// over the whole backing store. Returns the number of vertices drawn.
    pub fn draw(
        &mut self,
        ctx: &GpuContext<E>,
        positions: &[f32],
        color: Color,
    ) -> Result<usize, GpuError> {
        let vertex_count = positions.len() / 2;

        ctx.use_program(&self.program);

        match self.buffer.as_mut() {
            Some(buffer) => ctx.update_vertices(buffer, positions),
            None => self.buffer = Some(ctx.upload_vertices(positions)?),
        }

        ctx.bind_attribute(&self.program, POSITION)?;

        let (width, height) = ctx.element().backing_size();
        ctx.set_uniform_vec2(&self.resolution, Vec2::new(width as f32, height as f32));
        ctx.set_uniform_color(&self.color, color);

        ctx.draw_triangles(vertex_count);
        Ok(vertex_count)
    }

    /// Releases the program, its shaders and the vertex buffer.
    pub fn destroy(self, ctx: &GpuContext<E>) {
        if let Some(buffer) = self.buffer {
            ctx.delete_buffer(buffer);
        }
        ctx.delete_program(self.program);
    }
}
