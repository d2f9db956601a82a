use crate::coords::Vec2;
use crate::host::{CanvasHost, GlSource};
use crate::paint::Color;
use crate::surface::lookup_canvas;

use super::{GlBackend, GpuError, Shader, ShaderProgram, ShaderStage, VertexBuffer};

type Uniform<E> = <<E as GlSource>::Gl as GlBackend>::UniformLocation;

/// The GL context of one canvas.
///
/// There is exactly one of these per page. It is created by the top-level
/// application and passed by reference to whatever needs to compile programs
/// or issue draws; [`GpuSlot`](super::GpuSlot) provides first-caller-wins
/// memoisation on top when several components race to create it.
pub struct GpuContext<E: GlSource> {
    surface_id: String,
    element: E,
    gl: E::Gl,
    vertex_array: <E::Gl as GlBackend>::VertexArray,
    background: Color,
}

impl<E: GlSource> GpuContext<E> {
    /// Looks up `surface_id` on the host and creates a context on it.
    pub fn from_host<H>(
        host: &mut H,
        surface_id: &str,
        background: Option<Color>,
    ) -> Result<Self, GpuError>
    where
        H: CanvasHost<Element = E>,
    {
        let element = lookup_canvas(host, surface_id)?;
        Self::new(surface_id, element, background)
    }

    /// Creates a context on an already resolved element.
    ///
    /// A single vertex array is created and bound for the lifetime of the
    /// context; attribute bindings are recorded into it.
    pub fn new(
        surface_id: impl Into<String>,
        mut element: E,
        background: Option<Color>,
    ) -> Result<Self, GpuError> {
        let surface_id = surface_id.into();

        let Some(gl) = element.context_gl() else {
            log::error!("unable to initialise WebGL2 on `{surface_id}`");
            return Err(GpuError::ContextUnavailable { surface: surface_id });
        };

        let vertex_array = gl
            .create_vertex_array()
            .map_err(|reason| GpuError::ResourceCreation { what: "vertex array", reason })?;
        gl.bind_vertex_array(Some(vertex_array));

        log::debug!("GPU context created on `{surface_id}`");

        Ok(Self {
            surface_id,
            element,
            gl,
            vertex_array,
            background: background.unwrap_or_else(Color::transparent),
        })
    }

    #[inline]
    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    /// Raw backend access for draw calls not covered here.
    #[inline]
    pub fn gl(&self) -> &E::Gl {
        &self.gl
    }

    #[inline]
    pub fn element(&self) -> &E {
        &self.element
    }

    #[inline]
    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    // ── shaders & programs ────────────────────────────────────────────────

    /// Creates, uploads and compiles one shader.
    ///
    /// On a failed compile the shader object is deleted before the error is
    /// returned, so nothing is left to clean up.
    pub fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Shader<E::Gl>, GpuError> {
        let raw = self
            .gl
            .create_shader(stage)
            .map_err(|reason| GpuError::ResourceCreation { what: "shader", reason })?;

        self.gl.shader_source(raw, source);
        self.gl.compile_shader(raw);

        if !self.gl.shader_compile_status(raw) {
            let log = self.gl.shader_info_log(raw);
            self.gl.delete_shader(raw);
            log::error!("error compiling {stage} shader: {log}");
            return Err(GpuError::ShaderCompile { stage, log });
        }

        Ok(Shader { raw, stage })
    }

    /// Links two compiled shaders into a program.
    ///
    /// The shaders are consumed: on success they stay attached to the returned
    /// program, on failure the program and both shaders are deleted.
    pub fn link_program(
        &self,
        vertex: Shader<E::Gl>,
        fragment: Shader<E::Gl>,
    ) -> Result<ShaderProgram<E::Gl>, GpuError> {
        debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
        debug_assert_eq!(fragment.stage, ShaderStage::Fragment);

        let raw = match self.gl.create_program() {
            Ok(p) => p,
            Err(reason) => {
                self.delete_shader(vertex);
                self.delete_shader(fragment);
                return Err(GpuError::ResourceCreation { what: "program", reason });
            }
        };

        self.gl.attach_shader(raw, vertex.raw);
        self.gl.attach_shader(raw, fragment.raw);
        self.gl.link_program(raw);

        if !self.gl.program_link_status(raw) {
            let log = self.gl.program_info_log(raw);
            self.gl.delete_program(raw);
            self.delete_shader(vertex);
            self.delete_shader(fragment);
            log::error!("error linking program: {log}");
            return Err(GpuError::ProgramLink { log });
        }

        Ok(ShaderProgram {
            raw,
            vertex: vertex.raw,
            fragment: fragment.raw,
        })
    }

    /// Compiles both stages and links them.
    pub fn create_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram<E::Gl>, GpuError> {
        let vertex = self.compile_shader(ShaderStage::Vertex, vertex_source)?;
        let fragment = match self.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(f) => f,
            Err(e) => {
                self.delete_shader(vertex);
                return Err(e);
            }
        };
        self.link_program(vertex, fragment)
    }

    pub fn delete_shader(&self, shader: Shader<E::Gl>) {
        self.gl.delete_shader(shader.raw);
    }

    /// Deletes a program and its attached shaders.
    pub fn delete_program(&self, program: ShaderProgram<E::Gl>) {
        self.gl.delete_program(program.raw);
        self.gl.delete_shader(program.vertex);
        self.gl.delete_shader(program.fragment);
    }

    pub fn use_program(&self, program: &ShaderProgram<E::Gl>) {
        self.gl.use_program(Some(program.raw));
    }

    // ── attributes & uniforms ─────────────────────────────────────────────

    pub fn attribute_location(
        &self,
        program: &ShaderProgram<E::Gl>,
        name: &str,
    ) -> Result<u32, GpuError> {
        self.gl
            .attrib_location(program.raw, name)
            .ok_or_else(|| GpuError::AttributeNotFound { name: name.to_owned() })
    }

    /// Binds `name` as a `vec2` float attribute fed from the bound array
    /// buffer (tightly packed, offset 0). Returns the attribute location.
    pub fn bind_attribute(
        &self,
        program: &ShaderProgram<E::Gl>,
        name: &str,
    ) -> Result<u32, GpuError> {
        let location = self.attribute_location(program, name)?;

        self.gl.vertex_attrib_f32(location, 2, 0, 0);
        self.gl.enable_vertex_attrib_array(location);
        Ok(location)
    }

    pub fn uniform_location(
        &self,
        program: &ShaderProgram<E::Gl>,
        name: &str,
    ) -> Result<Uniform<E>, GpuError> {
        self.gl
            .uniform_location(program.raw, name)
            .ok_or_else(|| GpuError::UniformNotFound { name: name.to_owned() })
    }

    pub fn set_uniform_vec2(&self, location: &Uniform<E>, value: Vec2) {
        self.gl.uniform_2f(location, value.x, value.y);
    }

    pub fn set_uniform_color(&self, location: &Uniform<E>, color: Color) {
        self.gl.uniform_4f(location, color.r, color.g, color.b, color.a);
    }

    // ── vertex data & draws ───────────────────────────────────────────────

    /// Creates an array buffer, binds it and uploads `data`.
    ///
    /// The buffer stays bound, so a following [`bind_attribute`](Self::bind_attribute)
    /// reads from it.
    pub fn upload_vertices(&self, data: &[f32]) -> Result<VertexBuffer<E::Gl>, GpuError> {
        let raw = self
            .gl
            .create_buffer()
            .map_err(|reason| GpuError::ResourceCreation { what: "buffer", reason })?;
        self.gl.bind_array_buffer(Some(raw));
        self.gl.array_buffer_data(data);
        Ok(VertexBuffer { raw, floats: data.len() })
    }

    /// Rebinds `buffer` and replaces its contents.
    pub fn update_vertices(&self, buffer: &mut VertexBuffer<E::Gl>, data: &[f32]) {
        self.gl.bind_array_buffer(Some(buffer.raw));
        self.gl.array_buffer_data(data);
        buffer.floats = data.len();
    }

    pub fn delete_buffer(&self, buffer: VertexBuffer<E::Gl>) {
        self.gl.delete_buffer(buffer.raw);
    }

    /// Draws `vertex_count` vertices as a triangle list.
    pub fn draw_triangles(&self, vertex_count: usize) {
        let count = i32::try_from(vertex_count).unwrap_or(i32::MAX);
        self.gl.draw_triangles(0, count);
    }

    // ── canvas ────────────────────────────────────────────────────────────

    /// Resizes the backing store to `floor(client size × multiplier)`.
    ///
    /// Pass the device pixel ratio for native resolution. Returns `true` when
    /// the backing store changed, in which case the caller should re-issue the
    /// viewport (see [`clear_canvas`](Self::clear_canvas)).
    pub fn resize(&mut self, multiplier: f32) -> bool {
        let client = self.element.client_size();
        let width = (client.x * multiplier).floor().max(0.0) as u32;
        let height = (client.y * multiplier).floor().max(0.0) as u32;

        if self.element.backing_size() == (width, height) {
            return false;
        }

        self.element.set_backing_size(width, height);
        log::debug!("`{}` backing store resized to {width}x{height}", self.surface_id);
        true
    }

    /// Sets the viewport to the whole backing store and clears it with the
    /// background color.
    pub fn clear_canvas(&self) {
        let (width, height) = self.element.backing_size();
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.gl.clear_color(self.background);
        self.gl.clear_color_buffer();
    }
}

impl<E: GlSource> Drop for GpuContext<E> {
    fn drop(&mut self) {
        self.gl.bind_vertex_array(None);
        self.gl.delete_vertex_array(self.vertex_array);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::recording::{GlCall, MockUniform, RecordingCanvas, RecordingHost};
    use crate::host::CanvasElement;
    use crate::surface::SurfaceInitError;

    const VERTEX: &str = "#version 300 es
in vec2 a_position;
uniform vec2 u_resolution;
void main() {
  gl_Position = vec4(a_position / u_resolution, 0, 1);
}
";

    const FRAGMENT: &str = "#version 300 es
precision highp float;
uniform vec4 u_color;
out vec4 outColor;
void main() {
  outColor = u_color;
}
";

    fn context(canvas: &RecordingCanvas) -> GpuContext<RecordingCanvas> {
        let mut host = RecordingHost::new().with_canvas("gl", canvas.clone());
        GpuContext::from_host(&mut host, "gl", Some(Color::black())).unwrap()
    }

    // ── context ───────────────────────────────────────────────────────────

    #[test]
    fn new_binds_a_vertex_array() {
        let canvas = RecordingCanvas::new(100.0, 100.0, 1.0);
        let ctx = context(&canvas);
        let gl = canvas.gl();
        assert_eq!(gl.live_vertex_arrays(), 1);
        assert!(gl.bound_vertex_array().is_some());
        drop(ctx);
        assert_eq!(gl.live_vertex_arrays(), 0);
    }

    #[test]
    fn missing_gl_context_is_reported() {
        let canvas = RecordingCanvas::new(100.0, 100.0, 1.0).without_gl();
        let mut host = RecordingHost::new().with_canvas("gl", canvas);
        let err = GpuContext::from_host(&mut host, "gl", None).err().unwrap();
        assert!(matches!(err, GpuError::ContextUnavailable { surface } if surface == "gl"));
    }

    #[test]
    fn missing_element_surfaces_as_init_error() {
        let mut host = RecordingHost::new().with_element("gl", "section");
        let err = GpuContext::from_host(&mut host, "gl", None).err().unwrap();
        assert!(matches!(err, GpuError::Surface(SurfaceInitError::NotACanvas { .. })));
    }

    // ── compile / link ────────────────────────────────────────────────────

    #[test]
    fn invalid_source_fails_and_leaves_no_shader() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let err = ctx.compile_shader(ShaderStage::Fragment, "this is not glsl").unwrap_err();

        match err {
            GpuError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("syntax error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(canvas.gl().live_shaders(), 0);
    }

    #[test]
    fn create_program_links_and_keeps_shaders_attached() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let program = ctx.create_program(VERTEX, FRAGMENT).unwrap();

        let gl = canvas.gl();
        assert_eq!(gl.live_programs(), 1);
        assert_eq!(gl.live_shaders(), 2);

        ctx.delete_program(program);
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn fragment_failure_releases_the_vertex_shader() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let err = ctx.create_program(VERTEX, "garbage").unwrap_err();
        assert!(matches!(err, GpuError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(canvas.gl().live_shaders(), 0);
        assert_eq!(canvas.gl().live_programs(), 0);
    }

    #[test]
    fn link_failure_releases_everything() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        canvas.gl().reject_links("varying mismatch");

        let vs = ctx.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = ctx.compile_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        let vs_raw = vs.raw();

        let err = ctx.link_program(vs, fs).unwrap_err();
        assert!(matches!(err, GpuError::ProgramLink { ref log } if log == "varying mismatch"));

        let gl = canvas.gl();
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_shaders(), 0);
        assert!(!gl.is_shader_live(vs_raw));
    }

    // ── attributes / uniforms ─────────────────────────────────────────────

    #[test]
    fn bind_attribute_configures_vec2_float() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let program = ctx.create_program(VERTEX, FRAGMENT).unwrap();
        canvas.gl().clear_calls();

        let location = ctx.bind_attribute(&program, "a_position").unwrap();
        assert_eq!(location, 0);
        assert_eq!(
            canvas.gl().calls(),
            vec![
                GlCall::VertexAttrib { location: 0, components: 2, stride: 0, offset: 0 },
                GlCall::EnableAttrib(0),
            ]
        );
    }

    #[test]
    fn unknown_attribute_is_an_error_and_binds_nothing() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let program = ctx.create_program(VERTEX, FRAGMENT).unwrap();
        canvas.gl().clear_calls();

        let err = ctx.bind_attribute(&program, "a_normal").unwrap_err();
        assert!(matches!(err, GpuError::AttributeNotFound { ref name } if name == "a_normal"));
        assert!(canvas.gl().calls().is_empty());
    }

    #[test]
    fn uniform_lookup_and_upload() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        let program = ctx.create_program(VERTEX, FRAGMENT).unwrap();

        let resolution = ctx.uniform_location(&program, "u_resolution").unwrap();
        let color = ctx.uniform_location(&program, "u_color").unwrap();
        assert_eq!(resolution, MockUniform(0));
        assert_eq!(color, MockUniform(1));

        canvas.gl().clear_calls();
        ctx.set_uniform_vec2(&resolution, Vec2::new(640.0, 480.0));
        ctx.set_uniform_color(&color, Color::new(1.0, 0.0, 0.5, 1.0));
        assert_eq!(
            canvas.gl().calls(),
            vec![
                GlCall::Uniform2 { location: 0, x: 640.0, y: 480.0 },
                GlCall::Uniform4 { location: 1, values: [1.0, 0.0, 0.5, 1.0] },
            ]
        );

        let err = ctx.uniform_location(&program, "u_matrix").unwrap_err();
        assert!(matches!(err, GpuError::UniformNotFound { ref name } if name == "u_matrix"));
    }

    // ── buffers & draws ───────────────────────────────────────────────────

    #[test]
    fn upload_then_draw() {
        let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
        let ctx = context(&canvas);
        canvas.gl().clear_calls();

        let buffer = ctx.upload_vertices(&[0.0, 0.0, 0.0, 0.5, 0.7, 0.0]).unwrap();
        assert_eq!(buffer.len(), 6);
        ctx.draw_triangles(3);

        assert_eq!(
            canvas.gl().calls(),
            vec![
                GlCall::BufferData(vec![0.0, 0.0, 0.0, 0.5, 0.7, 0.0]),
                GlCall::DrawTriangles { first: 0, count: 3 },
            ]
        );

        ctx.delete_buffer(buffer);
        assert_eq!(canvas.gl().live_buffers(), 0);
    }

    // ── resize / clear ────────────────────────────────────────────────────

    #[test]
    fn resize_reports_changes_only() {
        let canvas = RecordingCanvas::new(320.0, 240.0, 2.0);
        let mut ctx = context(&canvas);

        assert!(ctx.resize(1.0));
        assert_eq!(canvas.backing_size(), (320, 240));
        assert!(!ctx.resize(1.0));

        assert!(ctx.resize(2.0));
        assert_eq!(canvas.backing_size(), (640, 480));

        canvas.set_client_size(100.7, 50.2);
        assert!(ctx.resize(1.5));
        assert_eq!(canvas.backing_size(), (151, 75));
    }

    #[test]
    fn clear_canvas_uses_full_backing_store() {
        let canvas = RecordingCanvas::new(200.0, 100.0, 1.0);
        let mut ctx = context(&canvas);
        ctx.resize(1.0);
        ctx.set_background(Color::new(0.1, 0.2, 0.3, 1.0));
        canvas.gl().clear_calls();

        ctx.clear_canvas();
        assert_eq!(
            canvas.gl().calls(),
            vec![
                GlCall::Viewport { x: 0, y: 0, width: 200, height: 100 },
                GlCall::ClearColor(Color::new(0.1, 0.2, 0.3, 1.0)),
                GlCall::Clear,
            ]
        );
    }
}
