use lumen_engine::coords::Vec2;
use lumen_engine::gpu::{FlatShapeProgram, GpuContext, GpuError};
use lumen_engine::host::recording::{GlCall, RecordingCanvas, RecordingHost};
use lumen_engine::paint::Color;
use lumen_engine::shapes::{Rectangle, Triangle};

const VERTEX: &str = "#version 300 es
in vec2 a_position;
uniform vec2 u_resolution;
void main() {
  gl_Position = vec4(a_position / u_resolution * 2.0 - 1.0, 0, 1);
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

fn context(canvas: &RecordingCanvas, background: Option<Color>) -> GpuContext<RecordingCanvas> {
    let mut host = RecordingHost::new().with_canvas("canvas", canvas.clone());
    GpuContext::from_host(&mut host, "canvas", background).unwrap()
}

#[test]
fn rectangle_walkthrough() {
    let canvas = RecordingCanvas::new(400.0, 300.0, 2.0);
    let mut ctx = context(&canvas, Some(Color::black()));
    let gl = canvas.gl();

    let program = ctx.create_program(VERTEX, FRAGMENT).unwrap();
    let resolution = ctx.uniform_location(&program, "u_resolution").unwrap();
    let color = ctx.uniform_location(&program, "u_color").unwrap();

    let rect = Rectangle::new(10.0, 20.0, 100.0, 50.0);
    let buffer = ctx.upload_vertices(&rect.to_array()).unwrap();
    assert_eq!(ctx.bind_attribute(&program, "a_position").unwrap(), 0);

    assert!(ctx.resize(2.0));
    ctx.clear_canvas();
    ctx.use_program(&program);
    ctx.set_uniform_vec2(&resolution, Vec2::new(800.0, 600.0));
    ctx.set_uniform_color(&color, Color::new(1.0, 0.0, 0.5, 1.0));
    ctx.draw_triangles(Rectangle::VERTEX_COUNT);

    let calls = gl.calls();
    assert!(calls.contains(&GlCall::Viewport { x: 0, y: 0, width: 800, height: 600 }));
    assert!(calls.contains(&GlCall::ClearColor(Color::black())));
    assert_eq!(calls.last(), Some(&GlCall::DrawTriangles { first: 0, count: 6 }));

    ctx.delete_buffer(buffer);
    ctx.delete_program(program);
    assert_eq!(gl.live_programs(), 0);
    assert_eq!(gl.live_shaders(), 0);
    assert_eq!(gl.live_buffers(), 0);

    drop(ctx);
    assert_eq!(gl.live_vertex_arrays(), 0);
}

#[test]
fn flat_program_draws_mixed_shapes() {
    let canvas = RecordingCanvas::new(100.0, 100.0, 1.0);
    let mut ctx = context(&canvas, None);
    ctx.resize(1.0);
    let mut flat = FlatShapeProgram::new(&ctx).unwrap();

    let mut positions = Rectangle::new(0.0, 0.0, 10.0, 10.0).to_array().to_vec();
    positions.extend_from_slice(
        &Triangle::new(Vec2::new(50.0, 50.0), Vec2::new(60.0, 50.0), Vec2::new(55.0, 60.0))
            .to_array(),
    );

    let drawn = flat.draw(&ctx, &positions, Color::white()).unwrap();
    assert_eq!(drawn, Rectangle::VERTEX_COUNT + Triangle::VERTEX_COUNT);
    assert_eq!(
        canvas.gl().calls().last(),
        Some(&GlCall::DrawTriangles { first: 0, count: 9 })
    );

    flat.destroy(&ctx);
}

#[test]
fn broken_shader_reports_its_log() {
    let canvas = RecordingCanvas::new(10.0, 10.0, 1.0);
    let ctx = context(&canvas, None);

    let err = ctx.create_program("in vec2 a_position;", FRAGMENT).err().unwrap();
    match err {
        GpuError::ShaderCompile { log, .. } => assert!(log.contains("syntax error")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(canvas.gl().live_shaders(), 0);
    assert_eq!(canvas.gl().live_programs(), 0);
}

#[test]
fn missing_gl_context_is_reported() {
    let canvas = RecordingCanvas::new(10.0, 10.0, 1.0).without_gl();
    let mut host = RecordingHost::new().with_canvas("canvas", canvas);
    let err = GpuContext::from_host(&mut host, "canvas", None).err().unwrap();
    assert!(matches!(err, GpuError::ContextUnavailable { .. }));
}
