//! In-memory host implementations.
//!
//! Every handle is a cheap clone over shared state, so a test can keep one
//! clone for inspection while the surface / engine / GPU context owns another.
//! Single-threaded by construction (`Rc<RefCell<_>>`), like the hosts they
//! stand in for.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::coords::{Rect, Vec2};
use crate::gpu::{GlBackend, ShaderStage};
use crate::paint::Color;

use super::{
    CanvasElement, CanvasHost, Context2d, Context2dSource, FrameRequest, FrameScheduler,
    GlSource, HostElement, ResizeSubscription, Transform2d,
};

// ── host ──────────────────────────────────────────────────────────────────

/// Element registry keyed by id.
#[derive(Default)]
pub struct RecordingHost {
    elements: HashMap<String, Entry>,
}

enum Entry {
    Canvas(RecordingCanvas),
    Other(String),
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas(mut self, id: &str, canvas: RecordingCanvas) -> Self {
        self.elements.insert(id.to_owned(), Entry::Canvas(canvas));
        self
    }

    /// Registers a non-canvas element with the given tag name.
    pub fn with_element(mut self, id: &str, tag: &str) -> Self {
        self.elements.insert(id.to_owned(), Entry::Other(tag.to_owned()));
        self
    }
}

impl CanvasHost for RecordingHost {
    type Element = RecordingCanvas;

    fn element_by_id(&mut self, id: &str) -> Option<HostElement<RecordingCanvas>> {
        self.elements.get(id).map(|entry| match entry {
            Entry::Canvas(canvas) => HostElement::Canvas(canvas.clone()),
            Entry::Other(tag) => HostElement::Other { tag: tag.clone() },
        })
    }
}

// ── canvas ────────────────────────────────────────────────────────────────

/// One recorded 2D drawing call, in the logical coordinates it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line { from: Vec2, to: Vec2, color: Color, width: f32 },
    FillRect { rect: Rect, color: Color },
    ClearRect { rect: Rect },
}

#[derive(Debug)]
struct CanvasState {
    client_size: Vec2,
    device_pixel_ratio: f32,
    backing_size: (u32, u32),
    has_context_2d: bool,
    has_gl: bool,

    next_subscription: u64,
    subscriptions: BTreeSet<u64>,
    pending_resize: BTreeSet<u64>,

    transform: Transform2d,
    set_transform_calls: usize,
    ops: Vec<DrawOp>,

    gl: RecordingGl,
}

/// Canvas element with a configurable layout box and pixel ratio.
#[derive(Clone)]
pub struct RecordingCanvas {
    state: Rc<RefCell<CanvasState>>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(CanvasState {
                client_size: Vec2::new(width, height),
                device_pixel_ratio,
                // Browsers default a fresh canvas to 300x150.
                backing_size: (300, 150),
                has_context_2d: true,
                has_gl: true,
                next_subscription: 1,
                subscriptions: BTreeSet::new(),
                pending_resize: BTreeSet::new(),
                transform: Transform2d::IDENTITY,
                set_transform_calls: 0,
                ops: Vec::new(),
                gl: RecordingGl::new(),
            })),
        }
    }

    pub fn without_context_2d(self) -> Self {
        self.state.borrow_mut().has_context_2d = false;
        self
    }

    pub fn without_gl(self) -> Self {
        self.state.borrow_mut().has_gl = false;
        self
    }

    pub fn set_client_size(&self, width: f32, height: f32) {
        self.state.borrow_mut().client_size = Vec2::new(width, height);
    }

    pub fn set_device_pixel_ratio(&self, ratio: f32) {
        self.state.borrow_mut().device_pixel_ratio = ratio;
    }

    /// Delivers a resize notification to every active subscription.
    pub fn notify_resize(&self) {
        let mut s = self.state.borrow_mut();
        let active: Vec<u64> = s.subscriptions.iter().copied().collect();
        s.pending_resize.extend(active);
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    /// Current transform of the 2D context.
    pub fn transform(&self) -> Transform2d {
        self.state.borrow().transform
    }

    pub fn set_transform_calls(&self) -> usize {
        self.state.borrow().set_transform_calls
    }

    pub fn ops(&self) -> Vec<DrawOp> {
        self.state.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    /// The GL backend handed out by [`GlSource::context_gl`].
    pub fn gl(&self) -> RecordingGl {
        self.state.borrow().gl.clone()
    }
}

impl CanvasElement for RecordingCanvas {
    fn client_size(&self) -> Vec2 {
        self.state.borrow().client_size
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.state.borrow().device_pixel_ratio
    }

    fn backing_size(&self) -> (u32, u32) {
        self.state.borrow().backing_size
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.state.borrow_mut().backing_size = (width, height);
    }

    fn subscribe_resize(&mut self) -> ResizeSubscription {
        let mut s = self.state.borrow_mut();
        let id = s.next_subscription;
        s.next_subscription += 1;
        s.subscriptions.insert(id);
        ResizeSubscription(id)
    }

    fn unsubscribe_resize(&mut self, subscription: ResizeSubscription) {
        let mut s = self.state.borrow_mut();
        s.subscriptions.remove(&subscription.0);
        s.pending_resize.remove(&subscription.0);
    }

    fn take_resize(&mut self, subscription: ResizeSubscription) -> bool {
        self.state.borrow_mut().pending_resize.remove(&subscription.0)
    }
}

impl Context2dSource for RecordingCanvas {
    type Context = RecordingContext2d;

    fn context_2d(&mut self) -> Option<RecordingContext2d> {
        self.state
            .borrow()
            .has_context_2d
            .then(|| RecordingContext2d { state: Rc::clone(&self.state) })
    }
}

impl GlSource for RecordingCanvas {
    type Gl = RecordingGl;

    fn context_gl(&mut self) -> Option<RecordingGl> {
        let s = self.state.borrow();
        s.has_gl.then(|| s.gl.clone())
    }
}

/// 2D context that appends every call to the canvas op log.
pub struct RecordingContext2d {
    state: Rc<RefCell<CanvasState>>,
}

impl Context2d for RecordingContext2d {
    fn set_transform(&mut self, transform: Transform2d) {
        let mut s = self.state.borrow_mut();
        s.transform = transform;
        s.set_transform_calls += 1;
    }

    fn transform(&self) -> Transform2d {
        self.state.borrow().transform
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.state.borrow_mut().ops.push(DrawOp::Line { from, to, color, width });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.state.borrow_mut().ops.push(DrawOp::FillRect { rect, color });
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.state.borrow_mut().ops.push(DrawOp::ClearRect { rect });
    }
}

// ── GL ────────────────────────────────────────────────────────────────────

/// One recorded GL call with side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    VertexAttrib { location: u32, components: i32, stride: i32, offset: i32 },
    EnableAttrib(u32),
    UseProgram(Option<u32>),
    Uniform2 { location: u32, x: f32, y: f32 },
    Uniform4 { location: u32, values: [f32; 4] },
    BufferData(Vec<f32>),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor(Color),
    Clear,
    DrawTriangles { first: i32, count: i32 },
}

#[derive(Debug, Default)]
struct GlState {
    next_id: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    vertex_arrays: BTreeSet<u32>,
    bound_vertex_array: Option<u32>,
    buffers: BTreeSet<u32>,
    bound_buffer: Option<u32>,
    reject_links: Option<String>,
    calls: Vec<GlCall>,
}

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    shaders: Vec<u32>,
    linked: bool,
    log: String,
}

impl GlState {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Names declared as `<keyword> <type> <name>;` in the program's shaders,
    /// in declaration order.
    fn declared(&self, program: u32, keyword: &str, stage: Option<ShaderStage>) -> Vec<String> {
        let Some(p) = self.programs.get(&program) else {
            return Vec::new();
        };
        p.shaders
            .iter()
            .filter_map(|id| self.shaders.get(id))
            .filter(|s| stage.is_none_or(|st| s.stage == st))
            .flat_map(|s| s.source.lines())
            .filter_map(|line| {
                let mut tokens = line.split_whitespace();
                if tokens.next() != Some(keyword) {
                    return None;
                }
                let _ty = tokens.next()?;
                let name = tokens.next()?.trim_end_matches(';');
                Some(name.to_owned())
            })
            .collect()
    }
}

/// GL backend that models object lifetimes and a toy compiler.
///
/// Compilation succeeds when the source contains `void main`; otherwise the
/// info log reports a syntax error. Attribute and uniform locations come from
/// `in` / `uniform` declarations, numbered in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RecordingGl {
    state: Rc<RefCell<GlState>>,
}

/// Uniform location of the recording backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUniform(pub u32);

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following link fail with `log`.
    pub fn reject_links(&self, log: &str) {
        self.state.borrow_mut().reject_links = Some(log.to_owned());
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn is_shader_live(&self, shader: u32) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().bound_vertex_array
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GlBackend for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockUniform;
    type VertexArray = u32;
    type Buffer = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.shaders.insert(
            id,
            MockShader { stage, source: String::new(), compiled: false, log: String::new() },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.compiled = s.source.contains("void main");
            s.log = if s.compiled {
                String::new()
            } else {
                "ERROR: 0:1: syntax error".to_owned()
            };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.shaders.push(shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        let reject = s.reject_links.clone();
        let all_compiled = s
            .programs
            .get(&program)
            .is_some_and(|p| p.shaders.iter().all(|id| s.shaders.get(id).is_some_and(|sh| sh.compiled)));

        if let Some(p) = s.programs.get_mut(&program) {
            match (reject, all_compiled) {
                (Some(log), _) => {
                    p.linked = false;
                    p.log = log;
                }
                (None, false) => {
                    p.linked = false;
                    p.log = "ERROR: attached shader not compiled".to_owned();
                }
                (None, true) => p.linked = true,
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        if !s.programs.get(&program).is_some_and(|p| p.linked) {
            return None;
        }
        s.declared(program, "in", Some(ShaderStage::Vertex))
            .iter()
            .position(|n| n == name)
            .map(|i| i as u32)
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttrib { location, components, stride, offset });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::EnableAttrib(location));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<MockUniform> {
        let s = self.state.borrow();
        if !s.programs.get(&program).is_some_and(|p| p.linked) {
            return None;
        }
        s.declared(program, "uniform", None)
            .iter()
            .position(|n| n == name)
            .map(|i| MockUniform(i as u32))
    }

    fn uniform_2f(&self, location: &MockUniform, x: f32, y: f32) {
        self.record(GlCall::Uniform2 { location: location.0, x, y });
    }

    fn uniform_4f(&self, location: &MockUniform, x: f32, y: f32, z: f32, w: f32) {
        self.record(GlCall::Uniform4 { location: location.0, values: [x, y, z, w] });
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.buffers.insert(id);
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().bound_buffer = buffer;
    }

    fn array_buffer_data(&self, data: &[f32]) {
        self.record(GlCall::BufferData(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut s = self.state.borrow_mut();
        s.buffers.remove(&buffer);
        if s.bound_buffer == Some(buffer) {
            s.bound_buffer = None;
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { x, y, width, height });
    }

    fn clear_color(&self, color: Color) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear_color_buffer(&self) {
        self.record(GlCall::Clear);
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(GlCall::DrawTriangles { first, count });
    }
}

// ── frames ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct FramesState {
    next_id: u64,
    pending: BTreeSet<u64>,
    requested: usize,
    cancelled: usize,
    refuse: bool,
}

/// Frame scheduler that only records requests; the test fires frames by
/// calling `Engine::on_frame` itself.
#[derive(Clone, Default)]
pub struct RecordingFrames {
    state: Rc<RefCell<FramesState>>,
}

impl RecordingFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }

    /// Makes following requests fail, like a host without a frame clock.
    pub fn refuse_requests(&self, refuse: bool) {
        self.state.borrow_mut().refuse = refuse;
    }

    /// Marks the oldest pending request as fired (the host would now call
    /// back into the requester).
    pub fn fire(&self) -> Option<FrameRequest> {
        let mut s = self.state.borrow_mut();
        let first = s.pending.iter().next().copied()?;
        s.pending.remove(&first);
        Some(FrameRequest(first))
    }
}

impl FrameScheduler for RecordingFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let mut s = self.state.borrow_mut();
        if s.refuse {
            return None;
        }
        s.next_id += 1;
        let id = s.next_id;
        s.pending.insert(id);
        s.requested += 1;
        Some(FrameRequest(id))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut s = self.state.borrow_mut();
        if s.pending.remove(&request.0) {
            s.cancelled += 1;
        }
    }
}
