//! ### English
//! In-memory EGL/GL doubles and recording collaborators for unit tests.
//!
//! ### 中文
//! 供单元测试使用的内存 EGL/GL 替身与记录型协作方。

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use dpi::PhysicalSize;

use crate::engine::egl::{
    EGL_ALPHA_SIZE, EGL_BAD_CONTEXT, EGL_BLUE_SIZE, EGL_CONTEXT_CLIENT_VERSION, EGL_DEPTH_SIZE,
    EGL_GREEN_SIZE, EGL_RED_SIZE, EGL_SAMPLE_BUFFERS, EGL_SAMPLES, EGL_STENCIL_SIZE, EGL_SUCCESS,
    EGLint, EglConfig, EglContext, EglDisplay, EglPlatform, EglSurface, NativeWindow,
    ParentContext,
};
use crate::engine::error::RemoteDisplayError;
use crate::engine::listeners::{ErrorPresenter, FrameConsumedListener, SessionListener};
use crate::engine::rendering::{GL_NO_ERROR, GLenum, GLint, GLuint, QuadGl, ShaderDialect};

pub(crate) const EGL_BAD_MATCH: EGLint = 0x3009;
pub(crate) const EGL_BAD_SURFACE: EGLint = 0x300D;
pub(crate) const GL_INVALID_OPERATION: GLenum = 0x0502;

const DISPLAY: usize = 0xD15;
const PRODUCER_CONTEXT: usize = 0xC0;
const WINDOW: usize = 0x717;
const PREFERRED_CONFIG_BASE: usize = 0x100;
const SIMPLE_CONFIG_BASE: usize = 0x200;
const FIRST_CONTEXT: usize = 0x1000;
const FIRST_SURFACE: usize = 0x2000;

/// ### English
/// Runs `f` with a subscriber that enables every level, so all log fields are evaluated.
///
/// ### 中文
/// 在启用全部日志级别的 subscriber 下运行 `f`，使所有日志字段都会被求值。
pub(crate) fn with_verbose_logging<R>(f: impl FnOnce() -> R) -> R {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn handle<T>(raw: usize, from_raw: fn(usize) -> Option<T>) -> T {
    from_raw(raw).unwrap()
}

/// ### English
/// Attributes reported for one fake config.
///
/// ### 中文
/// 单个伪 config 报告的属性。
#[derive(Clone, Copy, Debug)]
pub(crate) struct FakeConfig {
    red: EGLint,
    green: EGLint,
    blue: EGLint,
    alpha: EGLint,
    depth: EGLint,
    stencil: EGLint,
    samples: EGLint,
}

impl FakeConfig {
    pub(crate) fn rgba8888() -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 16,
            stencil: 0,
            samples: 0,
        }
    }

    pub(crate) fn samples(mut self, samples: EGLint) -> Self {
        self.samples = samples;
        self
    }

    pub(crate) fn channels(
        mut self,
        red: EGLint,
        green: EGLint,
        blue: EGLint,
        alpha: EGLint,
    ) -> Self {
        self.red = red;
        self.green = green;
        self.blue = blue;
        self.alpha = alpha;
        self
    }

    pub(crate) fn depth(mut self, depth: EGLint) -> Self {
        self.depth = depth;
        self
    }

    pub(crate) fn stencil(mut self, stencil: EGLint) -> Self {
        self.stencil = stencil;
        self
    }

    fn attrib(&self, attribute: EGLint) -> Option<EGLint> {
        match attribute {
            EGL_RED_SIZE => Some(self.red),
            EGL_GREEN_SIZE => Some(self.green),
            EGL_BLUE_SIZE => Some(self.blue),
            EGL_ALPHA_SIZE => Some(self.alpha),
            EGL_DEPTH_SIZE => Some(self.depth),
            EGL_STENCIL_SIZE => Some(self.stencil),
            EGL_SAMPLES => Some(self.samples),
            _ => None,
        }
    }
}

#[derive(Default)]
struct FakeEglState {
    preferred: Vec<FakeConfig>,
    simple: Vec<FakeConfig>,
    choose_config_calls: usize,
    rejected_versions: HashSet<EGLint>,
    created_versions: Vec<EGLint>,
    fail_surface_creation: bool,
    fail_next_swap: bool,
    next_context: usize,
    next_surface: usize,
    live_contexts: HashSet<usize>,
    live_surfaces: HashSet<usize>,
    destroyed: HashSet<usize>,
    contexts_destroyed: usize,
    surfaces_destroyed: usize,
    make_current_calls: usize,
    current: HashMap<ThreadId, (Option<EglContext>, Option<EglSurface>)>,
    errors: HashMap<ThreadId, EGLint>,
    surface_size: PhysicalSize<u32>,
    swaps: usize,
    swaps_entered: usize,
    swaps_held: bool,
    init_entered: usize,
    init_held: bool,
    panic_during_init: bool,
}

/// ### English
/// Single-display EGL double with per-thread current bindings, failure injection and gates
/// that can hold the render thread inside initialization or `swap_buffers`.
///
/// ### 中文
/// 单 display 的 EGL 替身：按线程记录 current 绑定，支持故障注入，并可通过闸门把
/// 渲染线程卡在初始化或 `swap_buffers` 中。
pub(crate) struct FakeEgl {
    state: Mutex<FakeEglState>,
    changed: Condvar,
    gl: Arc<FakeGlState>,
}

impl FakeEgl {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeEglState {
                preferred: vec![FakeConfig::rgba8888().samples(4)],
                simple: vec![FakeConfig::rgba8888()],
                next_context: FIRST_CONTEXT,
                next_surface: FIRST_SURFACE,
                surface_size: PhysicalSize::new(640, 480),
                ..FakeEglState::default()
            }),
            changed: Condvar::new(),
            gl: Arc::new(FakeGlState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeEglState> {
        lock(&self.state)
    }

    fn set_error(state: &mut FakeEglState, code: EGLint) {
        state.errors.insert(thread::current().id(), code);
    }

    pub(crate) fn set_configs(&self, preferred: Vec<FakeConfig>, simple: Vec<FakeConfig>) {
        let mut state = self.state();
        state.preferred = preferred;
        state.simple = simple;
    }

    pub(crate) fn choose_config_calls(&self) -> usize {
        self.state().choose_config_calls
    }

    pub(crate) fn simple_config_handle(&self, index: usize) -> EglConfig {
        handle(SIMPLE_CONFIG_BASE + index, EglConfig::from_raw)
    }

    pub(crate) fn producer_context(&self) -> EglContext {
        handle(PRODUCER_CONTEXT, EglContext::from_raw)
    }

    pub(crate) fn window(&self) -> NativeWindow {
        handle(WINDOW, NativeWindow::from_raw)
    }

    pub(crate) fn gl_state(&self) -> Arc<FakeGlState> {
        self.gl.clone()
    }

    /// ### English
    /// Binds the producer context on the calling thread, as the local renderer would.
    ///
    /// ### 中文
    /// 在调用线程绑定生产者上下文，模拟本地渲染器。
    pub(crate) fn make_producer_current(&self) {
        let producer = self.producer_context();
        self.state()
            .current
            .insert(thread::current().id(), (Some(producer), None));
    }

    /// ### English
    /// Replaces the calling thread's binding without going through `make_current`.
    ///
    /// ### 中文
    /// 不经过 `make_current` 直接替换调用线程的绑定。
    pub(crate) fn steal_current(&self) {
        self.make_producer_current();
    }

    pub(crate) fn reject_client_version(&self, version: EGLint) {
        self.state().rejected_versions.insert(version);
    }

    pub(crate) fn created_client_versions(&self) -> Vec<EGLint> {
        self.state().created_versions.clone()
    }

    pub(crate) fn fail_surface_creation(&self) {
        self.state().fail_surface_creation = true;
    }

    pub(crate) fn fail_next_swap(&self) {
        self.state().fail_next_swap = true;
    }

    pub(crate) fn set_surface_size(&self, width: u32, height: u32) {
        self.state().surface_size = PhysicalSize::new(width, height);
    }

    pub(crate) fn contexts_destroyed(&self) -> usize {
        self.state().contexts_destroyed
    }

    pub(crate) fn surfaces_destroyed(&self) -> usize {
        self.state().surfaces_destroyed
    }

    pub(crate) fn was_destroyed(&self, context: EglContext) -> bool {
        self.state().destroyed.contains(&context.as_raw())
    }

    pub(crate) fn make_current_calls(&self) -> usize {
        self.state().make_current_calls
    }

    pub(crate) fn swaps(&self) -> usize {
        self.state().swaps
    }

    /// ### English
    /// Makes every following `swap_buffers` block until `release_swaps`.
    ///
    /// ### 中文
    /// 让之后的每次 `swap_buffers` 阻塞，直到调用 `release_swaps`。
    pub(crate) fn hold_swaps(&self) {
        self.state().swaps_held = true;
    }

    pub(crate) fn release_swaps(&self) {
        self.state().swaps_held = false;
        self.changed.notify_all();
    }

    /// ### English
    /// Waits until at least `count` swaps have been entered (held or not).
    ///
    /// ### 中文
    /// 等待至少 `count` 次 swap 已进入（无论是否被卡住）。
    pub(crate) fn wait_for_swaps_entered(&self, count: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.swaps_entered >= count)
    }

    /// ### English
    /// Makes render-thread initialization block in `default_display` until `release_init`.
    ///
    /// ### 中文
    /// 让渲染线程的初始化阻塞在 `default_display`，直到调用 `release_init`。
    pub(crate) fn hold_init(&self) {
        self.state().init_held = true;
    }

    pub(crate) fn release_init(&self) {
        self.state().init_held = false;
        self.changed.notify_all();
    }

    pub(crate) fn wait_for_init_entered(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.init_entered > 0)
    }

    /// ### English
    /// Makes the next initialization panic, so the render thread exits without reporting.
    ///
    /// ### 中文
    /// 让下一次初始化 panic，使渲染线程未上报结果就退出。
    pub(crate) fn panic_during_init(&self) {
        self.state().panic_during_init = true;
    }

    /// ### English
    /// Simulates the native window going away: every surface becomes invalid and every
    /// thread loses its current binding.
    ///
    /// ### 中文
    /// 模拟原生窗口消失：所有 surface 失效，所有线程失去 current 绑定。
    pub(crate) fn lose_surfaces(&self) {
        let mut state = self.state();
        state.live_surfaces.clear();
        state.current.clear();
    }

    pub(crate) fn wait_for_surfaces_destroyed(&self, count: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.surfaces_destroyed >= count)
    }

    fn wait_until(&self, timeout: Duration, done: impl Fn(&FakeEglState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state();
        while !done(&state) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        true
    }
}

impl EglPlatform for FakeEgl {
    fn default_display(&self) -> Result<EglDisplay, RemoteDisplayError> {
        let mut state = self.state();
        state.init_entered += 1;
        self.changed.notify_all();
        while state.init_held {
            state = self.changed.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        let panic_now = std::mem::take(&mut state.panic_during_init);
        drop(state);
        if panic_now {
            panic!("injected initialization panic");
        }
        Ok(handle(DISPLAY, EglDisplay::from_raw))
    }

    fn choose_configs(&self, _display: EglDisplay, attribs: &[EGLint]) -> Option<Vec<EglConfig>> {
        let mut state = self.state();
        state.choose_config_calls += 1;
        let (base, configs) = if attribs.contains(&EGL_SAMPLE_BUFFERS) {
            (PREFERRED_CONFIG_BASE, &state.preferred)
        } else {
            (SIMPLE_CONFIG_BASE, &state.simple)
        };
        Some(
            (0..configs.len())
                .map(|i| handle(base + i, EglConfig::from_raw))
                .collect(),
        )
    }

    fn config_attrib(
        &self,
        _display: EglDisplay,
        config: EglConfig,
        attribute: EGLint,
    ) -> Option<EGLint> {
        let state = self.state();
        let raw = config.as_raw();
        let config = if raw >= SIMPLE_CONFIG_BASE {
            state.simple.get(raw - SIMPLE_CONFIG_BASE)
        } else {
            state.preferred.get(raw - PREFERRED_CONFIG_BASE)
        };
        config.and_then(|config| config.attrib(attribute))
    }

    fn create_context(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        share: ParentContext,
        attribs: &[EGLint],
    ) -> Option<EglContext> {
        let mut state = self.state();
        let version = attribs
            .chunks(2)
            .find(|pair| pair[0] == EGL_CONTEXT_CLIENT_VERSION)
            .and_then(|pair| pair.get(1).copied())
            .unwrap_or(1);

        if share.context().as_raw() != PRODUCER_CONTEXT {
            Self::set_error(&mut state, EGL_BAD_CONTEXT);
            return None;
        }
        if state.rejected_versions.contains(&version) {
            Self::set_error(&mut state, EGL_BAD_MATCH);
            return None;
        }

        let raw = state.next_context;
        state.next_context += 1;
        state.live_contexts.insert(raw);
        state.created_versions.push(version);
        EglContext::from_raw(raw)
    }

    fn create_window_surface(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        window: NativeWindow,
    ) -> Option<EglSurface> {
        let mut state = self.state();
        if state.fail_surface_creation || window.as_raw() != WINDOW {
            Self::set_error(&mut state, EGL_BAD_SURFACE);
            return None;
        }
        let raw = state.next_surface;
        state.next_surface += 1;
        state.live_surfaces.insert(raw);
        EglSurface::from_raw(raw)
    }

    fn make_current(
        &self,
        _display: EglDisplay,
        surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool {
        let mut state = self.state();
        state.make_current_calls += 1;

        if context.is_some_and(|c| !state.live_contexts.contains(&c.as_raw())) {
            Self::set_error(&mut state, EGL_BAD_CONTEXT);
            return false;
        }
        if surface.is_some_and(|s| !state.live_surfaces.contains(&s.as_raw())) {
            Self::set_error(&mut state, EGL_BAD_SURFACE);
            return false;
        }

        state.current.insert(thread::current().id(), (context, surface));
        true
    }

    fn current_context(&self) -> Option<EglContext> {
        self.state()
            .current
            .get(&thread::current().id())
            .and_then(|(context, _)| *context)
    }

    fn current_draw_surface(&self) -> Option<EglSurface> {
        self.state()
            .current
            .get(&thread::current().id())
            .and_then(|(_, surface)| *surface)
    }

    fn swap_buffers(&self, _display: EglDisplay, surface: EglSurface) -> bool {
        let mut state = self.state();
        state.swaps_entered += 1;
        self.changed.notify_all();
        while state.swaps_held {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }

        if state.fail_next_swap || !state.live_surfaces.contains(&surface.as_raw()) {
            state.fail_next_swap = false;
            Self::set_error(&mut state, EGL_BAD_SURFACE);
            return false;
        }
        state.swaps += 1;
        true
    }

    fn surface_size(&self, _display: EglDisplay, surface: EglSurface) -> Option<PhysicalSize<u32>> {
        let state = self.state();
        state
            .live_surfaces
            .contains(&surface.as_raw())
            .then_some(state.surface_size)
    }

    fn destroy_context(&self, _display: EglDisplay, context: EglContext) -> bool {
        let mut state = self.state();
        if !state.live_contexts.remove(&context.as_raw()) {
            Self::set_error(&mut state, EGL_BAD_CONTEXT);
            return false;
        }
        state.destroyed.insert(context.as_raw());
        state.contexts_destroyed += 1;
        true
    }

    fn destroy_surface(&self, _display: EglDisplay, surface: EglSurface) -> bool {
        let mut state = self.state();
        if !state.live_surfaces.remove(&surface.as_raw()) {
            Self::set_error(&mut state, EGL_BAD_SURFACE);
            return false;
        }
        state.surfaces_destroyed += 1;
        self.changed.notify_all();
        true
    }

    fn error(&self) -> EGLint {
        self.state()
            .errors
            .remove(&thread::current().id())
            .unwrap_or(EGL_SUCCESS)
    }

    fn load_gl(&self) -> Result<Box<dyn QuadGl>, RemoteDisplayError> {
        Ok(Box::new(FakeGl {
            state: self.gl.clone(),
        }))
    }
}

#[derive(Default)]
struct FakeGlInner {
    dialect: Option<ShaderDialect>,
    pending_errors: VecDeque<GLenum>,
    fail_next: HashMap<&'static str, GLenum>,
    fail_compile: Option<(GLenum, String)>,
    next_name: GLuint,
    shader_sources: Vec<String>,
    deleted_shaders: usize,
    deleted_programs: usize,
    deleted_buffers: usize,
    vertex_arrays_created: usize,
    vertex_arrays_deleted: usize,
    bound_textures: Vec<GLuint>,
    viewports: Vec<(GLint, GLint)>,
    draws: usize,
}

/// ### English
/// Shared, inspectable state behind every `FakeGl` handed out for one test.
///
/// ### 中文
/// 同一测试中所有 `FakeGl` 共享、可检查的状态。
#[derive(Default)]
pub(crate) struct FakeGlState {
    inner: Mutex<FakeGlInner>,
}

impl FakeGlState {
    fn inner(&self) -> MutexGuard<'_, FakeGlInner> {
        lock(&self.inner)
    }

    fn record(&self, op: &'static str) {
        let mut inner = self.inner();
        if let Some(error) = inner.fail_next.remove(op) {
            inner.pending_errors.push_back(error);
        }
    }

    fn next_name(&self) -> GLuint {
        let mut inner = self.inner();
        inner.next_name += 1;
        inner.next_name
    }

    pub(crate) fn fail_compile(&self, kind: GLenum, log: &str) {
        self.inner().fail_compile = Some((kind, log.to_string()));
    }

    /// ### English
    /// Raises `error` the next time the named `QuadGl` method runs.
    ///
    /// ### 中文
    /// 在下一次调用指定的 `QuadGl` 方法时产生 `error`。
    pub(crate) fn fail_next(&self, op: &'static str, error: GLenum) {
        self.inner().fail_next.insert(op, error);
    }

    pub(crate) fn shader_sources(&self) -> Vec<String> {
        self.inner().shader_sources.clone()
    }

    pub(crate) fn deleted_shaders(&self) -> usize {
        self.inner().deleted_shaders
    }

    pub(crate) fn deleted_programs(&self) -> usize {
        self.inner().deleted_programs
    }

    pub(crate) fn deleted_buffers(&self) -> usize {
        self.inner().deleted_buffers
    }

    pub(crate) fn vertex_arrays_created(&self) -> usize {
        self.inner().vertex_arrays_created
    }

    pub(crate) fn vertex_arrays_deleted(&self) -> usize {
        self.inner().vertex_arrays_deleted
    }

    pub(crate) fn bound_textures(&self) -> Vec<GLuint> {
        self.inner().bound_textures.clone()
    }

    pub(crate) fn viewports(&self) -> Vec<(GLint, GLint)> {
        self.inner().viewports.clone()
    }

    pub(crate) fn draws(&self) -> usize {
        self.inner().draws
    }
}

/// ### English
/// `QuadGl` double; GLES-flavoured unless built with another dialect.
///
/// ### 中文
/// `QuadGl` 替身；除非指定其他方言，否则为 GLES 风格。
pub(crate) struct FakeGl {
    state: Arc<FakeGlState>,
}

impl FakeGl {
    pub(crate) fn new() -> (Self, Arc<FakeGlState>) {
        Self::with_dialect(ShaderDialect::Gles100)
    }

    pub(crate) fn with_dialect(dialect: ShaderDialect) -> (Self, Arc<FakeGlState>) {
        let state = Arc::new(FakeGlState::default());
        state.inner().dialect = Some(dialect);
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl QuadGl for FakeGl {
    fn shader_dialect(&self) -> ShaderDialect {
        self.state.inner().dialect.unwrap_or(ShaderDialect::Gles100)
    }

    fn get_error(&self) -> GLenum {
        self.state
            .inner()
            .pending_errors
            .pop_front()
            .unwrap_or(GL_NO_ERROR)
    }

    fn compile_shader(&self, kind: GLenum, source: &str) -> Result<GLuint, String> {
        self.state.record("compile_shader");
        {
            let mut inner = self.state.inner();
            inner.shader_sources.push(source.to_string());
            if let Some((failing, log)) = &inner.fail_compile {
                if *failing == kind {
                    return Err(log.clone());
                }
            }
        }
        Ok(self.state.next_name())
    }

    fn delete_shader(&self, _shader: GLuint) {
        self.state.inner().deleted_shaders += 1;
    }

    fn link_program(&self, _vertex: GLuint, _fragment: GLuint) -> Result<GLuint, String> {
        self.state.record("link_program");
        Ok(self.state.next_name())
    }

    fn delete_program(&self, _program: GLuint) {
        self.state.inner().deleted_programs += 1;
    }

    fn use_program(&self, _program: GLuint) {
        self.state.record("use_program");
    }

    fn attrib_location(&self, _program: GLuint, name: &str) -> GLint {
        match name {
            "position" => 0,
            _ => 1,
        }
    }

    fn uniform_location(&self, _program: GLuint, _name: &str) -> GLint {
        0
    }

    fn upload_vertex_buffer(&self, _data: &[f32]) -> GLuint {
        self.state.record("upload_vertex_buffer");
        self.state.next_name()
    }

    fn delete_buffer(&self, _buffer: GLuint) {
        self.state.inner().deleted_buffers += 1;
    }

    fn create_vertex_array(&self) -> GLuint {
        self.state.record("create_vertex_array");
        self.state.inner().vertex_arrays_created += 1;
        self.state.next_name()
    }

    fn delete_vertex_array(&self, _vertex_array: GLuint) {
        self.state.inner().vertex_arrays_deleted += 1;
    }

    fn enable_vertex_attrib(&self, _location: GLuint) {
        self.state.record("enable_vertex_attrib");
    }

    fn vertex_attrib_pointer(
        &self,
        _location: GLuint,
        _components: GLint,
        _stride: GLint,
        _offset: u32,
    ) {
        self.state.record("vertex_attrib_pointer");
    }

    fn bind_texture_unit0(&self, texture: GLuint) {
        self.state.record("bind_texture_unit0");
        self.state.inner().bound_textures.push(texture);
    }

    fn set_linear_clamp_sampling(&self) {
        self.state.record("set_linear_clamp_sampling");
    }

    fn set_sampler_uniform(&self, _location: GLint, _unit: GLint) {
        self.state.record("set_sampler_uniform");
    }

    fn viewport(&self, width: GLint, height: GLint) {
        self.state.record("viewport");
        self.state.inner().viewports.push((width, height));
    }

    fn clear_color(&self, _rgba: [f32; 4]) {
        self.state.record("clear_color");
    }

    fn clear_color_buffer(&self) {
        self.state.record("clear_color_buffer");
    }

    fn draw_triangle_strip(&self, _vertex_count: GLint) {
        self.state.record("draw_triangle_strip");
        self.state.inner().draws += 1;
    }
}

/// ### English
/// Forwards every consumed texture id into a channel.
///
/// ### 中文
/// 把每个被消费的纹理 id 转发到通道。
pub(crate) struct RecordingFrames {
    sender: Sender<u32>,
}

impl RecordingFrames {
    pub(crate) fn new() -> (Arc<Self>, Receiver<u32>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Arc::new(Self { sender }), receiver)
    }
}

impl FrameConsumedListener for RecordingFrames {
    fn on_frame_consumed(&self, texture_id: u32) {
        let _ = self.sender.send(texture_id);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    Ready(u32, u32),
    Gone,
}

type GoneCheck = Box<dyn Fn() -> bool + Send>;

#[derive(Default)]
pub(crate) struct RecordingSession {
    events: Mutex<Vec<SessionEvent>>,
    gone_check: Mutex<Option<GoneCheck>>,
    gone_checks: Mutex<Vec<bool>>,
}

impl RecordingSession {
    pub(crate) fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    /// ### English
    /// Runs `check` inside every `on_remote_surface_gone` and records its result.
    ///
    /// ### 中文
    /// 在每次 `on_remote_surface_gone` 中运行 `check` 并记录结果。
    pub(crate) fn check_when_gone(&self, check: impl Fn() -> bool + Send + 'static) {
        *lock(&self.gone_check) = Some(Box::new(check));
    }

    pub(crate) fn gone_checks(&self) -> Vec<bool> {
        lock(&self.gone_checks).clone()
    }
}

impl SessionListener for RecordingSession {
    fn on_remote_surface_ready(&self, width: u32, height: u32) {
        lock(&self.events).push(SessionEvent::Ready(width, height));
    }

    fn on_remote_surface_gone(&self) {
        lock(&self.events).push(SessionEvent::Gone);
        if let Some(check) = lock(&self.gone_check).as_ref() {
            let passed = check();
            lock(&self.gone_checks).push(passed);
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingPresenter {
    messages: Mutex<Vec<String>>,
    reveals: Mutex<usize>,
}

impl RecordingPresenter {
    pub(crate) fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    pub(crate) fn reveals(&self) -> usize {
        *lock(&self.reveals)
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn set_error_message(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }

    fn reveal_error_banner(&self) {
        *lock(&self.reveals) += 1;
    }
}
