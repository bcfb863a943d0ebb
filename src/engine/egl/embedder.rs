//! ### English
//! EGL implementation backed by an embedder-provided function table.
//!
//! The host process already links EGL (it renders the local view with it), so instead of
//! looking symbols up by library name we take the entry points from the embedder.
//!
//! ### 中文
//! 基于宿主提供的函数表的 EGL 实现。
//!
//! 宿主进程本身已链接 EGL（本地视图即用它渲染），因此不按库名查找符号，
//! 而是直接使用宿主提供的函数入口。

use std::ffi::{CStr, CString, c_char, c_void};
use std::sync::OnceLock;

use dpi::PhysicalSize;

use super::{
    EGL_DRAW, EGL_HEIGHT, EGL_SUCCESS, EGL_WIDTH, EGLint, EglConfig, EglContext, EglDisplay,
    EglPlatform, EglSurface, NativeWindow, ParentContext,
};
use crate::engine::error::RemoteDisplayError;
use crate::engine::rendering::{self, QuadGl};

type EGLBoolean = u32;
type RawHandle = *mut c_void;

type EglGetDisplay = unsafe extern "C" fn(RawHandle) -> RawHandle;
type EglInitialize = unsafe extern "C" fn(RawHandle, *mut EGLint, *mut EGLint) -> EGLBoolean;
type EglChooseConfig = unsafe extern "C" fn(
    RawHandle,
    *const EGLint,
    *mut RawHandle,
    EGLint,
    *mut EGLint,
) -> EGLBoolean;
type EglGetConfigAttrib =
    unsafe extern "C" fn(RawHandle, RawHandle, EGLint, *mut EGLint) -> EGLBoolean;
type EglCreateContext =
    unsafe extern "C" fn(RawHandle, RawHandle, RawHandle, *const EGLint) -> RawHandle;
type EglCreateWindowSurface =
    unsafe extern "C" fn(RawHandle, RawHandle, RawHandle, *const EGLint) -> RawHandle;
type EglMakeCurrent =
    unsafe extern "C" fn(RawHandle, RawHandle, RawHandle, RawHandle) -> EGLBoolean;
type EglGetCurrentContext = unsafe extern "C" fn() -> RawHandle;
type EglGetCurrentSurface = unsafe extern "C" fn(EGLint) -> RawHandle;
type EglSwapBuffers = unsafe extern "C" fn(RawHandle, RawHandle) -> EGLBoolean;
type EglQuerySurface =
    unsafe extern "C" fn(RawHandle, RawHandle, EGLint, *mut EGLint) -> EGLBoolean;
type EglDestroyContext = unsafe extern "C" fn(RawHandle, RawHandle) -> EGLBoolean;
type EglDestroySurface = unsafe extern "C" fn(RawHandle, RawHandle) -> EGLBoolean;
type EglGetError = unsafe extern "C" fn() -> EGLint;
type EglGetProcAddress = unsafe extern "C" fn(*const c_char) -> *const c_void;

#[repr(C)]
#[derive(Clone, Copy, Default)]
/// ### English
/// Function pointer table for the EGL symbols used by this crate, provided by the embedder.
///
/// All fields are raw addresses (`usize`) and must be non-zero when installing.
///
/// ### 中文
/// 由宿主提供的、本 crate 所需 EGL 符号的函数指针表。
///
/// 所有字段都是原始地址（`usize`），安装时必须全部为非 0。
pub struct EmbedderEglApi {
    pub egl_get_display: usize,
    pub egl_initialize: usize,
    pub egl_choose_config: usize,
    pub egl_get_config_attrib: usize,
    pub egl_create_context: usize,
    pub egl_create_window_surface: usize,
    pub egl_make_current: usize,
    pub egl_get_current_context: usize,
    pub egl_get_current_surface: usize,
    pub egl_swap_buffers: usize,
    pub egl_query_surface: usize,
    pub egl_destroy_context: usize,
    pub egl_destroy_surface: usize,
    pub egl_get_error: usize,
    pub egl_get_proc_address: usize,
}

struct EglApi {
    get_display: EglGetDisplay,
    initialize: EglInitialize,
    choose_config: EglChooseConfig,
    get_config_attrib: EglGetConfigAttrib,
    create_context: EglCreateContext,
    create_window_surface: EglCreateWindowSurface,
    make_current: EglMakeCurrent,
    get_current_context: EglGetCurrentContext,
    get_current_surface: EglGetCurrentSurface,
    swap_buffers: EglSwapBuffers,
    query_surface: EglQuerySurface,
    destroy_context: EglDestroyContext,
    destroy_surface: EglDestroySurface,
    get_error: EglGetError,
    get_proc_address: EglGetProcAddress,
}

static EMBEDDER_EGL_API: OnceLock<EglApi> = OnceLock::new();

/// ### English
/// Reinterprets a non-zero raw address as a function pointer.
///
/// # Safety
/// `addr` must be the address of a function with signature `T`.
///
/// ### 中文
/// 将非 0 原始地址重新解释为函数指针。
///
/// # Safety
/// `addr` 必须是签名为 `T` 的函数地址。
unsafe fn fn_from_addr<T: Copy>(addr: usize, name: &'static str) -> Result<T, RemoteDisplayError> {
    if addr == 0 {
        return Err(RemoteDisplayError::NullEntryPoint(name));
    }
    Ok(unsafe { std::mem::transmute_copy(&addr) })
}

/// ### English
/// Installs the embedder-provided EGL function table for this process.
///
/// This is a one-time installation backed by `OnceLock`; repeated calls return an error.
///
/// #### Parameters
/// - `api`: Embedder function pointer table for required EGL symbols.
///
/// ### 中文
/// 为当前进程安装宿主提供的 EGL 函数表。
///
/// 该安装由 `OnceLock` 保证只执行一次；重复调用会返回错误。
///
/// #### 参数
/// - `api`：宿主提供的 EGL 必需符号函数指针表。
pub fn install_embedder_egl_api(api: EmbedderEglApi) -> Result<(), RemoteDisplayError> {
    if EMBEDDER_EGL_API.get().is_some() {
        return Err(RemoteDisplayError::ApiAlreadyInstalled);
    }

    let loaded = unsafe {
        EglApi {
            get_display: fn_from_addr(api.egl_get_display, "egl_get_display")?,
            initialize: fn_from_addr(api.egl_initialize, "egl_initialize")?,
            choose_config: fn_from_addr(api.egl_choose_config, "egl_choose_config")?,
            get_config_attrib: fn_from_addr(api.egl_get_config_attrib, "egl_get_config_attrib")?,
            create_context: fn_from_addr(api.egl_create_context, "egl_create_context")?,
            create_window_surface: fn_from_addr(
                api.egl_create_window_surface,
                "egl_create_window_surface",
            )?,
            make_current: fn_from_addr(api.egl_make_current, "egl_make_current")?,
            get_current_context: fn_from_addr(
                api.egl_get_current_context,
                "egl_get_current_context",
            )?,
            get_current_surface: fn_from_addr(
                api.egl_get_current_surface,
                "egl_get_current_surface",
            )?,
            swap_buffers: fn_from_addr(api.egl_swap_buffers, "egl_swap_buffers")?,
            query_surface: fn_from_addr(api.egl_query_surface, "egl_query_surface")?,
            destroy_context: fn_from_addr(api.egl_destroy_context, "egl_destroy_context")?,
            destroy_surface: fn_from_addr(api.egl_destroy_surface, "egl_destroy_surface")?,
            get_error: fn_from_addr(api.egl_get_error, "egl_get_error")?,
            get_proc_address: fn_from_addr(api.egl_get_proc_address, "egl_get_proc_address")?,
        }
    };

    EMBEDDER_EGL_API
        .set(loaded)
        .map_err(|_| RemoteDisplayError::ApiAlreadyInstalled)
}

#[inline]
fn raw(handle: Option<usize>) -> RawHandle {
    handle.unwrap_or(0) as RawHandle
}

/// ### English
/// `EglPlatform` backed by the installed embedder table.
///
/// ### 中文
/// 基于已安装宿主函数表的 `EglPlatform`。
pub struct EmbedderEgl {
    api: &'static EglApi,
}

impl EmbedderEgl {
    /// ### English
    /// Returns the platform, or an error if `install_embedder_egl_api` has not run yet.
    ///
    /// ### 中文
    /// 返回平台实现；若尚未调用 `install_embedder_egl_api` 则返回错误。
    pub fn installed() -> Result<Self, RemoteDisplayError> {
        EMBEDDER_EGL_API
            .get()
            .map(|api| Self { api })
            .ok_or(RemoteDisplayError::ApiNotInstalled)
    }
}

impl EglPlatform for EmbedderEgl {
    fn default_display(&self) -> Result<EglDisplay, RemoteDisplayError> {
        let display = unsafe { (self.api.get_display)(std::ptr::null_mut()) };
        let display = EglDisplay::from_raw(display as usize)
            .ok_or_else(|| RemoteDisplayError::NoDisplay(self.error()))?;

        let mut major = 0;
        let mut minor = 0;
        let ok = unsafe {
            (self.api.initialize)(raw(Some(display.as_raw())), &mut major, &mut minor)
        };
        if ok == 0 {
            return Err(RemoteDisplayError::DisplayInitialization(self.error()));
        }
        tracing::debug!(major, minor, "EGL display initialized");
        Ok(display)
    }

    fn choose_configs(&self, display: EglDisplay, attribs: &[EGLint]) -> Option<Vec<EglConfig>> {
        let display = raw(Some(display.as_raw()));
        let mut count: EGLint = 0;
        let ok = unsafe {
            (self.api.choose_config)(display, attribs.as_ptr(), std::ptr::null_mut(), 0, &mut count)
        };
        if ok == 0 {
            return None;
        }
        if count <= 0 {
            return Some(Vec::new());
        }

        let mut configs: Vec<RawHandle> = vec![std::ptr::null_mut(); count as usize];
        let ok = unsafe {
            (self.api.choose_config)(
                display,
                attribs.as_ptr(),
                configs.as_mut_ptr(),
                count,
                &mut count,
            )
        };
        if ok == 0 {
            return None;
        }
        configs.truncate(count.max(0) as usize);

        Some(
            configs
                .into_iter()
                .filter_map(|config| EglConfig::from_raw(config as usize))
                .collect(),
        )
    }

    fn config_attrib(
        &self,
        display: EglDisplay,
        config: EglConfig,
        attribute: EGLint,
    ) -> Option<EGLint> {
        let mut value: EGLint = 0;
        let ok = unsafe {
            (self.api.get_config_attrib)(
                raw(Some(display.as_raw())),
                raw(Some(config.as_raw())),
                attribute,
                &mut value,
            )
        };
        (ok != 0).then_some(value)
    }

    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        share: ParentContext,
        attribs: &[EGLint],
    ) -> Option<EglContext> {
        let context = unsafe {
            (self.api.create_context)(
                raw(Some(display.as_raw())),
                raw(Some(config.as_raw())),
                raw(Some(share.context().as_raw())),
                attribs.as_ptr(),
            )
        };
        EglContext::from_raw(context as usize)
    }

    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: NativeWindow,
    ) -> Option<EglSurface> {
        const SURFACE_ATTRIBS: [EGLint; 1] = [super::EGL_NONE];
        let surface = unsafe {
            (self.api.create_window_surface)(
                raw(Some(display.as_raw())),
                raw(Some(config.as_raw())),
                raw(Some(window.as_raw())),
                SURFACE_ATTRIBS.as_ptr(),
            )
        };
        EglSurface::from_raw(surface as usize)
    }

    fn make_current(
        &self,
        display: EglDisplay,
        surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool {
        let surface = raw(surface.map(EglSurface::as_raw));
        let context = raw(context.map(EglContext::as_raw));
        let display = raw(Some(display.as_raw()));
        unsafe { (self.api.make_current)(display, surface, surface, context) != 0 }
    }

    fn current_context(&self) -> Option<EglContext> {
        EglContext::from_raw(unsafe { (self.api.get_current_context)() } as usize)
    }

    fn current_draw_surface(&self) -> Option<EglSurface> {
        EglSurface::from_raw(unsafe { (self.api.get_current_surface)(EGL_DRAW) } as usize)
    }

    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool {
        unsafe {
            (self.api.swap_buffers)(raw(Some(display.as_raw())), raw(Some(surface.as_raw()))) != 0
        }
    }

    fn surface_size(&self, display: EglDisplay, surface: EglSurface) -> Option<PhysicalSize<u32>> {
        let display = raw(Some(display.as_raw()));
        let surface = raw(Some(surface.as_raw()));
        let mut width: EGLint = 0;
        let mut height: EGLint = 0;
        let ok = unsafe {
            (self.api.query_surface)(display, surface, EGL_WIDTH, &mut width) != 0
                && (self.api.query_surface)(display, surface, EGL_HEIGHT, &mut height) != 0
        };
        (ok && width > 0 && height > 0).then(|| PhysicalSize::new(width as u32, height as u32))
    }

    fn destroy_context(&self, display: EglDisplay, context: EglContext) -> bool {
        unsafe {
            (self.api.destroy_context)(raw(Some(display.as_raw())), raw(Some(context.as_raw())))
                != 0
        }
    }

    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) -> bool {
        unsafe {
            (self.api.destroy_surface)(raw(Some(display.as_raw())), raw(Some(surface.as_raw())))
                != 0
        }
    }

    fn error(&self) -> EGLint {
        let error = unsafe { (self.api.get_error)() };
        if error == 0 { EGL_SUCCESS } else { error }
    }

    fn load_gl(&self) -> Result<Box<dyn QuadGl>, RemoteDisplayError> {
        let get_proc_address = self.api.get_proc_address;
        Ok(rendering::load_quad_gl(|name: &str| {
            let Ok(cstr) = CString::new(name) else {
                return std::ptr::null();
            };
            proc_address(get_proc_address, cstr.as_c_str())
        }))
    }
}

#[inline]
fn proc_address(get_proc_address: EglGetProcAddress, name: &CStr) -> *const c_void {
    unsafe { get_proc_address(name.as_ptr()) }
}
