use std::cell::OnceCell;
use std::ffi::{c_char, c_void, CStr, CString};
use std::num::NonZeroU32;
use std::path::PathBuf;

use glow::HasContext;
use khronos_egl as egl;

use super::{ConfigRequest, Driver, DriverError, TexImage};
use crate::consts;
use crate::context::{GlObjectKind, Profile};

type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

/// Environment variable overriding the EGL library path.
pub const LIBRARY_ENV: &str = "UMBRA_EGL_LIBRARY";

const DEFAULT_LIBRARY: &str = "libEGL.so.1";

// EGL 1.5 / ANGLE attribute values not exposed by `khronos-egl` 1.4 bindings.
const OPENGL_ES3_BIT: egl::Int = 0x0040;
const CONTEXT_WEBGL_COMPATIBILITY_ANGLE: egl::Int = 0x33AC;
const CONTEXT_OPENGL_BACKWARDS_COMPATIBLE_ANGLE: egl::Int = 0x3483;
const ROBUST_RESOURCE_INITIALIZATION_ANGLE: egl::Int = 0x3453;
const EGL_TRUE: egl::Int = 1;
const EGL_FALSE: egl::Int = 0;

// ANGLE-only GLES entry points `glow` does not cover.
type GetStringFn = unsafe extern "system" fn(name: u32) -> *const u8;
type RequestExtensionFn = unsafe extern "system" fn(name: *const c_char);

/// Where to find the EGL library.
#[derive(Debug, Clone, Default)]
pub struct EglConfig {
    /// Path or soname of the EGL library. `None` uses `libEGL.so.1`.
    pub library: Option<PathBuf>,
}

impl EglConfig {
    /// Reads [`LIBRARY_ENV`]; unset falls back to the default library.
    pub fn from_env() -> Self {
        Self {
            library: std::env::var_os(LIBRARY_ENV).map(PathBuf::from),
        }
    }
}

struct Loaded {
    egl: EglInstance,
    /// Built on the first successful bind; glow reads `GL_VERSION` on
    /// construction, which needs a current context.
    gl: OnceCell<glow::Context>,
    get_string: Option<GetStringFn>,
    request_extension: Option<RequestExtensionFn>,
}

/// [`Driver`] backed by a dynamically loaded EGL library.
///
/// Works with any EGL implementation; ANGLE-specific context attributes and
/// requestable extensions are used only when the driver advertises them.
pub struct EglDriver {
    config: EglConfig,
    loaded: Option<Loaded>,
}

impl EglDriver {
    /// Creates an unloaded driver; nothing is resolved until the first context.
    pub fn new(config: EglConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    fn loaded(&self, call: &'static str) -> Result<&Loaded, DriverError> {
        self.loaded
            .as_ref()
            .ok_or_else(|| DriverError::call(call, "driver not loaded"))
    }

    fn current_gl(&self, call: &'static str) -> Result<&glow::Context, DriverError> {
        self.gl()
            .ok_or_else(|| DriverError::call(call, "no context has been made current"))
    }

    fn display_has_extension(&self, display: egl::Display, name: &str) -> bool {
        let Some(loaded) = self.loaded.as_ref() else {
            return false;
        };
        loaded
            .egl
            .query_string(Some(display), egl::EXTENSIONS)
            .map(|s| s.to_string_lossy().split_whitespace().any(|e| e == name))
            .unwrap_or(false)
    }

    fn gl_string(&self, name: u32) -> Option<String> {
        let get_string = self.loaded.as_ref()?.get_string?;
        // SAFETY: resolved from the driver with the glGetString signature.
        let ptr = unsafe { get_string(name) };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: glGetString returns a static NUL-terminated string.
        let s = unsafe { CStr::from_ptr(ptr.cast()) };
        Some(s.to_string_lossy().into_owned())
    }
}

impl Default for EglDriver {
    fn default() -> Self {
        Self::new(EglConfig::from_env())
    }
}

impl Driver for EglDriver {
    type Display = egl::Display;
    type Config = egl::Config;
    type Surface = egl::Surface;
    type Context = egl::Context;
    type Gl = glow::Context;

    fn load(&mut self) -> Result<(), DriverError> {
        if self.loaded.is_some() {
            return Ok(());
        }

        let library = self
            .config
            .library
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY));

        // SAFETY: loading a shared library runs its initializers; EGL
        // implementations are expected to tolerate that.
        let egl = unsafe { EglInstance::load_required_from_filename(&library) }
            .map_err(|e| DriverError::Load(format!("{}: {e:?}", library.display())))?;

        let get_string = egl.get_proc_address("glGetString").map(|f| unsafe {
            std::mem::transmute::<extern "system" fn(), GetStringFn>(f)
        });
        let request_extension = egl
            .get_proc_address("glRequestExtensionANGLE")
            .map(|f| unsafe { std::mem::transmute::<extern "system" fn(), RequestExtensionFn>(f) });

        log::info!("loaded EGL from {}", library.display());

        self.loaded = Some(Loaded {
            egl,
            gl: OnceCell::new(),
            get_string,
            request_extension,
        });
        Ok(())
    }

    fn default_display(&self) -> Result<egl::Display, DriverError> {
        let loaded = self.loaded("eglGetDisplay")?;
        // SAFETY: EGL_DEFAULT_DISPLAY is always a valid native display id.
        unsafe { loaded.egl.get_display(egl::DEFAULT_DISPLAY) }
            .ok_or_else(|| DriverError::call("eglGetDisplay", "EGL_NO_DISPLAY"))
    }

    fn initialize(&self, display: egl::Display) -> Result<(), DriverError> {
        let loaded = self.loaded("eglInitialize")?;
        let (major, minor) = loaded
            .egl
            .initialize(display)
            .map_err(|e| DriverError::call("eglInitialize", e))?;
        loaded
            .egl
            .bind_api(egl::OPENGL_ES_API)
            .map_err(|e| DriverError::call("eglBindAPI", e))?;
        log::debug!("EGL {major}.{minor} initialized");
        Ok(())
    }

    fn terminate(&self, display: egl::Display) {
        if let Some(loaded) = self.loaded.as_ref() {
            if let Err(e) = loaded.egl.terminate(display) {
                log::warn!("eglTerminate failed: {e}");
            }
        }
    }

    fn choose_config(
        &self,
        display: egl::Display,
        request: &ConfigRequest,
    ) -> Result<egl::Config, DriverError> {
        let loaded = self.loaded("eglChooseConfig")?;
        let renderable = match request.profile {
            Profile::WebGl1 => egl::OPENGL_ES2_BIT,
            Profile::WebGl2 => OPENGL_ES3_BIT,
        };
        let attribs = [
            egl::SURFACE_TYPE,
            egl::PBUFFER_BIT,
            egl::RED_SIZE,
            egl::Int::from(request.red),
            egl::GREEN_SIZE,
            egl::Int::from(request.green),
            egl::BLUE_SIZE,
            egl::Int::from(request.blue),
            egl::ALPHA_SIZE,
            egl::Int::from(request.alpha),
            egl::DEPTH_SIZE,
            egl::Int::from(request.depth),
            egl::STENCIL_SIZE,
            egl::Int::from(request.stencil),
            egl::RENDERABLE_TYPE,
            renderable,
            egl::NONE,
        ];
        loaded
            .egl
            .choose_first_config(display, &attribs)
            .map_err(|e| DriverError::call("eglChooseConfig", e))?
            .ok_or_else(|| DriverError::call("eglChooseConfig", "no matching config"))
    }

    fn create_context(
        &self,
        display: egl::Display,
        config: egl::Config,
        profile: Profile,
    ) -> Result<egl::Context, DriverError> {
        let loaded = self.loaded("eglCreateContext")?;
        let mut attribs = vec![egl::CONTEXT_CLIENT_VERSION, profile.client_version()];
        if self.display_has_extension(display, "EGL_ANGLE_create_context_webgl_compatibility") {
            attribs.extend([CONTEXT_WEBGL_COMPATIBILITY_ANGLE, EGL_TRUE]);
        }
        if self.display_has_extension(display, "EGL_ANGLE_create_context_backwards_compatible") {
            attribs.extend([CONTEXT_OPENGL_BACKWARDS_COMPATIBLE_ANGLE, EGL_FALSE]);
        }
        if self.display_has_extension(display, "EGL_ANGLE_robust_resource_initialization") {
            attribs.extend([ROBUST_RESOURCE_INITIALIZATION_ANGLE, EGL_TRUE]);
        }
        attribs.push(egl::NONE);

        loaded
            .egl
            .create_context(display, config, None, &attribs)
            .map_err(|e| DriverError::call("eglCreateContext", e))
    }

    fn create_pbuffer_surface(
        &self,
        display: egl::Display,
        config: egl::Config,
        width: u32,
        height: u32,
    ) -> Result<egl::Surface, DriverError> {
        let loaded = self.loaded("eglCreatePbufferSurface")?;
        let width = egl::Int::try_from(width)
            .map_err(|_| DriverError::call("eglCreatePbufferSurface", "width out of range"))?;
        let height = egl::Int::try_from(height)
            .map_err(|_| DriverError::call("eglCreatePbufferSurface", "height out of range"))?;
        let attribs = [egl::WIDTH, width, egl::HEIGHT, height, egl::NONE];
        loaded
            .egl
            .create_pbuffer_surface(display, config, &attribs)
            .map_err(|e| DriverError::call("eglCreatePbufferSurface", e))
    }

    fn destroy_surface(&self, display: egl::Display, surface: egl::Surface) {
        if let Some(loaded) = self.loaded.as_ref() {
            if let Err(e) = loaded.egl.destroy_surface(display, surface) {
                log::warn!("eglDestroySurface failed: {e}");
            }
        }
    }

    fn destroy_context(&self, display: egl::Display, context: egl::Context) {
        if let Some(loaded) = self.loaded.as_ref() {
            if let Err(e) = loaded.egl.destroy_context(display, context) {
                log::warn!("eglDestroyContext failed: {e}");
            }
        }
    }

    fn make_current(
        &self,
        display: egl::Display,
        target: Option<(egl::Surface, egl::Context)>,
    ) -> Result<(), DriverError> {
        let loaded = self.loaded("eglMakeCurrent")?;
        let (surface, context) = match target {
            Some((s, c)) => (Some(s), Some(c)),
            None => (None, None),
        };
        loaded
            .egl
            .make_current(display, surface, surface, context)
            .map_err(|e| DriverError::call("eglMakeCurrent", e))?;

        if context.is_some() {
            loaded.gl.get_or_init(|| {
                let proc_address = |name: &str| -> *const c_void {
                    loaded
                        .egl
                        .get_proc_address(name)
                        .map_or(std::ptr::null(), |f| f as *const c_void)
                };
                // SAFETY: a context is current, and every pointer comes from
                // eglGetProcAddress for the named symbol.
                let gl = unsafe { glow::Context::from_loader_function(proc_address) };
                log::debug!("GL entry points resolved: {:?}", gl.version());
                gl
            });
        }
        Ok(())
    }

    fn gl(&self) -> Option<&glow::Context> {
        self.loaded.as_ref()?.gl.get()
    }

    fn extensions(&self) -> Option<String> {
        self.gl_string(consts::EXTENSIONS)
    }

    fn requestable_extensions(&self) -> Option<String> {
        // Querying the ANGLE enum on other drivers would queue INVALID_ENUM.
        let enabled = self.extensions()?;
        if !enabled.split_whitespace().any(|e| e == "GL_ANGLE_request_extension") {
            return None;
        }
        self.gl_string(consts::REQUESTABLE_EXTENSIONS_ANGLE)
    }

    fn request_extension(&self, name: &str) -> Result<(), DriverError> {
        let request = self
            .loaded("glRequestExtensionANGLE")?
            .request_extension
            .ok_or_else(|| DriverError::call("glRequestExtensionANGLE", "entry point unavailable"))?;
        let name = CString::new(name).map_err(|e| DriverError::call("glRequestExtensionANGLE", e))?;
        // SAFETY: resolved with the glRequestExtensionANGLE signature; `name`
        // outlives the call.
        unsafe { request(name.as_ptr()) };
        Ok(())
    }

    fn get_error(&self) -> u32 {
        match self.gl() {
            // SAFETY: plain query on the current context.
            Some(gl) => unsafe { gl.get_error() },
            None => consts::NO_ERROR,
        }
    }

    fn pixel_store_i(&self, pname: u32, param: i32) {
        if let Some(gl) = self.gl() {
            // SAFETY: the driver validates pname/param and reports through glGetError.
            unsafe { gl.pixel_store_i32(pname, param) };
        }
    }

    fn create_object(&self, kind: GlObjectKind) -> Result<u32, DriverError> {
        let gl = self.current_gl(kind.create_call())?;
        // SAFETY: object creation only touches the current context.
        let created = unsafe {
            match kind {
                GlObjectKind::Buffer => gl.create_buffer().map(|o| o.0),
                GlObjectKind::Framebuffer => gl.create_framebuffer().map(|o| o.0),
                GlObjectKind::Program => gl.create_program().map(|o| o.0),
                GlObjectKind::Renderbuffer => gl.create_renderbuffer().map(|o| o.0),
                GlObjectKind::Texture => gl.create_texture().map(|o| o.0),
                GlObjectKind::VertexArray => gl.create_vertex_array().map(|o| o.0),
                GlObjectKind::Shader => {
                    return Err(DriverError::call("glCreateShader", "shader type required"));
                }
            }
        };
        created
            .map(NonZeroU32::get)
            .map_err(|e| DriverError::call(kind.create_call(), e))
    }

    fn create_shader(&self, shader_type: u32) -> Result<u32, DriverError> {
        let gl = self.current_gl("glCreateShader")?;
        // SAFETY: the driver validates shader_type.
        unsafe { gl.create_shader(shader_type) }
            .map(|o| o.0.get())
            .map_err(|e| DriverError::call("glCreateShader", e))
    }

    fn delete_object(&self, kind: GlObjectKind, id: u32) {
        let (Some(gl), Some(name)) = (self.gl(), NonZeroU32::new(id)) else {
            return;
        };
        // SAFETY: deleting an unknown name is a no-op in GL.
        unsafe {
            match kind {
                GlObjectKind::Buffer => gl.delete_buffer(glow::NativeBuffer(name)),
                GlObjectKind::Framebuffer => gl.delete_framebuffer(glow::NativeFramebuffer(name)),
                GlObjectKind::Program => gl.delete_program(glow::NativeProgram(name)),
                GlObjectKind::Renderbuffer => {
                    gl.delete_renderbuffer(glow::NativeRenderbuffer(name))
                }
                GlObjectKind::Shader => gl.delete_shader(glow::NativeShader(name)),
                GlObjectKind::Texture => gl.delete_texture(glow::NativeTexture(name)),
                GlObjectKind::VertexArray => gl.delete_vertex_array(glow::NativeVertexArray(name)),
            }
        }
    }

    fn tex_image_2d(&self, image: &TexImage, pixels: Option<&[u8]>) -> Result<(), DriverError> {
        let gl = self.current_gl("glTexImage2D")?;
        let (width, height) = gl_size(image, "glTexImage2D")?;
        // SAFETY: `pixels` was sized by the unpacker for these dimensions.
        unsafe {
            gl.tex_image_2d(
                image.target,
                image.level,
                image.internal_format,
                width,
                height,
                0,
                image.format,
                image.ty,
                glow::PixelUnpackData::Slice(pixels),
            );
        }
        Ok(())
    }

    fn tex_sub_image_2d(&self, image: &TexImage, pixels: &[u8]) -> Result<(), DriverError> {
        let gl = self.current_gl("glTexSubImage2D")?;
        let (width, height) = gl_size(image, "glTexSubImage2D")?;
        // SAFETY: as above.
        unsafe {
            gl.tex_sub_image_2d(
                image.target,
                image.level,
                image.x_offset,
                image.y_offset,
                width,
                height,
                image.format,
                image.ty,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
        Ok(())
    }
}

/// Image dimensions as GL `GLsizei`s.
fn gl_size(image: &TexImage, call: &'static str) -> Result<(i32, i32), DriverError> {
    let width = i32::try_from(image.width).map_err(|_| DriverError::call(call, "width out of range"))?;
    let height =
        i32::try_from(image.height).map_err(|_| DriverError::call(call, "height out of range"))?;
    Ok((width, height))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextAttributes, ContextState};
    use crate::session::Session;

    fn image(width: u32, height: u32) -> TexImage {
        TexImage {
            target: consts::TEXTURE_2D,
            level: 0,
            internal_format: consts::RGBA as i32,
            x_offset: 0,
            y_offset: 0,
            width,
            height,
            format: consts::RGBA,
            ty: consts::UNSIGNED_BYTE,
        }
    }

    /// A driver with a usable display, or `None` when the host has no EGL.
    ///
    /// The default display is process-wide, so only one test may use it.
    fn system_driver() -> Option<EglDriver> {
        let mut driver = EglDriver::new(EglConfig::from_env());
        if let Err(e) = driver.load() {
            eprintln!("skipping: {e}");
            return None;
        }
        let display = driver.default_display().ok()?;
        if let Err(e) = driver.initialize(display) {
            eprintln!("skipping: {e}");
            return None;
        }
        driver.terminate(display);
        Some(driver)
    }

    // ── sizes ─────────────────────────────────────────────────────────────

    #[test]
    fn oversized_images_are_rejected() {
        assert_eq!(gl_size(&image(4, 2), "glTexImage2D").unwrap(), (4, 2));
        assert!(gl_size(&image(u32::MAX, 1), "glTexImage2D").is_err());
        assert!(gl_size(&image(1, i32::MAX as u32 + 1), "glTexSubImage2D").is_err());
    }

    // ── unloaded driver ───────────────────────────────────────────────────

    #[test]
    fn unloaded_driver_has_no_gl() {
        let driver = EglDriver::new(EglConfig::default());
        assert!(driver.gl().is_none());
        assert!(driver.extensions().is_none());
        assert!(driver.create_object(GlObjectKind::Texture).is_err());
        assert!(driver.tex_image_2d(&image(1, 1), None).is_err());
        assert_eq!(driver.get_error(), consts::NO_ERROR);
    }

    #[test]
    fn missing_library_fails_construction() {
        let driver = EglDriver::new(EglConfig {
            library: Some(PathBuf::from("/nonexistent/libEGL.so")),
        });
        let mut session = Session::new(driver);
        let id = session.create_context(ContextAttributes::sized(8, 8));

        let context = session.context(id).unwrap();
        assert_eq!(context.state(), ContextState::Error);
        assert!(context.error_message().unwrap().starts_with("error opening driver library"));
    }

    // ── system driver ─────────────────────────────────────────────────────

    #[test]
    fn full_lifecycle_on_system_driver() {
        let Some(driver) = system_driver() else {
            return;
        };
        assert!(driver.gl().is_none());
        let mut session = Session::new(driver);

        let id = session.create_context(ContextAttributes::sized(16, 16));
        let context = session.context(id).unwrap();
        if !context.is_ready() {
            eprintln!("skipping: {:?}", context.error_message());
            return;
        }
        assert!(context.extensions().is_supported("STACKGL_destroy_context"));
        assert!(session.driver().gl().is_some());

        {
            let mut current = session.activate(id).unwrap();
            let texture = current.create_texture().unwrap();
            assert_ne!(texture, 0);
            current.create_shader(consts::FRAGMENT_SHADER).unwrap();
            current
                .tex_image_2d(&image(2, 2), Some(&[0xff; 16]))
                .unwrap();
            assert_eq!(current.context().objects().len(), 2);
        }

        session.resize(id, 32, 8).unwrap();
        assert_eq!(session.context(id).unwrap().size(), (32, 8));

        session.dispose(id);
        session.dispose(id);
        assert_eq!(session.context(id).unwrap().state(), ContextState::Destroyed);

        session.cleanup();
        assert!(!session.has_display());
    }
}
