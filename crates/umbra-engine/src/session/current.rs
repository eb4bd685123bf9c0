use crate::consts;
use crate::context::{
    unpack_pixels, Context, ContextId, ContextState, GlObjectKind, UnpackError,
};
use crate::driver::{Driver, TexImage};
use crate::error::ContextError;

/// Proof that a context is the one bound to the driver.
///
/// Obtained from [`Session::activate`](super::Session::activate); every
/// operation that reaches driver state goes through it. The guard borrows the
/// session, so no other context can be activated while it is alive.
pub struct Current<'s, D: Driver> {
    id: ContextId,
    driver: &'s D,
    display: D::Display,
    gl: &'s D::Gl,
    context: &'s mut Context<D>,
}

impl<'s, D: Driver> Current<'s, D> {
    pub(super) fn new(
        id: ContextId,
        driver: &'s D,
        display: D::Display,
        gl: &'s D::Gl,
        context: &'s mut Context<D>,
    ) -> Self {
        Self {
            id,
            driver,
            display,
            gl,
            context,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The driver's GL entry points, for pass-through calls.
    pub fn gl(&self) -> &'s D::Gl {
        self.gl
    }

    pub(crate) fn driver(&self) -> &'s D {
        self.driver
    }

    pub fn context(&self) -> &Context<D> {
        self.context
    }

    // ── object registry ───────────────────────────────────────────────────

    pub fn register_object(&mut self, kind: GlObjectKind, id: u32) {
        self.context.register_object(kind, id);
    }

    pub fn unregister_object(&mut self, kind: GlObjectKind, id: u32) {
        self.context.unregister_object(kind, id);
    }

    /// Allocates a non-shader object and registers it.
    pub fn create_object(&mut self, kind: GlObjectKind) -> Result<u32, ContextError> {
        let id = self.driver.create_object(kind)?;
        self.context.register_object(kind, id);
        Ok(id)
    }

    pub fn create_buffer(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::Buffer)
    }

    pub fn create_framebuffer(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::Framebuffer)
    }

    pub fn create_program(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::Program)
    }

    pub fn create_renderbuffer(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::Renderbuffer)
    }

    pub fn create_texture(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::Texture)
    }

    pub fn create_vertex_array(&mut self) -> Result<u32, ContextError> {
        self.create_object(GlObjectKind::VertexArray)
    }

    pub fn create_shader(&mut self, shader_type: u32) -> Result<u32, ContextError> {
        let id = self.driver.create_shader(shader_type)?;
        self.context.register_object(GlObjectKind::Shader, id);
        Ok(id)
    }

    /// Unregisters `id` and deletes it natively. Id 0 is ignored.
    pub fn delete_object(&mut self, kind: GlObjectKind, id: u32) {
        if id == 0 {
            return;
        }
        self.context.unregister_object(kind, id);
        self.driver.delete_object(kind, id);
    }

    // ── errors ────────────────────────────────────────────────────────────

    /// Queues a synthetic error ahead of the driver's own.
    pub fn set_error(&mut self, code: u32) {
        self.context.errors.push(code);
    }

    /// Smallest queued synthetic error, else the driver's error.
    pub fn get_error(&mut self) -> u32 {
        let driver = self.driver;
        self.context.errors.next_or_else(|| driver.get_error())
    }

    // ── pixel storage ─────────────────────────────────────────────────────

    /// `pixelStorei`: WebGL-only parameters stay on the context, the rest is
    /// forwarded. `UNPACK_ALIGNMENT` is both recorded and forwarded.
    pub fn pixel_storei(&mut self, pname: u32, param: i32) {
        let store = &mut self.context.pixel_store;
        match pname {
            consts::UNPACK_FLIP_Y_WEBGL => store.flip_y = param != 0,
            consts::UNPACK_PREMULTIPLY_ALPHA_WEBGL => store.premultiply_alpha = param != 0,
            consts::UNPACK_COLORSPACE_CONVERSION_WEBGL => match u32::try_from(param) {
                Ok(mode @ (0 | consts::BROWSER_DEFAULT_WEBGL)) => store.colorspace_conversion = mode,
                _ => self.context.errors.push(consts::INVALID_ENUM),
            },
            consts::UNPACK_ALIGNMENT => {
                if u32::try_from(param).is_ok_and(|a| store.set_alignment(a)) {
                    self.driver.pixel_store_i(pname, param);
                } else {
                    self.context.errors.push(consts::INVALID_VALUE);
                }
            }
            _ => self.driver.pixel_store_i(pname, param),
        }
    }

    /// Lays out a tightly packed client image under the current unpack state.
    pub fn unpack_pixels(
        &self,
        ty: u32,
        format: u32,
        width: u32,
        height: u32,
        src: &[u8],
    ) -> Result<Vec<u8>, UnpackError> {
        unpack_pixels(&self.context.pixel_store, ty, format, width, height, src)
    }

    /// `texImage2D`: unpacks `pixels` (if any) and forwards the upload.
    pub fn tex_image_2d(&mut self, image: &TexImage, pixels: Option<&[u8]>) -> Result<(), ContextError> {
        match pixels {
            Some(src) => {
                let data = self.unpack_pixels(image.ty, image.format, image.width, image.height, src)?;
                self.driver.tex_image_2d(image, Some(&data))?;
            }
            None => self.driver.tex_image_2d(image, None)?,
        }
        Ok(())
    }

    /// `texSubImage2D`: unpacks `pixels` and forwards the upload.
    pub fn tex_sub_image_2d(&mut self, image: &TexImage, pixels: &[u8]) -> Result<(), ContextError> {
        let data = self.unpack_pixels(image.ty, image.format, image.width, image.height, pixels)?;
        self.driver.tex_sub_image_2d(image, &data)?;
        Ok(())
    }

    // ── capabilities ──────────────────────────────────────────────────────

    /// Supported capability names, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.context.extensions.supported().collect()
    }

    /// Whether the named capability is supported (case-insensitive).
    pub fn get_extension(&self, name: &str) -> bool {
        self.context.extensions.is_supported(name)
    }

    // ── drawing buffer ────────────────────────────────────────────────────

    /// Replaces the pbuffer surface with one of the new size.
    ///
    /// The old surface is destroyed before the new one exists, so a driver
    /// failure leaves the context in [`ContextState::Error`] for good. The
    /// stored size changes only on success. Consumes the guard: after a
    /// failure the context must be re-activated, which will be refused.
    pub fn resize(self, width: u32, height: u32) -> Result<(), ContextError> {
        let Self {
            id,
            driver,
            display,
            context,
            ..
        } = self;

        let (Some(config), Some(native)) = (context.native.config, context.native.context) else {
            context.state = ContextState::Error;
            return Err(ContextError::InvalidContext);
        };

        if let Some(old) = context.native.surface.take() {
            driver.destroy_surface(display, old);
        }

        let surface = match driver.create_pbuffer_surface(display, config, width, height) {
            Ok(surface) => surface,
            Err(e) => {
                log::warn!("context {id:?}: resize to {width}x{height} failed: {e}");
                context.state = ContextState::Error;
                return Err(e.into());
            }
        };
        context.native.surface = Some(surface);

        if let Err(e) = driver.make_current(display, Some((surface, native))) {
            log::warn!("context {id:?}: rebinding after resize failed: {e}");
            context.state = ContextState::Error;
            return Err(e.into());
        }

        context.width = width;
        context.height = height;
        log::debug!("context {id:?} resized to {width}x{height}");
        Ok(())
    }
}
