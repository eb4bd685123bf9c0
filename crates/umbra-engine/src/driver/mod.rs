//! Native driver boundary.
//!
//! The session never talks to EGL or GLES directly; it goes through the
//! [`Driver`] trait, a fixed table of the primitives the context manager
//! needs. [`EglDriver`] is the production implementation. Everything the
//! engine does not interpret itself is reached through [`Driver::gl`].

mod egl;
#[cfg(test)]
pub(crate) mod fake;

pub use egl::{EglConfig, EglDriver};

use std::fmt;

use thiserror::Error;

use crate::context::{GlObjectKind, Profile};

/// Failure reported by a driver entry point.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver library (or its entry points) could not be resolved.
    #[error("failed to load driver library: {0}")]
    Load(String),

    /// A resolved entry point reported failure.
    #[error("{call} failed: {reason}")]
    Call { call: &'static str, reason: String },
}

impl DriverError {
    pub(crate) fn call(call: &'static str, reason: impl fmt::Display) -> Self {
        Self::Call {
            call,
            reason: reason.to_string(),
        }
    }
}

/// Surface-format request used when choosing the native config.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConfigRequest {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
    /// Selects the renderable-type bit (ES2 or ES3).
    pub profile: Profile,
}

impl ConfigRequest {
    /// RGBA8, 24-bit depth, 8-bit stencil, pbuffer-capable.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 24,
            stencil: 8,
            profile,
        }
    }
}

/// Parameters of a 2D texture upload once the pixels are driver-ready.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TexImage {
    pub target: u32,
    pub level: i32,
    /// Ignored by sub-image uploads.
    pub internal_format: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub ty: u32,
}

/// Entry-point table of a native EGL + GLES driver.
///
/// Handles are opaque copies; the session owns their lifetimes. All calls
/// assume a single thread, and every GL call applies to whichever context the
/// driver currently has bound.
pub trait Driver {
    type Display: Copy + fmt::Debug;
    type Config: Copy + fmt::Debug;
    type Surface: Copy + fmt::Debug;
    type Context: Copy + fmt::Debug;

    /// The full GL entry-point table exposed for pass-through calls.
    type Gl;

    // ── display ───────────────────────────────────────────────────────────

    /// Resolves the driver's entry points. Idempotent.
    fn load(&mut self) -> Result<(), DriverError>;

    fn default_display(&self) -> Result<Self::Display, DriverError>;

    fn initialize(&self, display: Self::Display) -> Result<(), DriverError>;

    fn terminate(&self, display: Self::Display);

    // ── surfaces and contexts ─────────────────────────────────────────────

    /// Returns the single config matching `request`.
    fn choose_config(
        &self,
        display: Self::Display,
        request: &ConfigRequest,
    ) -> Result<Self::Config, DriverError>;

    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        profile: Profile,
    ) -> Result<Self::Context, DriverError>;

    fn create_pbuffer_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        width: u32,
        height: u32,
    ) -> Result<Self::Surface, DriverError>;

    fn destroy_surface(&self, display: Self::Display, surface: Self::Surface);

    fn destroy_context(&self, display: Self::Display, context: Self::Context);

    /// Binds `target` (or nothing, for `None`) to the calling thread.
    fn make_current(
        &self,
        display: Self::Display,
        target: Option<(Self::Surface, Self::Context)>,
    ) -> Result<(), DriverError>;

    // ── GL ────────────────────────────────────────────────────────────────

    /// `None` until a context has been made current once.
    fn gl(&self) -> Option<&Self::Gl>;

    /// Whitespace-separated `GL_EXTENSIONS` string.
    fn extensions(&self) -> Option<String>;

    /// Whitespace-separated requestable extensions; `None` when the driver
    /// has no notion of requestable extensions.
    fn requestable_extensions(&self) -> Option<String>;

    fn request_extension(&self, name: &str) -> Result<(), DriverError>;

    fn get_error(&self) -> u32;

    fn pixel_store_i(&self, pname: u32, param: i32);

    /// Allocates an object of any kind except [`GlObjectKind::Shader`].
    fn create_object(&self, kind: GlObjectKind) -> Result<u32, DriverError>;

    fn create_shader(&self, shader_type: u32) -> Result<u32, DriverError>;

    fn delete_object(&self, kind: GlObjectKind, id: u32);

    /// `None` allocates storage without uploading.
    fn tex_image_2d(&self, image: &TexImage, pixels: Option<&[u8]>) -> Result<(), DriverError>;

    fn tex_sub_image_2d(&self, image: &TexImage, pixels: &[u8]) -> Result<(), DriverError>;
}
