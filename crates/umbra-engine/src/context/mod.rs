//! Per-context bookkeeping.
//!
//! A [`Context`] pairs the native surface/context handles with everything the
//! engine tracks on top of the driver: object ownership, synthetic errors,
//! negotiated capabilities and unpack state. Contexts live inside a
//! [`Session`](crate::session::Session) and are addressed by [`ContextId`].

mod attributes;
mod errors;
mod extensions;
mod objects;
mod pixels;

pub use attributes::{ContextAttributes, Profile, DEFAULT_SIZE};
pub use errors::ErrorQueue;
pub use extensions::{capability_table, Capability, Extensions, TEXTURE_STORAGE_EXTENSION};
pub use objects::{GlObjectKind, ObjectRegistry};
pub use pixels::{bytes_per_pixel, channel_count, unpack_pixels, PixelStore, UnpackError};

use crate::driver::Driver;

slotmap::new_key_type! {
    /// Stable handle to a context owned by a session.
    pub struct ContextId;
}

/// Lifecycle state of a context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContextState {
    /// Construction has not finished.
    Init,
    /// Usable.
    Ready,
    /// Disposed; every operation is refused.
    Destroyed,
    /// Construction or activation failed; every operation is refused.
    Error,
}

/// Native handles of a context, filled in as construction progresses.
pub(crate) struct NativeHandles<D: Driver> {
    pub config: Option<D::Config>,
    pub context: Option<D::Context>,
    pub surface: Option<D::Surface>,
}

impl<D: Driver> Default for NativeHandles<D> {
    fn default() -> Self {
        Self {
            config: None,
            context: None,
            surface: None,
        }
    }
}

/// One logical rendering session on top of the driver.
pub struct Context<D: Driver> {
    pub(crate) state: ContextState,
    pub(crate) native: NativeHandles<D>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) error_message: Option<String>,
    pub(crate) attributes: ContextAttributes,
    pub(crate) pixel_store: PixelStore,
    pub(crate) objects: ObjectRegistry,
    pub(crate) extensions: Extensions,
    pub(crate) errors: ErrorQueue,
    pub(crate) preferred_depth: u32,
}

impl<D: Driver> Context<D> {
    pub(crate) fn new(attributes: ContextAttributes) -> Self {
        let (width, height) = attributes.surface_size();
        Self {
            state: ContextState::Init,
            native: NativeHandles::default(),
            width,
            height,
            error_message: None,
            attributes,
            pixel_store: PixelStore::default(),
            objects: ObjectRegistry::new(),
            extensions: Extensions::default(),
            errors: ErrorQueue::new(),
            preferred_depth: crate::consts::DEPTH_COMPONENT16,
        }
    }

    pub(crate) fn fail(&mut self, message: String) {
        log::warn!("context failed: {message}");
        self.state = ContextState::Error;
        self.error_message = Some(message);
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ContextState::Ready
    }

    /// Why construction failed, if it did.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Drawing-buffer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn attributes(&self) -> &ContextAttributes {
        &self.attributes
    }

    pub fn profile(&self) -> Profile {
        self.attributes.profile
    }

    pub fn pixel_store(&self) -> &PixelStore {
        &self.pixel_store
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    /// Records an object allocated on this context's behalf. No driver call.
    pub fn register_object(&mut self, kind: GlObjectKind, id: u32) {
        self.objects.register(kind, id);
    }

    /// Forgets an object. Unknown ids are ignored. No driver call.
    pub fn unregister_object(&mut self, kind: GlObjectKind, id: u32) {
        self.objects.unregister(kind, id);
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Depth renderbuffer format chosen at creation.
    pub fn preferred_depth_format(&self) -> u32 {
        self.preferred_depth
    }

    pub fn pending_errors(&self) -> &ErrorQueue {
        &self.errors
    }
}
