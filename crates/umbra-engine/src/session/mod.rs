//! Context lifecycle and scheduling.
//!
//! A [`Session`] owns everything that would otherwise be process-global
//! driver state:
//! - the display connection, shared by all contexts
//! - the registry of live contexts (newest first)
//! - the single "active" context currently bound to the driver
//!
//! The driver is implicitly stateful: GL calls hit whichever context was made
//! current last. [`Session::activate`] is therefore the only way to reach a
//! context's driver-side state, and it rebinds only when the target is not
//! already active.

mod current;
mod display;
mod registry;

pub use current::Current;
pub use registry::{Links, Registry};

use slotmap::SlotMap;

use crate::context::{
    capability_table, Context, ContextAttributes, ContextId, ContextState, Extensions,
    TEXTURE_STORAGE_EXTENSION,
};
use crate::driver::{ConfigRequest, Driver};
use crate::error::{ContextError, CreateError};

use display::DisplaySlot;

/// Owner of the display, every context, and the active-context pointer.
///
/// Single-threaded: embedders sharing a session across threads must
/// serialize access themselves. Dropping the session runs [`Session::cleanup`].
pub struct Session<D: Driver> {
    driver: D,
    display: DisplaySlot<D>,
    contexts: SlotMap<ContextId, Context<D>>,
    registry: Registry,
    active: Option<ContextId>,
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            display: DisplaySlot::default(),
            contexts: SlotMap::with_key(),
            registry: Registry::new(),
            active: None,
        }
    }

    pub(crate) fn driver(&self) -> &D {
        &self.driver
    }

    pub fn has_display(&self) -> bool {
        self.display.is_initialized()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The context currently bound to the driver, if any.
    pub fn active(&self) -> Option<ContextId> {
        self.active
    }

    pub fn context(&self, id: ContextId) -> Option<&Context<D>> {
        self.contexts.get(id)
    }

    /// Mutable access for bookkeeping that needs no driver call.
    pub fn context_mut(&mut self, id: ContextId) -> Option<&mut Context<D>> {
        self.contexts.get_mut(id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = (ContextId, &Context<D>)> {
        self.contexts.iter()
    }

    // ── construction ──────────────────────────────────────────────────────

    /// Builds a context and makes it active.
    ///
    /// Always returns an id. On failure the context is in
    /// [`ContextState::Error`] with its error message set; it can be
    /// inspected and must still be released.
    pub fn create_context(&mut self, attributes: ContextAttributes) -> ContextId {
        let mut context = Context::new(attributes);

        if let Err(err) = self.bind_native(&mut context) {
            self.release_partial(&mut context);
            context.fail(err.describe());
            return self.contexts.insert(context);
        }

        context.state = ContextState::Ready;
        let id = self.contexts.insert(context);
        self.registry.insert(id);
        self.active = Some(id);

        if let Some(context) = self.contexts.get_mut(id) {
            negotiate(&self.driver, context);
            let (width, height) = context.size();
            log::debug!(
                "context {id:?} ready: {width}x{height} {:?}, {} capabilities",
                context.profile(),
                context.extensions.supported().count(),
            );
        }
        id
    }

    /// Display, config, native context, surface, make-current.
    fn bind_native(&mut self, context: &mut Context<D>) -> Result<(), CreateError> {
        let display = self.display.ensure(&mut self.driver)?;
        let driver = &self.driver;
        let profile = context.profile();

        let config = driver
            .choose_config(display, &ConfigRequest::for_profile(profile))
            .map_err(CreateError::ChooseConfig)?;
        context.native.config = Some(config);

        let native = driver
            .create_context(display, config, profile)
            .map_err(CreateError::CreateContext)?;
        context.native.context = Some(native);

        let surface = driver
            .create_pbuffer_surface(display, config, context.width, context.height)
            .map_err(CreateError::CreateSurface)?;
        context.native.surface = Some(surface);

        driver
            .make_current(display, Some((surface, native)))
            .map_err(CreateError::MakeCurrent)
    }

    /// Destroys whatever native handles a failed construction left behind.
    fn release_partial(&self, context: &mut Context<D>) {
        let Some(display) = self.display.handle() else {
            return;
        };
        if let Some(surface) = context.native.surface.take() {
            self.driver.destroy_surface(display, surface);
        }
        if let Some(native) = context.native.context.take() {
            self.driver.destroy_context(display, native);
        }
    }

    // ── scheduling ────────────────────────────────────────────────────────

    /// Makes `id` the active context and returns the guard for driver work.
    ///
    /// Fails with [`ContextError::InvalidContext`] without touching the
    /// driver when the id is unknown or the context is not ready. Activating
    /// the already-active context makes no driver call. A driver refusal
    /// moves the context to [`ContextState::Error`].
    pub fn activate(&mut self, id: ContextId) -> Result<Current<'_, D>, ContextError> {
        let Self {
            driver,
            display,
            contexts,
            active,
            ..
        } = self;
        let driver: &D = driver;

        let context = contexts.get_mut(id).ok_or(ContextError::InvalidContext)?;
        let display = display.handle().ok_or(ContextError::InvalidContext)?;
        if !make_active(driver, display, active, id, context) {
            return Err(ContextError::InvalidContext);
        }
        let gl = driver.gl().ok_or(ContextError::InvalidContext)?;

        Ok(Current::new(id, driver, display, gl, context))
    }

    /// Predicate form of [`Session::activate`].
    pub fn set_active(&mut self, id: ContextId) -> bool {
        self.activate(id).is_ok()
    }

    // ── operations ────────────────────────────────────────────────────────

    /// Resizes the drawing buffer of `id`; see [`Current::resize`].
    pub fn resize(&mut self, id: ContextId, width: u32, height: u32) -> Result<(), ContextError> {
        self.activate(id)?.resize(width, height)
    }

    /// Queues a synthetic error on the active context.
    pub fn inject_error(&mut self, code: u32) -> Result<(), ContextError> {
        let id = self.active.ok_or(ContextError::InvalidContext)?;
        self.activate(id)?.set_error(code);
        Ok(())
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Tears down `id`. Safe to call repeatedly and on failed contexts.
    ///
    /// A context that is already [`ContextState::Destroyed`] stays so; a
    /// repeated call does not move it to [`ContextState::Error`].
    ///
    /// Deletes every object the context still owns, unbinds it and destroys
    /// the native context. If the context cannot be made current it is
    /// marked [`ContextState::Error`] and its driver objects are abandoned.
    pub fn dispose(&mut self, id: ContextId) {
        self.registry.remove(id);

        let Self {
            driver,
            display,
            contexts,
            active,
            ..
        } = self;
        let driver: &D = driver;

        let Some(context) = contexts.get_mut(id) else {
            return;
        };
        if context.state == ContextState::Destroyed {
            return;
        }

        let Some(display) = display.handle() else {
            context.state = ContextState::Error;
            return;
        };
        if !make_active(driver, display, active, id, context) {
            context.state = ContextState::Error;
            return;
        }

        context.state = ContextState::Destroyed;

        let mut deleted = 0usize;
        for (kind, object) in context.objects.drain() {
            driver.delete_object(kind, object);
            deleted += 1;
        }

        if let Err(e) = driver.make_current(display, None) {
            log::warn!("context {id:?}: unbinding failed: {e}");
        }
        if *active == Some(id) {
            *active = None;
        }

        if let Some(native) = context.native.context.take() {
            driver.destroy_context(display, native);
        }
        log::debug!("context {id:?} disposed ({deleted} objects deleted)");
    }

    /// Disposes `id` and drops its bookkeeping. Returns whether it existed.
    pub fn release(&mut self, id: ContextId) -> bool {
        self.dispose(id);
        self.contexts.remove(id).is_some()
    }

    /// Disposes every registered context, then terminates the display.
    ///
    /// Idempotent. Released contexts stay addressable until [`Session::release`].
    pub fn cleanup(&mut self) {
        while let Some(head) = self.registry.head() {
            self.dispose(head);
        }
        self.display.terminate(&self.driver);
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Binds `context` unless it already is the active one.
fn make_active<D: Driver>(
    driver: &D,
    display: D::Display,
    active: &mut Option<ContextId>,
    id: ContextId,
    context: &mut Context<D>,
) -> bool {
    if context.state != ContextState::Ready {
        return false;
    }
    if *active == Some(id) {
        return true;
    }

    let (Some(surface), Some(native)) = (context.native.surface, context.native.context) else {
        context.state = ContextState::Error;
        return false;
    };

    match driver.make_current(display, Some((surface, native))) {
        Ok(()) => {
            log::trace!("context {id:?} made current");
            *active = Some(id);
            true
        }
        Err(e) => {
            log::warn!("context {id:?} could not be made current: {e}");
            context.state = ContextState::Error;
            false
        }
    }
}

/// Reads the driver's extension sets and fixes the supported capabilities.
///
/// Expects `context` to be current.
fn negotiate<D: Driver>(driver: &D, context: &mut Context<D>) {
    let enabled = driver.extensions();
    let requestable = driver.requestable_extensions();

    if let Err(e) = driver.request_extension(TEXTURE_STORAGE_EXTENSION) {
        log::debug!("{TEXTURE_STORAGE_EXTENSION} not requested: {e}");
    }

    context.extensions = Extensions::negotiate(
        enabled.as_deref(),
        requestable.as_deref(),
        capability_table(context.profile()),
    );
    context.preferred_depth = context.extensions.preferred_depth_format();
}
