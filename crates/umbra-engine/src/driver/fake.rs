//! Scripted in-memory driver for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::{ConfigRequest, Driver, DriverError, TexImage};
use crate::consts;
use crate::context::{GlObjectKind, Profile};

/// Calls that may be told to fail.
#[derive(Debug, Default)]
pub(crate) struct FailPoints {
    pub load: Cell<bool>,
    pub display: Cell<bool>,
    pub initialize: Cell<bool>,
    pub config: Cell<bool>,
    pub context: Cell<bool>,
    pub surface: Cell<bool>,
    pub make_current: Cell<bool>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeDriver {
    pub fail: FailPoints,

    pub extensions: RefCell<String>,
    pub requestable: RefCell<Option<String>>,
    pub gl_errors: RefCell<VecDeque<u32>>,

    pub loads: Cell<usize>,
    pub initializes: Cell<usize>,
    pub terminates: Cell<usize>,
    pub make_current_calls: Cell<usize>,
    pub current: Cell<Option<(u32, u32)>>,
    pub profiles: RefCell<Vec<Profile>>,
    pub surfaces_created: RefCell<Vec<(u32, u32)>>,
    pub surfaces_destroyed: RefCell<Vec<u32>>,
    pub contexts_destroyed: RefCell<Vec<u32>>,
    pub requested: RefCell<Vec<String>>,
    pub pixel_stores: RefCell<Vec<(u32, i32)>>,
    pub deleted: RefCell<Vec<(GlObjectKind, u32)>>,
    pub uploads: RefCell<Vec<(TexImage, Option<Vec<u8>>)>>,

    next_handle: Cell<u32>,
    loaded: bool,
    bound: Cell<bool>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(enabled: &str, requestable: Option<&str>) -> Self {
        let driver = Self::new();
        *driver.extensions.borrow_mut() = enabled.to_string();
        *driver.requestable.borrow_mut() = requestable.map(str::to_string);
        driver
    }

    fn handle(&self) -> u32 {
        let next = self.next_handle.get() + 1;
        self.next_handle.set(next);
        next
    }

    fn check(flag: &Cell<bool>, call: &'static str) -> Result<(), DriverError> {
        if flag.get() {
            Err(DriverError::call(call, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl Driver for FakeDriver {
    type Display = u32;
    type Config = u32;
    type Surface = u32;
    type Context = u32;
    type Gl = ();

    fn load(&mut self) -> Result<(), DriverError> {
        if self.fail.load.get() {
            return Err(DriverError::Load("libEGL: not found".into()));
        }
        if !self.loaded {
            self.loads.set(self.loads.get() + 1);
            self.loaded = true;
        }
        Ok(())
    }

    fn default_display(&self) -> Result<u32, DriverError> {
        Self::check(&self.fail.display, "eglGetDisplay")?;
        Ok(self.handle())
    }

    fn initialize(&self, _display: u32) -> Result<(), DriverError> {
        Self::check(&self.fail.initialize, "eglInitialize")?;
        self.initializes.set(self.initializes.get() + 1);
        Ok(())
    }

    fn terminate(&self, _display: u32) {
        self.terminates.set(self.terminates.get() + 1);
    }

    fn choose_config(&self, _display: u32, _request: &ConfigRequest) -> Result<u32, DriverError> {
        Self::check(&self.fail.config, "eglChooseConfig")?;
        Ok(self.handle())
    }

    fn create_context(&self, _display: u32, _config: u32, profile: Profile) -> Result<u32, DriverError> {
        Self::check(&self.fail.context, "eglCreateContext")?;
        self.profiles.borrow_mut().push(profile);
        Ok(self.handle())
    }

    fn create_pbuffer_surface(
        &self,
        _display: u32,
        _config: u32,
        width: u32,
        height: u32,
    ) -> Result<u32, DriverError> {
        Self::check(&self.fail.surface, "eglCreatePbufferSurface")?;
        self.surfaces_created.borrow_mut().push((width, height));
        Ok(self.handle())
    }

    fn destroy_surface(&self, _display: u32, surface: u32) {
        self.surfaces_destroyed.borrow_mut().push(surface);
    }

    fn destroy_context(&self, _display: u32, context: u32) {
        self.contexts_destroyed.borrow_mut().push(context);
    }

    fn make_current(&self, _display: u32, target: Option<(u32, u32)>) -> Result<(), DriverError> {
        self.make_current_calls.set(self.make_current_calls.get() + 1);
        Self::check(&self.fail.make_current, "eglMakeCurrent")?;
        if target.is_some() {
            self.bound.set(true);
        }
        self.current.set(target);
        Ok(())
    }

    fn gl(&self) -> Option<&()> {
        self.bound.get().then_some(&())
    }

    fn extensions(&self) -> Option<String> {
        Some(self.extensions.borrow().clone())
    }

    fn requestable_extensions(&self) -> Option<String> {
        self.requestable.borrow().clone()
    }

    fn request_extension(&self, name: &str) -> Result<(), DriverError> {
        self.requested.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn get_error(&self) -> u32 {
        self.gl_errors
            .borrow_mut()
            .pop_front()
            .unwrap_or(consts::NO_ERROR)
    }

    fn pixel_store_i(&self, pname: u32, param: i32) {
        self.pixel_stores.borrow_mut().push((pname, param));
    }

    fn create_object(&self, kind: GlObjectKind) -> Result<u32, DriverError> {
        if kind == GlObjectKind::Shader {
            return Err(DriverError::call("glCreateShader", "shader type required"));
        }
        Ok(self.handle())
    }

    fn create_shader(&self, _shader_type: u32) -> Result<u32, DriverError> {
        Ok(self.handle())
    }

    fn delete_object(&self, kind: GlObjectKind, id: u32) {
        self.deleted.borrow_mut().push((kind, id));
    }

    fn tex_image_2d(&self, image: &TexImage, pixels: Option<&[u8]>) -> Result<(), DriverError> {
        self.uploads.borrow_mut().push((*image, pixels.map(<[u8]>::to_vec)));
        Ok(())
    }

    fn tex_sub_image_2d(&self, image: &TexImage, pixels: &[u8]) -> Result<(), DriverError> {
        self.uploads.borrow_mut().push((*image, Some(pixels.to_vec())));
        Ok(())
    }
}
