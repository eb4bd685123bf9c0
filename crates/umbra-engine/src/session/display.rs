use crate::driver::Driver;
use crate::error::CreateError;

/// The session's one driver display connection.
///
/// Empty until the first context is built; emptied again only by
/// [`DisplaySlot::terminate`] once every context is gone.
pub(crate) struct DisplaySlot<D: Driver> {
    handle: Option<D::Display>,
}

impl<D: Driver> Default for DisplaySlot<D> {
    fn default() -> Self {
        Self { handle: None }
    }
}

impl<D: Driver> DisplaySlot<D> {
    pub fn handle(&self) -> Option<D::Display> {
        self.handle
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns the display, loading the driver and initializing it first if
    /// needed. A failure leaves the slot empty.
    pub fn ensure(&mut self, driver: &mut D) -> Result<D::Display, CreateError> {
        if let Some(display) = self.handle {
            return Ok(display);
        }

        driver.load().map_err(CreateError::Library)?;
        let display = driver.default_display().map_err(CreateError::NoDisplay)?;
        driver
            .initialize(display)
            .map_err(CreateError::InitializeDisplay)?;

        log::info!("display initialized: {display:?}");
        self.handle = Some(display);
        Ok(display)
    }

    /// Tears the display down; a later [`DisplaySlot::ensure`] starts over.
    pub fn terminate(&mut self, driver: &D) {
        if let Some(display) = self.handle.take() {
            driver.terminate(display);
            log::info!("display terminated");
        }
    }
}
