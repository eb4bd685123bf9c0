//! Umbra engine crate.
//!
//! Headless WebGL-style rendering contexts on top of a native EGL + GLES
//! driver: context lifecycle, scheduling of the single active context, and
//! the bookkeeping WebGL needs above the driver (object registry, synthetic
//! error queue, pixel unpacking, capability negotiation).

pub mod consts;
pub mod context;
pub mod driver;
pub mod error;
pub mod logging;
pub mod session;

pub use context::{ContextAttributes, ContextId, ContextState, GlObjectKind, Profile};
pub use driver::{Driver, DriverError, EglConfig, EglDriver, TexImage};
pub use error::{ContextError, CreateError};
pub use logging::{init_logging, LoggingConfig};
pub use session::{Current, Session};
