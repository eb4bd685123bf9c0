/// Feature-set profile requested from the driver.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Profile {
    /// WebGL 1 on an OpenGL ES 2 context.
    #[default]
    WebGl1,
    /// WebGL 2 on an OpenGL ES 3 context.
    WebGl2,
}

impl Profile {
    /// `EGL_CONTEXT_CLIENT_VERSION` for this profile.
    pub fn client_version(self) -> i32 {
        match self {
            Self::WebGl1 => 2,
            Self::WebGl2 => 3,
        }
    }
}

/// Creation parameters for a context.
///
/// The boolean hints mirror WebGL's context attributes. They are recorded
/// for callers to read back but only the surface size and `profile` shape
/// the native request; the native config is always RGBA8/D24/S8.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContextAttributes {
    /// Drawing-buffer width in pixels. Zero selects [`DEFAULT_SIZE`].
    pub width: u32,
    /// Drawing-buffer height in pixels. Zero selects [`DEFAULT_SIZE`].
    pub height: u32,

    pub alpha: bool,
    pub depth: bool,
    pub stencil: bool,
    pub antialias: bool,
    pub premultiplied_alpha: bool,
    pub preserve_drawing_buffer: bool,
    pub prefer_low_power_to_high_performance: bool,
    pub fail_if_major_performance_caveat: bool,

    pub profile: Profile,
}

/// Edge length used for unset dimensions.
pub const DEFAULT_SIZE: u32 = 256;

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            alpha: true,
            depth: true,
            stencil: false,
            antialias: true,
            premultiplied_alpha: true,
            preserve_drawing_buffer: false,
            prefer_low_power_to_high_performance: false,
            fail_if_major_performance_caveat: false,
            profile: Profile::WebGl1,
        }
    }
}

impl ContextAttributes {
    /// Default attributes at the given size.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Returns the surface size with unset dimensions replaced.
    pub fn surface_size(&self) -> (u32, u32) {
        let coerce = |v: u32| if v == 0 { DEFAULT_SIZE } else { v };
        (coerce(self.width), coerce(self.height))
    }
}
