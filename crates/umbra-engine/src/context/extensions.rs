use std::collections::BTreeSet;

use super::Profile;
use crate::consts;

/// A WebGL-visible capability and the native extensions backing it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Capability {
    pub name: &'static str,
    /// Every entry must be enabled or requestable. Empty means the capability
    /// is implemented above the driver and always available.
    pub requires: &'static [&'static str],
}

const fn cap(name: &'static str, requires: &'static [&'static str]) -> Capability {
    Capability { name, requires }
}

const COMMON: &[Capability] = &[
    cap("STACKGL_destroy_context", &[]),
    cap("STACKGL_resize_drawingbuffer", &[]),
    cap("EXT_texture_filter_anisotropic", &["GL_EXT_texture_filter_anisotropic"]),
    cap("OES_texture_float_linear", &["GL_OES_texture_float_linear"]),
];

const WEBGL1_ONLY: &[Capability] = &[
    cap("ANGLE_instanced_arrays", &["GL_ANGLE_instanced_arrays"]),
    cap("OES_element_index_uint", &["GL_OES_element_index_uint"]),
    cap("EXT_blend_minmax", &["GL_EXT_blend_minmax"]),
    cap("OES_standard_derivatives", &["GL_OES_standard_derivatives"]),
    cap(
        "OES_texture_float",
        &[
            "GL_OES_texture_float",
            "GL_CHROMIUM_color_buffer_float_rgba",
            "GL_CHROMIUM_color_buffer_float_rgb",
        ],
    ),
    cap("WEBGL_draw_buffers", &["GL_EXT_draw_buffers"]),
    cap("OES_vertex_array_object", &["GL_OES_vertex_array_object"]),
    cap("EXT_shader_texture_lod", &["GL_EXT_shader_texture_lod"]),
];

const WEBGL2_ONLY: &[Capability] = &[cap("EXT_color_buffer_float", &["GL_EXT_color_buffer_float"])];

/// Native extension requested at creation so texture storage is complete.
pub const TEXTURE_STORAGE_EXTENSION: &str = "GL_EXT_texture_storage";

/// The capability table for `profile`.
pub fn capability_table(profile: Profile) -> impl Iterator<Item = &'static Capability> {
    let extra = match profile {
        Profile::WebGl1 => WEBGL1_ONLY,
        Profile::WebGl2 => WEBGL2_ONLY,
    };
    COMMON.iter().chain(extra)
}

/// Native extension sets of a context and the capabilities they support.
///
/// Computed once at creation; never re-evaluated.
#[derive(Debug, Default, Clone)]
pub struct Extensions {
    enabled: BTreeSet<String>,
    requestable: BTreeSet<String>,
    supported: BTreeSet<String>,
}

impl Extensions {
    /// Splits the driver's extension strings and evaluates `table` against them.
    pub fn negotiate<'a>(
        enabled: Option<&str>,
        requestable: Option<&str>,
        table: impl IntoIterator<Item = &'a Capability>,
    ) -> Self {
        let split = |s: Option<&str>| -> BTreeSet<String> {
            s.unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect()
        };

        let mut extensions = Self {
            enabled: split(enabled),
            requestable: split(requestable),
            supported: BTreeSet::new(),
        };

        for capability in table {
            if capability.requires.iter().all(|name| extensions.has_native(name)) {
                extensions.supported.insert(capability.name.to_string());
            }
        }

        extensions
    }

    /// Whether the driver exposes `name`, either enabled or requestable.
    pub fn has_native(&self, name: &str) -> bool {
        self.enabled.contains(name) || self.requestable.contains(name)
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn requestable(&self) -> &BTreeSet<String> {
        &self.requestable
    }

    /// Supported capability names, sorted.
    pub fn supported(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }

    /// Case-insensitive capability lookup, as WebGL's `getExtension` does.
    pub fn is_supported(&self, name: &str) -> bool {
        self.supported.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    /// Best depth renderbuffer format the enabled extensions allow.
    pub fn preferred_depth_format(&self) -> u32 {
        if self.enabled.contains("GL_OES_depth32") {
            consts::DEPTH_COMPONENT32_OES
        } else if self.enabled.contains("GL_OES_depth24") {
            consts::DEPTH_COMPONENT24_OES
        } else {
            consts::DEPTH_COMPONENT16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirement_is_always_supported() {
        let ext = Extensions::negotiate(None, None, capability_table(Profile::WebGl1));
        assert!(ext.is_supported("STACKGL_destroy_context"));
        assert!(ext.is_supported("STACKGL_resize_drawingbuffer"));
        assert!(!ext.is_supported("OES_element_index_uint"));
    }

    #[test]
    fn missing_native_name_is_unsupported() {
        let table = [cap("FAKE_thing", &["GL_present", "GL_absent"])];
        let ext = Extensions::negotiate(Some("GL_present"), Some("GL_other"), &table);
        assert!(!ext.is_supported("FAKE_thing"));
    }

    #[test]
    fn requestable_names_count_as_available() {
        let ext = Extensions::negotiate(
            Some("GL_OES_texture_float GL_CHROMIUM_color_buffer_float_rgba"),
            Some("GL_CHROMIUM_color_buffer_float_rgb"),
            capability_table(Profile::WebGl1),
        );
        assert!(ext.is_supported("OES_texture_float"));
    }

    #[test]
    fn profiles_differ_on_float_color_buffers() {
        let natives = Some("GL_EXT_color_buffer_float GL_OES_element_index_uint");
        let gl1 = Extensions::negotiate(natives, None, capability_table(Profile::WebGl1));
        let gl2 = Extensions::negotiate(natives, None, capability_table(Profile::WebGl2));

        assert!(!gl1.is_supported("EXT_color_buffer_float"));
        assert!(gl1.is_supported("OES_element_index_uint"));
        assert!(gl2.is_supported("EXT_color_buffer_float"));
        assert!(!gl2.is_supported("OES_element_index_uint"));
    }

    #[test]
    fn lookup_ignores_case() {
        let ext = Extensions::negotiate(None, None, capability_table(Profile::WebGl2));
        assert!(ext.is_supported("stackgl_destroy_context"));
    }

    #[test]
    fn depth_preference_order() {
        let pick = |s: &str| Extensions::negotiate(Some(s), None, []).preferred_depth_format();
        assert_eq!(pick(""), consts::DEPTH_COMPONENT16);
        assert_eq!(pick("GL_OES_depth24"), consts::DEPTH_COMPONENT24_OES);
        assert_eq!(pick("GL_OES_depth24 GL_OES_depth32"), consts::DEPTH_COMPONENT32_OES);
    }
}
