use std::collections::BTreeSet;

/// Kind of a driver-allocated GL object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum GlObjectKind {
    Buffer,
    Framebuffer,
    Program,
    Renderbuffer,
    Shader,
    Texture,
    VertexArray,
}

impl GlObjectKind {
    pub const ALL: [GlObjectKind; 7] = [
        Self::Buffer,
        Self::Framebuffer,
        Self::Program,
        Self::Renderbuffer,
        Self::Shader,
        Self::Texture,
        Self::VertexArray,
    ];

    /// Name of the native call allocating this kind.
    pub fn create_call(self) -> &'static str {
        match self {
            Self::Buffer => "glGenBuffers",
            Self::Framebuffer => "glGenFramebuffers",
            Self::Program => "glCreateProgram",
            Self::Renderbuffer => "glGenRenderbuffers",
            Self::Shader => "glCreateShader",
            Self::Texture => "glGenTextures",
            Self::VertexArray => "glGenVertexArrays",
        }
    }
}

/// Objects a context owns on the driver side, keyed by `(id, kind)`.
///
/// Id 0 is the driver's "no object" name and is never stored.
#[derive(Debug, Default, Clone)]
pub struct ObjectRegistry {
    entries: BTreeSet<(u32, GlObjectKind)>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id`; registering an existing entry is a no-op.
    pub fn register(&mut self, kind: GlObjectKind, id: u32) {
        if id != 0 {
            self.entries.insert((id, kind));
        }
    }

    /// Forgets `id`; returns whether it was present.
    pub fn unregister(&mut self, kind: GlObjectKind, id: u32) -> bool {
        self.entries.remove(&(id, kind))
    }

    pub fn contains(&self, kind: GlObjectKind, id: u32) -> bool {
        self.entries.contains(&(id, kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GlObjectKind, u32)> + '_ {
        self.entries.iter().map(|&(id, kind)| (kind, id))
    }

    /// Empties the registry, yielding every entry.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (GlObjectKind, u32)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(id, kind)| (kind, id))
    }
}
