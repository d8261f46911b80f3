//! Error types for glTF loading.

/// Errors that can fail a whole model load.
///
/// Per-primitive problems (unsupported topology, missing attributes, bad
/// component types) are not represented here: those are logged and skipped
/// so a partially malformed asset still yields its good geometry.
#[derive(Debug)]
pub enum GltfError {
    /// Failed to read the asset or a sibling file from disk.
    Io(std::io::Error),
    /// Failed to parse the glTF document.
    Parse(gltf_dep::Error),
    /// Error resolving buffer data.
    Buffer(String),
    /// Error decoding an image.
    Image(String),
    /// Error reading accessor data.
    Accessor(String),
    /// The whole asset produced zero triangles.
    NoGeometry,
}

impl std::fmt::Display for GltfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::Buffer(msg) => write!(f, "buffer error: {msg}"),
            Self::Image(msg) => write!(f, "image decode error: {msg}"),
            Self::Accessor(msg) => write!(f, "accessor error: {msg}"),
            Self::NoGeometry => write!(f, "no triangles found in asset"),
        }
    }
}

impl std::error::Error for GltfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf_dep::Error> for GltfError {
    fn from(e: gltf_dep::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for GltfError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
