use std::path::PathBuf;

use crate::device::DeviceError;

/// Why a [`load`](super::AssetLoader::load) failed.
///
/// Every variant leaves the previously published scene in place.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("model file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("GPU resource allocation failed: {0}")]
    ResourceAllocationFailed(#[from] DeviceError),
}

/// The bare category of a [`LoadError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LoadErrorKind {
    FileNotFound,
    Io,
    MalformedDocument,
    UnsupportedFeature,
    ResourceAllocationFailed,
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::FileNotFound(_) => LoadErrorKind::FileNotFound,
            LoadError::Io { .. } => LoadErrorKind::Io,
            LoadError::MalformedDocument(_) => LoadErrorKind::MalformedDocument,
            LoadError::UnsupportedFeature(_) => LoadErrorKind::UnsupportedFeature,
            LoadError::ResourceAllocationFailed(_) => LoadErrorKind::ResourceAllocationFailed,
        }
    }

    /// Maps an `io::Error` for `path`, separating "missing" from other failures.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound(path)
        } else {
            LoadError::Io { path, source }
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        LoadError::MalformedDocument(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        LoadError::UnsupportedFeature(msg.into())
    }

    /// Whether a per-primitive failure may be dropped under
    /// [`PrimitivePolicy::SkipAndWarn`](super::PrimitivePolicy::SkipAndWarn).
    /// I/O and allocation failures always abort the load.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            LoadError::MalformedDocument(_) | LoadError::UnsupportedFeature(_)
        )
    }

    /// Prefixes content errors with the primitive they came from.
    pub(crate) fn at_primitive(self, mesh: usize, primitive: usize) -> Self {
        match self {
            LoadError::MalformedDocument(msg) => {
                LoadError::MalformedDocument(format!("mesh {mesh} primitive {primitive}: {msg}"))
            }
            LoadError::UnsupportedFeature(msg) => {
                LoadError::UnsupportedFeature(format!("mesh {mesh} primitive {primitive}: {msg}"))
            }
            other => other,
        }
    }
}

impl From<gltf::Error> for LoadError {
    fn from(err: gltf::Error) -> Self {
        match err {
            gltf::Error::Validation(errors) => {
                let unsupported = errors
                    .iter()
                    .any(|(_, e)| matches!(e, gltf::json::validation::Error::Unsupported));
                let detail = errors
                    .iter()
                    .map(|(path, e)| format!("{}: {e}", path.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                if unsupported {
                    LoadError::UnsupportedFeature(detail)
                } else {
                    LoadError::MalformedDocument(detail)
                }
            }
            other => LoadError::MalformedDocument(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let err = LoadError::io("a.gltf", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.kind(), LoadErrorKind::FileNotFound);

        let err = LoadError::io("a.gltf", std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind(), LoadErrorKind::Io);
    }

    #[test]
    fn location_prefix_only_touches_content_errors() {
        let err = LoadError::malformed("bad stride").at_primitive(2, 1);
        assert_eq!(err.to_string(), "malformed document: mesh 2 primitive 1: bad stride");

        let err = LoadError::from(DeviceError::DeviceLost).at_primitive(0, 0);
        assert_eq!(err.kind(), LoadErrorKind::ResourceAllocationFailed);
        assert!(!err.is_content_error());
    }
}
