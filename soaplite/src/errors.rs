#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got an invalid parameter value in a function
    InvalidParameter(String),
    /// The overlap matrix of a radial basis is not positive definite, or too
    /// ill-conditioned for the orthonormalized basis to be computed in
    /// floating point
    BasisNotRealizable {
        cutoff: f64,
        max_radial: usize,
    },
    /// The kernel required for a calculation is not available
    KernelLoad(String),
    /// The kernel failed while computing the descriptor
    Kernel(String),
    /// Error while serializing/deserializing data
    Json(serde_json::Error),
    /// Error related to reading structure files
    Chemfiles(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::BasisNotRealizable { cutoff, max_radial } => write!(f,
                "the radial basis can not be orthonormalized in real numbers \
                for cutoff={} and max_radial={}, try with a lower max_radial",
                cutoff, max_radial
            ),
            Error::KernelLoad(e) => write!(f, "failed to load kernel: {}", e),
            Error::Kernel(e) => write!(f, "kernel error: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::Chemfiles(e) => write!(f, "chemfiles error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidParameter(_) |
            Error::BasisNotRealizable { .. } |
            Error::KernelLoad(_) |
            Error::Kernel(_) |
            Error::Chemfiles(_) => None,
            Error::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

// Box<dyn Any + Send + 'static> is the error type in std::panic::catch_unwind,
// which is used to isolate kernel calls
impl From<Box<dyn std::any::Any + Send + 'static>> for Error {
    fn from(error: Box<dyn std::any::Any + Send + 'static>) -> Error {
        let message = if let Some(message) = error.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = error.downcast_ref::<&str>() {
            (*message).to_owned()
        } else {
            "panic message is not a string".to_owned()
        };

        Error::Kernel(format!("kernel panicked: {}", message))
    }
}
