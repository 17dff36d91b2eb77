#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got an invalid parameter value in a function
    InvalidParameter(String),
    /// The number of entries or the shape of some input data does not match
    /// the expected one
    ShapeMismatch(String),
    /// The requested feature is not implemented
    NotSupported(String),
    /// Some structures in a batch can compute a property that others can not
    CapabilityMismatch(String),
    /// Two `TensorMap` do not have the same set of keys
    KeyMismatch(String),
    /// The requested gradient does not exist in a block
    UnknownParameter(String),
    /// Error while serializing/deserializing data
    Json(serde_json::Error),
    /// Errors coming from metatensor
    Metatensor(metatensor::Error),
    /// Error related to reading structure files
    Chemfiles(String),
    /// Error used for failed internal consistency check, i.e. bugs in
    /// equisolve.
    Internal(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::ShapeMismatch(e) => write!(f, "shape mismatch: {}", e),
            Error::NotSupported(e) => write!(f, "not supported: {}", e),
            Error::CapabilityMismatch(e) => write!(f, "capability mismatch: {}", e),
            Error::KeyMismatch(e) => write!(f, "key mismatch: {}", e),
            Error::UnknownParameter(e) => write!(f, "unknown parameter: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::Metatensor(e) => write!(f, "metatensor error: {}", e),
            Error::Chemfiles(e) => write!(f, "chemfiles error: {}", e),
            Error::Internal(e) => write!(f, "internal equisolve error (this is likely a bug, please report it): {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidParameter(_) |
            Error::ShapeMismatch(_) |
            Error::NotSupported(_) |
            Error::CapabilityMismatch(_) |
            Error::KeyMismatch(_) |
            Error::UnknownParameter(_) |
            Error::Chemfiles(_) |
            Error::Internal(_) => None,
            Error::Json(e) => Some(e),
            Error::Metatensor(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

impl From<metatensor::Error> for Error {
    fn from(error: metatensor::Error) -> Error {
        return Error::Metatensor(error);
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(error: ndarray::ShapeError) -> Error {
        Error::ShapeMismatch(error.to_string())
    }
}
