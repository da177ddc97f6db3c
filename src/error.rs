use std::error::Error;
use std::fmt;

/// The operands of a matrix operation had incompatible shapes.
///
/// `left` and `right` are the `(rows, columns)` of the two operands, in the order the
/// operation received them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ShapeError {
    pub operation: &'static str,
    pub left: (usize, usize),
    pub right: (usize, usize),
}

impl ShapeError {
    pub(crate) fn new(operation: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        Self {
            operation,
            left,
            right,
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: incompatible shapes {}x{} and {}x{}",
            self.operation, self.left.0, self.left.1, self.right.0, self.right.1,
        )
    }
}

impl Error for ShapeError {}

#[derive(Debug)]
pub enum NetworkError {
    Shape(ShapeError),
    UnknownActivation(String),
    Json(serde_json::Error),
}

impl From<ShapeError> for NetworkError {
    fn from(error: ShapeError) -> Self {
        Self::Shape(error)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(error) => fmt::Display::fmt(error, f),
            Self::UnknownActivation(name) => write!(f, "unknown activation function \"{name}\""),
            Self::Json(error) => write!(f, "invalid network data: {error}"),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(error) => Some(error),
            Self::UnknownActivation(_) => None,
            Self::Json(error) => Some(error),
        }
    }
}
