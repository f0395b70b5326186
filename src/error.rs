use std::fmt;

/// Failures that can surface while loading scene assets or writing output.
/// Kept deliberately small — geometric/material construction never fails at
/// runtime, only I/O and the OBJ parser's text format can.
#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    ObjParse { line: usize, message: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "I/O error: {e}"),
            RenderError::ObjParse { line, message } => {
                write!(f, "OBJ parse error at line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            RenderError::ObjParse { .. } => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Io(e)
    }
}
