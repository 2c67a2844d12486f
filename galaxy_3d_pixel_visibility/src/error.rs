//! Error types for the pixel visibility subsystem
//!
//! Visibility estimation itself never fails from the caller's point of view
//! (every failure degrades to a conservative visibility value). These errors
//! cover configuration and internal pool growth.

use std::fmt;

/// Result type for pixel visibility operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pixel visibility errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Configuration value out of range
    InvalidConfig(String),

    /// An arena reached the limit imposed by its index encoding
    PoolExhausted(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::PoolExhausted(msg) => write!(f, "Pool exhausted: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an `Error::InvalidConfig` from it
///
/// # Example
///
/// ```ignore
/// let err = pixvis_err!("galaxy3d::PixelVisibility", "bad value: {}", v);
/// ```
#[macro_export]
macro_rules! pixvis_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::pixvis_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidConfig(message)
    }};
}

/// Log an ERROR message and return `Err(Error::InvalidConfig)` from the
/// enclosing function
#[macro_export]
macro_rules! pixvis_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::pixvis_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
