//! Error types for the Atelier asset store.
//!
//! This crate provides the error taxonomy shared by every Atelier component.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error maps onto a stable [`ErrorCondition`], which is what a transport
//! adapter translates into status codes.
//!
//! # Examples
//!
//! ```
//! use atelier_error::{AtelierResult, ErrorCondition, NotFoundError, NotFoundErrorKind};
//!
//! fn lookup() -> AtelierResult<String> {
//!     Err(NotFoundError::new(NotFoundErrorKind::Asset("42".to_string())))?
//! }
//!
//! let err = lookup().unwrap_err();
//! assert_eq!(err.condition(), ErrorCondition::NotFound);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod condition;
mod config;
mod conflict;
mod error;
mod not_found;
mod storage;
mod transform;
mod validation;

pub use condition::ErrorCondition;
pub use config::ConfigError;
pub use conflict::{ConflictError, ConflictErrorKind};
pub use error::{AtelierError, AtelierErrorKind, AtelierResult};
pub use not_found::{NotFoundError, NotFoundErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use transform::{TransformError, TransformErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
