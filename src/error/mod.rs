//! Error Handling Module
//!
//! Every failure the dispatch core can observe is represented by [`VaultError`].
//! The dispatcher never lets these escape as faults: they are folded into an
//! [`crate::types::ApiResult`] carrying a normalized response status.
//!
//! # Example
//!
//! ```rust,ignore
//! use docvault::error::{ErrorCategory, VaultError};
//!
//! let error = VaultError::InvalidArgument("file part has no source".into());
//! assert_eq!(error.category(), ErrorCategory::Client);
//! ```

mod conversions;
pub mod types;

pub use types::*;
