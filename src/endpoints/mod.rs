//! Endpoint call sites.
//!
//! Each call site knows one URL template, one verb and one response type and
//! delegates everything else to the [`crate::Dispatcher`].

pub mod documents;

pub use documents::Documents;
