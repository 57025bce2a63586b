//! Shared data types: normalized results and response shape descriptors.

pub mod response;
pub mod shape;

pub use response::*;
pub use shape::*;
