//! Execution layer
//!
//! - `http`: client construction, header building, interceptors and the
//!   transport seam
//! - `dispatcher`: executes one request descriptor and shapes the response

pub mod dispatcher;
pub mod http;

pub use dispatcher::Dispatcher;
