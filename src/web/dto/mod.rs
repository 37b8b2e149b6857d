//! Data Transfer Objects for the Web API.
//!
//! Proxy bodies live in [`crate::proxy::dto`] since they mirror the
//! analytics service rather than this API.

pub mod request;
pub mod response;
pub mod validation;

pub use request::*;
pub use response::*;
pub use validation::{ValidatedJson, ValidatedPath};
