// Application layer: loading, caching and reporting on top of the pure
// aggregation core in `domain`.

pub mod cache;
pub mod config;
pub mod error;
pub mod reporting;
pub mod service;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
