mod export;
mod fetch;
mod import;
mod source;

pub use export::*;
pub use fetch::*;
pub use import::*;
pub use source::*;
