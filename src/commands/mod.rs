//! CLI commands implementation

pub mod ingest;
pub mod qualify;
pub mod status;

pub use ingest::*;
pub use qualify::*;
pub use status::*;
