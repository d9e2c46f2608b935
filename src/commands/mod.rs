//! Command implementations

pub mod clustermesh;
pub mod status;
pub mod version;

pub use clustermesh::*;
pub use status::*;
pub use version::*;
