//! Project layout and manifest files.
pub mod manifest;
pub mod project;

pub use project::Project;
