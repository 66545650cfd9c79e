//! Utility modules for autodoc.

pub mod fs;
pub mod logging;

pub use fs::interface_file_name;
