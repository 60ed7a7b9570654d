//! Local filesystem adapters

mod directory;

pub use directory::ensure_dir;
