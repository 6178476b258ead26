pub mod config;
pub mod loader;
pub mod names;
pub mod records;
