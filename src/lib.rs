pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod reducer;
pub mod scorer;
pub mod search;
pub mod synthetic;
// cmd and reports belong to the binary (main.rs).
