// Library entry point for proof-converter
// Exposes core modules for the binaries, tests and external use

pub mod config;
pub mod logging;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use services::converter;
pub use services::field;
