// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds the CLI, logging setup and the terminal loop.
pub mod app;
pub mod app_dirs;
pub mod collaborators;
pub mod combo;
pub mod config;
pub mod confetti;
pub mod cues;
pub mod engine;
pub mod error;
pub mod moves;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;
