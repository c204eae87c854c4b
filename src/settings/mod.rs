//! TOML settings plus the command line. See `bin/settings_demo.rs` for a
//! manual check of both.

mod cli;
pub use clap::{Parser, Subcommand};
pub use cli::*;

mod settings;
pub use settings::*;
