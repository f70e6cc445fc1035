mod types;
mod commands;
mod config;
mod engine;
mod handlers;
mod error;
mod import;
mod localization;
mod state;
mod keyboard;

pub use types::*;
pub use commands::*;
pub use config::*;
pub use engine::*;
pub use handlers::*;
pub use error::*;
pub use import::*;
pub use localization::*;
pub use state::*;
pub use keyboard::*;
