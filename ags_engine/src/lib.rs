//! Runtime core for AGS-format adventure games: opens a game directory,
//! wraps the decoded model in script objects and arbitrates audio channels.

pub mod api;
pub mod audio;
pub mod config;
pub mod resources;
pub mod runtime;
pub mod script;
pub mod session;

pub use config::EngineConfig;
pub use runtime::Runtime;
pub use session::{Session, SessionSummary};
