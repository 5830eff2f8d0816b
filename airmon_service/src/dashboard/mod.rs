//! Interactive terminal dashboard.
//!
//! Submodules:
//! - `commands` — parses operator input lines.
//! - `render` — turns snapshots, answers and settings into text.
//! - `session` — operator choices and the last successful snapshot.

pub mod commands;
pub mod render;
pub mod session;

pub use commands::{parse_command, Command, CommandError, Question};
pub use session::{FetchRequest, Session};
