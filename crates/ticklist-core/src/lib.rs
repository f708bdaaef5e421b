pub mod board;
pub mod cli;
pub mod config;
pub mod overlay;
pub mod render;
pub mod script;
pub mod task;

pub use board::{Board, BoardError, DUPLICATE_ALERT, Toggle};
pub use overlay::{HideHandle, Overlay, OverlaySettings, RearmPolicy};
pub use task::{Task, TaskId};
