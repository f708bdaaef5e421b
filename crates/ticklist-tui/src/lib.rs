//! ticklist-tui: terminal front-end for [`ticklist_core::Board`].
//!
//! [`App`] holds the terminal-side state and key handling, [`view`] draws
//! it, and [`run_tui`] owns the terminal.

pub mod app;
pub mod run;
pub mod view;

pub use app::App;
pub use run::run_tui;
