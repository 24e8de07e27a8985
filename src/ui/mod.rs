//! Terminal UI views.
//!
//! Each view module exposes a `render` function drawing into a region of
//! the frame from the shared [`App`](crate::app::App) state.

pub mod common;
pub mod detail;
pub mod format;
pub mod overview;
pub mod queues;
pub mod theme;
pub mod vhosts;

pub use theme::Theme;
