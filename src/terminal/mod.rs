//! Line-oriented front end: stdin commands in, ANSI views out.

pub mod input;
pub mod render;

pub use input::{parse_line, Input, WorkerCommand, HELP};
pub use render::{render_history, render_view};
