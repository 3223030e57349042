// CLI module

pub mod args;

pub use args::{Cli, Commands, HighlightArgs, InitTemplatesArgs, RenderArgs};
