//! Console harness for running the extension without a game server.

mod commands;
mod console;
mod repl;

pub use commands::Cli;
pub use console::ConsoleEngine;
pub use repl::run_repl;
