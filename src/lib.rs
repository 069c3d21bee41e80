// library crate for railblocks
// the binary in main.rs is a thin wrapper over `cli`

pub mod blocks;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod devices;
pub mod editor;
pub mod interpreter;
pub mod logging;
pub mod snap;
