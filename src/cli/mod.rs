//! Command handlers for the `powctl` binary

pub mod commands;

pub use commands::{
    cmd_check, cmd_decode, cmd_encode, cmd_next, cmd_params, load_config, CliResult,
};
