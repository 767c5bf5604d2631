//! # fieldwatch-cli
//!
//! The `fieldwatch` command-line tool:
//! - `serve`: run the report persistence server
//! - `watch`: follow the outbreak map as it syncs
//! - `report`: save a detection at a position
//! - `clusters`: print the current zones once
//! - `clear`: delete every stored report
//! - `config`: inspect and edit the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod render;

pub use cli::{Cli, Command, ConfigAction, ReportArgs};
pub use config::FieldwatchConfig;
pub use error::{Error, Result};
