//! Dotfile backup and restore engine.
//!
//! Mirrors a machine's dotfiles and package list into a portable backup
//! folder (`Brewfile` plus a GNU stow tree under `STOW/`) and restores them
//! onto another machine, driven by a small declarative configuration file.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]** parses the configuration file
//! - **[`resources`]** classifies dotfile link state and moves files
//! - **[`gateway`]** drives brew, stow, git and plugin managers through [`exec`]
//! - **[`modules`]** holds the registry of module descriptors
//! - **[`orchestrator`]** runs the enabled modules and collects a report
//! - **[`commands`]** wires it together for the `backup` and `restore` subcommands
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod gateway;
pub mod logging;
pub mod modules;
pub mod orchestrator;
pub mod resources;
