//! workmux library crate.
//!
//! This library provides the core functionality for workmux, including:
//! - Project discovery across workspace roots
//! - The filter/sort/group picker engine
//! - tmux session management and one-key shortcut bindings
//! - Background refresh orchestration

pub mod agent;
pub mod app;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod event_loop;
pub mod git;
pub mod handlers;
pub mod keymap;
pub mod logging;
pub mod mux;
pub mod persist;
pub mod picker;
pub mod project;
pub mod refresh;
pub mod ui;
