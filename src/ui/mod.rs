//! Terminal user interface.
//!
//! This module provides the command parser, the controller that maps user
//! intents onto the engine, and the application loop that ties them to
//! stdin and the refresh tick.

pub mod application;
pub mod commands;
pub mod controller;
pub mod utils;

pub use {
    application::{Flow, PlayerApplication},
    commands::Command,
    controller::PlayerController,
};
