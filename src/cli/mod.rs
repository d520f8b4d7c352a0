//! Command-line interface for training, playing against and inspecting the engine

pub mod commands;
pub mod config;
pub mod output;
