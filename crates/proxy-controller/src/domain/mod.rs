//! Domain layer for the controller.

pub mod config;

pub use config::ControllerConfig;
