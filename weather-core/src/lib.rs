//! Core library for the `weather` desktop window.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the weather provider (OpenWeatherMap)
//! - The weather reading model and unit conversion
//! - Day/night background choice and image compositing
//! - UI-agnostic window state
//!
//! It is used by `weather-gui`, but nothing in it needs a display.

pub mod config;
pub mod daypart;
pub mod model;
pub mod provider;
pub mod render;
pub mod shell;

pub use config::Config;
pub use daypart::{Background, background_for, current_hour};
pub use model::WeatherReading;
pub use provider::{FetchError, WeatherProvider, provider_from_config};
pub use render::{AssetDir, Frame, ImageCrate, ImagePort, RenderError};
pub use shell::{Effect, Labels, ShellState};
