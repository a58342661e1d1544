//! Host plugin that uploads images to im.ge and rewrites the resulting URLs
//! into markdown image references.
//!
//! The host calls the registered uploader with a batch of [`ImageRecord`]s,
//! then the after-upload hook fills in each record's display text.

pub mod config;
pub mod errors;
pub mod hooks;
pub mod host;
pub mod image;
pub mod plugin;
pub mod post_process;
pub mod security;
pub mod uploader;

pub use config::PluginConfig;
pub use errors::{AppError, AppResult};
pub use image::ImageRecord;
pub use plugin::{register, ImgePlugin, CONFIG_KEY, PLUGIN_ID};
