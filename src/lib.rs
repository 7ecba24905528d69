pub mod config;
pub mod jobs;
pub mod logging;
pub mod playlist;
pub mod radio_browser;
pub mod radio_garden;
pub mod stations;
pub mod stream_probe;
pub mod stream_validation;
