pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod ids;
pub mod insight;
pub mod library;
pub mod model;
pub mod playback;
pub mod scan;
pub mod ui;
