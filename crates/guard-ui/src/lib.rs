pub mod app;
pub mod components;
pub mod themes;
pub mod views;
