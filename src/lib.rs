pub mod api;
pub mod app;
pub mod config;
pub mod forms;
pub mod http_client;
pub mod provider;
pub mod session;
pub mod state;
pub mod ui;
