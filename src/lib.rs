pub mod combobox;
pub mod config;
pub mod http_client;
pub mod predict;
pub mod provider;
pub mod state;
pub mod team_cache;
pub mod team_search;
