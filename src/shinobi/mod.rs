pub mod api_client;
pub mod login;
pub mod models;
pub mod monitor_entity;

pub use api_client::ShinobiClient;
