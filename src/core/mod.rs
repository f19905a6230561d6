pub mod layout;
pub mod monitor_manager;
pub mod monitor_poller;
pub mod monitor_selection;
pub mod snapshot_source;
