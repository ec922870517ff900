pub mod api_types;
pub mod bundle;
pub mod client;
pub mod types;
