pub mod config;
pub mod csv;
pub mod geocoding;
pub mod llm_clients;
pub mod request_counter;
pub mod response;
