pub mod auth;
pub mod configuration;
pub mod db;
pub mod server;
pub mod telemetry;
pub mod test_utils;
