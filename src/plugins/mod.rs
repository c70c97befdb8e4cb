pub mod commands;
pub mod core;
pub mod geolocation;
pub mod sim;
