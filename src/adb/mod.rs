pub mod client;
pub mod constants;
pub mod frame;
pub mod tracker;
pub mod types;
