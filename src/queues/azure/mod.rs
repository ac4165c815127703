pub mod client;
pub mod connection_string;
pub mod shared_key;

pub static API_VERSION: &str = "2021-12-02";
