pub mod controller;
pub mod dtos;
pub mod errors;
pub mod service;

pub static QUEUE_NAME: &str = "transactions";
