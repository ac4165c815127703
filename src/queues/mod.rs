pub mod azure;
pub mod errors;
#[cfg(test)]
pub mod in_memory;
pub mod queue_service;
