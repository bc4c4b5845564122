pub mod environment;
pub mod manager;
pub mod planner;

pub use environment::{AdapterInfo, Environment};
pub use manager::Manager;
