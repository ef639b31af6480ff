mod manager;
mod types;

pub use manager::FlowSessionManager;
pub use types::{FlowSession, FlowSessionStatus, StepRecord};
