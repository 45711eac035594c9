pub mod extraction;
pub mod risk;
pub mod triage;

pub use triage::*;
