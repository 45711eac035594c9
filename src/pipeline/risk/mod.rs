pub mod types;
pub mod policy;
pub mod scripted;

pub use types::*;
pub use policy::*;
pub use scripted::*;
