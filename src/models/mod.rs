pub mod assessment;
pub mod diagnosis;
pub mod enums;
pub mod record;
pub mod vital_sign;
pub mod warning;

pub use assessment::*;
pub use diagnosis::*;
pub use enums::*;
pub use record::*;
pub use vital_sign::*;
pub use warning::*;
