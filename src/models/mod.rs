pub mod audit;
pub mod enums;
pub mod record;

pub use audit::*;
pub use enums::*;
pub use record::*;
