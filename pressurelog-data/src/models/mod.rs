// Data storage models
pub mod reading;

pub use reading::{ReadingFilter, StoredReading};
