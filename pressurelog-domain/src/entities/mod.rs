// Domain entities and value objects
pub mod category;
pub mod conversions;
pub mod reading;

// Re-export common types for easier imports
pub use category::{CategoryInfo, ReadingCategory};
pub use reading::{CreateReadingRequest, InvalidReading, Reading, UpdateReadingRequest};
