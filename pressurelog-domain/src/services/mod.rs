// Domain services
pub mod analytics;
pub mod classification;
pub mod reading;
pub mod validation;

// Re-export the service entry points
pub use reading::{ReadingService, ReadingServiceError, ReadingServiceTrait};
