// PressureLog Domain
// This crate contains the business logic for the PressureLog application

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Re-export the repository module from pressurelog-data for convenience
pub use pressurelog_data::repository;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
