// PressureLog Data
// This crate handles data access for blood pressure readings

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
