//! This module defines the core, strongly-typed data representations used
//! throughout the samar pipeline.
//!
//! It currently includes the canonical `SamarDataType` enum which replaces
//! fragile string-based types with a safe, serializable, and Arrow-compatible enum.

pub mod samar_data_type;

// Re-export the main type(s) for easier access.
pub use samar_data_type::SamarDataType;
