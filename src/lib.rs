//! This file is the root of the `samar_core` Rust crate.
//!
//! samar obfuscates tabular data deterministically: given typed Arrow
//! columns and a seed, it produces same-typed columns whose rows are
//! synthetic but keep the statistical shape of the source (cardinalities,
//! magnitude and length distributions, null/empty probabilities, local
//! continuity of floats and timestamps, date components, and
//! natural-looking strings). Identical input and seed always give
//! byte-identical output, and equally-named non-text columns of different
//! tables transform identically under one seed, so obfuscated tables can
//! still be JOINed.
//!
//! The crate root is strictly limited to:
//! 1.  Declaring all the top-level modules of the library so the compiler
//!     knows they exist.
//! 2.  Re-exporting the handful of types a driver needs.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod kernels;
pub mod markov;
pub mod models;
pub mod obfuscator;
pub mod types;

mod persist;

//==================================================================================
// 2. Public API Surface
//==================================================================================
pub use config::SamarConfig;
pub use error::SamarError;
pub use markov::MarkovModelParameters;
pub use obfuscator::{ColumnSchema, Obfuscator, MODEL_FORMAT_VERSION};
pub use types::SamarDataType;
