//! Data-driven question content and loaders.
//!
//! This crate houses the static trivia content and provides loaders for
//! RON/TOML data files:
//! - Question banks (data-driven via RON)
//! - Quest hall sequences (data-driven via RON)
//! - Rule sets (data-driven via TOML)
//!
//! A standard bank, hall sequence, and rule set ship embedded in the crate so
//! the engines are usable without any external files. Content is consumed by
//! the runtime session and never appears in session state beyond the
//! questions actually drawn.
//!
//! All loaders use quiz-core types directly with serde for RON/TOML
//! deserialization.

#[cfg(feature = "loaders")]
pub mod builtin;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use builtin::{standard_bank, standard_halls, standard_rules};

#[cfg(feature = "loaders")]
pub use loaders::{BankLoader, HallLoader, RulesLoader};
