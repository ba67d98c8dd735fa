//! Persona domain module.
//!
//! A persona is a named system-prompt configuration shaping the assistant's
//! tone for subsequent turns.
//!
//! # Module Structure
//!
//! - `model`: Core persona model (`Persona`)
//! - `preset`: Built-in default personas
//! - `registry`: Ordered, immutable persona registry with TOML loading

mod model;
mod preset;
mod registry;

// Re-export public API
pub use model::Persona;
pub use preset::default_presets;
pub use registry::{PersonaRegistry, RegistryFile};
