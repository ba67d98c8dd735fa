//! Ordered persona registry with TOML file loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::model::Persona;
use super::preset::default_presets;
use crate::error::{BanterError, Result};

/// Root of the persona config file (`[[persona]]` tables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(rename = "persona")]
    pub personas: Vec<Persona>,
}

/// A fixed, ordered mapping from persona key to persona.
///
/// The registry is loaded once at startup and immutable at runtime. It is
/// never empty; the first entry is the default persona.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Creates a registry from the given personas, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `personas` is empty or contains a
    /// duplicate key.
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        if personas.is_empty() {
            return Err(BanterError::config("persona registry must not be empty"));
        }
        for (i, persona) in personas.iter().enumerate() {
            if personas[..i].iter().any(|p| p.key == persona.key) {
                return Err(BanterError::config(format!(
                    "duplicate persona key '{}'",
                    persona.key
                )));
            }
        }
        Ok(Self { personas })
    }

    /// Creates a registry holding the built-in presets.
    pub fn with_presets() -> Self {
        Self {
            personas: default_presets(),
        }
    }

    /// Loads a registry from a TOML file of `[[persona]]` tables.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read, a `Format` error if
    /// it is not valid TOML of the expected shape, and a `Config` error if
    /// the resulting registry would be empty.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let file: RegistryFile = toml::from_str(&text)?;
        Self::new(file.personas)
    }

    /// Loads the registry from the default config location
    /// (`~/.config/banter/personas.toml`), falling back to the built-in
    /// presets when no file is present.
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading persona registry");
                Self::from_toml_file(&path)
            }
            _ => Ok(Self::with_presets()),
        }
    }

    /// The default persona config path (`~/.config/banter/personas.toml`).
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("banter").join("personas.toml"))
    }

    /// Persona keys in registry insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.personas.iter().map(|p| p.key.as_str())
    }

    /// All personas in registry insertion order.
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Looks up a persona by key.
    ///
    /// # Errors
    ///
    /// Returns an `UnknownPersona` error listing the valid keys when the key
    /// is absent.
    pub fn get(&self, key: &str) -> Result<&Persona> {
        self.personas.iter().find(|p| p.key == key).ok_or_else(|| {
            BanterError::unknown_persona(key, self.keys().map(str::to_string).collect())
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.personas.iter().any(|p| p.key == key)
    }

    /// The default persona (first registry entry).
    pub fn default_persona(&self) -> &Persona {
        // The registry is never empty by construction.
        &self.personas[0]
    }

    pub fn default_key(&self) -> &str {
        &self.default_persona().key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn presets_keep_insertion_order() {
        let registry = PersonaRegistry::with_presets();
        let keys: Vec<&str> = registry.keys().collect();

        assert_eq!(keys, vec!["professional", "creative", "technical"]);
        assert_eq!(registry.default_key(), "professional");
    }

    #[test]
    fn get_unknown_key_lists_valid_keys() {
        let registry = PersonaRegistry::with_presets();

        let err = registry.get("pirate").unwrap_err();
        assert!(err.is_unknown_persona());
        assert!(err.to_string().contains("professional"));
        assert!(err.to_string().contains("technical"));
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(PersonaRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let presets = default_presets();
        let mut personas = vec![presets[0].clone(), presets[0].clone()];
        personas[1].name = "Copy".to_string();

        assert!(PersonaRegistry::new(personas).is_err());
    }

    #[test]
    fn loads_registry_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[persona]]
key = "pirate"
name = "Pirate Captain"
prompt = "You are a pirate captain. Answer in pirate speak."

[[persona]]
key = "poet"
name = "Court Poet"
prompt = "You answer only in rhyming couplets."
"#
        )
        .unwrap();

        let registry = PersonaRegistry::from_toml_file(file.path()).unwrap();

        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["pirate", "poet"]);
        assert_eq!(registry.default_key(), "pirate");
        assert_eq!(registry.get("poet").unwrap().name, "Court Poet");
    }

    #[test]
    fn missing_toml_file_is_io_error() {
        let err = PersonaRegistry::from_toml_file("/nonexistent/personas.toml").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn malformed_toml_file_is_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[").unwrap();

        let err = PersonaRegistry::from_toml_file(file.path()).unwrap_err();
        assert!(err.is_format());
    }
}
