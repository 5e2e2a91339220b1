//! Lowering configuration
//!
//! Loaded from the `[lowering]`-style TOML the driver passes in. Every field
//! has a default, so an empty document is a valid configuration.

use indexmap::IndexMap;
use lk_ir::{FloatType, IntType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::de;

/// Built-in functions handled by the external lowering capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinKind {
    /// Print arguments followed by a newline
    Print,
    /// Length of an array, string or slice
    Len,
}

/// Configuration for expression lowering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerConfig {
    /// Types given to untyped literals
    pub literals: LiteralConfig,

    /// Element addressing
    pub index: IndexConfig,

    /// Identifiers recognised as built-ins when called
    ///
    /// A `[builtins]` table in the document replaces the default set.
    pub builtins: IndexMap<String, BuiltinKind>,
}

/// Default types for literals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralConfig {
    /// Width of integer literals (always signed)
    pub int_bits: u32,

    /// Type of floating-point literals
    pub float: FloatType,

    /// Width of character literals (always signed)
    pub rune_bits: u32,
}

/// Element addressing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Width of the leading zero offset in element address computations
    pub offset_bits: u32,
}

impl Default for LowerConfig {
    fn default() -> Self {
        let mut builtins = IndexMap::new();
        builtins.insert("println".to_string(), BuiltinKind::Print);
        builtins.insert("len".to_string(), BuiltinKind::Len);

        Self {
            literals: LiteralConfig::default(),
            index: IndexConfig::default(),
            builtins,
        }
    }
}

impl Default for LiteralConfig {
    fn default() -> Self {
        Self {
            int_bits: 64,
            float: FloatType::F64,
            rune_bits: 32,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { offset_bits: 32 }
    }
}

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was being read
        path: PathBuf,
        /// I/O failure
        source: io::Error,
    },

    /// The document is not valid TOML for this schema
    #[error("invalid lowering configuration: {0}")]
    Parse(#[from] de::Error),

    /// A value is outside its permitted range
    #[error("invalid lowering configuration: {field} = {value} (expected 1..=64)")]
    Width {
        /// Offending key
        field: &'static str,
        /// Offending value
        value: u32,
    },
}

impl LowerConfig {
    /// Parses a configuration from TOML text
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::Width`] for out-of-range widths.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Built-in bound to `name`, if any
    pub fn builtin(&self, name: &str) -> Option<BuiltinKind> {
        self.builtins.get(name).copied()
    }

    /// Type of untyped integer literals
    pub fn int_literal_type(&self) -> IntType {
        IntType::new(self.literals.int_bits, true)
    }

    /// Type of character literals
    pub fn rune_literal_type(&self) -> IntType {
        IntType::new(self.literals.rune_bits, true)
    }

    /// Type of the leading zero offset in element addresses
    pub fn offset_type(&self) -> IntType {
        IntType::new(self.index.offset_bits, true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("literals.int_bits", self.literals.int_bits),
            ("literals.rune_bits", self.literals.rune_bits),
            ("index.offset_bits", self.index.offset_bits),
        ];
        for (field, value) in widths {
            if !(1..=64).contains(&value) {
                return Err(ConfigError::Width { field, value });
            }
        }
        Ok(())
    }
}
