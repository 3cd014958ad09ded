//! # Machine Configuration
//!
//! Loads the starting reserve, the catalog and the session policy.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VEND_MIN_INSERT=50                                                 │
//! │     VEND_SELECTION_CARRY=reset                                         │
//! │     VEND_SHORTFALL=allow_negative                                      │
//! │                                                                         │
//! │  2. TOML Config File, first match of                                   │
//! │     --config <path>                                                    │
//! │     $VEND_CONFIG                                                       │
//! │     ~/.config/vend/machine.toml (Linux)                                │
//! │                                                                         │
//! │  3. Built-in Defaults (lowest priority)                                │
//! │     five denominations, four drinks                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [session]
//! min_insert = 10
//! selection_carry = "retain"   # retain | reset
//! shortfall = "reject"         # reject | allow_negative
//!
//! [[denominations]]
//! value = 1000
//! count = 5
//!
//! [[denominations]]
//! value = 100
//! count = 20
//!
//! [[catalog]]
//! name = "cola"
//! price = 1100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use vend_core::{
    validation, Catalog, CatalogItem, Ledger, Money, SelectionCarry, SessionOptions,
    ShortfallPolicy, VendingError, VendingMachine, VendingResult, MIN_INSERT_AMOUNT,
};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VEND_CONFIG";

// =============================================================================
// Session Settings
// =============================================================================

/// Business rules applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Smallest amount a single insertion may carry.
    #[serde(default = "default_min_insert")]
    pub min_insert: i64,

    /// Whether the selected total survives a return.
    #[serde(default)]
    pub selection_carry: SelectionCarry,

    /// What the reserve does when it runs out of a denomination.
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
}

fn default_min_insert() -> i64 {
    MIN_INSERT_AMOUNT
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            min_insert: default_min_insert(),
            selection_carry: SelectionCarry::default(),
            shortfall: ShortfallPolicy::default(),
        }
    }
}

impl SessionSettings {
    pub fn to_options(self) -> SessionOptions {
        SessionOptions {
            min_insert: Money::from_units(self.min_insert),
            shortfall: self.shortfall,
            selection_carry: self.selection_carry,
        }
    }
}

// =============================================================================
// Reserve and Catalog Entries
// =============================================================================

/// One `[[denominations]]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationEntry {
    pub value: i64,
    #[serde(default)]
    pub count: i64,
}

/// One `[[catalog]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub price: i64,
}

fn default_denominations() -> Vec<DenominationEntry> {
    [(1000, 5), (500, 10), (100, 20), (50, 20), (10, 50)]
        .into_iter()
        .map(|(value, count)| DenominationEntry { value, count })
        .collect()
}

fn default_catalog() -> Vec<CatalogEntry> {
    [("cola", 1100), ("cider", 1000), ("coffee", 700), ("water", 600)]
        .into_iter()
        .map(|(name, price)| CatalogEntry {
            name: name.to_string(),
            price,
        })
        .collect()
}

// =============================================================================
// Main Machine Configuration
// =============================================================================

/// Complete machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default = "default_denominations")]
    pub denominations: Vec<DenominationEntry>,

    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            session: SessionSettings::default(),
            denominations: default_denominations(),
            catalog: default_catalog(),
        }
    }
}

impl MachineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`machine.toml`)
    /// 3. Environment variables
    ///
    /// A path given explicitly (argument or `VEND_CONFIG`) must exist; the
    /// platform default is optional.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file at `path`.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading machine config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses config from a TOML document.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration without starting a session.
    pub fn validate(&self) -> ConfigResult<()> {
        validation::validate_min_insert(Money::from_units(self.session.min_insert))
            .map_err(VendingError::from)?;

        let ledger = self.ledger()?;
        let unit = ledger.smallest_value();
        for item in self.catalog()?.iter() {
            validation::validate_item_price(item.price, unit).map_err(VendingError::from)?;
        }

        Ok(())
    }

    fn ledger(&self) -> VendingResult<Ledger> {
        Ledger::from_pairs(self.denominations.iter().map(|d| (d.value, d.count)))
    }

    fn catalog(&self) -> VendingResult<Catalog> {
        Catalog::new(
            self.catalog
                .iter()
                .map(|item| CatalogItem::new(item.name.clone(), Money::from_units(item.price))),
        )
    }

    /// Builds the vending machine this configuration describes.
    pub fn build_machine(&self) -> VendingResult<VendingMachine> {
        VendingMachine::new(self.ledger()?, self.catalog()?, self.session.to_options())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup; split out so tests need not
    /// touch the process environment.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("VEND_MIN_INSERT") {
            match raw.trim().parse::<i64>() {
                Ok(min) => {
                    debug!(min_insert = min, "Overriding minimum insertion from environment");
                    self.session.min_insert = min;
                }
                Err(_) => warn!(value = %raw, "Ignoring non-numeric VEND_MIN_INSERT"),
            }
        }

        if let Some(raw) = lookup("VEND_SELECTION_CARRY") {
            match raw.parse() {
                Ok(carry) => {
                    debug!(%carry, "Overriding selection carry from environment");
                    self.session.selection_carry = carry;
                }
                Err(e) => warn!(value = %raw, "Ignoring VEND_SELECTION_CARRY: {}", e),
            }
        }

        if let Some(raw) = lookup("VEND_SHORTFALL") {
            match raw.parse() {
                Ok(policy) => {
                    debug!(%policy, "Overriding shortfall policy from environment");
                    self.session.shortfall = policy;
                }
                Err(e) => warn!(value = %raw, "Ignoring VEND_SHORTFALL: {}", e),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "vend", "vend")
            .map(|dirs| dirs.config_dir().join("machine.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MachineConfig::default();
        assert_eq!(config.session.min_insert, 10);
        assert_eq!(config.denominations.len(), 5);
        assert_eq!(config.catalog[0].name, "cola");
        assert!(config.validate().is_ok());

        let machine = config.build_machine().unwrap();
        // 5000 + 5000 + 2000 + 1000 + 500
        assert_eq!(machine.available_balance(), Money::from_units(13_500));
    }

    #[test]
    fn test_toml_parsing() {
        let config = MachineConfig::from_toml(
            r#"
            [session]
            min_insert = 50
            selection_carry = "reset"
            shortfall = "allow_negative"

            [[denominations]]
            value = 100
            count = 2

            [[denominations]]
            value = 50
            count = 4

            [[catalog]]
            name = "tea"
            price = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.session.min_insert, 50);
        assert_eq!(config.session.selection_carry, SelectionCarry::Reset);
        assert_eq!(config.session.shortfall, ShortfallPolicy::AllowNegative);
        assert_eq!(config.denominations.len(), 2);
        assert_eq!(config.catalog.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let config = MachineConfig::from_toml("[session]\nmin_insert = 100\n").unwrap();
        assert_eq!(config.session.min_insert, 100);
        assert_eq!(config.session.selection_carry, SelectionCarry::Retain);
        assert_eq!(config.denominations, default_denominations());
        assert_eq!(config.catalog, default_catalog());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = MachineConfig::from_toml("[[denominations]]\nvalue = \"ten\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MachineConfig::default();
        config.denominations.push(DenominationEntry { value: 100, count: 1 });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = MachineConfig::default();
        config.catalog.push(CatalogEntry {
            name: "gum".to_string(),
            price: 15,
        });
        assert!(config.validate().is_err());

        let mut config = MachineConfig::default();
        config.session.min_insert = 0;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::default();
        config.denominations = vec![DenominationEntry {
            value: 1000,
            count: i64::MAX / 10,
        }];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(config.build_machine().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MachineConfig::default();
        config.apply_overrides(env(&[
            ("VEND_MIN_INSERT", "100"),
            ("VEND_SELECTION_CARRY", "reset"),
            ("VEND_SHORTFALL", "allow-negative"),
        ]));

        assert_eq!(config.session.min_insert, 100);
        assert_eq!(config.session.selection_carry, SelectionCarry::Reset);
        assert_eq!(config.session.shortfall, ShortfallPolicy::AllowNegative);
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let mut config = MachineConfig::default();
        config.apply_overrides(env(&[
            ("VEND_MIN_INSERT", "lots"),
            ("VEND_SHORTFALL", "sometimes"),
        ]));

        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_read_error() {
        let path = PathBuf::from("/nonexistent/vend/machine.toml");
        let err = MachineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
