// options.rs - Build option model
//
// The fixed set of build switches the recipe understands and their
// defaults. Keys pruned for a platform are absent afterwards, not false:
// `enabled` reads an absent key as disabled, `contains` tells them apart.

use std::collections::BTreeMap;

use phf::phf_map;
use serde::Serialize;

use crate::error::RecipeError;

/// Every option the recipe accepts, with its default value.
pub static DEFAULT_OPTIONS: phf::Map<&'static str, bool> = phf_map! {
    "shared" => false,
    "fPIC" => true,
    "simd" => true,
    "arith_encoder" => true,
    "arith_decoder" => true,
    "jpeg7_compat" => true,
    "jpeg8_compat" => true,
    "mem_src_dst" => true,
    "turbojpeg" => true,
    "java" => false,
    "bit12" => false,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    values: BTreeMap<String, bool>,
}

impl OptionSet {
    /// Merge caller overrides onto the defaults. Unknown keys are rejected
    /// up front, before anything touches the filesystem.
    pub fn resolve(overrides: &BTreeMap<String, bool>) -> Result<Self, RecipeError> {
        let mut values: BTreeMap<String, bool> = DEFAULT_OPTIONS
            .entries()
            .map(|(key, value)| (key.to_string(), *value))
            .collect();

        for (key, value) in overrides {
            if !DEFAULT_OPTIONS.contains_key(key.as_str()) {
                return Err(RecipeError::InvalidOption(format!(
                    "unknown option '{}'",
                    key
                )));
            }
            values.insert(key.clone(), *value);
        }

        Ok(OptionSet { values })
    }

    /// True when the option is present and enabled. Absent reads as
    /// disabled so stages running after platform pruning never have to
    /// special-case removed keys.
    pub fn enabled(&self, key: &str) -> bool {
        self.values.get(key).copied().unwrap_or(false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Drop an option entirely. Platform pruning uses this; downstream
    /// stages observe absence, not a false value.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|key| key.as_str())
    }
}

/// Parse a `name=value` override from the command line.
pub fn parse_override(spec: &str) -> Result<(String, bool), RecipeError> {
    let (key, value) = spec
        .split_once('=')
        .ok_or_else(|| RecipeError::InvalidOption(format!("expected name=value, got '{}'", spec)))?;

    let value = match value {
        "true" | "True" | "1" => true,
        "false" | "False" | "0" => false,
        other => {
            return Err(RecipeError::InvalidOption(format!(
                "option '{}' takes true or false, got '{}'",
                key, other
            )));
        }
    };

    Ok((key.to_string(), value))
}
