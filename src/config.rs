// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Store configuration system

use crate::io::{ScalarType, DEFAULT_TITLE};
use crate::store::StoreOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read by [`StoreConfig::load`] when present in the working directory
pub const CONFIG_FILE: &str = "meshvtk.toml";

/// Encoding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Write BINARY instead of ASCII
    pub binary: bool,
    /// Transpose attribute and field tables on read and write
    pub switch_rows_cols: bool,
    /// Column cap for scalar and field tables on write
    pub max_columns: Option<usize>,
    /// Element type for POINTS on write
    pub point_type: ScalarType,
    /// Title line written to the header
    pub title: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            binary: false,
            switch_rows_cols: false,
            max_columns: None,
            point_type: ScalarType::Float,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: StoreConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHVTK_*` overrides from a key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(binary) = lookup("MESHVTK_BINARY") {
            self.binary = parse_flag(&binary).context("Invalid MESHVTK_BINARY")?;
        }

        if let Some(switch) = lookup("MESHVTK_SWITCH_ROWS_COLS") {
            self.switch_rows_cols =
                parse_flag(&switch).context("Invalid MESHVTK_SWITCH_ROWS_COLS")?;
        }

        if let Some(max) = lookup("MESHVTK_MAX_COLUMNS") {
            let max = max.trim();
            // empty or zero removes the cap
            self.max_columns = match max.parse::<usize>() {
                _ if max.is_empty() => None,
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(e) => {
                    return Err(e).with_context(|| format!("Invalid MESHVTK_MAX_COLUMNS: {max}"))
                }
            };
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

impl From<StoreConfig> for StoreOptions {
    fn from(config: StoreConfig) -> Self {
        StoreOptions {
            binary: config.binary,
            switch_rows_cols: config.switch_rows_cols,
            max_columns: config.max_columns,
            point_type: config.point_type,
            title: config.title,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
