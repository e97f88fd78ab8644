// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration file and environment overrides

use crate::geometry::check_tolerance;
use crate::radar::RadarConfig;
use crate::repair::{IssueThresholds, RepairOptions, RepairStep};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "meshdoctor.toml";

/// Tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repair pipeline options
    pub repair: RepairOptions,
    /// Limits used when pruning meshes
    pub prune: IssueThresholds,
    /// Radar imaging parameters
    pub radar: RadarConfig,
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config
            .repair
            .validate()
            .with_context(|| format!("Invalid repair options in {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshdoctor.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHDOCTOR_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(tolerance) = lookup("MESHDOCTOR_MERGE_TOLERANCE") {
            let parsed: f64 = tolerance
                .trim()
                .parse()
                .with_context(|| format!("Invalid MESHDOCTOR_MERGE_TOLERANCE: {}", tolerance))?;
            self.set_merge_tolerance(parsed)
                .with_context(|| format!("Invalid MESHDOCTOR_MERGE_TOLERANCE: {}", tolerance))?;
        }

        if let Some(ensure) = lookup("MESHDOCTOR_ENSURE_MANIFOLD") {
            self.repair.ensure_manifold = matches!(
                ensure.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Some(skip) = lookup("MESHDOCTOR_SKIP") {
            self.repair.skip_operations = parse_step_list(&skip)?;
        }

        Ok(())
    }

    /// Set the vertex merge tolerance, rejecting zero, negative and non-finite values
    pub fn set_merge_tolerance(&mut self, tolerance: f64) -> Result<()> {
        self.repair.merge_tolerance = check_tolerance(tolerance)?;
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

/// Comma separated step names; blank entries are ignored
pub fn parse_step_list(list: &str) -> Result<Vec<RepairStep>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<RepairStep>().map_err(|e| anyhow!(e)))
        .collect()
}
