// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run configuration: `meshbool.toml` plus environment overrides

use crate::error::{MeshBoolError, Result};
use crate::geometry::{BooleanOp, DEFAULT_PHI_RESOLUTION, DEFAULT_THETA_RESOLUTION};
use crate::pipeline::SPHERE_SCALE;
use crate::repair::RepairOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory
pub const CONFIG_FILE: &str = "meshbool.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boolean operation applied as `mesh <op> sphere`
    pub operation: BooleanOp,
    /// Where to write the result mesh, if anywhere
    pub output: Option<PathBuf>,
    /// Where to write the JSON run summary, if anywhere
    pub summary: Option<PathBuf>,
    pub repair: RepairConfig,
    pub sphere: SphereConfig,
    pub viewer: ViewerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operation: BooleanOp::Difference,
            output: None,
            summary: None,
            repair: RepairConfig::default(),
            sphere: SphereConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub options: RepairOptions,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: RepairOptions::default(),
        }
    }
}

/// Cutter sphere sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    /// Radius as a fraction of the mesh bounding box diagonal
    pub scale: f64,
    pub theta_resolution: u32,
    pub phi_resolution: u32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            scale: SPHERE_SCALE,
            theta_resolution: DEFAULT_THETA_RESOLUTION,
            phi_resolution: DEFAULT_PHI_RESOLUTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub enabled: bool,
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// RGB per displayed mesh; missing entries render white
    pub colors: Vec<[u8; 3]>,
    pub background: [u8; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "meshbool".to_string(),
            width: 1024.0,
            height: 768.0,
            colors: Vec::new(),
            background: [30, 30, 36],
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeshBoolError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            MeshBoolError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `meshbool.toml` from the working directory if present, else
    /// defaults, then environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHBOOL_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(operation) = lookup("MESHBOOL_OPERATION") {
            self.operation = operation.parse()?;
        }

        if let Some(repair) = lookup("MESHBOOL_REPAIR") {
            self.repair.enabled = parse_flag("MESHBOOL_REPAIR", &repair)?;
        }

        if let Some(scale) = lookup("MESHBOOL_SCALE") {
            self.sphere.scale = scale.trim().parse().map_err(|_| {
                MeshBoolError::Config(format!("MESHBOOL_SCALE is not a number: {}", scale))
            })?;
        }

        if let Some(no_view) = lookup("MESHBOOL_NO_VIEW") {
            self.viewer.enabled = !parse_flag("MESHBOOL_NO_VIEW", &no_view)?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sphere.scale.is_finite() && self.sphere.scale > 0.0) {
            return Err(MeshBoolError::Config(format!(
                "sphere scale must be positive, got {}",
                self.sphere.scale
            )));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| MeshBoolError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| MeshBoolError::io(path, e))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MeshBoolError::Config(format!(
            "{} must be a boolean, got {}",
            key, other
        ))),
    }
}
