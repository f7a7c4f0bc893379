// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy shared by every pipeline stage

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the meshbool library
#[derive(Debug, Error)]
pub enum MeshBoolError {
    /// File extension is neither `.stl` nor `.ply`
    #[error("File must be STL or PLY: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Boolean operation name outside union/intersection/difference
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Sphere radius must be strictly positive and finite
    #[error("Invalid sphere radius: {0}")]
    InvalidRadius(f64),

    /// A stage needed vertices but received none
    #[error("Mesh has no vertices")]
    EmptyMesh,

    /// Face connectivity or cell layout is inconsistent
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Mesh fixer rejected the input or failed during repair
    #[error("Repair failed: {0}")]
    Repair(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PLY header or payload is malformed
    #[error("PLY error: {0}")]
    Ply(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Viewer error: {0}")]
    Viewer(String),
}

impl MeshBoolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MeshBoolError>;
