// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL and PLY mesh importer

use super::arrays::{from_cells, CellArray};
use super::MeshFormat;
use crate::error::{MeshBoolError, Result};
use crate::geometry::Mesh;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Load a mesh, choosing the reader from the file extension.
/// Polygonal faces are fan-triangulated.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;

    let file = File::open(path).map_err(|e| MeshBoolError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mesh = match format {
        MeshFormat::Stl => read_stl(&mut reader, path)?,
        MeshFormat::Ply => read_ply(&mut reader)?,
    };

    info!(
        format = %format,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "mesh loaded"
    );
    Ok(mesh)
}

/// Read ASCII or binary STL; `stl_io` merges identical corner positions
pub fn read_stl<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).map_err(|e| MeshBoolError::io(path, e))?;

    let vertices: Vec<[f64; 3]> = stl
        .vertices
        .iter()
        .map(|v| [v[0] as f64, v[1] as f64, v[2] as f64])
        .collect();

    let mut cells = CellArray::new();
    for face in &stl.faces {
        cells.push_cell(&face.vertices);
    }

    from_cells(&vertices, &cells)
}

/// Read a PLY file with a `vertex` element (`x`, `y`, `z`) and a `face`
/// element carrying `vertex_indices` or `vertex_index`
pub fn read_ply<R: BufRead>(reader: &mut R) -> Result<Mesh> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(reader)
        .map_err(|e| MeshBoolError::Ply(e.to_string()))?;

    let vertex_elements = ply
        .payload
        .get("vertex")
        .ok_or_else(|| MeshBoolError::Ply("missing 'vertex' element".to_string()))?;

    let vertices = vertex_elements
        .iter()
        .map(|element| {
            Ok([
                scalar(element, "x")?,
                scalar(element, "y")?,
                scalar(element, "z")?,
            ])
        })
        .collect::<Result<Vec<[f64; 3]>>>()?;

    let mut cells = CellArray::new();
    if let Some(face_elements) = ply.payload.get("face") {
        for element in face_elements {
            cells.push_cell(&face_indices(element)?);
        }
    }

    let (_, skipped) = cells.triangulate();
    if skipped > 0 {
        warn!(skipped, "ignored PLY faces with fewer than three vertices");
    }

    from_cells(&vertices, &cells)
}

fn scalar(element: &DefaultElement, key: &str) -> Result<f64> {
    let value = match element.get(key) {
        Some(Property::Float(v)) => *v as f64,
        Some(Property::Double(v)) => *v,
        Some(Property::Int(v)) => *v as f64,
        Some(Property::UInt(v)) => *v as f64,
        Some(Property::Short(v)) => *v as f64,
        Some(Property::UShort(v)) => *v as f64,
        Some(Property::Char(v)) => *v as f64,
        Some(Property::UChar(v)) => *v as f64,
        Some(_) => {
            return Err(MeshBoolError::Ply(format!(
                "vertex property '{}' is a list",
                key
            )))
        }
        None => {
            return Err(MeshBoolError::Ply(format!(
                "vertex is missing property '{}'",
                key
            )))
        }
    };
    Ok(value)
}

fn face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let property = element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
        .ok_or_else(|| MeshBoolError::Ply("face has no vertex index list".to_string()))?;

    let raw: Vec<i64> = match property {
        Property::ListChar(v) => v.iter().map(|&i| i as i64).collect(),
        Property::ListUChar(v) => v.iter().map(|&i| i as i64).collect(),
        Property::ListShort(v) => v.iter().map(|&i| i as i64).collect(),
        Property::ListUShort(v) => v.iter().map(|&i| i as i64).collect(),
        Property::ListInt(v) => v.iter().map(|&i| i as i64).collect(),
        Property::ListUInt(v) => v.iter().map(|&i| i as i64).collect(),
        _ => {
            return Err(MeshBoolError::Ply(
                "face vertex indices must be an integer list".to_string(),
            ))
        }
    };

    raw.into_iter()
        .map(|i| {
            usize::try_from(i)
                .map_err(|_| MeshBoolError::InvalidMesh(format!("negative vertex index {}", i)))
        })
        .collect()
}
