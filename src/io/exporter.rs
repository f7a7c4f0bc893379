// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL and PLY mesh exporter

use super::arrays::CellArray;
use super::MeshFormat;
use crate::error::{MeshBoolError, Result};
use crate::geometry::Mesh;
use nalgebra::Vector3;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::{info, instrument};

/// Save a mesh, choosing the writer from the file extension.
/// STL is written as binary, PLY as binary little endian.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;

    let file = File::create(path).map_err(|e| MeshBoolError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let written = match format {
        MeshFormat::Stl => write_stl(mesh, &mut writer),
        MeshFormat::Ply => write_ply(mesh, &mut writer),
    };
    written
        .and_then(|_| writer.flush())
        .map_err(|e| MeshBoolError::io(path, e))?;

    info!(
        format = %format,
        triangles = mesh.triangle_count(),
        "mesh saved"
    );
    Ok(())
}

pub fn write_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let [a, b, c] = mesh.corners(triangle);
            let normal = (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [a, b, c].map(|p| StlVertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

pub fn write_ply<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::BinaryLittleEndian;

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    ply.header.elements.add(face_def);

    let vertices = mesh
        .vertices
        .iter()
        .map(|vertex| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(vertex.position.x as f32));
            element.insert("y".to_string(), Property::Float(vertex.position.y as f32));
            element.insert("z".to_string(), Property::Float(vertex.position.z as f32));
            element
        })
        .collect();

    let triangles: Vec<[usize; 3]> = mesh.triangles.iter().map(|t| t.indices).collect();
    let faces = CellArray::from_triangles(&triangles)
        .cells()
        .map(|ids| {
            let mut element = DefaultElement::new();
            element.insert(
                "vertex_indices".to_string(),
                Property::ListInt(ids.iter().map(|&id| id as i32).collect()),
            );
            element
        })
        .collect();

    ply.payload.insert("vertex".to_string(), vertices);
    ply.payload.insert("face".to_string(), faces);
    ply.make_consistent().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", e))
    })?;

    Writer::<DefaultElement>::new().write_ply(writer, &mut ply)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::importer::{read_ply, read_stl};
    use crate::geometry::SphereSource;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::io::Cursor;

    fn sphere() -> Mesh {
        SphereSource::new(Point3::new(1.0, 2.0, 3.0), 0.5)
            .to_mesh()
            .unwrap()
    }

    #[test]
    fn test_binary_stl_layout() {
        let mesh = sphere();
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes).unwrap();

        // 80 byte header, u32 count, 50 bytes per facet
        assert_eq!(bytes.len(), 84 + 50 * mesh.triangle_count());
    }

    #[test]
    fn test_ply_buffer_reads_back() {
        let mesh = sphere();
        let mut bytes = Vec::new();
        write_ply(&mesh, &mut bytes).unwrap();

        let back = read_ply(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back.vertex_count(), mesh.vertex_count());
        assert_eq!(back.triangle_count(), mesh.triangle_count());
        for (a, b) in back.vertices.iter().zip(&mesh.vertices) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_stl_buffer_reads_back_welded() {
        let mesh = sphere();
        let mut bytes = Vec::new();
        write_stl(&mesh, &mut bytes).unwrap();

        let back = read_stl(&mut Cursor::new(bytes), Path::new("mem.stl")).unwrap();
        assert_eq!(back.triangle_count(), mesh.triangle_count());
        assert_eq!(back.vertex_count(), mesh.vertex_count());
    }
}
