// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations between two meshes

use super::{csg, Mesh};
use crate::error::{MeshBoolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

impl BooleanOp {
    pub const ALL: [BooleanOp; 3] = [Self::Union, Self::Intersection, Self::Difference];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BooleanOp {
    type Err = MeshBoolError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == lowered)
            .ok_or_else(|| MeshBoolError::UnknownOperation(s.to_string()))
    }
}

/// Anything able to combine two solids. `a` is always operand 0 and `b`
/// operand 1, so `Difference` yields `a - b`.
pub trait BooleanEngine {
    fn apply(&self, a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh>;
}

/// BSP-tree CSG engine
#[derive(Debug, Clone, Copy, Default)]
pub struct BspEngine;

impl BooleanEngine for BspEngine {
    fn apply(&self, a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
        let result = match op {
            BooleanOp::Union => csg::csg_union(a, b),
            BooleanOp::Intersection => csg::csg_intersection(a, b),
            BooleanOp::Difference => csg::csg_difference(a, b),
        };
        result.validate()?;
        Ok(result)
    }
}

/// Combine `a` and `b` with the default BSP engine.
///
/// Face indices are always in bounds and cut vertices within the plane
/// tolerance are welded, but the result is not guaranteed watertight: a
/// BSP split can end a cut on another polygon's edge, leaving a T-junction
/// whose edges each appear once. `mesh_utils::validate_mesh` reports them.
pub fn combine(a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
    combine_with(&BspEngine, a, b, op)
}

/// Combine `a` and `b` with a caller-supplied engine
#[instrument(skip_all, fields(op = %op, a_triangles = a.triangle_count(), b_triangles = b.triangle_count()))]
pub fn combine_with(engine: &dyn BooleanEngine, a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
    let result = engine.apply(a, b, op)?;
    debug!(
        vertices = result.vertex_count(),
        triangles = result.triangle_count(),
        "boolean operation finished"
    );
    Ok(result)
}

/// Parse `name` and combine; an unknown name never reaches the engine
pub fn combine_named(engine: &dyn BooleanEngine, a: &Mesh, b: &Mesh, name: &str) -> Result<Mesh> {
    let op: BooleanOp = name.parse()?;
    combine_with(engine, a, b, op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, SphereSource};
    use nalgebra::{Point3, Vector3};
    use std::cell::RefCell;

    /// Records operand identities instead of computing anything
    #[derive(Default)]
    struct RecordingEngine {
        calls: RefCell<Vec<(usize, usize, BooleanOp)>>,
    }

    impl BooleanEngine for RecordingEngine {
        fn apply(&self, a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
            self.calls
                .borrow_mut()
                .push((a.triangle_count(), b.triangle_count(), op));
            Ok(a.clone())
        }
    }

    fn operands() -> (Mesh, Mesh) {
        let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true)
            .to_mesh()
            .unwrap();
        let sphere = SphereSource::new(Point3::new(1.0, 0.0, 0.0), 0.75)
            .to_mesh()
            .unwrap();
        (cube, sphere)
    }

    #[test]
    fn test_parse_operation_names() {
        assert_eq!("union".parse::<BooleanOp>().unwrap(), BooleanOp::Union);
        assert_eq!(
            "Intersection".parse::<BooleanOp>().unwrap(),
            BooleanOp::Intersection
        );
        assert_eq!(
            " DIFFERENCE ".parse::<BooleanOp>().unwrap(),
            BooleanOp::Difference
        );
        assert!(matches!(
            "subtract".parse::<BooleanOp>(),
            Err(MeshBoolError::UnknownOperation(name)) if name == "subtract"
        ));
    }

    #[test]
    fn test_difference_operand_order_reaches_engine() {
        let (cube, sphere) = operands();
        let engine = RecordingEngine::default();

        combine_with(&engine, &cube, &sphere, BooleanOp::Difference).unwrap();
        combine_with(&engine, &sphere, &cube, BooleanOp::Difference).unwrap();

        let calls = engine.calls.borrow();
        assert_eq!(calls[0], (12, 96, BooleanOp::Difference));
        assert_eq!(calls[1], (96, 12, BooleanOp::Difference));
    }

    #[test]
    fn test_unknown_operation_skips_engine() {
        let (cube, sphere) = operands();
        let engine = RecordingEngine::default();

        let result = combine_named(&engine, &cube, &sphere, "xor");
        assert!(matches!(result, Err(MeshBoolError::UnknownOperation(_))));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_difference_is_not_symmetric() {
        let (cube, sphere) = operands();

        let a_minus_b = combine(&cube, &sphere, BooleanOp::Difference).unwrap();
        let b_minus_a = combine(&sphere, &cube, BooleanOp::Difference).unwrap();

        assert!(a_minus_b.bounding_box().max.x < 1.0 + 1e-6);
        assert!(b_minus_a.bounding_box().min.x > 1.0 - 1e-6);
    }

    #[test]
    fn test_every_operation_yields_valid_mesh() {
        let (cube, sphere) = operands();
        for op in BooleanOp::ALL {
            let result = combine(&cube, &sphere, op).unwrap();
            assert!(result.vertex_count() > 0, "{} produced no vertices", op);
            assert!(result.validate().is_ok());
        }
    }
}
