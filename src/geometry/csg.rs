// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP tree
//!
//! Nodes live in an arena so building, clipping and inverting never recurse;
//! large convex inputs degenerate into long chains and would otherwise
//! exhaust the stack.

use super::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

/// Plane tolerance relative to the combined bounding box diagonal
const PLANE_EPSILON_RATIO: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

/// Outcome of classifying a polygon against a plane
enum Split {
    CoplanarFront(Polygon),
    CoplanarBack(Polygon),
    Front(Polygon),
    Back(Polygon),
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

impl Plane {
    /// `None` when twice the triangle's area is at most `min_cross`
    fn from_points(
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        min_cross: f64,
    ) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(min_cross)?;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn split_polygon(&self, polygon: Polygon, epsilon: f64) -> Split {
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.normal.dot(&v.coords) - self.w;
                if t < -epsilon {
                    BACK
                } else if t > epsilon {
                    FRONT
                } else {
                    COPLANAR
                }
            })
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    Split::CoplanarFront(polygon)
                } else {
                    Split::CoplanarBack(polygon)
                }
            }
            FRONT => Split::Front(polygon),
            BACK => Split::Back(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);

                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if ti | tj == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }

                let plane = polygon.plane;
                let piece = |vertices: Vec<Point3<f64>>| {
                    (vertices.len() >= 3).then_some(Polygon { vertices, plane })
                };
                Split::Spanning {
                    front: piece(f),
                    back: piece(b),
                }
            }
        }
    }
}

impl Polygon {
    fn triangle(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, min_cross: f64) -> Option<Self> {
        let plane = Plane::from_points(&a, &b, &c, min_cross)?;
        Some(Self {
            vertices: vec![a, b, c],
            plane,
        })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

#[derive(Debug, Clone, Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<usize>,
    back: Option<usize>,
    polygons: Vec<Polygon>,
}

/// BSP tree stored as an arena; node 0 is the root
#[derive(Debug, Clone)]
struct BspTree {
    nodes: Vec<BspNode>,
    epsilon: f64,
}

impl BspTree {
    fn new(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut tree = Self {
            nodes: vec![BspNode::default()],
            epsilon,
        };
        tree.build(polygons);
        tree
    }

    /// Insert polygons, extending the existing tree where needed
    fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack = vec![(0usize, polygons)];

        while let Some((idx, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }

            let plane = *self.nodes[idx].plane.get_or_insert(polygons[0].plane);
            let mut front = Vec::new();
            let mut back = Vec::new();

            for polygon in polygons {
                match plane.split_polygon(polygon, self.epsilon) {
                    Split::CoplanarFront(p) | Split::CoplanarBack(p) => {
                        self.nodes[idx].polygons.push(p)
                    }
                    Split::Front(p) => front.push(p),
                    Split::Back(p) => back.push(p),
                    Split::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }

            if !front.is_empty() {
                let child = self.child(idx, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(idx, false);
                stack.push((child, back));
            }
        }
    }

    fn child(&mut self, idx: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[idx].front
        } else {
            self.nodes[idx].back
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(BspNode::default());
        if front {
            self.nodes[idx].front = Some(child);
        } else {
            self.nodes[idx].back = Some(child);
        }
        child
    }

    /// Convert solid space to empty space and vice versa
    fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            if let Some(plane) = node.plane.as_mut() {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Remove the parts of `polygons` that lie inside this tree's solid
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack = vec![(0usize, polygons)];

        while let Some((idx, polygons)) = stack.pop() {
            let node = &self.nodes[idx];
            let Some(plane) = node.plane else {
                result.extend(polygons);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                match plane.split_polygon(polygon, self.epsilon) {
                    Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                    Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                    Split::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }

            match node.front {
                Some(child) => stack.push((child, front)),
                None => result.extend(front),
            }
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }

        result
    }

    /// Remove every polygon of this tree that lies inside `other`
    fn clip_to(&mut self, other: &BspTree) {
        for idx in 0..self.nodes.len() {
            let polygons = std::mem::take(&mut self.nodes[idx].polygons);
            self.nodes[idx].polygons = other.clip_polygons(polygons);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|node| node.polygons.iter().cloned())
            .collect()
    }

    fn into_polygons(self) -> Vec<Polygon> {
        self.nodes.into_iter().flat_map(|node| node.polygons).collect()
    }
}

/// Convert mesh to polygons, skipping triangles whose doubled area is at
/// most `epsilon` squared
fn mesh_to_polygons(mesh: &Mesh, epsilon: f64) -> Vec<Polygon> {
    let min_cross = epsilon * epsilon;
    mesh.triangles
        .iter()
        .filter_map(|tri| {
            let [a, b, c] = mesh.corners(tri);
            Polygon::triangle(a, b, c, min_cross)
        })
        .collect()
}

/// Fan-triangulate convex polygons and weld the shared cut vertices
fn polygons_to_mesh(polygons: &[Polygon], weld_epsilon: f64) -> Mesh {
    let mut mesh = Mesh::new();

    for poly in polygons {
        let base = mesh.vertex_count();
        for position in &poly.vertices {
            mesh.add_vertex(Vertex::at(*position));
        }
        for i in 1..poly.vertices.len() - 1 {
            mesh.add_triangle(Triangle::new([base, base + i, base + i + 1]));
        }
    }

    mesh.weld_vertices(weld_epsilon);
    mesh.remove_duplicate_triangles();
    mesh.remove_orphaned_vertices();
    mesh.recompute_normals();
    mesh
}

fn epsilon_for(a: &Mesh, b: &Mesh) -> f64 {
    let mut bbox = a.bounding_box();
    for vertex in &b.vertices {
        bbox.expand_to_include(&vertex.position);
    }
    let diagonal = if bbox.is_empty() { 1.0 } else { bbox.diagonal() };
    let epsilon = diagonal * PLANE_EPSILON_RATIO;
    if epsilon > 0.0 {
        epsilon
    } else {
        f64::EPSILON
    }
}

fn trees(a: &Mesh, b: &Mesh) -> (BspTree, BspTree, f64) {
    let epsilon = epsilon_for(a, b);
    (
        BspTree::new(mesh_to_polygons(a, epsilon), epsilon),
        BspTree::new(mesh_to_polygons(b, epsilon), epsilon),
        epsilon,
    )
}

/// Perform CSG union using BSP trees
pub fn csg_union(a: &Mesh, b: &Mesh) -> Mesh {
    if a.is_empty() || b.is_empty() {
        let mut result = a.clone();
        result.merge(b);
        return result;
    }

    let (mut tree_a, mut tree_b, epsilon) = trees(a, b);

    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());

    polygons_to_mesh(&tree_a.into_polygons(), epsilon)
}

/// Perform CSG difference (a minus b) using BSP trees
pub fn csg_difference(a: &Mesh, b: &Mesh) -> Mesh {
    if a.is_empty() {
        return Mesh::empty();
    }
    if b.is_empty() {
        return a.clone();
    }

    let (mut tree_a, mut tree_b, epsilon) = trees(a, b);

    tree_a.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    polygons_to_mesh(&tree_a.into_polygons(), epsilon)
}

/// Perform CSG intersection using BSP trees
pub fn csg_intersection(a: &Mesh, b: &Mesh) -> Mesh {
    if a.is_empty() || b.is_empty() {
        return Mesh::empty();
    }

    let (mut tree_a, mut tree_b, epsilon) = trees(a, b);

    tree_a.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    polygons_to_mesh(&tree_a.into_polygons(), epsilon)
}
