/// Normalized mesh and scene types shared by all rendering frontends
use std::collections::BTreeSet;

use nalgebra::Point3;

use crate::bounds::Aabb;
use crate::error::{MeshError, Result};

/// A polygon face: 0-based indices into the owning mesh's vertex table.
///
/// Faces are triangles when decoded from STL but may be arbitrary polygons
/// when decoded from OBJ; consumers must go by vertex count, never assume 3.
pub type Face = Vec<u32>;

/// An immutable mesh: a vertex table, a face table, and the data derived
/// from them at construction time (canonical edge set, bounding box).
///
/// A mesh never changes after `Mesh::new` returns; replacing geometry means
/// building a new mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
    edges: Vec<(u32, u32)>,
    bounds: Aabb,
}

impl Mesh {
    /// Build a mesh from decoded vertices and faces.
    ///
    /// Every face index must resolve to a vertex; an out-of-range index is
    /// an error here, never a silent skip or a deferred render-time failure.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Result<Self> {
        for (face_id, face) in faces.iter().enumerate() {
            for &index in face {
                if index as usize >= vertices.len() {
                    return Err(MeshError::IndexOutOfRange {
                        face: face_id,
                        index,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        let edges = collect_edges(&faces);
        let bounds = referenced_bounds(&vertices, &faces);
        Ok(Self {
            vertices,
            faces,
            edges,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Resolve each face to the coordinates it references, in face order.
    ///
    /// This is the solid-rendering form: one coordinate polygon per face,
    /// no index lookup left for the consumer.
    pub fn expand_faces(&self) -> impl Iterator<Item = Vec<Point3<f64>>> + '_ {
        self.faces
            .iter()
            .map(|face| face.iter().map(|&i| self.vertices[i as usize]).collect())
    }

    /// The canonical edge set as (min, max) index pairs, sorted.
    pub fn edge_indices(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Wireframe segments: the two endpoint coordinates of every undirected
    /// edge, each edge exactly once no matter how many faces share it.
    pub fn edges(&self) -> impl Iterator<Item = (Point3<f64>, Point3<f64>)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| (self.vertices[a as usize], self.vertices[b as usize]))
    }

    /// Extent of the vertices referenced by at least one face.
    ///
    /// Stray vertices that no face uses do not contribute. `None` when the
    /// mesh has no faces.
    pub fn bounding_box(&self) -> Option<Aabb> {
        if self.bounds.is_empty() {
            None
        } else {
            Some(self.bounds)
        }
    }

    /// The 8-vertex, 6-quad unit cube the viewer shows before any file is
    /// loaded.
    pub fn unit_cube() -> Self {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces: Vec<Face> = vec![
            vec![0, 1, 2, 3],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
            vec![4, 5, 6, 7],
        ];
        let edges = collect_edges(&faces);
        let bounds = referenced_bounds(&vertices, &faces);
        Self {
            vertices,
            faces,
            edges,
            bounds,
        }
    }
}

/// Walk every face boundary, including the wrap-around pair, and keep each
/// undirected edge once under the (min, max) canonical ordering. The
/// BTreeSet gives a deterministic emission order.
fn collect_edges(faces: &[Face]) -> Vec<(u32, u32)> {
    let mut set = BTreeSet::new();
    for face in faces {
        if face.len() < 2 {
            continue;
        }
        for (k, &a) in face.iter().enumerate() {
            let b = face[(k + 1) % face.len()];
            if a == b {
                continue;
            }
            set.insert(if a < b { (a, b) } else { (b, a) });
        }
    }
    set.into_iter().collect()
}

fn referenced_bounds(vertices: &[Point3<f64>], faces: &[Face]) -> Aabb {
    let mut bounds = Aabb::empty();
    for face in faces {
        for &index in face {
            bounds.expand_to_include(&vertices[index as usize]);
        }
    }
    bounds
}

/// An ordered, append-only collection of meshes with an aggregate bounding
/// box for camera framing.
///
/// The scene is mutated only by the orchestrating caller: append a fully
/// built mesh on load, clear on reset. A failing decode never touches it.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Componentwise union of the member meshes' boxes; `None` for an empty
    /// scene or one whose meshes all have no faces.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut boxes = self.meshes.iter().filter_map(Mesh::bounding_box);
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, b| acc.union(&b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_triangle_edges_canonical() {
        let mesh = triangle();
        assert_eq!(mesh.edge_indices(), &[(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_shared_edge_reported_once() {
        // Two triangles sharing edge {1, 2} in opposite winding.
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2], vec![2, 1, 3]],
        )
        .unwrap();
        let shared: Vec<_> = mesh
            .edge_indices()
            .iter()
            .filter(|&&e| e == (1, 2))
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(mesh.edge_indices().len(), 5);
    }

    #[test]
    fn test_edges_have_distinct_endpoints() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![vec![0, 0, 1, 2]],
        )
        .unwrap();
        for &(a, b) in mesh.edge_indices() {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let result = Mesh::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            vec![vec![0, 1, 2]],
        );
        match result {
            Err(MeshError::IndexOutOfRange {
                face,
                index,
                vertex_count,
            }) => {
                assert_eq!(face, 0);
                assert_eq!(index, 2);
                assert_eq!(vertex_count, 2);
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_bounding_box_skips_unreferenced_vertices() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(100.0, 100.0, 100.0), // stray, no face uses it
            ],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_bounding_box_invariant_under_face_permutation() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
        ];
        let a = Mesh::new(vertices.clone(), vec![vec![0, 1, 2], vec![0, 1, 3]]).unwrap();
        let b = Mesh::new(vertices.clone(), vec![vec![0, 1, 3], vec![0, 1, 2]]).unwrap();
        let c = Mesh::new(vertices, vec![vec![1, 3, 0], vec![2, 0, 1]]).unwrap();
        assert_eq!(a.bounding_box(), b.bounding_box());
        assert_eq!(a.bounding_box(), c.bounding_box());
    }

    #[test]
    fn test_faceless_mesh_has_no_bounding_box() {
        let mesh = Mesh::new(vec![Point3::new(1.0, 2.0, 3.0)], vec![]).unwrap();
        assert!(mesh.bounding_box().is_none());
        assert_eq!(mesh.edge_indices().len(), 0);
    }

    #[test]
    fn test_expand_faces_resolves_coordinates() {
        let mesh = triangle();
        let polygons: Vec<_> = mesh.expand_faces().collect();
        assert_eq!(polygons.len(), 1);
        assert_eq!(
            polygons[0],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ]
        );
        // Restartable: a second pass yields the same thing.
        let again: Vec<_> = mesh.expand_faces().collect();
        assert_eq!(polygons, again);
    }

    #[test]
    fn test_unit_cube() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        // A cube has 12 undirected edges however its quads share them.
        assert_eq!(cube.edge_indices().len(), 12);
        let bounds = cube.bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_scene_bounding_box_union() {
        let mut scene = Scene::new();
        assert!(scene.bounding_box().is_none());

        scene.push(Mesh::unit_cube());
        let one = scene.bounding_box().unwrap();
        assert_eq!(one.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(one.max, Point3::new(1.0, 1.0, 1.0));

        let shifted = Mesh::new(
            vec![
                Point3::new(2.0, 2.0, 2.0),
                Point3::new(3.0, 2.0, 2.0),
                Point3::new(3.0, 3.0, 2.0),
            ],
            vec![vec![0, 1, 2]],
        )
        .unwrap();
        scene.push(shifted.clone());
        let both = scene.bounding_box().unwrap();
        assert_eq!(both.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(both.max, Point3::new(3.0, 3.0, 2.0));

        // Insertion order does not matter.
        let mut reversed = Scene::new();
        reversed.push(shifted);
        reversed.push(Mesh::unit_cube());
        assert_eq!(reversed.bounding_box(), scene.bounding_box());

        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.bounding_box().is_none());
    }
}
