//! Procedural primitive geometry in local space
//!
//! Every generator is a pure function of its parameters. Face loops are
//! wound so that `(v1 - v0) × (v2 - v0)` points into the solid; the renderer's
//! culling and shading rules are written against that convention.
use nalgebra::{Point3, Vector3};
use std::f32::consts::TAU;

/// Segments used for every circular section of an arrow.
pub const ARROW_SEGMENTS: usize = 8;

/// Upper bound on sphere and cone segment counts.
pub const MAX_SEGMENTS: u32 = 128;

/// Vertices, edges and faces of a primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Point3<f32>>,
    pub edges: Vec<[usize; 2]>,
    pub faces: Vec<Vec<usize>>,
}

impl Geometry {
    pub fn with_capacity(vertices: usize, edges: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Cube centred on the origin: 8 corners, 12 edges, 6 quads.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];
        let edges = vec![
            [0, 1], [1, 2], [2, 3], [3, 0],
            [4, 5], [5, 6], [6, 7], [7, 4],
            [0, 4], [1, 5], [2, 6], [3, 7],
        ];
        let faces = vec![
            vec![0, 1, 2, 3], // back  (-Z)
            vec![4, 7, 6, 5], // front (+Z)
            vec![0, 4, 5, 1], // bottom
            vec![2, 6, 7, 3], // top
            vec![0, 3, 7, 4], // left  (-X)
            vec![1, 5, 6, 2], // right (+X)
        ];
        Self { vertices, edges, faces }
    }

    /// Latitude/longitude sphere with `segments` bands and `segments` points
    /// per ring. The poles are single vertices at index 0 and the last index.
    pub fn uv_sphere(radius: f32, segments: usize) -> Self {
        let n = segments.clamp(3, MAX_SEGMENTS as usize);
        let ring_count = n - 1;
        let mut geometry = Self::with_capacity(2 + ring_count * n, n * (2 * ring_count), 2 * n * ring_count);

        geometry.vertices.push(Point3::new(0.0, radius, 0.0));
        for i in 1..n {
            let phi = std::f32::consts::PI * i as f32 / n as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();
            for j in 0..n {
                let theta = TAU * j as f32 / n as f32;
                geometry
                    .vertices
                    .push(Point3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin()));
            }
        }
        geometry.vertices.push(Point3::new(0.0, -radius, 0.0));

        let bottom = geometry.vertices.len() - 1;
        let ring = |i: usize, j: usize| 1 + i * n + (j % n);
        let last = ring_count - 1;

        for j in 0..n {
            geometry.edges.push([0, ring(0, j)]);
            geometry.edges.push([ring(last, j), bottom]);
        }
        for i in 0..ring_count {
            for j in 0..n {
                geometry.edges.push([ring(i, j), ring(i, j + 1)]);
                if i + 1 < ring_count {
                    geometry.edges.push([ring(i, j), ring(i + 1, j)]);
                }
            }
        }

        for j in 0..n {
            geometry.faces.push(vec![0, ring(0, j), ring(0, j + 1)]);
        }
        for i in 0..ring_count.saturating_sub(1) {
            for j in 0..n {
                let (curr, next) = (ring(i, j), ring(i, j + 1));
                let (down, down_next) = (ring(i + 1, j), ring(i + 1, j + 1));
                geometry.faces.push(vec![curr, down, next]);
                geometry.faces.push(vec![next, down, down_next]);
            }
        }
        for j in 0..n {
            geometry.faces.push(vec![bottom, ring(last, j + 1), ring(last, j)]);
        }

        geometry
    }

    /// Square pyramid standing on the XZ plane at `y = -height/2`.
    pub fn pyramid(base_size: f32, height: f32) -> Self {
        let b = base_size / 2.0;
        let h = height / 2.0;
        let vertices = vec![
            Point3::new(-b, -h, -b),
            Point3::new(b, -h, -b),
            Point3::new(b, -h, b),
            Point3::new(-b, -h, b),
            Point3::new(0.0, h, 0.0),
        ];
        let edges = vec![
            [0, 1], [1, 2], [2, 3], [3, 0],
            [0, 4], [1, 4], [2, 4], [3, 4],
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![0, 1, 4],
            vec![1, 2, 4],
            vec![2, 3, 4],
            vec![3, 0, 4],
        ];
        Self { vertices, edges, faces }
    }

    /// Cone over a `segments`-gon at `y = -height/2`, apex at `y = height/2`.
    pub fn cone(radius: f32, height: f32, segments: usize) -> Self {
        let n = segments.clamp(3, MAX_SEGMENTS as usize);
        let h = height / 2.0;
        let mut geometry = Self::with_capacity(n + 1, 2 * n, n + 1);
        for i in 0..n {
            let angle = TAU * i as f32 / n as f32;
            geometry
                .vertices
                .push(Point3::new(radius * angle.cos(), -h, radius * angle.sin()));
        }
        let apex = n;
        geometry.vertices.push(Point3::new(0.0, h, 0.0));

        for i in 0..n {
            geometry.edges.push([i, (i + 1) % n]);
            geometry.edges.push([i, apex]);
        }

        geometry.faces.push((0..n).rev().collect());
        for i in 0..n {
            geometry.faces.push(vec![i, (i + 1) % n, apex]);
        }
        geometry
    }

    /// Arrow from the origin along `direction`: a shaft cylinder continued by
    /// a wider cone head whose tip sits at `direction̂ · length`.
    pub fn arrow(
        direction: &Vector3<f32>,
        length: f32,
        shaft_radius: f32,
        head_radius: f32,
        head_length: f32,
    ) -> Self {
        let n = ARROW_SEGMENTS;
        let dir = direction.try_normalize(1e-6).unwrap_or_else(Vector3::x);
        let perp1 = if dir.x.abs() < 0.9 {
            Vector3::new(0.0, dir.z, -dir.y)
        } else {
            Vector3::new(-dir.z, 0.0, dir.x)
        }
        .normalize();
        let perp2 = dir.cross(&perp1);

        let shaft_end = dir * (length - head_length);
        let tip = Point3::from(dir * length);
        let section = |center: Vector3<f32>, radius: f32| {
            (0..n).map(move |i| {
                let angle = TAU * i as f32 / n as f32;
                Point3::from(center + (perp1 * angle.cos() + perp2 * angle.sin()) * radius)
            })
        };

        let mut geometry = Self::with_capacity(3 * n + 1, 5 * n, 3 * n + 2);
        geometry.vertices.extend(section(Vector3::zeros(), shaft_radius));
        geometry.vertices.extend(section(shaft_end, shaft_radius));
        geometry.vertices.extend(section(shaft_end, head_radius));
        geometry.vertices.push(tip);

        let (start, end, head, tip) = (0, n, 2 * n, 3 * n);
        for i in 0..n {
            let next = (i + 1) % n;
            geometry.edges.push([start + i, start + next]);
            geometry.edges.push([end + i, end + next]);
            geometry.edges.push([head + i, head + next]);
            geometry.edges.push([start + i, end + i]);
            geometry.edges.push([head + i, tip]);
        }

        geometry.faces.push((start..start + n).collect());
        for i in 0..n {
            let next = (i + 1) % n;
            geometry.faces.push(vec![start + i, end + next, start + next]);
            geometry.faces.push(vec![start + i, end + i, end + next]);
        }
        geometry.faces.push((head..head + n).collect());
        for i in 0..n {
            let next = (i + 1) % n;
            geometry.faces.push(vec![head + next, head + i, tip]);
        }

        geometry
    }
}

/// Cross product of the first two edges of a face, unnormalised.
pub fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a).cross(&(c - a))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face normal must point toward `inside`.
    fn assert_wound_inward(geometry: &Geometry, inside: Point3<f32>) {
        for face in &geometry.faces {
            let [a, b, c] = [face[0], face[1], face[2]].map(|i| geometry.vertices[i]);
            let normal = face_normal(&a, &b, &c);
            if normal.norm() < 1e-9 {
                continue;
            }
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(
                normal.dot(&(inside - centroid)) > 0.0,
                "face {face:?} faces outward"
            );
        }
    }

    fn assert_indices_valid(geometry: &Geometry) {
        let count = geometry.vertices.len();
        assert!(geometry.edges.iter().flatten().all(|&i| i < count));
        assert!(geometry.faces.iter().all(|f| f.len() >= 3));
        assert!(geometry.faces.iter().flatten().all(|&i| i < count));
    }

    #[test]
    fn test_cube_counts() {
        let cube = Geometry::cube(2.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.edges.len(), 12);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.faces.iter().all(|f| f.len() == 4));
        assert!(cube.vertices.iter().all(|v| v.coords.abs() == Vector3::repeat(1.0)));
    }

    #[test]
    fn test_cube_winding() {
        let cube = Geometry::cube(2.0);
        assert_indices_valid(&cube);
        assert_wound_inward(&cube, Point3::origin());
    }

    #[test]
    fn test_sphere_layout() {
        let sphere = Geometry::uv_sphere(1.0, 16);
        assert_eq!(sphere.vertices.len(), 2 + 15 * 16);
        assert_eq!(sphere.faces.len(), 16 + 2 * 14 * 16 + 16);
        assert!(sphere.faces.iter().all(|f| f.len() == 3));
        assert!(sphere
            .vertices
            .iter()
            .all(|v| (v.coords.norm() - 1.0).abs() < 1e-5));
        assert_indices_valid(&sphere);
        assert_wound_inward(&sphere, Point3::origin());
    }

    #[test]
    fn test_segment_count_is_bounded() {
        let n = MAX_SEGMENTS as usize;
        let sphere = Geometry::uv_sphere(1.0, usize::MAX);
        assert_eq!(sphere.vertices.len(), 2 + (n - 1) * n);
        let cone = Geometry::cone(1.0, 1.0, usize::MAX);
        assert_eq!(cone.vertices.len(), n + 1);
    }

    #[test]
    fn test_pyramid_winding() {
        let pyramid = Geometry::pyramid(2.0, 3.0);
        assert_eq!(pyramid.faces[0].len(), 4);
        assert_eq!(pyramid.faces.len(), 5);
        assert_indices_valid(&pyramid);
        assert_wound_inward(&pyramid, Point3::origin());
    }

    #[test]
    fn test_cone_single_base_face() {
        let cone = Geometry::cone(1.0, 2.0, 12);
        assert_eq!(cone.vertices.len(), 13);
        assert_eq!(cone.faces.len(), 13);
        assert_eq!(cone.faces[0].len(), 12);
        assert_indices_valid(&cone);
        assert_wound_inward(&cone, Point3::origin());
    }

    #[test]
    fn test_arrow_tip_and_winding() {
        let direction = Vector3::new(1.0, 2.0, -0.5);
        let arrow = Geometry::arrow(&direction, 2.0, 0.05, 0.15, 0.3);
        let dir = direction.normalize();
        let tip = arrow.vertices.last().copied().unwrap();
        assert!((tip.coords - dir * 2.0).norm() < 1e-5);
        assert_eq!(arrow.vertices.len(), 3 * ARROW_SEGMENTS + 1);
        assert_indices_valid(&arrow);
        assert_wound_inward(&arrow, Point3::from(dir * (1.7 + 0.3 * 0.25)));
    }

    #[test]
    fn test_arrow_zero_direction_falls_back_to_x() {
        let arrow = Geometry::arrow(&Vector3::zeros(), 1.0, 0.05, 0.15, 0.3);
        let tip = arrow.vertices.last().copied().unwrap();
        assert!((tip - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_arrow_shaft_radius() {
        let arrow = Geometry::arrow(&Vector3::y(), 2.0, 0.05, 0.15, 0.3);
        for v in &arrow.vertices[..ARROW_SEGMENTS] {
            assert!((v.coords.norm() - 0.05).abs() < 1e-6);
        }
    }
}
