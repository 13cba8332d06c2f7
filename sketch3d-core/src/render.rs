//! Painter's-algorithm renderer with backface culling and flat shading
use nalgebra::{Point2, Point3, Vector3};
use tracing::trace;

use crate::config::RenderConfig;
use crate::geometry::face_normal;
use crate::gizmo::{self, GizmoAxis, GizmoRegistry};
use crate::projection::{OrbitCamera, Projector, Viewport};
use crate::scene::Scene;
use crate::shape::ShapeId;
use crate::style::Color;

const AXIS_X_COLOR: Color = Color::rgb(0xbb, 0x55, 0x55);
const AXIS_Y_COLOR: Color = Color::rgb(0x55, 0xbb, 0x55);
const AXIS_Z_COLOR: Color = Color::rgb(0x55, 0x99, 0xbb);
const NORMAL_EPSILON: f32 = 1e-12;

/// 2D drawing primitives the renderer emits. Coordinates are pixels with
/// the origin top-left.
pub trait DrawSurface {
    fn polygon(&mut self, points: &[Point2<f32>], fill: Option<Color>, outline: Color, width: f32);
    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Color, width: f32);
    fn text(&mut self, at: Point2<f32>, text: &str, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polygon {
        points: Vec<Point2<f32>>,
        fill: Option<Color>,
        outline: Color,
        width: f32,
    },
    Line {
        from: Point2<f32>,
        to: Point2<f32>,
        color: Color,
        width: f32,
    },
    Text {
        at: Point2<f32>,
        text: String,
        color: Color,
    },
}

/// A surface that records commands instead of drawing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawSurface for DisplayList {
    fn polygon(&mut self, points: &[Point2<f32>], fill: Option<Color>, outline: Color, width: f32) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            outline,
            width,
        });
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn text(&mut self, at: Point2<f32>, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_owned(),
            color,
        });
    }
}

/// A visible face ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDraw {
    pub shape: ShapeId,
    pub points: Vec<Point2<f32>>,
    /// Mean world Z of the projected vertices; larger is painted first.
    pub depth: f32,
    pub fill: Color,
    pub outline: Color,
    pub line_width: f32,
}

/// Flat-shading factor in `[0.3, 1.0]`. A zero normal shades as if
/// perpendicular to the light.
pub fn brightness(normal: &Vector3<f32>, light: &Vector3<f32>) -> f32 {
    let n = normal.try_normalize(NORMAL_EPSILON);
    let l = light.try_normalize(NORMAL_EPSILON);
    let dot = match (n, l) {
        (Some(n), Some(l)) => n.dot(&l),
        _ => 0.0,
    };
    ((1.0 - dot) / 2.0).clamp(0.3, 1.0)
}

/// Normal of a face's first three vertices, whether or not they project.
fn shading_normal(vertices: &[Point3<f32>], face: &[usize]) -> Vector3<f32> {
    match face {
        [a, b, c, ..] => face_normal(&vertices[*a], &vertices[*b], &vertices[*c]),
        _ => Vector3::zeros(),
    }
}

/// Faces are wound so their normal points inward: a face is kept when that
/// normal points away from the eye. Degenerate faces are kept.
pub fn is_front_facing(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>, eye: &Point3<f32>) -> bool {
    let normal = face_normal(a, b, c);
    if normal.norm_squared() <= NORMAL_EPSILON {
        return true;
    }
    let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
    normal.dot(&(eye - centroid)) < 0.0
}

/// Project, cull and shade every face of every visible shape, sorted back
/// to front.
pub fn collect_faces(scene: &Scene, projector: &Projector, config: &RenderConfig) -> Vec<FaceDraw> {
    let eye = projector.eye();
    let light = Vector3::from(config.light_direction);
    let mut faces = Vec::new();

    for shape in scene.iter().filter(|s| s.style.visible) {
        let geometry = shape.world_geometry();
        let projected: Vec<Option<Point2<f32>>> = geometry
            .vertices
            .iter()
            .map(|v| projector.world_to_screen(v))
            .collect();

        let (base_fill, outline) = if shape.is_selected() {
            (config.highlight_fill, config.highlight_outline)
        } else {
            (shape.style.face_color(), shape.style.line_color)
        };

        for face in &geometry.faces {
            let visible: Vec<usize> = face
                .iter()
                .copied()
                .filter(|&i| projected.get(i).copied().flatten().is_some())
                .collect();
            if visible.len() < 3 {
                continue;
            }
            let world: Vec<&Point3<f32>> = visible.iter().map(|&i| &geometry.vertices[i]).collect();
            if !is_front_facing(world[0], world[1], world[2], &eye) {
                continue;
            }
            let depth = world.iter().map(|v| v.z).sum::<f32>() / world.len() as f32;
            let normal = shading_normal(&geometry.vertices, face);
            faces.push(FaceDraw {
                shape: shape.id(),
                points: visible.iter().filter_map(|&i| projected[i]).collect(),
                depth,
                fill: base_fill.scaled(brightness(&normal, &light)),
                outline,
                line_width: shape.style.line_width,
            });
        }
    }

    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    faces
}

/// Draws a scene through an orbit camera onto a [`DrawSurface`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Full redraw: grid, axes, shape faces, then the gizmo of the selected
    /// shape. Returns the gizmo registry for this frame, if a gizmo was drawn.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &OrbitCamera,
        viewport: Viewport,
        hover: Option<GizmoAxis>,
        surface: &mut dyn DrawSurface,
    ) -> Option<GizmoRegistry> {
        if viewport.is_degenerate() {
            return None;
        }
        let projector = camera.projector(viewport);

        if self.config.show_grid {
            self.draw_grid(camera, &projector, surface);
        }
        if self.config.show_axes {
            draw_axes(camera, &projector, surface);
        }

        let faces = collect_faces(scene, &projector, &self.config);
        trace!(faces = faces.len(), shapes = scene.len(), "frame");
        for face in &faces {
            surface.polygon(&face.points, Some(face.fill), face.outline, face.line_width);
        }

        let selected = scene.selected()?;
        gizmo::draw_gizmo(selected, scene.mode(), hover, &projector, surface)
    }

    /// Ground grid on the XZ plane, one line per world unit.
    fn draw_grid(&self, camera: &OrbitCamera, projector: &Projector, surface: &mut dyn DrawSurface) {
        let range = ((camera.distance() * 2.0) as i32).max(30);
        let r = range as f32;
        for i in -range..=range {
            let color = if i % 5 == 0 {
                self.config.grid_major_color
            } else {
                self.config.grid_color
            };
            let t = i as f32;
            let along_x = |x: f32| Point3::new(x, 0.0, t);
            let along_z = |z: f32| Point3::new(t, 0.0, z);
            for line in [grid_line(projector, along_x, r), grid_line(projector, along_z, r)] {
                if let Some((a, b)) = line {
                    surface.line(a, b, color, 1.0);
                }
            }
        }
    }
}

/// Endpoints of one grid line, retrying a half-length end when a full-length
/// end falls behind the camera.
fn grid_line(
    projector: &Projector,
    at: impl Fn(f32) -> Point3<f32>,
    range: f32,
) -> Option<(Point2<f32>, Point2<f32>)> {
    let start = projector.world_to_screen(&at(-range));
    let end = projector.world_to_screen(&at(range));
    if start.is_none() && end.is_none() {
        return None;
    }
    let start = start.or_else(|| projector.world_to_screen(&at(-range * 0.5)))?;
    let end = end.or_else(|| projector.world_to_screen(&at(range * 0.5)))?;
    Some((start, end))
}

/// Positive world axes from the origin with X/Y/Z labels.
fn draw_axes(camera: &OrbitCamera, projector: &Projector, surface: &mut dyn DrawSurface) {
    let Some(origin) = projector.world_to_screen(&Point3::origin()) else {
        return;
    };
    let length = camera.distance().min(10.0);
    let axes = [
        (Vector3::x(), AXIS_X_COLOR, "X", Point3::new(length * 0.8, 0.3, 0.0)),
        (Vector3::y(), AXIS_Y_COLOR, "Y", Point3::new(0.3, length * 0.8, 0.0)),
        (Vector3::z(), AXIS_Z_COLOR, "Z", Point3::new(0.0, 0.3, length * 0.8)),
    ];
    for (dir, color, label, label_at) in axes {
        let tip = [length, length * 0.5, length * 0.25, 1.0]
            .into_iter()
            .find_map(|l| projector.world_to_screen(&Point3::from(dir * l)));
        if let Some(tip) = tip {
            surface.line(origin, tip, color, 3.0);
        }
        if let Some(at) = projector.world_to_screen(&label_at) {
            surface.text(at, label, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Shape, ShapeKind};

    fn no_furniture() -> RenderConfig {
        RenderConfig {
            show_grid: false,
            show_axes: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_brightness_range() {
        let light = Vector3::new(0.5, 0.7, 0.5);
        assert!((brightness(&-light, &light) - 1.0).abs() < 1e-6);
        assert!((brightness(&light, &light) - 0.3).abs() < 1e-6);
        assert!((brightness(&Vector3::zeros(), &light) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shading_uses_leading_face_vertices() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let normal = shading_normal(&vertices, &[0, 1, 2, 3]);
        assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert_eq!(shading_normal(&vertices, &[0, 1]), Vector3::zeros());
    }

    #[test]
    fn test_cube_from_plus_x_keeps_one_face() {
        let mut scene = Scene::new();
        scene.push(Shape::new(ShapeKind::cube(2.0), Point3::origin()));
        let camera = OrbitCamera::new(20.0, 0.0, 0.0);
        let projector = camera.projector(Viewport::new(800.0, 600.0));

        let faces = collect_faces(&scene, &projector, &no_furniture());
        assert_eq!(faces.len(), 1);
        let geometry = scene.shapes()[0].world_geometry();
        let kept = geometry
            .faces
            .iter()
            .find(|f| f.iter().all(|&i| (geometry.vertices[i].x - 1.0).abs() < 1e-6))
            .unwrap();
        let expected: Vec<_> = kept
            .iter()
            .map(|&i| projector.world_to_screen(&geometry.vertices[i]).unwrap())
            .collect();
        assert_eq!(faces[0].points, expected);
    }

    #[test]
    fn test_faces_sorted_far_to_near() {
        let mut scene = Scene::new();
        scene.push(Shape::new(ShapeKind::cube(1.0), Point3::new(0.0, 0.0, 4.0)));
        scene.push(Shape::new(ShapeKind::cube(1.0), Point3::new(0.0, 0.0, -4.0)));
        let camera = OrbitCamera::default();
        let faces = collect_faces(&scene, &camera.projector(Viewport::new(800.0, 600.0)), &no_furniture());
        assert!(!faces.is_empty());
        assert!(faces.windows(2).all(|w| w[0].depth >= w[1].depth));
    }

    #[test]
    fn test_hidden_shapes_skipped() {
        let mut scene = Scene::new();
        let mut shape = Shape::new(ShapeKind::sphere(1.0), Point3::origin());
        shape.style.visible = false;
        scene.push(shape);
        let camera = OrbitCamera::default();
        let projector = camera.projector(Viewport::new(800.0, 600.0));
        assert!(collect_faces(&scene, &projector, &no_furniture()).is_empty());
    }

    #[test]
    fn test_selected_shape_is_highlighted() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::cube(2.0), Point3::origin());
        let config = no_furniture();
        let camera = OrbitCamera::new(20.0, 0.0, 0.0);
        let faces = collect_faces(&scene, &camera.projector(Viewport::new(800.0, 600.0)), &config);
        let light = Vector3::from(config.light_direction);
        let shade = brightness(&Vector3::new(-1.0, 0.0, 0.0), &light);
        assert_eq!(faces[0].fill, config.highlight_fill.scaled(shade));
        assert_eq!(faces[0].outline, config.highlight_outline);
    }

    #[test]
    fn test_fill_falls_back_to_line_color() {
        let mut scene = Scene::new();
        let mut shape = Shape::new(ShapeKind::cube(2.0), Point3::origin());
        shape.style.fill_color = None;
        shape.style.line_color = Color::rgb(200, 100, 50);
        scene.push(shape);
        let config = no_furniture();
        let camera = OrbitCamera::new(20.0, 0.0, 0.0);
        let faces = collect_faces(&scene, &camera.projector(Viewport::new(800.0, 600.0)), &config);
        let shade = brightness(&Vector3::new(-1.0, 0.0, 0.0), &Vector3::from(config.light_direction));
        assert_eq!(faces[0].fill, Color::rgb(200, 100, 50).scaled(shade));
    }

    #[test]
    fn test_render_returns_registry_for_selection() {
        let mut scene = Scene::new();
        let id = scene.add(ShapeKind::cube(2.0), Point3::origin());
        let renderer = Renderer::default();
        let mut list = DisplayList::new();
        let registry = renderer
            .render(&scene, &OrbitCamera::default(), Viewport::new(800.0, 600.0), None, &mut list)
            .unwrap();
        assert!(registry.matches(id, scene.mode()));
        assert!(
            list.commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
                .count()
                >= 3
        );
        let labels: Vec<_> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["X", "Y", "Z"]);
    }

    #[test]
    fn test_degenerate_viewport_draws_nothing() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::cube(2.0), Point3::origin());
        let mut list = DisplayList::new();
        let registry = Renderer::default().render(
            &scene,
            &OrbitCamera::default(),
            Viewport::new(1.0, 600.0),
            None,
            &mut list,
        );
        assert!(registry.is_none());
        assert!(list.commands.is_empty());
    }
}
