//! Screen-space shape picking by center proximity
use nalgebra::Point2;

use crate::projection::Projector;
use crate::scene::Scene;
use crate::shape::ShapeId;

/// The candidate closest to `click` whose distance is strictly below
/// `radius`. Ties go to the earliest candidate.
pub fn nearest_within<I>(candidates: I, click: &Point2<f32>, radius: f32) -> Option<ShapeId>
where
    I: IntoIterator<Item = (ShapeId, Point2<f32>)>,
{
    candidates
        .into_iter()
        .map(|(id, at)| (id, (at - click).norm()))
        .filter(|(_, d)| *d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Pick the visible shape whose projected center is nearest to `click`.
pub fn pick(scene: &Scene, projector: &Projector, click: &Point2<f32>, radius: f32) -> Option<ShapeId> {
    let centers = scene
        .iter()
        .filter(|s| s.style.visible)
        .filter_map(|s| Some((s.id(), projector.world_to_screen(&s.center())?)));
    nearest_within(centers, click, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{OrbitCamera, Viewport};
    use crate::shape::{Shape, ShapeKind};
    use nalgebra::Point3;

    #[test]
    fn test_radius_is_strict() {
        let candidates = [(ShapeId(1), Point2::new(100.0, 100.0))];
        let near = Point2::new(105.0, 100.0);
        let far = Point2::new(125.0, 100.0);
        let edge = Point2::new(120.0, 100.0);
        assert_eq!(nearest_within(candidates, &near, 20.0), Some(ShapeId(1)));
        assert_eq!(nearest_within(candidates, &far, 20.0), None);
        assert_eq!(nearest_within(candidates, &edge, 20.0), None);
    }

    #[test]
    fn test_nearest_wins() {
        let candidates = [
            (ShapeId(1), Point2::new(0.0, 0.0)),
            (ShapeId(2), Point2::new(10.0, 0.0)),
            (ShapeId(3), Point2::new(10.0, 0.0)),
        ];
        assert_eq!(nearest_within(candidates, &Point2::new(7.0, 0.0), 20.0), Some(ShapeId(2)));
    }

    #[test]
    fn test_pick_scene() {
        let mut scene = Scene::new();
        let a = scene.push(Shape::new(ShapeKind::cube(1.0), Point3::origin()));
        let mut hidden = Shape::new(ShapeKind::cube(1.0), Point3::origin());
        hidden.style.visible = false;
        scene.push(hidden);

        let projector = OrbitCamera::default().projector(Viewport::new(800.0, 600.0));
        let center = projector.world_to_screen(&Point3::origin()).unwrap();
        assert_eq!(pick(&scene, &projector, &(center + nalgebra::Vector2::new(5.0, 0.0)), 20.0), Some(a));
        assert_eq!(pick(&scene, &projector, &(center + nalgebra::Vector2::new(25.0, 0.0)), 20.0), None);
    }
}
