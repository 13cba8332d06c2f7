//! Editor facade tying scene, camera, renderer and pointer handling together
use nalgebra::Point2;

use crate::config::ViewerConfig;
use crate::gizmo::{GizmoAxis, GizmoRegistry};
use crate::interaction::{DragState, Interaction, PointerButton};
use crate::projection::{OrbitCamera, Viewport};
use crate::render::{DrawSurface, Renderer};
use crate::scene::Scene;

/// Everything a host needs to drive one 3D view.
///
/// Hosts forward pointer events and call [`Editor::render`] whenever an
/// event reports a change. Gizmo hit-testing uses the registry produced by
/// the most recent render.
#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    camera: OrbitCamera,
    viewport: Viewport,
    renderer: Renderer,
    interaction: Interaction,
    registry: Option<GizmoRegistry>,
}

impl Editor {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(ViewerConfig::default(), width, height)
    }

    pub fn with_config(config: ViewerConfig, width: f32, height: f32) -> Self {
        let mut camera = OrbitCamera::new(config.camera.distance, config.camera.yaw, config.camera.pitch);
        camera.fov = config.camera.fov;
        Self {
            scene: Scene::with_default_style(config.style),
            camera,
            viewport: Viewport::new(width, height),
            renderer: Renderer::new(config.render),
            interaction: Interaction::new(config.interaction),
            registry: None,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Redraw everything onto `surface`.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) {
        self.registry = self.renderer.render(
            &self.scene,
            &self.camera,
            self.viewport,
            self.interaction.hover(),
            surface,
        );
    }

    pub fn gizmo_registry(&self) -> Option<&GizmoRegistry> {
        self.registry.as_ref()
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32) {
        self.interaction.pointer_down(
            &mut self.scene,
            &self.camera,
            self.viewport,
            self.registry.as_ref(),
            button,
            Point2::new(x, y),
        );
    }

    /// Returns whether the view needs a redraw.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.interaction.pointer_move(
            &mut self.scene,
            &mut self.camera,
            self.registry.as_ref(),
            Point2::new(x, y),
        )
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        self.interaction.pointer_up(button);
    }

    pub fn wheel(&mut self, delta: f32) {
        self.interaction.wheel(&mut self.camera, delta);
    }

    /// Orbit the camera as if the pointer had been dragged by `(dx, dy)`
    /// with the secondary button held.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let config = &self.interaction.config;
        self.camera
            .orbit(dx, dy, config.orbit_yaw_speed, config.orbit_pitch_speed);
    }

    pub fn drag_state(&self) -> DragState {
        self.interaction.state()
    }

    pub fn hover_axis(&self) -> Option<GizmoAxis> {
        self.interaction.hover()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DisplayList;
    use crate::shape::{ShapeKind, TransformMode};
    use nalgebra::Point3;

    #[test]
    fn test_drag_move_gizmo_x() {
        let mut editor = Editor::new(800.0, 600.0);
        let id = editor.scene_mut().add(ShapeKind::cube(2.0), Point3::origin());
        let mut list = DisplayList::new();
        editor.render(&mut list);

        let tip = editor
            .camera()
            .projector(editor.viewport())
            .world_to_screen(&Point3::new(2.0, 0.0, 0.0))
            .unwrap();
        editor.pointer_down(PointerButton::Primary, tip.x, tip.y);
        assert_eq!(
            editor.drag_state(),
            DragState::DraggingGizmoAxis {
                axis: GizmoAxis::X,
                mode: TransformMode::Move
            }
        );
        assert!(editor.pointer_move(tip.x + 20.0, tip.y));
        editor.pointer_up(PointerButton::Primary);

        let position = editor.scene().get(id).unwrap().pose.position;
        assert!((position.x - 1.0).abs() < 1e-5);
        assert_eq!(position.y, 0.0);
        assert_eq!(position.z, 0.0);
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_rotate_ring_drag() {
        let mut editor = Editor::new(800.0, 600.0);
        editor.scene_mut().add(ShapeKind::cube(2.0), Point3::origin());
        editor.scene_mut().set_mode(TransformMode::Rotate);
        let mut list = DisplayList::new();
        editor.render(&mut list);

        // Where the Y and Z rings cross.
        let on_ring = editor
            .camera()
            .projector(editor.viewport())
            .world_to_screen(&Point3::new(2.5, 0.0, 0.0))
            .unwrap();
        editor.pointer_down(PointerButton::Primary, on_ring.x, on_ring.y);
        assert!(matches!(
            editor.drag_state(),
            DragState::DraggingGizmoAxis { mode: TransformMode::Rotate, .. }
        ));
    }

    #[test]
    fn test_hover_tracks_gizmo() {
        let mut editor = Editor::new(800.0, 600.0);
        editor.scene_mut().add(ShapeKind::cube(2.0), Point3::origin());
        let mut list = DisplayList::new();
        editor.render(&mut list);

        let tip = editor
            .camera()
            .projector(editor.viewport())
            .world_to_screen(&Point3::new(0.0, 2.0, 0.0))
            .unwrap();
        assert!(editor.pointer_move(tip.x, tip.y));
        assert_eq!(editor.hover_axis(), Some(GizmoAxis::Y));
        assert!(!editor.pointer_move(tip.x, tip.y));
    }

    #[test]
    fn test_stale_registry_ignored_after_mode_change() {
        let mut editor = Editor::new(800.0, 600.0);
        editor.scene_mut().add(ShapeKind::cube(2.0), Point3::origin());
        let mut list = DisplayList::new();
        editor.render(&mut list);
        editor.scene_mut().set_mode(TransformMode::Scale);

        let tip = editor
            .camera()
            .projector(editor.viewport())
            .world_to_screen(&Point3::new(2.0, 0.0, 0.0))
            .unwrap();
        editor.pointer_down(PointerButton::Primary, tip.x, tip.y);
        assert!(!matches!(editor.drag_state(), DragState::DraggingGizmoAxis { .. }));
    }

    #[test]
    fn test_wheel_zooms() {
        let mut editor = Editor::new(800.0, 600.0);
        editor.wheel(120.0);
        assert!((editor.camera().distance() - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_uses_configured_speeds() {
        let mut editor = Editor::new(800.0, 600.0);
        editor.orbit(10.0, 10.0);
        assert!((editor.camera().yaw() - 41.0).abs() < 1e-4);
        assert!((editor.camera().pitch() - 33.0).abs() < 1e-4);
    }
}
