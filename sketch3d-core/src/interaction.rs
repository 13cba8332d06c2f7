//! Pointer-driven selection and gizmo drag state machine
use nalgebra::{Point2, Unit, Vector3};
use tracing::debug;

use crate::config::InteractionConfig;
use crate::gizmo::{GizmoAxis, GizmoRegistry};
use crate::picker;
use crate::projection::{OrbitCamera, Viewport};
use crate::scene::Scene;
use crate::shape::{Shape, ShapeKind, TransformMode};
use crate::transform::{MAX_SCALE, MIN_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Selects and drags.
    Primary,
    /// Orbits the camera.
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingGizmoAxis {
        axis: GizmoAxis,
        mode: TransformMode,
    },
    DraggingShapeFree {
        mode: TransformMode,
    },
}

/// Screen delta that drives a single-axis move or scale: right for X,
/// up for Y, down for Z.
fn axis_delta(axis: GizmoAxis, dx: f32, dy: f32) -> f32 {
    match axis {
        GizmoAxis::X => dx,
        GizmoAxis::Y => -dy,
        GizmoAxis::Z | GizmoAxis::VectorLength => dy,
    }
}

/// Degrees of rotation per pixel of drag, before sensitivity.
fn rotate_delta(axis: GizmoAxis, dx: f32, dy: f32) -> f32 {
    match axis {
        GizmoAxis::X => -dy,
        _ => dx,
    }
}

fn rotate_about_center(shape: &mut Shape, axis: &Unit<Vector3<f32>>, degrees: f32) {
    let center = shape.center();
    shape.pose.rotate_about(&center, axis, degrees.to_radians());
}

/// Apply one drag step on a gizmo handle.
pub fn apply_axis_drag(
    shape: &mut Shape,
    axis: GizmoAxis,
    mode: TransformMode,
    dx: f32,
    dy: f32,
    config: &InteractionConfig,
) {
    if axis == GizmoAxis::VectorLength {
        if let ShapeKind::Vector(arrow) = &mut shape.kind {
            arrow.set_length(arrow.length + (dx - dy) * config.vector_length_speed);
        }
        return;
    }
    let Some(unit) = axis.unit() else { return };

    match mode {
        TransformMode::Move => {
            let offset = unit.into_inner() * axis_delta(axis, dx, dy) * config.move_speed;
            shape.pose.translate(&offset);
        }
        TransformMode::Scale => {
            let factor = 1.0 + axis_delta(axis, dx, dy) * config.scale_speed;
            let mut factors = Vector3::repeat(1.0);
            factors += unit.into_inner() * (factor - 1.0);
            let center = shape.center();
            shape.pose.scale_about(&center, &factors);
        }
        TransformMode::Rotate => {
            rotate_about_center(shape, &unit, rotate_delta(axis, dx, dy) * config.rotate_speed);
        }
    }
}

/// Apply one drag step on the body of the selected shape.
pub fn apply_free_drag(
    shape: &mut Shape,
    mode: TransformMode,
    dx: f32,
    dy: f32,
    camera: &OrbitCamera,
    config: &InteractionConfig,
) {
    match mode {
        TransformMode::Move => {
            let (right, up) = camera.drag_axes();
            let offset = (right * dx - up * dy) * config.free_move_speed;
            shape.pose.translate(&offset);
        }
        TransformMode::Scale => {
            let factor = (1.0 + (dx - dy) * config.scale_speed).clamp(MIN_SCALE, MAX_SCALE);
            let center = shape.center();
            shape.pose.scale_about(&center, &Vector3::repeat(factor));
        }
        TransformMode::Rotate => {
            if dx.abs() > dy.abs() {
                rotate_about_center(shape, &Vector3::y_axis(), dx * config.free_rotate_speed);
            } else {
                rotate_about_center(shape, &Vector3::x_axis(), -dy * config.free_rotate_speed);
            }
        }
    }
}

/// Pointer state between events.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: DragState,
    last: Point2<f32>,
    orbit_last: Option<Point2<f32>>,
    hover: Option<GizmoAxis>,
    pub config: InteractionConfig,
}

impl Interaction {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: DragState::Idle,
            last: Point2::origin(),
            orbit_last: None,
            hover: None,
            config,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Gizmo axis under the pointer while idle.
    pub fn hover(&self) -> Option<GizmoAxis> {
        self.hover
    }

    fn gizmo_radius(&self, mode: TransformMode) -> f32 {
        match mode {
            TransformMode::Rotate => self.config.rotate_gizmo_radius,
            _ => self.config.gizmo_radius,
        }
    }

    /// Gizmo axis at `at`, if the registry belongs to the current selection
    /// and mode.
    fn gizmo_hit(&self, scene: &Scene, registry: Option<&GizmoRegistry>, at: &Point2<f32>) -> Option<GizmoAxis> {
        let selected = scene.selected_id()?;
        let registry = registry.filter(|r| r.matches(selected, scene.mode()))?;
        registry.hit_test(at, self.gizmo_radius(scene.mode()))
    }

    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        camera: &OrbitCamera,
        viewport: Viewport,
        registry: Option<&GizmoRegistry>,
        button: PointerButton,
        at: Point2<f32>,
    ) {
        match button {
            PointerButton::Secondary => {
                self.orbit_last = Some(at);
                return;
            }
            PointerButton::Middle => return,
            PointerButton::Primary => {}
        }

        self.last = at;
        if let Some(axis) = self.gizmo_hit(scene, registry, &at) {
            let mode = scene.mode();
            self.state = DragState::DraggingGizmoAxis { axis, mode };
            debug!(?axis, ?mode, "gizmo drag started");
            return;
        }

        let projector = camera.projector(viewport);
        match picker::pick(scene, &projector, &at, self.config.pick_radius) {
            Some(id) => {
                scene.select(Some(id));
                let mode = scene.mode();
                self.state = DragState::DraggingShapeFree { mode };
                debug!(?id, ?mode, "free drag started");
            }
            None => {
                scene.select(None);
                self.state = DragState::Idle;
            }
        }
    }

    /// Returns whether anything visible changed.
    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        camera: &mut OrbitCamera,
        registry: Option<&GizmoRegistry>,
        at: Point2<f32>,
    ) -> bool {
        let mut changed = false;

        if let Some(last) = self.orbit_last {
            let d = at - last;
            camera.orbit(d.x, d.y, self.config.orbit_yaw_speed, self.config.orbit_pitch_speed);
            self.orbit_last = Some(at);
            changed = true;
        }

        let (dx, dy) = (at.x - self.last.x, at.y - self.last.y);
        match self.state {
            DragState::Idle => {
                let hover = self.gizmo_hit(scene, registry, &at);
                changed |= hover != self.hover;
                self.hover = hover;
            }
            DragState::DraggingGizmoAxis { axis, mode } => {
                self.last = at;
                match scene.selected_mut() {
                    Some(shape) => apply_axis_drag(shape, axis, mode, dx, dy, &self.config),
                    None => self.state = DragState::Idle,
                }
                changed = true;
            }
            DragState::DraggingShapeFree { mode } => {
                self.last = at;
                match scene.selected_mut() {
                    Some(shape) => apply_free_drag(shape, mode, dx, dy, camera, &self.config),
                    None => self.state = DragState::Idle,
                }
                changed = true;
            }
        }
        changed
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        match button {
            PointerButton::Primary => {
                if self.state != DragState::Idle {
                    debug!("drag ended");
                }
                self.state = DragState::Idle;
            }
            PointerButton::Secondary => self.orbit_last = None,
            PointerButton::Middle => {}
        }
    }

    pub fn wheel(&mut self, camera: &mut OrbitCamera, delta: f32) {
        camera.zoom(delta);
    }
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}
