//! Ordered shape list with single selection and the active transform mode
use nalgebra::{Point3, Vector3};
use std::fmt;
use tracing::{debug, warn};

use crate::error::RecordError;
use crate::record::{self, ShapeRecord};
use crate::shape::{Shape, ShapeId, ShapeKind, TransformMode};
use crate::style::Style;

/// Called with the newly selected shape (or `None`) once per actual change.
pub type SelectionListener = Box<dyn FnMut(Option<&Shape>)>;

pub struct Scene {
    shapes: Vec<Shape>,
    mode: TransformMode,
    next_id: u64,
    default_style: Style,
    listener: Option<SelectionListener>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            mode: TransformMode::Move,
            next_id: 1,
            default_style: Style::default(),
            listener: None,
        }
    }

    pub fn with_default_style(style: Style) -> Self {
        Self {
            default_style: style,
            ..Self::new()
        }
    }

    pub fn on_selection_changed(&mut self, listener: impl FnMut(Option<&Shape>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a shape with the default style, append it and select it.
    pub fn add(&mut self, kind: ShapeKind, position: Point3<f32>) -> ShapeId {
        let shape = Shape::new(kind, position).with_style(self.default_style.clone());
        let id = self.push(shape);
        debug!(?id, kind = kind.type_tag(), "shape added");
        self.select(Some(id));
        id
    }

    /// Append an existing shape without touching the selection. The shape is
    /// given a fresh id.
    pub fn push(&mut self, mut shape: Shape) -> ShapeId {
        shape.id = self.allocate_id();
        shape.selected = false;
        let id = shape.id;
        self.shapes.push(shape);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        let shape = self.shapes.remove(index);
        debug!(?id, "shape removed");
        if shape.selected {
            self.notify_selection();
        }
        Some(shape)
    }

    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.selected_id()?;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        let had_selection = self.selected_id().is_some();
        self.shapes.clear();
        debug!("scene cleared");
        if had_selection {
            self.notify_selection();
        }
    }

    /// Select a shape, or clear the selection with `None`. Returns whether
    /// the selection changed; unknown ids change nothing.
    pub fn select(&mut self, id: Option<ShapeId>) -> bool {
        if id == self.selected_id() {
            return false;
        }
        if let Some(id) = id {
            if self.get(id).is_none() {
                return false;
            }
        }
        for shape in &mut self.shapes {
            shape.selected = Some(shape.id) == id;
        }
        if let Some(shape) = self.selected() {
            let allowed = shape.allowed_modes();
            if !allowed.contains(&self.mode) {
                self.mode = allowed[0];
                debug!(mode = self.mode.label(), "transform mode forced by selection");
            }
        }
        self.notify_selection();
        true
    }

    fn notify_selection(&mut self) {
        let selected = self.shapes.iter().find(|s| s.selected);
        debug!(selected = ?selected.map(Shape::id), "selection changed");
        if let Some(listener) = self.listener.as_mut() {
            listener(selected);
        }
    }

    pub fn selected(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.selected)
    }

    pub fn selected_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.selected)
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected().map(Shape::id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Request a transform mode. A mode the selected shape forbids yields its
    /// first allowed mode instead. Returns the mode now active.
    pub fn set_mode(&mut self, mode: TransformMode) -> TransformMode {
        let mode = match self.selected() {
            Some(shape) if !shape.kind.allows(mode) => shape.allowed_modes()[0],
            _ => mode,
        };
        if mode != self.mode {
            debug!(mode = mode.label(), "transform mode changed");
        }
        self.mode = mode;
        mode
    }

    pub fn translate_selected(&mut self, offset: &Vector3<f32>) {
        if let Some(shape) = self.selected_mut() {
            shape.pose.translate(offset);
        }
    }

    /// Add Euler increments (radians) to the selected shape's rotation.
    pub fn rotate_selected(&mut self, dx: f32, dy: f32, dz: f32) {
        if let Some(shape) = self.selected_mut() {
            shape.pose.rotation.rotate(dx, dy, dz);
        }
    }

    /// Multiply the selected shape's scale about its center.
    pub fn scale_selected(&mut self, factors: &Vector3<f32>) {
        if let Some(shape) = self.selected_mut() {
            let center = shape.center();
            shape.pose.scale_about(&center, factors);
        }
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    /// Change the style of future shapes; the current selection takes it too.
    pub fn set_default_style(&mut self, style: Style) {
        if let Some(shape) = self.selected_mut() {
            shape.style = style.clone();
        }
        self.default_style = style;
    }

    pub fn export_records(&self) -> Vec<ShapeRecord> {
        self.shapes.iter().map(Shape::to_record).collect()
    }

    /// Replace the scene with the given records. Unknown type tags are
    /// skipped; any other bad record leaves the scene untouched. Returns the
    /// number of shapes loaded.
    pub fn load_records(&mut self, records: &[ShapeRecord]) -> Result<usize, RecordError> {
        let mut shapes = Vec::with_capacity(records.len());
        for record in records {
            match Shape::from_record(record)? {
                Some(shape) => shapes.push(shape),
                None => warn!(tag = %record.kind, "skipping record with unknown type"),
            }
        }
        self.clear();
        let count = shapes.len();
        for shape in shapes {
            self.push(shape);
        }
        debug!(count, "scene loaded");
        Ok(count)
    }

    pub fn to_document(&self) -> String {
        record::write_document(&self.export_records())
    }

    pub fn load_document(&mut self, text: &str) -> Result<usize, RecordError> {
        let records = record::parse_document(text)?;
        self.load_records(&records)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("shapes", &self.shapes)
            .field("mode", &self.mode)
            .field("default_style", &self.default_style)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_scene() -> (Scene, Rc<RefCell<Vec<Option<ShapeId>>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        let sink = Rc::clone(&events);
        scene.on_selection_changed(move |shape| sink.borrow_mut().push(shape.map(Shape::id)));
        (scene, events)
    }

    #[test]
    fn test_add_selects_new_shape() {
        let (mut scene, events) = recording_scene();
        let a = scene.add(ShapeKind::cube(2.0), Point3::origin());
        let b = scene.add(ShapeKind::sphere(1.0), Point3::new(3.0, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(scene.selected_id(), Some(b));
        assert_eq!(*events.borrow(), vec![Some(a), Some(b)]);
    }

    #[test]
    fn test_select_switches_single_selection() {
        let (mut scene, events) = recording_scene();
        let a = scene.push(Shape::new(ShapeKind::cube(1.0), Point3::origin()));
        let b = scene.push(Shape::new(ShapeKind::cube(1.0), Point3::origin()));
        assert!(scene.select(Some(a)));
        events.borrow_mut().clear();

        assert!(scene.select(Some(b)));
        assert_eq!(scene.iter().filter(|s| s.is_selected()).count(), 1);
        assert_eq!(scene.selected_id(), Some(b));
        assert_eq!(*events.borrow(), vec![Some(b)]);
    }

    #[test]
    fn test_reselect_is_silent() {
        let (mut scene, events) = recording_scene();
        let a = scene.add(ShapeKind::cube(1.0), Point3::origin());
        assert!(!scene.select(Some(a)));
        assert!(!scene.select(Some(ShapeId(999))));
        assert_eq!(events.borrow().len(), 1);
        assert!(scene.select(None));
        assert!(!scene.select(None));
        assert_eq!(*events.borrow(), vec![Some(a), None]);
    }

    #[test]
    fn test_selection_forces_allowed_mode() {
        let mut scene = Scene::new();
        let cube = scene.add(ShapeKind::cube(1.0), Point3::origin());
        assert_eq!(scene.set_mode(TransformMode::Rotate), TransformMode::Rotate);

        let point = scene.add(ShapeKind::point(), Point3::origin());
        assert_eq!(scene.mode(), TransformMode::Move);

        scene.select(Some(cube));
        assert_eq!(scene.mode(), TransformMode::Move);
        assert_eq!(scene.set_mode(TransformMode::Scale), TransformMode::Scale);

        scene.select(Some(point));
        assert_eq!(scene.mode(), TransformMode::Move);
        assert_eq!(scene.set_mode(TransformMode::Rotate), TransformMode::Move);
    }

    #[test]
    fn test_vector_keeps_scale_mode() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::cube(1.0), Point3::origin());
        scene.set_mode(TransformMode::Scale);
        scene.add(ShapeKind::vector(Vector3::y()), Point3::origin());
        assert_eq!(scene.mode(), TransformMode::Scale);
    }

    #[test]
    fn test_remove_selected_notifies() {
        let (mut scene, events) = recording_scene();
        let a = scene.add(ShapeKind::cube(1.0), Point3::origin());
        let b = scene.push(Shape::new(ShapeKind::cone(1.0, 2.0), Point3::origin()));
        assert!(scene.remove(b).is_some());
        assert_eq!(events.borrow().len(), 1);

        let removed = scene.delete_selected().unwrap();
        assert_eq!(removed.id(), a);
        assert!(scene.is_empty());
        assert_eq!(events.borrow().last(), Some(&None));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut scene = Scene::new();
        let a = scene.add(ShapeKind::cube(1.0), Point3::origin());
        scene.clear();
        let b = scene.add(ShapeKind::cube(1.0), Point3::origin());
        assert!(b > a);
    }

    #[test]
    fn test_selection_edits() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::cube(1.0), Point3::new(1.0, 0.0, 0.0));
        scene.translate_selected(&Vector3::new(0.0, 2.0, 0.0));
        scene.rotate_selected(0.5, 0.0, 0.25);
        for _ in 0..50 {
            scene.scale_selected(&Vector3::new(0.5, 0.5, 2.0));
        }
        let shape = scene.selected().unwrap();
        assert!((shape.pose.position - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-6);
        assert!((shape.pose.rotation.x - 0.5).abs() < 1e-6);
        assert!((shape.pose.scale.x - 0.1).abs() < 1e-6);
        assert!((shape.pose.scale.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_style_restyles_selection() {
        let mut scene = Scene::new();
        let a = scene.add(ShapeKind::cube(1.0), Point3::origin());
        let style = Style {
            line_width: 3.0,
            ..Style::default()
        };
        scene.set_default_style(style.clone());
        assert_eq!(scene.get(a).unwrap().style, style);
        scene.add(ShapeKind::sphere(1.0), Point3::origin());
        assert_eq!(scene.selected().unwrap().style.line_width, 3.0);
    }

    #[test]
    fn test_load_replaces_and_skips_unknown() {
        let mut source = Scene::new();
        source.add(ShapeKind::cube(2.0), Point3::new(1.0, 2.0, 3.0));
        source.add(ShapeKind::cone(1.0, 2.0), Point3::origin());
        let mut records = source.export_records();
        records.insert(1, ShapeRecord::new("Torus3D"));

        let (mut scene, events) = recording_scene();
        scene.add(ShapeKind::point(), Point3::origin());
        assert_eq!(scene.load_records(&records), Ok(2));
        assert_eq!(scene.len(), 2);
        assert!(scene.selected().is_none());
        assert_eq!(events.borrow().last(), Some(&None));
        assert_eq!(scene.shapes()[0].kind, ShapeKind::cube(2.0));
    }

    #[test]
    fn test_bad_record_leaves_scene_untouched() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::point(), Point3::origin());
        let bad = ShapeRecord::new("Cube3D").with("size", true);
        assert!(scene.load_records(&[bad]).is_err());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_document_round_trip() {
        let mut scene = Scene::new();
        scene.add(ShapeKind::pyramid(2.0, 2.0), Point3::new(0.0, 1.0, 0.0));
        scene.add(ShapeKind::vector(Vector3::new(0.0, 0.0, 1.0)), Point3::origin());
        let text = scene.to_document();

        let mut copy = Scene::new();
        assert_eq!(copy.load_document(&text), Ok(2));
        assert_eq!(copy.export_records(), scene.export_records());
    }
}
