//! Sketch3D Core Library - software 3D pipeline for primitive editing
//!
//! Procedural primitive geometry, an orbit camera with perspective
//! projection, a painter's-algorithm renderer with backface culling and flat
//! shading, center-proximity picking and a gizmo drag state machine that
//! turns 2D pointer deltas into translate/scale/rotate edits. Hosts supply a
//! [`DrawSurface`] and forward pointer events to an [`Editor`].

pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod gizmo;
pub mod interaction;
pub mod picker;
pub mod projection;
pub mod record;
pub mod render;
pub mod scene;
pub mod shape;
pub mod style;
pub mod transform;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use editor::Editor;
pub use error::{ConfigError, RecordError};
pub use geometry::Geometry;
pub use gizmo::{GizmoAxis, GizmoRegistry};
pub use interaction::{DragState, PointerButton};
pub use projection::{OrbitCamera, Projector, Viewport};
pub use record::{RecordValue, ShapeRecord};
pub use render::{DisplayList, DrawCommand, DrawSurface, Renderer};
pub use scene::Scene;
pub use shape::{Arrow, Shape, ShapeId, ShapeKind, ShapeParam, TransformMode};
pub use style::{Color, Style};
pub use transform::{Pose, RotationState};
