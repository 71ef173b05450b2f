//! The planar geometry core (§3-§4): points, tagged vertices, derived spans,
//! curves, and the region-level `Area` type with its Boolean operators,
//! offset/thicken, and reorder/split machinery.

pub mod area;
pub mod clip;
pub mod curve;
pub mod offset;
pub mod point;
pub mod span;
pub mod vertex;

pub use area::Area;
pub use curve::Curve;
pub use point::{Box2D, Point};
pub use span::Span;
pub use vertex::{Vertex, VertexKind};
