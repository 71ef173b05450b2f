//! Planar pocket-milling toolpath generation: an integer-clipping-backed 2D
//! geometry core (`geometry`) plus spiral and zig-zag pocket-fill generators
//! (`pocket`) built on top of it.

pub mod api;
pub mod context;
pub mod errors;
pub mod geometry;
pub mod pocket;

pub use api::{vertex_views, CurveBuilder, VertexView};
pub use context::ProcessingContext;
pub use errors::{AreaError, AreaResult};
pub use geometry::area::{get_overlap_type, is_inside_area, is_inside_curve, Area, OverlapType};
pub use geometry::{Box2D, Curve, Point, Span, Vertex, VertexKind};
pub use pocket::{make_pocket_toolpath, split_and_make_pocket_toolpath, CAreaPocketParams, PocketMode};
