//! Pocket-toolpath generation (§4.5-§4.7): mode dispatch over the spiral
//! (concentric-offset) and zig-zag generators, plus the single-offset perimeter
//! pass and the batch `SplitAndMakePocketToolpath` entry point.

mod spiral;
mod zigzag;

use crate::context::{bump, should_abort, ProcessingContext};
use crate::errors::{AreaError, AreaResult};
use crate::geometry::area::Area;
use crate::geometry::curve::Curve;
use tracing::{debug, debug_span};

/// `CAreaPocketParams` (§3): parameters shared by every pocket-fill mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CAreaPocketParams {
    pub tool_radius: f64,
    pub extra_offset: f64,
    pub stepover: f64,
    pub from_center: bool,
    pub mode: PocketMode,
    pub zig_angle_degrees: f64,
    /// Restrict `MakePocketToolpath` to the initial tool-radius offset ring,
    /// skipping the mode-specific fill entirely (a "rough perimeter only" pass).
    pub only_cut_first_offset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketMode {
    Spiral,
    ZigZag,
    SingleOffset,
    ZigZagThenSingleOffset,
}

impl CAreaPocketParams {
    pub fn validate(&self) -> AreaResult<()> {
        if self.tool_radius <= 0.0 {
            return Err(AreaError::invalid_parameters("tool_radius must be positive"));
        }
        if self.stepover <= 0.0 {
            return Err(AreaError::invalid_parameters("stepover must be positive"));
        }
        if self.stepover >= 2.0 * self.tool_radius {
            return Err(AreaError::invalid_parameters(
                "stepover must be strictly less than 2 * tool_radius",
            ));
        }
        Ok(())
    }
}

/// `CArea::MakePocketToolpath` (§4.7): `area` is a single-outer-plus-islands
/// region (the caller is responsible for having already `Split` a multi-outer
/// input; see `split_and_make_pocket_toolpath` for the batch entry point that
/// does this itself).
pub fn make_pocket_toolpath(
    area: &Area,
    params: &CAreaPocketParams,
    mut ctx: Option<&mut ProcessingContext>,
) -> AreaResult<Vec<Curve>> {
    params.validate()?;
    let _span = debug_span!("make_pocket_toolpath", mode = ?params.mode).entered();

    if area.is_empty() {
        return Ok(Vec::new());
    }

    let offset_value = params.tool_radius + params.extra_offset;
    let mut starting = area.clone();
    starting.offset(offset_value)?;
    if starting.is_empty() {
        return Ok(Vec::new());
    }

    if params.only_cut_first_offset {
        return Ok(starting.curves.clone());
    }

    match params.mode {
        PocketMode::SingleOffset => Ok(starting.curves.clone()),
        PocketMode::Spiral => {
            let sub_areas = starting.split()?;
            let mut out = Vec::new();
            for sub in &sub_areas {
                if should_abort(&ctx) {
                    debug!("aborted mid-spiral");
                    break;
                }
                if let Some(curve) =
                    spiral::generate_for_subarea(sub, params.stepover, area.accuracy, &mut ctx)?
                {
                    out.push(curve);
                }
                bump(&mut ctx, 1.0);
            }
            Ok(out)
        }
        PocketMode::ZigZag => zigzag::zigzag(
            &starting,
            params.stepover,
            params.zig_angle_degrees,
            area.accuracy,
            &mut ctx,
        ),
        PocketMode::ZigZagThenSingleOffset => {
            let mut out = zigzag::zigzag(
                &starting,
                params.stepover,
                params.zig_angle_degrees,
                area.accuracy,
                &mut ctx,
            )?;
            out.extend(starting.curves.iter().cloned());
            Ok(out)
        }
    }
}

/// `CArea::SplitAndMakePocketToolpath` (§4.7/§7): split `area` into its
/// independent single-outer sub-areas first, then run `make_pocket_toolpath` on
/// each, continuing past a failing sub-area and recording it on `ctx` rather
/// than aborting the whole batch.
pub fn split_and_make_pocket_toolpath(
    area: &Area,
    params: &CAreaPocketParams,
    mut ctx: Option<&mut ProcessingContext>,
) -> AreaResult<Vec<Curve>> {
    params.validate()?;
    let sub_areas = area.split()?;
    let mut out = Vec::new();
    for (i, sub) in sub_areas.iter().enumerate() {
        if should_abort(&ctx) {
            debug!(index = i, "aborted mid-split-batch");
            break;
        }
        match make_pocket_toolpath(sub, params, ctx.as_deref_mut()) {
            Ok(curves) => out.extend(curves),
            Err(err) => {
                if let Some(c) = ctx.as_deref_mut() {
                    c.record_failure(i, err);
                }
            }
        }
    }
    Ok(out)
}
