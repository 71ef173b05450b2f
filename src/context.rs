//! Cooperative progress/abort plumbing threaded through the longer-running Area
//! operations (`Reorder`, `Split`, the pocket generators).
//!
//! Everything here is synchronous, single-threaded state: callers poll
//! `please_abort` between units of work and bump `processing_done` as they go,
//! the way the original implementation's `CAreaProcessingContext` is used from a
//! UI progress bar. There is no background thread or channel involved.

use crate::errors::AreaError;
use tracing::debug;

/// Progress/abort state for one top-level operation. Distances here are in the
/// same arbitrary "processing length" units the original uses: callers assign
/// whatever total feels representative (e.g. one unit per sub-area, or one per
/// offset ring) and increment `processing_done` by the matching fraction.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    pub fit_arcs: bool,
    pub please_abort: bool,
    pub processing_done: f64,
    pub single_area_processing_length: f64,
    pub after_make_offsets_length: f64,
    pub make_offsets_increment: f64,
    pub split_processing_length: f64,
    pub set_processing_length_in_split: bool,
    /// Sub-areas that failed during a batch operation (`SplitAndMakePocketToolpath`),
    /// indexed by their position in the split result. The batch continues past a
    /// failure rather than aborting the whole toolpath.
    pub failed_sub_areas: Vec<(usize, AreaError)>,
}

impl ProcessingContext {
    pub fn new() -> Self {
        ProcessingContext {
            fit_arcs: true,
            ..Default::default()
        }
    }

    pub fn bump(&mut self, amount: f64) {
        self.processing_done += amount;
    }

    pub fn abort(&mut self) {
        debug!("abort requested");
        self.please_abort = true;
    }

    pub fn record_failure(&mut self, index: usize, err: AreaError) {
        self.failed_sub_areas.push((index, err));
    }
}

/// Bump `processing_done` on an optional context, reborrowing through the `Option`
/// each call so the context can be polled repeatedly inside a loop.
pub(crate) fn bump(ctx: &mut Option<&mut ProcessingContext>, amount: f64) {
    if let Some(c) = ctx.as_deref_mut() {
        c.bump(amount);
    }
}

pub(crate) fn should_abort(ctx: &Option<&mut ProcessingContext>) -> bool {
    ctx.as_deref().map(|c| c.please_abort).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_accumulates_through_option() {
        let mut real = ProcessingContext::new();
        let mut opt = Some(&mut real);
        bump(&mut opt, 0.5);
        bump(&mut opt, 0.25);
        assert!((real.processing_done - 0.75).abs() < 1e-12);
    }
}
