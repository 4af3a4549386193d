//! Per-frame image operations composed into a fixed, task-specific pipeline.
//!
//! Stages are pure functions of `(frame, t)`. Stages that ignore `t` report themselves as
//! time-invariant, so a static source can have its leading invariant stages folded once instead
//! of once per output frame.

pub(crate) mod color;
pub(crate) mod crop;
pub(crate) mod overlay;
pub(crate) mod resize;
pub(crate) mod rotate;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::BotResult;

/// One per-frame operation.
pub trait FrameStage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Transform `frame`, which is displayed at `t` seconds.
    fn apply(&self, frame: FrameRGBA, t: f64) -> BotResult<FrameRGBA>;

    /// `true` when the output never depends on `t`.
    fn is_time_invariant(&self) -> bool {
        true
    }
}

/// A frame whose leading time-invariant stages have already been applied.
#[derive(Clone, Debug)]
pub struct PreparedFrame {
    frame: FrameRGBA,
    next_stage: usize,
}

impl PreparedFrame {
    /// Pixels after the folded prefix.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Number of stages already applied.
    pub fn folded_stages(&self) -> usize {
        self.next_stage
    }
}

/// Ordered list of stages applied to every frame.
#[derive(Default)]
pub struct FramePipeline {
    stages: Vec<Box<dyn FrameStage>>,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn with_stage(mut self, stage: impl FrameStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in application order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage on `frame` for time `t`.
    pub fn apply(&self, frame: FrameRGBA, t: f64) -> BotResult<FrameRGBA> {
        self.stages
            .iter()
            .try_fold(frame, |frame, stage| stage.apply(frame, t))
    }

    /// Apply the leading run of time-invariant stages once.
    pub fn prepare_static(&self, frame: FrameRGBA) -> BotResult<PreparedFrame> {
        let mut frame = frame;
        let mut next_stage = 0;
        for stage in &self.stages {
            if !stage.is_time_invariant() {
                break;
            }
            frame = stage.apply(frame, 0.0)?;
            next_stage += 1;
        }
        Ok(PreparedFrame { frame, next_stage })
    }

    /// Finish a prepared frame for time `t`.
    pub fn apply_prepared(&self, prepared: &PreparedFrame, t: f64) -> BotResult<FrameRGBA> {
        self.stages[prepared.next_stage.min(self.stages.len())..]
            .iter()
            .try_fold(prepared.frame.clone(), |frame, stage| stage.apply(frame, t))
    }
}

#[cfg(test)]
#[path = "../tests/unit/transform/pipeline.rs"]
mod tests;
