//! Staged virtual-user schedules with linear ramp interpolation.

use std::time::Duration;

/// One step of a schedule: ramp linearly to `target` VUs over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

/// An ordered list of stages. The VU count ramps linearly from the previous
/// stage's target (0 before the first stage) to each stage's target across
/// its duration.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    stages: Vec<Stage>,
}

impl StageSchedule {
    /// Build a schedule. Empty schedules are rejected.
    pub fn new(stages: Vec<Stage>) -> Result<Self, EmptySchedule> {
        if stages.is_empty() {
            return Err(EmptySchedule);
        }
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Index of the stage active at `elapsed`, clamped to the last stage.
    pub fn stage_index_at(&self, elapsed: Duration) -> usize {
        let mut offset = Duration::ZERO;
        for (idx, stage) in self.stages.iter().enumerate() {
            offset += stage.duration;
            if elapsed < offset {
                return idx;
            }
        }
        self.stages.len() - 1
    }

    /// Desired VU count at `elapsed` since the start of the schedule.
    ///
    /// Within a stage the count is interpolated linearly between the previous
    /// target and the stage target; past the end of the schedule the final
    /// target is returned.
    pub fn vus_at(&self, elapsed: Duration) -> usize {
        let mut offset = Duration::ZERO;
        let mut from = 0usize;

        for stage in &self.stages {
            let end = offset + stage.duration;
            if elapsed < end {
                let into = (elapsed - offset).as_secs_f64();
                let span = stage.duration.as_secs_f64();
                if span == 0.0 {
                    return stage.target;
                }
                let fraction = into / span;
                let from_f = from as f64;
                let to_f = stage.target as f64;
                return (from_f + (to_f - from_f) * fraction).round() as usize;
            }
            offset = end;
            from = stage.target;
        }

        from
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a stage schedule needs at least one stage")]
pub struct EmptySchedule;

/// Shorthand for building a schedule from `(seconds, target)` pairs.
///
/// Panics on an empty list; profile constructors always pass their fixed
/// three stages.
pub fn schedule(steps: &[(u64, usize)]) -> StageSchedule {
    let stages = steps
        .iter()
        .map(|&(secs, target)| Stage::new(Duration::from_secs(secs), target))
        .collect();
    StageSchedule::new(stages).expect("at least one stage")
}
