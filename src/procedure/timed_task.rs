// Hold-near-target-while-engaged timer with a grace window for brief dropouts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPhase {
    Idle,
    Running,
    /// Condition lost, still inside the grace window
    GracePaused,
    /// Terminal until `reset`
    Complete,
}

/// What a single `update` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskUpdate {
    /// Not running and the condition is not met
    Idle,
    /// Went from idle to running this tick
    Started { fraction: f32 },
    Progress { fraction: f32, in_grace: bool },
    /// Grace window ran out; progress discarded
    Interrupted,
    /// Reached the required duration this tick
    Completed,
    /// Already complete, input ignored
    AlreadyComplete,
}

impl TaskUpdate {
    /// Progress fraction to present, if this tick produced one
    pub fn fraction(&self) -> Option<f32> {
        match self {
            TaskUpdate::Started { fraction } | TaskUpdate::Progress { fraction, .. } => {
                Some(*fraction)
            }
            TaskUpdate::Completed => Some(1.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedTask {
    label: String,
    required_duration: f32,
    grace_period: f32,
    elapsed: f32,
    out_of_range_elapsed: f32,
    phase: TaskPhase,
}

impl TimedTask {
    pub fn new(label: impl Into<String>, required_duration: f32, grace_period: f32) -> Self {
        Self {
            label: label.into(),
            required_duration: required_duration.max(f32::EPSILON),
            grace_period: grace_period.max(0.0),
            elapsed: 0.0,
            out_of_range_elapsed: 0.0,
            phase: TaskPhase::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn required_duration(&self) -> f32 {
        self.required_duration
    }

    pub fn grace_period(&self) -> f32 {
        self.grace_period
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn out_of_range_elapsed(&self) -> f32 {
        self.out_of_range_elapsed
    }

    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    /// Running or inside the grace window
    pub fn is_running(&self) -> bool {
        matches!(self.phase, TaskPhase::Running | TaskPhase::GracePaused)
    }

    pub fn is_permanently_complete(&self) -> bool {
        self.phase == TaskPhase::Complete
    }

    pub fn fraction(&self) -> f32 {
        (self.elapsed / self.required_duration).clamp(0.0, 1.0)
    }

    /// Back to a fresh idle task. The only way out of `Complete`.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.out_of_range_elapsed = 0.0;
        self.phase = TaskPhase::Idle;
    }

    pub fn update_with(&mut self, in_range: bool, engaged: bool, dt: f32) -> TaskUpdate {
        self.update(in_range && engaged, dt)
    }

    /// Advance by `dt` seconds with the controlling condition either held or lost
    pub fn update(&mut self, condition: bool, dt: f32) -> TaskUpdate {
        let dt = dt.max(0.0);

        match self.phase {
            TaskPhase::Complete => TaskUpdate::AlreadyComplete,
            TaskPhase::Idle => {
                if !condition {
                    return TaskUpdate::Idle;
                }
                self.elapsed = 0.0;
                self.out_of_range_elapsed = 0.0;
                self.phase = TaskPhase::Running;
                tracing::debug!(task = %self.label, "Timed task started");

                if self.accumulate(dt) {
                    TaskUpdate::Completed
                } else {
                    TaskUpdate::Started {
                        fraction: self.fraction(),
                    }
                }
            }
            TaskPhase::Running | TaskPhase::GracePaused => {
                if condition {
                    if self.phase == TaskPhase::GracePaused {
                        tracing::debug!(
                            task = %self.label,
                            dropout = self.out_of_range_elapsed,
                            "Condition restored inside grace window"
                        );
                    }
                    self.out_of_range_elapsed = 0.0;
                    self.phase = TaskPhase::Running;
                    return self.progress(dt, false);
                }

                self.out_of_range_elapsed += dt;
                if self.out_of_range_elapsed >= self.grace_period {
                    tracing::warn!(
                        task = %self.label,
                        elapsed = self.elapsed,
                        grace_period = self.grace_period,
                        "Timed task interrupted"
                    );
                    self.reset();
                    return TaskUpdate::Interrupted;
                }

                if self.phase == TaskPhase::Running {
                    tracing::debug!(task = %self.label, "Condition lost, grace window open");
                }
                self.phase = TaskPhase::GracePaused;
                self.progress(dt, true)
            }
        }
    }

    fn progress(&mut self, dt: f32, in_grace: bool) -> TaskUpdate {
        if self.accumulate(dt) {
            TaskUpdate::Completed
        } else {
            TaskUpdate::Progress {
                fraction: self.fraction(),
                in_grace,
            }
        }
    }

    /// Returns true when this call completed the task
    fn accumulate(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.required_duration {
            self.elapsed = self.required_duration;
            self.out_of_range_elapsed = 0.0;
            self.phase = TaskPhase::Complete;
            tracing::info!(
                task = %self.label,
                duration = self.required_duration,
                "Timed task complete"
            );
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(task: &mut TimedTask, condition: bool, seconds: f32, dt: f32) -> Vec<TaskUpdate> {
        let ticks = (seconds / dt).round() as usize;
        (0..ticks).map(|_| task.update(condition, dt)).collect()
    }

    #[test]
    fn test_short_dropout_inside_grace_still_completes() {
        let mut task = TimedTask::new("anesthesia", 3.0, 1.0);

        let engaged = feed(&mut task, true, 2.0, 0.25);
        assert!(matches!(engaged[0], TaskUpdate::Started { .. }));
        assert_eq!(task.elapsed(), 2.0);

        let dropout = feed(&mut task, false, 0.5, 0.25);
        assert!(dropout
            .iter()
            .all(|u| matches!(u, TaskUpdate::Progress { in_grace: true, .. })));
        assert_eq!(task.phase(), TaskPhase::GracePaused);

        let resumed = feed(&mut task, true, 1.5, 0.25);
        let completions = resumed
            .iter()
            .filter(|u| **u == TaskUpdate::Completed)
            .count();
        assert_eq!(completions, 1);
        assert!(task.is_permanently_complete());
        assert_eq!(task.elapsed(), 3.0);
        assert!(resumed[2..].iter().all(|u| *u == TaskUpdate::AlreadyComplete));
    }

    #[test]
    fn test_dropout_past_grace_resets_to_idle() {
        let mut task = TimedTask::new("anesthesia", 3.0, 1.0);
        feed(&mut task, true, 2.0, 0.25);

        let gap = feed(&mut task, false, 1.25, 0.25);
        assert_eq!(gap[3], TaskUpdate::Interrupted);
        assert_eq!(gap[4], TaskUpdate::Idle);
        assert_eq!(task.phase(), TaskPhase::Idle);
        assert_eq!(task.elapsed(), 0.0);
        assert_eq!(task.out_of_range_elapsed(), 0.0);
    }

    #[test]
    fn test_dropout_just_under_grace_keeps_progress() {
        let mut task = TimedTask::new("drilling", 5.0, 1.0);
        feed(&mut task, true, 1.0, 0.5);
        let before = task.elapsed();

        task.update(false, 0.9);
        assert_eq!(task.phase(), TaskPhase::GracePaused);
        assert!(task.elapsed() >= before);

        let update = task.update(true, 0.5);
        assert!(matches!(update, TaskUpdate::Progress { in_grace: false, .. }));
        assert!(task.elapsed() > before);
        assert_eq!(task.out_of_range_elapsed(), 0.0);
    }

    #[test]
    fn test_dropout_just_over_grace_resets() {
        let mut task = TimedTask::new("drilling", 5.0, 1.0);
        feed(&mut task, true, 1.0, 0.5);

        assert_eq!(task.update(false, 1.01), TaskUpdate::Interrupted);
        assert_eq!(task.elapsed(), 0.0);
        assert_eq!(task.phase(), TaskPhase::Idle);
    }

    #[test]
    fn test_grace_windows_do_not_accumulate_across_resumes() {
        let mut task = TimedTask::new("cleaning", 10.0, 1.0);
        for _ in 0..5 {
            task.update(true, 0.5);
            task.update(false, 0.75);
        }
        assert!(task.is_running());
        assert!(task.elapsed() > 0.0);
    }

    #[test]
    fn test_completion_is_sticky_until_reset() {
        let mut task = TimedTask::new("screwing", 1.0, 0.5);
        assert_eq!(task.update(true, 1.0), TaskUpdate::Completed);

        for condition in [false, true, false, false] {
            assert_eq!(task.update(condition, 5.0), TaskUpdate::AlreadyComplete);
            assert!(task.is_permanently_complete());
        }

        task.reset();
        assert_eq!(task.phase(), TaskPhase::Idle);
        assert_eq!(task.update(false, 0.1), TaskUpdate::Idle);
    }

    #[test]
    fn test_idle_ignores_lost_condition() {
        let mut task = TimedTask::new("anesthesia", 3.0, 1.0);
        assert_eq!(task.update_with(true, false, 0.5), TaskUpdate::Idle);
        assert_eq!(task.update_with(false, true, 0.5), TaskUpdate::Idle);
        assert_eq!(task.elapsed(), 0.0);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let mut task = TimedTask::new("anesthesia", 2.0, 1.0);
        assert_eq!(task.fraction(), 0.0);
        task.update(true, 1.0);
        assert_eq!(task.fraction(), 0.5);
        task.update(true, 10.0);
        assert_eq!(task.fraction(), 1.0);
    }

    #[test]
    fn test_zero_grace_resets_on_any_dropout() {
        let mut task = TimedTask::new("strict", 2.0, 0.0);
        task.update(true, 1.0);
        assert_eq!(task.update(false, 0.01), TaskUpdate::Interrupted);
    }
}
