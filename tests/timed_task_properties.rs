// Property-based tests for the grace-buffered timed task
// Ticks use a power-of-two length so accumulated time stays exact

use dental_trainer::procedure::{TaskPhase, TaskUpdate, TimedTask};
use proptest::prelude::*;

const DT: f32 = 0.125;
const REQUIRED: f32 = 3.0;
const GRACE: f32 = 1.0;
const REQUIRED_TICKS: u32 = 24;
const GRACE_TICKS: u32 = 8;

fn task() -> TimedTask {
    TimedTask::new("property", REQUIRED, GRACE)
}

// (engaged ticks, dropout ticks) pairs; dropouts always shorter than grace
fn segments_within_grace() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1u32..=10, 0u32..GRACE_TICKS), 1..12)
}

proptest! {
    #[test]
    fn completes_exactly_once_when_gaps_stay_inside_grace(segments in segments_within_grace()) {
        let mut task = task();
        let mut completions = 0;
        let mut engaged_ticks = 0;

        for (engaged, dropout) in &segments {
            for _ in 0..*engaged {
                if task.update(true, DT) == TaskUpdate::Completed {
                    completions += 1;
                }
            }
            engaged_ticks += engaged;
            for _ in 0..*dropout {
                if task.update(false, DT) == TaskUpdate::Completed {
                    completions += 1;
                }
                prop_assert_ne!(task.phase(), TaskPhase::Idle);
            }
        }

        prop_assert!(completions <= 1);
        if engaged_ticks >= REQUIRED_TICKS {
            prop_assert_eq!(completions, 1);
            prop_assert_eq!(task.phase(), TaskPhase::Complete);
            prop_assert_eq!(task.elapsed(), REQUIRED);
        }
    }

    #[test]
    fn dropout_of_full_grace_resets_to_idle(engaged in 1u32..(REQUIRED_TICKS - GRACE_TICKS)) {
        let mut task = task();
        for _ in 0..engaged {
            task.update(true, DT);
        }
        prop_assert!(task.elapsed() > 0.0);

        let mut interrupted = false;
        for _ in 0..GRACE_TICKS {
            interrupted |= task.update(false, DT) == TaskUpdate::Interrupted;
        }

        prop_assert!(interrupted);
        prop_assert_eq!(task.phase(), TaskPhase::Idle);
        prop_assert_eq!(task.elapsed(), 0.0);
    }

    #[test]
    fn short_dropout_never_loses_progress(
        engaged in 1u32..12,
        dropout in 1u32..GRACE_TICKS,
    ) {
        let mut task = task();
        for _ in 0..engaged {
            task.update(true, DT);
        }
        let before = task.elapsed();

        for _ in 0..dropout {
            task.update(false, DT);
        }
        task.update(true, DT);

        prop_assert!(task.elapsed() >= before);
        prop_assert!(task.is_running());
    }

    #[test]
    fn completion_is_sticky(inputs in prop::collection::vec((any::<bool>(), 0.0f32..2.0), 0..50)) {
        let mut task = task();
        for _ in 0..REQUIRED_TICKS {
            task.update(true, DT);
        }
        prop_assert!(task.is_permanently_complete());

        for (condition, dt) in inputs {
            prop_assert_eq!(task.update(condition, dt), TaskUpdate::AlreadyComplete);
            prop_assert!(task.is_permanently_complete());
            prop_assert_eq!(task.elapsed(), REQUIRED);
        }
    }

    #[test]
    fn fraction_stays_in_unit_range(
        inputs in prop::collection::vec((any::<bool>(), 0.0f32..1.5), 0..80),
    ) {
        let mut task = task();
        for (condition, dt) in inputs {
            let update = task.update(condition, dt);
            if let Some(fraction) = update.fraction() {
                prop_assert!((0.0..=1.0).contains(&fraction));
            }
            prop_assert!((0.0..=1.0).contains(&task.fraction()));
        }
    }
}

#[test]
fn reset_clears_completion() {
    let mut task = task();
    for _ in 0..REQUIRED_TICKS {
        task.update(true, DT);
    }
    task.reset();
    assert_eq!(task.phase(), TaskPhase::Idle);
    assert_eq!(task.elapsed(), 0.0);
    assert!(matches!(task.update(true, DT), TaskUpdate::Started { .. }));
}
