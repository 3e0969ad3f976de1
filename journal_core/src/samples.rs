//! Canned sample data for previews and tests.
//!
//! Every call mints fresh identifiers, so two sample journals never
//! collide.

use crate::types::{
    Distribution, Exercise, Segment, SegmentSet, Units, Weight, Workout,
};
use chrono::{Duration, Utc};

/// A coherent sample journal: exercises plus workouts referencing them
pub struct SampleData {
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
}

/// Build the sample journal used by previews and store tests
pub fn sample_data() -> SampleData {
    let bench_press = Exercise::new("Bench Press");
    let chest_flys = Exercise::new("Chest Flys");
    let bicep_curl = Exercise::new("Bicep Curl");
    let deadlifts = Exercise::new("Deadlifts").with_comment("pull slack out first");
    let leg_extensions = Exercise::new("Leg Extensions");

    let mut push_day = Workout::dated(Utc::now() - Duration::days(3));
    push_day.segments = vec![
        Segment::with_sets(
            bench_press.id,
            repeated_sets(
                3,
                Weight::new(
                    Distribution::Barbell {
                        plates: 45.0,
                        bar: 45.0,
                    },
                    Units::Pounds,
                ),
                8,
            ),
        ),
        Segment::with_sets(
            chest_flys.id,
            repeated_sets(3, Weight::new(Distribution::Total(60.0), Units::Pounds), 10),
        ),
        Segment::with_sets(
            bicep_curl.id,
            repeated_sets(
                3,
                Weight::new(Distribution::Dumbbell(50.0), Units::Pounds),
                10,
            ),
        ),
    ];

    let mut pull_day = Workout::dated(Utc::now() - Duration::days(1));
    pull_day.segments = vec![
        Segment::with_sets(
            deadlifts.id,
            repeated_sets(
                5,
                Weight::new(
                    Distribution::Barbell {
                        plates: 70.0,
                        bar: 45.0,
                    },
                    Units::Pounds,
                ),
                5,
            ),
        ),
        Segment::with_sets(
            leg_extensions.id,
            repeated_sets(3, Weight::new(Distribution::Total(80.0), Units::Pounds), 10),
        ),
    ];

    SampleData {
        workouts: vec![push_day, pull_day],
        exercises: vec![
            bench_press,
            chest_flys,
            bicep_curl,
            deadlifts,
            leg_extensions,
        ],
    }
}

fn repeated_sets(count: usize, weight: Weight, repetitions: u32) -> Vec<SegmentSet> {
    (0..count)
        .map(|_| SegmentSet::new(weight, repetitions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_references_are_consistent() {
        let data = sample_data();
        for workout in &data.workouts {
            for segment in &workout.segments {
                assert!(
                    data.exercises
                        .iter()
                        .any(|exercise| exercise.id == segment.exercise),
                    "segment references an exercise outside the sample set"
                );
            }
        }
    }

    #[test]
    fn test_samples_mint_fresh_ids() {
        let first = sample_data();
        let second = sample_data();
        assert_ne!(first.exercises[0].id, second.exercises[0].id);
        assert_ne!(first.workouts[0].id, second.workouts[0].id);
    }
}
