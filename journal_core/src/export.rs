//! CSV export of the journal.
//!
//! Flattens workouts into one row per logged set, joined to the exercise
//! name, for use in spreadsheets.

use crate::types::{Distribution, Exercise, Workout};
use crate::Result;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    exercise: String,
    distribution: String,
    units: String,
    total_weight: f64,
    repetitions: u32,
    rate_of_perceived_exertion: Option<u8>,
}

/// Write every set of every workout as a CSV row, one file per export.
///
/// Returns the number of rows written. Segments referencing an unknown
/// exercise are exported with a placeholder name rather than dropped.
pub fn export_sets_csv(
    workouts: &[Workout],
    exercises: &[Exercise],
    csv_path: &Path,
) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);
    let mut count = 0;

    for workout in workouts {
        for segment in &workout.segments {
            let exercise_name = exercises
                .iter()
                .find(|exercise| exercise.id == segment.exercise)
                .map(|exercise| exercise.name.as_str())
                .unwrap_or("(unknown exercise)");

            for set in &segment.sets {
                writer.serialize(CsvRow {
                    date: workout.date.to_rfc3339(),
                    exercise: exercise_name.to_owned(),
                    distribution: distribution_label(&set.weight.distribution),
                    units: set.weight.units.abbreviation().to_owned(),
                    total_weight: set.weight.total_weight(),
                    repetitions: set.repetitions,
                    rate_of_perceived_exertion: set.rate_of_perceived_exertion,
                })?;
                count += 1;
            }
        }
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets to {:?}", count, csv_path);
    Ok(count)
}

fn distribution_label(distribution: &Distribution) -> String {
    match distribution {
        Distribution::Total(weight) => format!("total {weight}"),
        Distribution::Dumbbell(weight) => format!("dumbbell {weight}"),
        Distribution::Barbell { plates, bar } => format!("barbell {plates}+{bar}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn test_export_writes_one_row_per_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("journal.csv");
        let data = samples::sample_data();

        let expected: usize = data
            .workouts
            .iter()
            .flat_map(|workout| workout.segments.iter())
            .map(|segment| segment.sets.len())
            .sum();

        let count = export_sets_csv(&data.workouts, &data.exercises, &csv_path).unwrap();
        assert_eq!(count, expected);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("date,exercise,distribution,units,"));
        assert_eq!(contents.lines().count(), expected + 1);
        assert!(contents.contains("Bench Press"));
        assert!(contents.contains("barbell 45+45"));
    }

    #[test]
    fn test_export_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("journal.csv");

        let count = export_sets_csv(&[], &[], &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(csv_path.exists());
    }

    #[test]
    fn test_export_orphaned_reference_gets_placeholder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("journal.csv");
        let data = samples::sample_data();

        // Export without the exercise list; every row falls back
        let count = export_sets_csv(&data.workouts, &[], &csv_path).unwrap();
        assert!(count > 0);
        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.contains("(unknown exercise)"));
    }
}
