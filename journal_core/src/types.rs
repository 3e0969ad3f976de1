//! Core domain types for the fitness journal.
//!
//! This module defines the fundamental types used throughout the system:
//! - Phantom-typed identifiers
//! - Weights and their load distributions
//! - Sets, segments, exercises and workouts
//!
//! The serde derives on these types emit the *latest* wire shape only;
//! reading older document versions is the codec module's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier scoped to an owning entity type.
///
/// The phantom parameter makes identifiers of different entities distinct
/// at compile time: a `WorkoutId` can never be passed where an
/// `ExerciseId` is expected, even though both wrap a UUID.
pub struct Id<T> {
    raw: Uuid,
    _owner: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Mint a fresh, never-before-used identifier
    pub fn new() -> Self {
        Self::from_raw(Uuid::new_v4())
    }

    pub const fn from_raw(raw: Uuid) -> Self {
        Self {
            raw,
            _owner: PhantomData,
        }
    }

    pub fn raw(&self) -> Uuid {
        self.raw
    }

    pub fn parse(text: &str) -> std::result::Result<Self, uuid::Error> {
        Uuid::parse_str(text).map(Self::from_raw)
    }
}

// Manual impls: derives would needlessly bound `T`.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.raw)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_raw)
    }
}

pub type WorkoutId = Id<Workout>;
pub type ExerciseId = Id<Exercise>;
pub type SegmentId = Id<Segment>;
pub type SetId = Id<SegmentSet>;

// ============================================================================
// Weight
// ============================================================================

/// How a weight's load is specified
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// The total weight moved
    Total(f64),
    /// The weight of a single dumbbell; counted twice
    Dumbbell(f64),
    /// The plates on one side of the bar (counted twice) plus the bar itself
    Barbell { plates: f64, bar: f64 },
}

/// Measurement units for a weight
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Kilograms,
    Pounds,
}

impl Units {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Units::Kilograms => "kg",
            Units::Pounds => "lb",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(Units::Kilograms),
            "lb" | "lbs" | "pounds" => Ok(Units::Pounds),
            other => Err(format!("unknown units: {other}")),
        }
    }
}

/// A logged load: a distribution plus the units it was entered in
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub distribution: Distribution,
    pub units: Units,
}

impl Weight {
    pub fn new(distribution: Distribution, units: Units) -> Self {
        Self {
            distribution,
            units,
        }
    }

    /// The total weight moved, derived from the distribution
    pub fn total_weight(&self) -> f64 {
        match self.distribution {
            Distribution::Total(weight) => weight,
            Distribution::Dumbbell(weight) => weight * 2.0,
            Distribution::Barbell { plates, bar } => plates * 2.0 + bar,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_weight();
        if total.fract() == 0.0 {
            write!(f, "{:.0} {}", total, self.units)
        } else {
            write!(f, "{} {}", total, self.units)
        }
    }
}

// ============================================================================
// Sets and Segments
// ============================================================================

/// One logged repetition group within a segment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSet {
    pub id: SetId,
    pub weight: Weight,
    pub repetitions: u32,
    /// Subjective exertion rating, 0..=10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_of_perceived_exertion: Option<u8>,
}

impl SegmentSet {
    pub fn new(weight: Weight, repetitions: u32) -> Self {
        Self {
            id: SetId::new(),
            weight,
            repetitions,
            rate_of_perceived_exertion: None,
        }
    }

    pub fn with_rpe(mut self, rpe: u8) -> Self {
        self.rate_of_perceived_exertion = Some(rpe);
        self
    }

    /// Copy of this set, minting a fresh identifier iff `new_id`
    pub fn duplicated(&self, new_id: bool) -> Self {
        let mut copy = self.clone();
        if new_id {
            copy.id = SetId::new();
        }
        copy
    }
}

/// One exercise's occurrence within a workout: a reference to the exercise
/// plus the sets logged for it, in order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub exercise: ExerciseId,
    pub sets: Vec<SegmentSet>,
}

impl Segment {
    pub fn new(exercise: ExerciseId) -> Self {
        Self::with_sets(exercise, Vec::new())
    }

    pub fn with_sets(exercise: ExerciseId, sets: Vec<SegmentSet>) -> Self {
        Self {
            id: SegmentId::new(),
            exercise,
            sets,
        }
    }

    /// The weight shared by more than one set, if any.
    ///
    /// A weight logged by a single set is not "common"; ties go to the
    /// most frequent weight.
    pub fn common_weight(&self) -> Option<Weight> {
        let mut counts: Vec<(Weight, usize)> = Vec::new();
        for set in &self.sets {
            match counts.iter_mut().find(|(weight, _)| *weight == set.weight) {
                Some(entry) => entry.1 += 1,
                None => counts.push((set.weight, 1)),
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .max_by_key(|(_, count)| *count)
            .map(|(weight, _)| weight)
    }

    /// The common weight, or the heaviest set's weight when nothing repeats
    pub fn display_weight(&self) -> Option<Weight> {
        self.common_weight().or_else(|| {
            self.sets
                .iter()
                .map(|set| set.weight)
                .max_by(|a, b| a.total_weight().total_cmp(&b.total_weight()))
        })
    }

    /// The repetition count shared by more than one set, if any
    pub fn common_repetitions(&self) -> Option<u32> {
        let mut counts: Vec<(u32, usize)> = Vec::new();
        for set in &self.sets {
            match counts.iter_mut().find(|(reps, _)| *reps == set.repetitions) {
                Some(entry) => entry.1 += 1,
                None => counts.push((set.repetitions, 1)),
            }
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .max_by_key(|(_, count)| *count)
            .map(|(reps, _)| reps)
    }

    /// The common repetition count, or the highest when nothing repeats
    pub fn display_repetitions(&self) -> Option<u32> {
        self.common_repetitions()
            .or_else(|| self.sets.iter().map(|set| set.repetitions).max())
    }

    /// `"10"` when a common repetition count exists, otherwise an in-order
    /// breakdown like `"8/10/12"`
    pub fn display_repetitions_string(&self) -> Option<String> {
        if self.sets.is_empty() {
            return None;
        }
        match self.common_repetitions() {
            Some(reps) => Some(reps.to_string()),
            None => Some(self.repetitions_breakdown()),
        }
    }

    /// `"3x10"` when a common repetition count exists, otherwise the
    /// breakdown form
    pub fn composition_string(&self) -> Option<String> {
        if self.sets.is_empty() {
            return None;
        }
        match self.common_repetitions() {
            Some(reps) => Some(format!("{}x{}", self.sets.len(), reps)),
            None => Some(self.repetitions_breakdown()),
        }
    }

    fn repetitions_breakdown(&self) -> String {
        self.sets
            .iter()
            .map(|set| set.repetitions.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

// ============================================================================
// Exercises and Workouts
// ============================================================================

/// A reusable, named movement definition, referenced by segments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ExerciseId::new(),
            name: name.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A dated training session containing ordered segments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    pub date: DateTime<Utc>,
    pub segments: Vec<Segment>,
}

impl Workout {
    /// A fresh, empty workout dated now
    pub fn new() -> Self {
        Self::dated(Utc::now())
    }

    pub fn dated(date: DateTime<Utc>) -> Self {
        Self {
            id: WorkoutId::new(),
            date,
            segments: Vec::new(),
        }
    }
}

impl Default for Workout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lb(distribution: Distribution) -> Weight {
        Weight::new(distribution, Units::Pounds)
    }

    fn set_with(weight: f64, repetitions: u32) -> SegmentSet {
        SegmentSet::new(lb(Distribution::Total(weight)), repetitions)
    }

    #[test]
    fn test_identifiers_are_unique_and_typed() {
        let a = ExerciseId::new();
        let b = ExerciseId::new();
        assert_ne!(a, b);

        let raw = Uuid::new_v4();
        assert_eq!(ExerciseId::from_raw(raw).raw(), raw);
        assert_eq!(ExerciseId::from_raw(raw), ExerciseId::from_raw(raw));
    }

    #[test]
    fn test_identifier_serde_is_a_bare_uuid() {
        let id = WorkoutId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!(id.raw().to_string()));

        let back: WorkoutId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_total_weight() {
        assert_eq!(lb(Distribution::Total(50.0)).total_weight(), 50.0);
        assert_eq!(lb(Distribution::Dumbbell(50.0)).total_weight(), 100.0);
        assert_eq!(
            lb(Distribution::Barbell {
                plates: 50.0,
                bar: 45.0
            })
            .total_weight(),
            145.0
        );
    }

    #[test]
    fn test_weight_wire_shape_is_flat() {
        let weight = lb(Distribution::Total(50.0));
        let json = serde_json::to_value(weight).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"distribution": {"total": 50.0}, "units": "pounds"})
        );

        let barbell = Weight::new(
            Distribution::Barbell {
                plates: 45.0,
                bar: 45.0,
            },
            Units::Kilograms,
        );
        let json = serde_json::to_value(barbell).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "distribution": {"barbell": {"plates": 45.0, "bar": 45.0}},
                "units": "kilograms"
            })
        );
    }

    #[test]
    fn test_units_parsing() {
        assert_eq!("lb".parse::<Units>().unwrap(), Units::Pounds);
        assert_eq!("KG".parse::<Units>().unwrap(), Units::Kilograms);
        assert!("stone".parse::<Units>().is_err());
    }

    #[test]
    fn test_duplicated_keeps_fields_same_id() {
        let set = set_with(50.0, 10).with_rpe(5);
        let copy = set.duplicated(false);
        assert_eq!(set, copy);
    }

    #[test]
    fn test_duplicated_with_new_id() {
        let set = set_with(50.0, 10).with_rpe(5);
        let copy = set.duplicated(true);
        assert_ne!(set.id, copy.id);
        assert_eq!(set.weight, copy.weight);
        assert_eq!(set.repetitions, copy.repetitions);
        assert_eq!(
            set.rate_of_perceived_exertion,
            copy.rate_of_perceived_exertion
        );
    }

    #[test]
    fn test_common_display_weight() {
        let segment = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(50.0, 10), set_with(50.0, 10), set_with(55.0, 10)],
        );
        assert_eq!(
            segment.display_weight(),
            Some(lb(Distribution::Total(50.0)))
        );
    }

    #[test]
    fn test_display_weight_falls_back_to_max() {
        let segment = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(45.0, 10), set_with(50.0, 10), set_with(55.0, 10)],
        );
        assert_eq!(segment.common_weight(), None);
        assert_eq!(
            segment.display_weight(),
            Some(lb(Distribution::Total(55.0)))
        );
    }

    #[test]
    fn test_display_weight_empty_segment() {
        let segment = Segment::new(ExerciseId::new());
        assert_eq!(segment.display_weight(), None);
    }

    #[test]
    fn test_common_repetitions_requires_a_repeat() {
        let common = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(50.0, 10), set_with(50.0, 10), set_with(55.0, 12)],
        );
        assert_eq!(common.common_repetitions(), Some(10));

        let distinct = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(45.0, 8), set_with(50.0, 10), set_with(55.0, 12)],
        );
        assert_eq!(distinct.common_repetitions(), None);
        assert_eq!(distinct.display_repetitions(), Some(12));
    }

    #[test]
    fn test_display_repetitions_string() {
        let common = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(50.0, 10), set_with(50.0, 10), set_with(55.0, 10)],
        );
        assert_eq!(common.display_repetitions_string().as_deref(), Some("10"));

        let distinct = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(45.0, 8), set_with(50.0, 10), set_with(55.0, 12)],
        );
        assert_eq!(
            distinct.display_repetitions_string().as_deref(),
            Some("8/10/12")
        );
    }

    #[test]
    fn test_composition_string() {
        let common = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(45.0, 10), set_with(50.0, 10), set_with(55.0, 10)],
        );
        assert_eq!(common.composition_string().as_deref(), Some("3x10"));

        let distinct = Segment::with_sets(
            ExerciseId::new(),
            vec![set_with(45.0, 8), set_with(50.0, 10), set_with(55.0, 12)],
        );
        assert_eq!(distinct.composition_string().as_deref(), Some("8/10/12"));

        assert_eq!(Segment::new(ExerciseId::new()).composition_string(), None);
    }

    #[test]
    fn test_set_wire_shape() {
        let set = set_with(50.0, 10).with_rpe(7);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["rateOfPerceivedExertion"], serde_json::json!(7));
        assert_eq!(json["repetitions"], serde_json::json!(10));

        let plain = set_with(50.0, 10);
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("rateOfPerceivedExertion").is_none());
    }

    #[test]
    fn test_exercise_comment_omitted_when_absent() {
        let exercise = Exercise::new("Bench Press");
        let json = serde_json::to_value(&exercise).unwrap();
        assert!(json.get("comment").is_none());

        let commented = Exercise::new("Squats").with_comment("low bar");
        let json = serde_json::to_value(&commented).unwrap();
        assert_eq!(json["comment"], serde_json::json!("low bar"));
    }
}
