//! Versioned decoding of the persisted journal document.
//!
//! The on-disk format is a single JSON document tagged with a schema
//! version. Encoding always emits the latest shape; decoding dispatches on
//! the version read from the document and understands every historical
//! shape. Adding a schema version means adding a branch here, never
//! changing an old one.
//!
//! Version history:
//! - v1: segments embedded the full exercise object, units were encoded as
//!   single-key objects, and scalar distributions were wrapped in a nested
//!   `_0` payload.
//! - v2 (current): segments reference exercises by id, units are bare
//!   strings, scalar distributions are stored flat.

use crate::error::{Error, Result};
use crate::types::{
    Distribution, Exercise, ExerciseId, Id, Segment, SegmentSet, Units, Weight, Workout,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// The schema version this code writes
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// Documents without a version tag predate tagging and are this version
pub const OLDEST_SCHEMA_VERSION: i64 = 1;

/// Version information threaded through every entity decode function
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext {
    /// The schema version the document on disk was written with
    pub decoded_version: i64,
    /// The schema version the running code writes
    pub latest_version: i64,
}

impl DecodeContext {
    fn is_oldest(&self) -> bool {
        self.decoded_version <= OLDEST_SCHEMA_VERSION
    }
}

// ============================================================================
// Document root
// ============================================================================

/// The root persisted document: a schema version tag plus the full data set
#[derive(Clone, Debug, PartialEq)]
pub struct DataWrapper {
    pub version: Option<i64>,
    pub workouts: Vec<Workout>,
    pub exercises: Vec<Exercise>,
}

/// Wire view of the document; field order is the emitted key order
#[derive(Serialize)]
struct WireWrapper<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
    workouts: &'a [Workout],
    exercises: &'a [Exercise],
}

impl DataWrapper {
    /// A fresh, empty document stamped with the given schema version
    pub fn empty(version: i64) -> Self {
        Self {
            version: Some(version),
            workouts: Vec::new(),
            exercises: Vec::new(),
        }
    }

    /// Decode a document, dispatching every nested decode on the version
    /// tag found in the document itself.
    ///
    /// A document without a `version` key is decoded as the oldest known
    /// version. The returned wrapper is always stamped with
    /// `latest_version`; the version that was read only drives dispatch.
    pub fn decode(bytes: &[u8], latest_version: i64) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        let root = as_object(&value, "document root")?;

        let decoded_version = match root.get("version") {
            None | Some(Value::Null) => OLDEST_SCHEMA_VERSION,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| corrupt("document version must be an integer"))?,
        };
        let ctx = DecodeContext {
            decoded_version,
            latest_version,
        };

        let workouts = array_field(root, "workouts", "document")?
            .iter()
            .map(|value| decode_workout(value, ctx))
            .collect::<Result<Vec<_>>>()?;
        let exercises = array_field(root, "exercises", "document")?
            .iter()
            .map(|value| decode_exercise(value, ctx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: Some(latest_version),
            workouts,
            exercises,
        })
    }

    /// Encode the document in the latest shape.
    ///
    /// With `pretty`, output is indented with sorted keys for human
    /// inspection; otherwise compact.
    pub fn encode(&self, pretty: bool) -> Result<Vec<u8>> {
        let wire = WireWrapper {
            version: self.version,
            workouts: &self.workouts,
            exercises: &self.exercises,
        };
        if pretty {
            // A Value round-trip sorts object keys
            let value = serde_json::to_value(&wire)?;
            Ok(serde_json::to_vec_pretty(&value)?)
        } else {
            Ok(serde_json::to_vec(&wire)?)
        }
    }
}

// ============================================================================
// Entity decoding
// ============================================================================

fn decode_workout(value: &Value, ctx: DecodeContext) -> Result<Workout> {
    let map = as_object(value, "workout")?;
    let id = id_field(map, "id", "workout")?;
    let date = decode_date(field(map, "date", "workout")?)?;
    let segments = array_field(map, "segments", "workout")?
        .iter()
        .map(|value| decode_segment(value, ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(Workout { id, date, segments })
}

fn decode_segment(value: &Value, ctx: DecodeContext) -> Result<Segment> {
    let map = as_object(value, "segment")?;
    let id = id_field(map, "id", "segment")?;
    let exercise = decode_segment_exercise(field(map, "exercise", "segment")?, ctx)?;
    let sets = array_field(map, "sets", "segment")?
        .iter()
        .map(|value| decode_set(value, ctx))
        .collect::<Result<Vec<_>>>()?;
    Ok(Segment { id, exercise, sets })
}

/// v1 embedded the full exercise object under `exercise`; only the
/// reference survives modernization. v2 stores the bare id.
fn decode_segment_exercise(value: &Value, ctx: DecodeContext) -> Result<ExerciseId> {
    if ctx.is_oldest() {
        Ok(decode_exercise(value, ctx)?.id)
    } else {
        parse_id(value, "segment exercise reference")
    }
}

/// Both versions decode `{id, name}`. v1 additionally nested per-occurrence
/// sets under the exercise definition itself; those are discarded on
/// modernization, which falls out of simply not reading the field.
fn decode_exercise(value: &Value, _ctx: DecodeContext) -> Result<Exercise> {
    let map = as_object(value, "exercise")?;
    let id = id_field(map, "id", "exercise")?;
    let name = string_field(map, "name", "exercise")?.to_owned();
    let comment = match map.get("comment") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_str()
                .ok_or_else(|| corrupt("exercise comment must be a string"))?
                .to_owned(),
        ),
    };
    Ok(Exercise { id, name, comment })
}

fn decode_set(value: &Value, ctx: DecodeContext) -> Result<SegmentSet> {
    let map = as_object(value, "set")?;
    let id = id_field(map, "id", "set")?;
    let weight = decode_weight(field(map, "weight", "set")?, ctx)?;
    let repetitions = field(map, "repetitions", "set")?
        .as_u64()
        .and_then(|reps| u32::try_from(reps).ok())
        .ok_or_else(|| corrupt("set repetitions must be a non-negative integer"))?;
    let rate_of_perceived_exertion = match map.get("rateOfPerceivedExertion") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .filter(|rpe| *rpe <= 10)
                .ok_or_else(|| corrupt("rate of perceived exertion must be in 0..=10"))?
                as u8,
        ),
    };
    Ok(SegmentSet {
        id,
        weight,
        repetitions,
        rate_of_perceived_exertion,
    })
}

fn decode_weight(value: &Value, ctx: DecodeContext) -> Result<Weight> {
    let map = as_object(value, "weight")?;
    let distribution = decode_distribution(field(map, "distribution", "weight")?, ctx)?;
    let units = decode_units(field(map, "units", "weight")?, ctx)?;
    Ok(Weight {
        distribution,
        units,
    })
}

/// v1 encoded units as a single-key object (`{"pounds": {}}`), v2 as a
/// bare string.
fn decode_units(value: &Value, ctx: DecodeContext) -> Result<Units> {
    let name = if ctx.is_oldest() {
        let map = as_object(value, "weight units")?;
        let mut keys = map.keys();
        match (keys.next(), keys.next()) {
            (Some(key), None) => key.as_str(),
            _ => return Err(corrupt("expected exactly one weight units key")),
        }
    } else {
        value
            .as_str()
            .ok_or_else(|| corrupt("weight units must be a string"))?
    };

    match name {
        "kilograms" => Ok(Units::Kilograms),
        "pounds" => Ok(Units::Pounds),
        other => Err(corrupt(format!("unsupported weight units {other:?}"))),
    }
}

/// Exactly one of `total`/`dumbbell`/`barbell` must be present. v1 wrapped
/// the scalar payloads in a nested `_0` object; `barbell` is unchanged
/// across versions.
fn decode_distribution(value: &Value, ctx: DecodeContext) -> Result<Distribution> {
    let map = as_object(value, "weight distribution")?;
    if map.len() != 1 {
        return Err(corrupt(
            "expected exactly one weight distribution key, found a different number",
        ));
    }
    let (key, payload) = map
        .iter()
        .next()
        .ok_or_else(|| corrupt("expected exactly one weight distribution key"))?;

    match key.as_str() {
        "total" => Ok(Distribution::Total(decode_scalar_payload(payload, ctx)?)),
        "dumbbell" => Ok(Distribution::Dumbbell(decode_scalar_payload(payload, ctx)?)),
        "barbell" => {
            let map = as_object(payload, "barbell distribution")?;
            let plates = f64_value(field(map, "plates", "barbell distribution")?)?;
            let bar = f64_value(field(map, "bar", "barbell distribution")?)?;
            Ok(Distribution::Barbell { plates, bar })
        }
        other => Err(corrupt(format!("unknown weight distribution {other:?}"))),
    }
}

fn decode_scalar_payload(value: &Value, ctx: DecodeContext) -> Result<f64> {
    if ctx.is_oldest() {
        let map = as_object(value, "weight distribution payload")?;
        f64_value(field(map, "_0", "weight distribution payload")?)
    } else {
        f64_value(value)
    }
}

fn decode_date(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|err| corrupt(format!("invalid workout date {text:?}: {err}"))),
        Value::Number(number) => {
            let seconds = number
                .as_f64()
                .ok_or_else(|| corrupt("workout date is out of range"))?;
            DateTime::from_timestamp(seconds as i64, 0)
                .ok_or_else(|| corrupt("workout date is out of range"))
        }
        _ => Err(corrupt("workout date must be a string or a number")),
    }
}

// ============================================================================
// Value helpers
// ============================================================================

fn corrupt(message: impl Into<String>) -> Error {
    Error::Corrupt(message.into())
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| corrupt(format!("{what} must be an object")))
}

fn field<'a>(map: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| corrupt(format!("{what} is missing the {key:?} field")))
}

fn array_field<'a>(map: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a Vec<Value>> {
    field(map, key, what)?
        .as_array()
        .ok_or_else(|| corrupt(format!("{what} field {key:?} must be an array")))
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a str> {
    field(map, key, what)?
        .as_str()
        .ok_or_else(|| corrupt(format!("{what} field {key:?} must be a string")))
}

fn id_field<T>(map: &Map<String, Value>, key: &str, what: &str) -> Result<Id<T>> {
    parse_id(field(map, key, what)?, what)
}

fn f64_value(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| corrupt("expected a number"))
}

fn parse_id<T>(value: &Value, what: &str) -> Result<Id<T>> {
    let text = value
        .as_str()
        .ok_or_else(|| corrupt(format!("{what} id must be a string")))?;
    Id::parse(text).map_err(|err| corrupt(format!("{what} id is not a valid UUID: {err}")))
}
