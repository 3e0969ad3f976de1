use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use journal_core::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Fitness journal data store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workouts with their segments
    Workouts,

    /// List known exercises
    Exercises,

    /// Show history and stats for one exercise
    Show {
        /// Exercise name (case-insensitive)
        name: String,
    },

    /// Add a reusable exercise definition
    AddExercise {
        name: String,

        /// Free-form note attached to the exercise
        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete an exercise (refused while any workout still references it)
    RmExercise {
        name: String,
    },

    /// Start a new, empty workout
    StartWorkout {
        /// Workout date (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<String>,
    },

    /// Log sets of an exercise into the most recent workout
    Log {
        /// Exercise name (case-insensitive)
        exercise: String,

        /// Repetitions per set; repeat the flag for multiple sets
        #[arg(long, required = true)]
        reps: Vec<u32>,

        /// Number of sets; combines with a single --reps value
        #[arg(long)]
        sets: Option<u32>,

        /// Rate of perceived exertion (0-10), applied to every set
        #[arg(long)]
        rpe: Option<u8>,

        #[command(flatten)]
        weight: WeightArgs,
    },

    /// Export every logged set to a CSV file
    Export {
        /// Destination CSV path
        path: PathBuf,
    },
}

#[derive(Args)]
struct WeightArgs {
    /// Total weight moved
    #[arg(long, conflicts_with_all = ["dumbbell", "plates"])]
    total: Option<f64>,

    /// Weight of a single dumbbell (counted twice)
    #[arg(long, conflicts_with_all = ["total", "plates"])]
    dumbbell: Option<f64>,

    /// Plates on one side of the bar (counted twice)
    #[arg(long)]
    plates: Option<f64>,

    /// Bar weight, used with --plates
    #[arg(long, default_value_t = 45.0, requires = "plates")]
    bar: f64,

    /// Units (pounds/kilograms); defaults to the configured units
    #[arg(long)]
    units: Option<String>,
}

impl WeightArgs {
    fn to_weight(&self, default_units: Units) -> Result<Weight> {
        let units = match &self.units {
            Some(text) => text.parse().map_err(Error::Config)?,
            None => default_units,
        };
        let distribution = match (self.total, self.dumbbell, self.plates) {
            (Some(total), None, None) => Distribution::Total(total),
            (None, Some(per_side), None) => Distribution::Dumbbell(per_side),
            (None, None, Some(plates)) => Distribution::Barbell {
                plates,
                bar: self.bar,
            },
            _ => {
                return Err(Error::Config(
                    "specify exactly one of --total, --dumbbell or --plates".into(),
                ))
            }
        };
        Ok(Weight::new(distribution, units))
    }
}

fn main() -> Result<()> {
    journal_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let persistor = Arc::new(FilePersistor::at(data_dir.join("data.json")));
    let store = WorkoutStore::new(persistor);
    if !store.wait_until_loaded(Duration::from_secs(10)) {
        tracing::warn!("initial load did not complete; proceeding with empty data");
    }

    match cli.command {
        Commands::Workouts => cmd_workouts(&store),
        Commands::Exercises => cmd_exercises(&store),
        Commands::Show { name } => cmd_show(&store, &name),
        Commands::AddExercise { name, comment } => cmd_add_exercise(&store, name, comment),
        Commands::RmExercise { name } => cmd_rm_exercise(&store, &name),
        Commands::StartWorkout { date } => cmd_start_workout(&store, date),
        Commands::Log {
            exercise,
            reps,
            sets,
            rpe,
            weight,
        } => cmd_log(&store, &config, &exercise, reps, sets, rpe, &weight),
        Commands::Export { path } => cmd_export(&store, &path),
    }
}

fn cmd_workouts(store: &WorkoutStore) -> Result<()> {
    let workouts = store.workouts();
    if workouts.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for workout in &workouts {
        println!(
            "{}  ({} segments)",
            workout.date.format("%Y-%m-%d %H:%M"),
            workout.segments.len()
        );
        for segment in &workout.segments {
            println!("  {}", segment_summary(store, segment));
        }
    }
    Ok(())
}

fn cmd_exercises(store: &WorkoutStore) -> Result<()> {
    let mut exercises = store.exercises();
    if exercises.is_empty() {
        println!("No exercises defined yet.");
        return Ok(());
    }
    exercises.sort_by(|a, b| a.name.cmp(&b.name));

    for exercise in &exercises {
        let mut line = exercise.name.clone();
        if let Some(weight) = store.max_weight(exercise.id) {
            line.push_str(&format!("  (max {})", weight));
        }
        if let Some(comment) = &exercise.comment {
            line.push_str(&format!("  ({})", comment));
        }
        println!("{line}");
    }
    Ok(())
}

fn cmd_show(store: &WorkoutStore, name: &str) -> Result<()> {
    let Some(exercise) = find_exercise(store, name) else {
        eprintln!("No exercise named \"{name}\". Add it with add-exercise.");
        std::process::exit(1);
    };

    println!("{}", exercise.name);
    if let Some(comment) = &exercise.comment {
        println!("  {}", comment);
    }
    match store.max_weight(exercise.id) {
        Some(weight) => println!("  max weight: {}", weight),
        None => println!("  no sets logged yet"),
    }

    let by_date = store.sets_by_date(exercise.id);
    for (date, sets) in by_date.iter().rev() {
        if sets.is_empty() {
            continue;
        }
        let reps = sets
            .iter()
            .map(|set| set.repetitions.to_string())
            .collect::<Vec<_>>()
            .join("/");
        println!(
            "  {}  {} sets: {} reps",
            date.format("%Y-%m-%d"),
            sets.len(),
            reps
        );
    }
    Ok(())
}

fn cmd_add_exercise(store: &WorkoutStore, name: String, comment: Option<String>) -> Result<()> {
    if find_exercise(store, &name).is_some() {
        eprintln!("Exercise \"{name}\" already exists.");
        std::process::exit(1);
    }

    let mut exercise = Exercise::new(name);
    exercise.comment = comment;
    let exercise = store.create_exercise(exercise);
    store.flush();

    println!("Added exercise \"{}\".", exercise.name);
    Ok(())
}

fn cmd_rm_exercise(store: &WorkoutStore, name: &str) -> Result<()> {
    let Some(exercise) = find_exercise(store, name) else {
        eprintln!("No exercise named \"{name}\".");
        std::process::exit(1);
    };

    match store.delete_exercise(exercise.id) {
        Ok(()) => {
            store.flush();
            println!("Deleted exercise \"{}\".", exercise.name);
            Ok(())
        }
        Err(Error::ExerciseUsedInSegments(exercise)) => {
            eprintln!(
                "Cannot delete \"{}\": it is still used by logged segments.",
                exercise.name
            );
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}

fn cmd_start_workout(store: &WorkoutStore, date: Option<String>) -> Result<()> {
    let workout = match date {
        Some(text) => Workout::dated(parse_date(&text)?),
        None => Workout::new(),
    };

    let workout = store.create_workout(workout);
    store.flush();

    println!("Started workout on {}.", workout.date.format("%Y-%m-%d %H:%M"));
    Ok(())
}

fn cmd_log(
    store: &WorkoutStore,
    config: &Config,
    exercise_name: &str,
    reps: Vec<u32>,
    sets: Option<u32>,
    rpe: Option<u8>,
    weight: &WeightArgs,
) -> Result<()> {
    let Some(exercise) = find_exercise(store, exercise_name) else {
        eprintln!("No exercise named \"{exercise_name}\". Add it with add-exercise.");
        std::process::exit(1);
    };

    if let Some(rpe) = rpe {
        if rpe > 10 {
            return Err(Error::Config("--rpe must be between 0 and 10".into()));
        }
    }

    let weight = weight.to_weight(config.defaults.units)?;

    let set_reps: Vec<u32> = match (sets, reps.as_slice()) {
        (Some(count), [single]) => vec![*single; count as usize],
        (Some(_), _) => {
            return Err(Error::Config(
                "--sets only combines with a single --reps value".into(),
            ))
        }
        (None, many) => many.to_vec(),
    };

    // Log into the most recent workout, starting one if none exists
    let workout = store
        .workouts()
        .into_iter()
        .max_by_key(|workout| workout.date)
        .unwrap_or_else(|| store.create_workout(Workout::new()));

    let segment = store
        .create_segment(Segment::new(exercise.id), workout.id)
        .ok_or_else(|| Error::Config("workout disappeared while logging".into()))?;

    for repetitions in &set_reps {
        let mut set = SegmentSet::new(weight, *repetitions);
        set.rate_of_perceived_exertion = rpe;
        store.create_set(set, segment.id, workout.id);
    }
    store.flush();

    let logged = store
        .segment(segment.id, workout.id)
        .ok_or_else(|| Error::Config("segment disappeared while logging".into()))?;
    println!(
        "Logged {}: {} @ {}",
        exercise.name,
        logged.composition_string().unwrap_or_default(),
        weight
    );
    Ok(())
}

fn cmd_export(store: &WorkoutStore, path: &PathBuf) -> Result<()> {
    let count = export_sets_csv(&store.workouts(), &store.exercises(), path)?;
    println!("Exported {count} sets to {}.", path.display());
    Ok(())
}

// Helpers

fn find_exercise(store: &WorkoutStore, name: &str) -> Option<Exercise> {
    store
        .exercises()
        .into_iter()
        .find(|exercise| exercise.name.eq_ignore_ascii_case(name))
}

fn segment_summary(store: &WorkoutStore, segment: &Segment) -> String {
    let name = store
        .exercise(segment.exercise)
        .map(|exercise| exercise.name)
        .unwrap_or_else(|| "(unknown exercise)".into());

    let mut summary = name;
    if let Some(composition) = segment.composition_string() {
        summary.push_str(&format!(": {}", composition));
    }
    if let Some(weight) = segment.display_weight() {
        summary.push_str(&format!(" @ {}", weight));
    }
    summary
}

fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|err| Error::Config(format!("invalid date {text:?}: {err}")))?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| Error::Config(format!("invalid date {text:?}")))?;
    Ok(Utc.from_utc_datetime(&noon))
}
