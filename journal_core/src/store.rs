//! In-memory workout store: the single source of truth for journal data.
//!
//! The store owns the workouts and exercises, performs every mutation, and
//! enforces the one hard integrity rule (an exercise referenced by any
//! segment cannot be deleted). Mutations apply synchronously to in-memory
//! state; persistence happens afterwards on a background worker thread fed
//! through a channel, so mutation callers never wait on the disk.
//!
//! In-memory state is authoritative for the running session: a failed save
//! is logged and dropped, never rolled back or retried.

use crate::error::{Error, Result};
use crate::samples;
use crate::types::{
    Exercise, ExerciseId, Segment, SegmentId, SegmentSet, SetId, Weight, Workout, WorkoutId,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// Persistor seam
// ============================================================================

/// The persistence capability the store is built against.
///
/// Loads are issued once, from the store's background loader thread.
/// Saves receive a full snapshot of the collection; a save error is the
/// implementation's way of reporting failure, which the store logs and
/// otherwise ignores.
pub trait WorkoutStorePersistor: Send + Sync {
    fn load_workouts(&self) -> Vec<Workout>;

    fn save_workouts(&self, workouts: Vec<Workout>) -> Result<()>;

    fn load_exercises(&self) -> Vec<Exercise>;

    fn save_exercises(&self, exercises: Vec<Exercise>) -> Result<()>;
}

/// Observable persistor activity, recorded by [`MemoryPersistor`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistorEvent {
    LoadWorkouts,
    SaveWorkouts,
    LoadExercises,
    SaveExercises,
}

#[derive(Default)]
struct MemoryInner {
    workouts: Vec<Workout>,
    exercises: Vec<Exercise>,
    events: Vec<PersistorEvent>,
    hold_loads: bool,
    fail_saves: bool,
}

/// In-memory persistor with an observable event log.
///
/// Used for previews and as the spy the store's behavior is tested
/// against: tests wait on recorded events instead of sleeping, can hold
/// loads open to observe the not-yet-loaded store, and can force saves to
/// fail to exercise the log-and-drop policy.
pub struct MemoryPersistor {
    inner: Mutex<MemoryInner>,
    signal: Condvar,
}

impl MemoryPersistor {
    pub fn new(workouts: Vec<Workout>, exercises: Vec<Exercise>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                workouts,
                exercises,
                ..MemoryInner::default()
            }),
            signal: Condvar::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Seeded with the sample journal
    pub fn preview() -> Self {
        let data = samples::sample_data();
        Self::new(data.workouts, data.exercises)
    }

    /// Like [`MemoryPersistor::new`], but loads block until
    /// [`MemoryPersistor::release_loads`] is called
    pub fn gated(workouts: Vec<Workout>, exercises: Vec<Exercise>) -> Self {
        let persistor = Self::new(workouts, exercises);
        persistor.lock().hold_loads = true;
        persistor
    }

    pub fn release_loads(&self) {
        self.lock().hold_loads = false;
        self.signal.notify_all();
    }

    /// Make subsequent saves report failure (the data is not updated)
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn events(&self) -> Vec<PersistorEvent> {
        self.lock().events.clone()
    }

    /// The workout collection as of the last completed save
    pub fn workouts(&self) -> Vec<Workout> {
        self.lock().workouts.clone()
    }

    /// The exercise collection as of the last completed save
    pub fn exercises(&self) -> Vec<Exercise> {
        self.lock().exercises.clone()
    }

    /// Block until the given event has been recorded; false on timeout
    pub fn wait_for_event(&self, event: PersistorEvent, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        while !inner.events.contains(&event) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .signal
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, inner: &mut MemoryInner, event: PersistorEvent) {
        inner.events.push(event);
        self.signal.notify_all();
    }
}

impl WorkoutStorePersistor for MemoryPersistor {
    fn load_workouts(&self) -> Vec<Workout> {
        let mut inner = self.lock();
        while inner.hold_loads {
            inner = self
                .signal
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.record(&mut inner, PersistorEvent::LoadWorkouts);
        inner.workouts.clone()
    }

    fn save_workouts(&self, workouts: Vec<Workout>) -> Result<()> {
        let mut inner = self.lock();
        self.record(&mut inner, PersistorEvent::SaveWorkouts);
        if inner.fail_saves {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated save failure",
            )));
        }
        inner.workouts = workouts;
        Ok(())
    }

    fn load_exercises(&self) -> Vec<Exercise> {
        let mut inner = self.lock();
        while inner.hold_loads {
            inner = self
                .signal
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.record(&mut inner, PersistorEvent::LoadExercises);
        inner.exercises.clone()
    }

    fn save_exercises(&self, exercises: Vec<Exercise>) -> Result<()> {
        let mut inner = self.lock();
        self.record(&mut inner, PersistorEvent::SaveExercises);
        if inner.fail_saves {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated save failure",
            )));
        }
        inner.exercises = exercises;
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

enum SaveRequest {
    Workouts(Vec<Workout>),
    Exercises(Vec<Exercise>),
    Flush(mpsc::Sender<()>),
}

#[derive(Default)]
struct StoreState {
    workouts: Vec<Workout>,
    exercises: Vec<Exercise>,
    loaded: bool,
}

/// The in-memory authority for all workout and exercise data.
///
/// Construction returns immediately; a background thread seeds the store
/// from the persistor, and reads before that completes return empty
/// collections. Every successful mutation enqueues a full-collection
/// snapshot for the save worker, which coalesces bursts into the newest
/// pending snapshot per collection.
pub struct WorkoutStore {
    state: Arc<(Mutex<StoreState>, Condvar)>,
    save_tx: mpsc::Sender<SaveRequest>,
}

impl WorkoutStore {
    pub fn new(persistor: Arc<dyn WorkoutStorePersistor>) -> Self {
        let state = Arc::new((Mutex::new(StoreState::default()), Condvar::new()));
        let (save_tx, save_rx) = mpsc::channel();

        {
            let persistor = Arc::clone(&persistor);
            thread::spawn(move || save_worker(save_rx, persistor));
        }

        {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let workouts = persistor.load_workouts();
                let exercises = persistor.load_exercises();

                let (lock, signal) = &*state;
                let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
                tracing::debug!(
                    workouts = workouts.len(),
                    exercises = exercises.len(),
                    "initial journal load complete"
                );
                state.workouts = workouts;
                state.exercises = exercises;
                state.loaded = true;
                signal.notify_all();
            });
        }

        Self { state, save_tx }
    }

    /// Whether the initial load from the persistor has completed
    pub fn is_loaded(&self) -> bool {
        self.lock_state().loaded
    }

    /// Block until the initial load has completed; false on timeout
    pub fn wait_until_loaded(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (_, signal) = &*self.state;
        let mut state = self.lock_state();
        while !state.loaded {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = signal
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        true
    }

    /// Block until every save enqueued so far has been handed to the
    /// persistor. Mutation callers never need this; it exists so a process
    /// can drain fire-and-forget saves before exiting.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.save_tx.send(SaveRequest::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn queue_workouts_save(&self, workouts: Vec<Workout>) {
        if self.save_tx.send(SaveRequest::Workouts(workouts)).is_err() {
            tracing::error!("save worker is gone; workout changes will not be persisted");
        }
    }

    fn queue_exercises_save(&self, exercises: Vec<Exercise>) {
        if self.save_tx.send(SaveRequest::Exercises(exercises)).is_err() {
            tracing::error!("save worker is gone; exercise changes will not be persisted");
        }
    }
}

fn save_worker(rx: mpsc::Receiver<SaveRequest>, persistor: Arc<dyn WorkoutStorePersistor>) {
    while let Ok(request) = rx.recv() {
        let mut pending = vec![request];
        // Coalesce whatever queued up while the previous save was running;
        // every snapshot is a full collection, so only the newest of each
        // kind needs to hit the disk.
        while let Ok(request) = rx.try_recv() {
            pending.push(request);
        }

        let mut workouts = None;
        let mut exercises = None;
        let mut flushes = Vec::new();
        for request in pending {
            match request {
                SaveRequest::Workouts(snapshot) => workouts = Some(snapshot),
                SaveRequest::Exercises(snapshot) => exercises = Some(snapshot),
                SaveRequest::Flush(ack) => flushes.push(ack),
            }
        }

        if let Some(snapshot) = workouts {
            if let Err(err) = persistor.save_workouts(snapshot) {
                tracing::error!("failed to save workouts: {err}");
            }
        }
        if let Some(snapshot) = exercises {
            if let Err(err) = persistor.save_exercises(snapshot) {
                tracing::error!("failed to save exercises: {err}");
            }
        }
        for ack in flushes {
            let _ = ack.send(());
        }
    }
}

// ============================================================================
// Lookups
// ============================================================================

impl WorkoutStore {
    pub fn workouts(&self) -> Vec<Workout> {
        self.lock_state().workouts.clone()
    }

    pub fn workout(&self, workout_id: WorkoutId) -> Option<Workout> {
        self.lock_state()
            .workouts
            .iter()
            .find(|workout| workout.id == workout_id)
            .cloned()
    }

    pub fn segments(&self, workout_id: WorkoutId) -> Option<Vec<Segment>> {
        self.workout(workout_id).map(|workout| workout.segments)
    }

    pub fn segment(&self, segment_id: SegmentId, workout_id: WorkoutId) -> Option<Segment> {
        self.segments(workout_id)?
            .into_iter()
            .find(|segment| segment.id == segment_id)
    }

    pub fn sets(&self, segment_id: SegmentId, workout_id: WorkoutId) -> Option<Vec<SegmentSet>> {
        self.segment(segment_id, workout_id).map(|segment| segment.sets)
    }

    pub fn set(
        &self,
        set_id: SetId,
        segment_id: SegmentId,
        workout_id: WorkoutId,
    ) -> Option<SegmentSet> {
        self.sets(segment_id, workout_id)?
            .into_iter()
            .find(|set| set.id == set_id)
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.lock_state().exercises.clone()
    }

    pub fn exercise(&self, exercise_id: ExerciseId) -> Option<Exercise> {
        self.lock_state()
            .exercises
            .iter()
            .find(|exercise| exercise.id == exercise_id)
            .cloned()
    }

    /// Every segment across every workout that references the exercise
    pub fn segments_with_exercise(&self, exercise_id: ExerciseId) -> Vec<Segment> {
        self.lock_state()
            .workouts
            .iter()
            .flat_map(|workout| {
                workout
                    .segments
                    .iter()
                    .filter(|segment| segment.exercise == exercise_id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The exercise's segment from the most recent workout that logged it
    pub fn latest_segment(&self, exercise_id: ExerciseId) -> Option<Segment> {
        let state = self.lock_state();
        state
            .workouts
            .iter()
            .filter(|workout| {
                workout
                    .segments
                    .iter()
                    .any(|segment| segment.exercise == exercise_id)
            })
            .max_by_key(|workout| workout.date)?
            .segments
            .iter()
            .rev()
            .find(|segment| segment.exercise == exercise_id)
            .cloned()
    }

    /// The heaviest total weight ever logged for the exercise
    pub fn max_weight(&self, exercise_id: ExerciseId) -> Option<Weight> {
        let state = self.lock_state();
        state
            .workouts
            .iter()
            .flat_map(|workout| workout.segments.iter())
            .filter(|segment| segment.exercise == exercise_id)
            .flat_map(|segment| segment.sets.iter())
            .map(|set| set.weight)
            .max_by(|a, b| a.total_weight().total_cmp(&b.total_weight()))
    }

    /// All sets of the exercise, keyed by the date of the workout that
    /// logged them
    pub fn sets_by_date(&self, exercise_id: ExerciseId) -> BTreeMap<DateTime<Utc>, Vec<SegmentSet>> {
        let state = self.lock_state();
        let mut by_date: BTreeMap<DateTime<Utc>, Vec<SegmentSet>> = BTreeMap::new();
        for workout in &state.workouts {
            for segment in &workout.segments {
                if segment.exercise == exercise_id {
                    by_date
                        .entry(workout.date)
                        .or_default()
                        .extend(segment.sets.iter().cloned());
                }
            }
        }
        by_date
    }

    /// The last set logged on the most recent date the exercise appears
    pub fn last_set(&self, exercise_id: ExerciseId) -> Option<SegmentSet> {
        self.latest_segment(exercise_id)?.sets.last().cloned()
    }
}

// ============================================================================
// Workout mutations
// ============================================================================

impl WorkoutStore {
    pub fn create_workout(&self, workout: Workout) -> Workout {
        let snapshot;
        {
            let mut state = self.lock_state();
            state.workouts.push(workout.clone());
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        workout
    }

    pub fn update_workout(&self, workout: Workout) -> Option<Workout> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let index = state
                .workouts
                .iter()
                .position(|existing| existing.id == workout.id)?;
            state.workouts[index] = workout.clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(workout)
    }

    pub fn update_workout_with(
        &self,
        workout_id: WorkoutId,
        update: impl FnOnce(&mut Workout),
    ) -> Option<Workout> {
        let snapshot;
        let updated;
        {
            let mut state = self.lock_state();
            let index = state
                .workouts
                .iter()
                .position(|workout| workout.id == workout_id)?;
            update(&mut state.workouts[index]);
            updated = state.workouts[index].clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(updated)
    }

    pub fn delete_workout(&self, workout_id: WorkoutId) {
        let snapshot;
        {
            let mut state = self.lock_state();
            let before = state.workouts.len();
            state.workouts.retain(|workout| workout.id != workout_id);
            if state.workouts.len() == before {
                return;
            }
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
    }
}

// ============================================================================
// Segment mutations
// ============================================================================

impl WorkoutStore {
    pub fn create_segment(&self, segment: Segment, workout_id: WorkoutId) -> Option<Segment> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let index = state
                .workouts
                .iter()
                .position(|workout| workout.id == workout_id)?;
            state.workouts[index].segments.push(segment.clone());
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(segment)
    }

    pub fn update_segment(&self, segment: Segment, workout_id: WorkoutId) -> Option<Segment> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let (workout_index, segment_index) =
                segment_index(&state.workouts, segment.id, workout_id)?;
            state.workouts[workout_index].segments[segment_index] = segment.clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(segment)
    }

    pub fn update_segment_with(
        &self,
        segment_id: SegmentId,
        workout_id: WorkoutId,
        update: impl FnOnce(&mut Segment),
    ) -> Option<Segment> {
        let snapshot;
        let updated;
        {
            let mut state = self.lock_state();
            let (workout_index, segment_index) =
                segment_index(&state.workouts, segment_id, workout_id)?;
            let segment = &mut state.workouts[workout_index].segments[segment_index];
            update(segment);
            updated = segment.clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(updated)
    }

    /// Reorder segments within a workout: the segments at `from_indices`
    /// are extracted (in order) and reinserted before the element that was
    /// at `to_index`. No-op if the workout is missing.
    pub fn move_segments(&self, from_indices: &[usize], to_index: usize, workout_id: WorkoutId) {
        let snapshot;
        {
            let mut state = self.lock_state();
            let Some(index) = state
                .workouts
                .iter()
                .position(|workout| workout.id == workout_id)
            else {
                return;
            };
            move_elements(&mut state.workouts[index].segments, from_indices, to_index);
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
    }

    pub fn delete_segment(&self, segment_id: SegmentId, workout_id: WorkoutId) {
        let snapshot;
        {
            let mut state = self.lock_state();
            let Some(index) = state
                .workouts
                .iter()
                .position(|workout| workout.id == workout_id)
            else {
                return;
            };
            let workout = &mut state.workouts[index];
            let before = workout.segments.len();
            workout.segments.retain(|segment| segment.id != segment_id);
            if workout.segments.len() == before {
                return;
            }
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
    }
}

// ============================================================================
// Set mutations
// ============================================================================

impl WorkoutStore {
    pub fn create_set(
        &self,
        set: SegmentSet,
        segment_id: SegmentId,
        workout_id: WorkoutId,
    ) -> Option<SegmentSet> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let (workout_index, segment_index) =
                segment_index(&state.workouts, segment_id, workout_id)?;
            state.workouts[workout_index].segments[segment_index]
                .sets
                .push(set.clone());
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(set)
    }

    pub fn update_set(
        &self,
        set: SegmentSet,
        segment_id: SegmentId,
        workout_id: WorkoutId,
    ) -> Option<SegmentSet> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let (workout_index, segment_index, set_index) =
                set_index(&state.workouts, set.id, segment_id, workout_id)?;
            state.workouts[workout_index].segments[segment_index].sets[set_index] = set.clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(set)
    }

    pub fn update_set_with(
        &self,
        set_id: SetId,
        segment_id: SegmentId,
        workout_id: WorkoutId,
        update: impl FnOnce(&mut SegmentSet),
    ) -> Option<SegmentSet> {
        let snapshot;
        let updated;
        {
            let mut state = self.lock_state();
            let (workout_index, segment_index, set_index) =
                set_index(&state.workouts, set_id, segment_id, workout_id)?;
            let set = &mut state.workouts[workout_index].segments[segment_index].sets[set_index];
            update(set);
            updated = set.clone();
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
        Some(updated)
    }

    pub fn delete_set(&self, set_id: SetId, segment_id: SegmentId, workout_id: WorkoutId) {
        let snapshot;
        {
            let mut state = self.lock_state();
            let Some((workout_index, segment_index)) =
                segment_index(&state.workouts, segment_id, workout_id)
            else {
                return;
            };
            let sets = &mut state.workouts[workout_index].segments[segment_index].sets;
            let before = sets.len();
            sets.retain(|set| set.id != set_id);
            if sets.len() == before {
                return;
            }
            snapshot = state.workouts.clone();
        }
        self.queue_workouts_save(snapshot);
    }
}

// ============================================================================
// Exercise mutations
// ============================================================================

impl WorkoutStore {
    pub fn create_exercise(&self, exercise: Exercise) -> Exercise {
        let snapshot;
        {
            let mut state = self.lock_state();
            state.exercises.push(exercise.clone());
            snapshot = state.exercises.clone();
        }
        self.queue_exercises_save(snapshot);
        exercise
    }

    /// Replace the exercise. Segments reference exercises by id, so every
    /// lookup that joins a segment to its exercise observes the update
    /// immediately; nothing inside the workouts needs rewriting.
    pub fn update_exercise(&self, exercise: Exercise) -> Option<Exercise> {
        let snapshot;
        {
            let mut state = self.lock_state();
            let index = state
                .exercises
                .iter()
                .position(|existing| existing.id == exercise.id)?;
            state.exercises[index] = exercise.clone();
            snapshot = state.exercises.clone();
        }
        self.queue_exercises_save(snapshot);
        Some(exercise)
    }

    pub fn update_exercise_with(
        &self,
        exercise_id: ExerciseId,
        update: impl FnOnce(&mut Exercise),
    ) -> Option<Exercise> {
        let snapshot;
        let updated;
        {
            let mut state = self.lock_state();
            let index = state
                .exercises
                .iter()
                .position(|exercise| exercise.id == exercise_id)?;
            update(&mut state.exercises[index]);
            updated = state.exercises[index].clone();
            snapshot = state.exercises.clone();
        }
        self.queue_exercises_save(snapshot);
        Some(updated)
    }

    /// True iff no segment anywhere references the exercise
    pub fn can_delete_exercise(&self, exercise_id: ExerciseId) -> bool {
        !self.is_exercise_referenced(&self.lock_state(), exercise_id)
    }

    /// Delete the exercise, refusing while any segment still references it
    pub fn delete_exercise(&self, exercise_id: ExerciseId) -> Result<()> {
        let snapshot;
        {
            let mut state = self.lock_state();
            if self.is_exercise_referenced(&state, exercise_id) {
                return match state
                    .exercises
                    .iter()
                    .find(|exercise| exercise.id == exercise_id)
                {
                    Some(exercise) => Err(Error::ExerciseUsedInSegments(exercise.clone())),
                    // Orphaned reference; there is nothing to delete
                    None => Ok(()),
                };
            }
            let before = state.exercises.len();
            state.exercises.retain(|exercise| exercise.id != exercise_id);
            if state.exercises.len() == before {
                return Ok(());
            }
            snapshot = state.exercises.clone();
        }
        self.queue_exercises_save(snapshot);
        Ok(())
    }

    fn is_exercise_referenced(&self, state: &StoreState, exercise_id: ExerciseId) -> bool {
        state.workouts.iter().any(|workout| {
            workout
                .segments
                .iter()
                .any(|segment| segment.exercise == exercise_id)
        })
    }
}

// ============================================================================
// Index helpers
// ============================================================================

fn segment_index(
    workouts: &[Workout],
    segment_id: SegmentId,
    workout_id: WorkoutId,
) -> Option<(usize, usize)> {
    let workout_index = workouts
        .iter()
        .position(|workout| workout.id == workout_id)?;
    let segment_index = workouts[workout_index]
        .segments
        .iter()
        .position(|segment| segment.id == segment_id)?;
    Some((workout_index, segment_index))
}

fn set_index(
    workouts: &[Workout],
    set_id: SetId,
    segment_id: SegmentId,
    workout_id: WorkoutId,
) -> Option<(usize, usize, usize)> {
    let (workout_index, segment_index) = segment_index(workouts, segment_id, workout_id)?;
    let set_index = workouts[workout_index].segments[segment_index]
        .sets
        .iter()
        .position(|set| set.id == set_id)?;
    Some((workout_index, segment_index, set_index))
}

/// Move the elements at `from_indices` (deduplicated, in ascending order)
/// so the block ends up before the element originally at `to_index`.
fn move_elements<T>(items: &mut Vec<T>, from_indices: &[usize], to_index: usize) {
    let mut picked: Vec<usize> = from_indices
        .iter()
        .copied()
        .filter(|&index| index < items.len())
        .collect();
    picked.sort_unstable();
    picked.dedup();
    if picked.is_empty() {
        return;
    }

    let mut moved = Vec::with_capacity(picked.len());
    for &index in picked.iter().rev() {
        moved.push(items.remove(index));
    }
    moved.reverse();

    let offset = picked.iter().filter(|&&index| index < to_index).count();
    let insert_at = to_index.saturating_sub(offset).min(items.len());
    for (slot, item) in moved.into_iter().enumerate() {
        items.insert(insert_at + slot, item);
    }
}
