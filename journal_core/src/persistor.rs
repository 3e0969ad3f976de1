//! File-backed persistence for the journal document.
//!
//! One persistor owns one JSON document location. The document is loaded
//! once, cached in memory, and rewritten wholesale (atomically) on every
//! save. File access goes through the [`JournalFileIo`] capability so
//! tests can substitute an in-memory implementation.

use crate::codec::{DataWrapper, CURRENT_SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::store::WorkoutStorePersistor;
use crate::types::{Exercise, Workout};
use fs2::FileExt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

/// Abstract file access consumed by the persistor
pub trait JournalFileIo: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write the full contents, atomically or not at all
    fn write(&self, bytes: &[u8], path: &Path) -> Result<()>;
}

/// Production file IO: locked reads, atomic locked writes
///
/// Writes go to a temp file in the destination directory, are synced to
/// disk, then renamed over the original.
pub struct StdFileIo;

impl JournalFileIo for StdFileIo {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;

        // Shared lock for reading
        file.lock_shared()?;

        let mut contents = Vec::new();
        let mut reader = BufReader::new(&file);
        let outcome = reader.read_to_end(&mut contents);
        file.unlock()?;
        outcome?;

        Ok(contents)
    }

    fn write(&self, bytes: &[u8], path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "journal path missing parent")
        })?)?;

        // Exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            writer.write_all(bytes)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old document
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        Ok(())
    }
}

struct PersistorState {
    path: PathBuf,
    data: Option<DataWrapper>,
    loaded: bool,
}

/// Owns the on-disk journal document and its load/save lifecycle.
///
/// Construction only records the location; the initial load happens on the
/// first `load_*` call, which the store issues from a background thread,
/// so constructing a persistor never touches the disk on the caller's
/// thread. A document that fails to decode leaves the cache absent: reads
/// come back empty and saves are refused (with a critical log) until a
/// successful reload, e.g. after [`FilePersistor::set_file_path`].
pub struct FilePersistor<I: JournalFileIo = StdFileIo> {
    io: I,
    state: Mutex<PersistorState>,
}

impl FilePersistor<StdFileIo> {
    /// Persistor over the real filesystem at the given document path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(path, StdFileIo)
    }
}

impl<I: JournalFileIo> FilePersistor<I> {
    pub fn new(path: impl Into<PathBuf>, io: I) -> Self {
        let path = path.into();
        tracing::trace!("initialized file persistor at {:?}", path);
        Self {
            io,
            state: Mutex::new(PersistorState {
                path,
                data: None,
                loaded: false,
            }),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.state().path.clone()
    }

    /// Redirect the persistor to a new document location and reload
    pub fn set_file_path(&self, path: impl Into<PathBuf>) {
        let mut state = self.state();
        state.path = path.into();
        tracing::trace!("set file persistor path to {:?}", state.path);
        self.load_locked(&mut state);
    }

    fn state(&self) -> MutexGuard<'_, PersistorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_loaded(&self, state: &mut PersistorState) {
        if !state.loaded {
            self.load_locked(state);
        }
    }

    fn load_locked(&self, state: &mut PersistorState) {
        state.loaded = true;

        if !self.io.exists(&state.path) {
            tracing::debug!("no journal document at {:?}, starting fresh", state.path);
            state.data = Some(DataWrapper::empty(CURRENT_SCHEMA_VERSION));
            return;
        }

        let bytes = match self.io.read(&state.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to read journal document at {:?}: {err}", state.path);
                state.data = None;
                return;
            }
        };

        match DataWrapper::decode(&bytes, CURRENT_SCHEMA_VERSION) {
            Ok(data) => {
                tracing::debug!(
                    workouts = data.workouts.len(),
                    exercises = data.exercises.len(),
                    "loaded journal document from {:?}",
                    state.path
                );
                state.data = Some(data);
            }
            Err(err) => {
                tracing::error!(
                    "failed to decode journal document at {:?}: {err}",
                    state.path
                );
                state.data = None;
            }
        }
    }

    /// Re-encode the cached document and rewrite the file. IO and encode
    /// failures are terminal here: logged, never propagated.
    fn write_locked(&self, state: &PersistorState) {
        let Some(data) = &state.data else {
            return;
        };

        let bytes = match data.encode(cfg!(debug_assertions)) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to encode journal document: {err}");
                return;
            }
        };

        if let Err(err) = self.io.write(&bytes, &state.path) {
            tracing::error!("failed to save journal document at {:?}: {err}", state.path);
        }
    }
}

impl<I: JournalFileIo> WorkoutStorePersistor for FilePersistor<I> {
    fn load_workouts(&self) -> Vec<Workout> {
        let mut state = self.state();
        self.ensure_loaded(&mut state);
        state
            .data
            .as_ref()
            .map(|data| data.workouts.clone())
            .unwrap_or_default()
    }

    fn save_workouts(&self, workouts: Vec<Workout>) -> Result<()> {
        let mut state = self.state();
        match &mut state.data {
            Some(data) => {
                data.workouts = workouts;
                data.version = Some(CURRENT_SCHEMA_VERSION);
            }
            None => {
                tracing::error!("could not save workouts: no journal document is loaded");
                return Ok(());
            }
        }
        self.write_locked(&state);
        Ok(())
    }

    fn load_exercises(&self) -> Vec<Exercise> {
        let mut state = self.state();
        self.ensure_loaded(&mut state);
        state
            .data
            .as_ref()
            .map(|data| data.exercises.clone())
            .unwrap_or_default()
    }

    fn save_exercises(&self, exercises: Vec<Exercise>) -> Result<()> {
        let mut state = self.state();
        match &mut state.data {
            Some(data) => {
                data.exercises = exercises;
                data.version = Some(CURRENT_SCHEMA_VERSION);
            }
            None => {
                tracing::error!("could not save exercises: no journal document is loaded");
                return Ok(());
            }
        }
        self.write_locked(&state);
        Ok(())
    }
}
