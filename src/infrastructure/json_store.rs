use crate::domain::models::Entry;
use crate::domain::repository::EntryRepository;
use crate::error::{LaunchbarError, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_error(&self, source: io::Error) -> LaunchbarError {
        LaunchbarError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

impl EntryRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Entry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(LaunchbarError::MalformedState(format!(
                    "{}: {err}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&content).map_err(|err| {
            LaunchbarError::MalformedState(format!("{}: {err}", self.path.display()))
        })
    }

    /// Overwrites the file atomically: the list goes to a temp file next to
    /// the target, which is then renamed over it.
    fn save(&self, entries: &[Entry]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        serde_json::to_writer(&mut tmp, entries).map_err(|e| self.write_error(e.into()))?;
        tmp.flush().map_err(|e| self.write_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
