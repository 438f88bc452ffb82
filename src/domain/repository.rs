use crate::domain::models::Entry;
use crate::error::Result;

/// Durable home of the entry list. Implementations hold no business logic:
/// they read and overwrite the whole list as one blob.
#[cfg_attr(test, mockall::automock)]
pub trait EntryRepository: Send + Sync {
    /// Returns an empty list when nothing has been stored yet and
    /// `LaunchbarError::MalformedState` when the stored blob cannot be parsed.
    fn load(&self) -> Result<Vec<Entry>>;

    fn save(&self, entries: &[Entry]) -> Result<()>;

    /// Human readable location, used in logs and warnings.
    fn location(&self) -> String;
}
