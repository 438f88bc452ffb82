use crate::app::notification::Notification;
use crate::domain::entries;
use crate::domain::models::{Direction, Entry, Item, ItemPatch};
use crate::domain::repository::EntryRepository;
use crate::error::{LaunchbarError, Result};

/// Outcome of a mutation that was accepted in memory.
#[derive(Debug)]
pub struct Commit<T> {
    pub value: T,
    /// Transitions to push, in the order they happened.
    pub notifications: Vec<Notification>,
    /// Set when the durable write failed. The mutation is kept regardless.
    pub write_error: Option<LaunchbarError>,
}

impl<T> Commit<T> {
    fn unchanged(value: T) -> Self {
        Self {
            value,
            notifications: Vec::new(),
            write_error: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.notifications.is_empty()
    }
}

pub struct ListStore {
    entries: Vec<Entry>,
    repository: Box<dyn EntryRepository>,
    load_error: Option<LaunchbarError>,
}

impl ListStore {
    /// Loads the persisted list. A missing or unreadable blob is a first run,
    /// not a failure: the store starts empty.
    pub fn open(repository: Box<dyn EntryRepository>) -> Self {
        let mut load_error = None;
        let entries = match repository.load() {
            Ok(mut loaded) => {
                let duplicates = entries::dedup_urls(&mut loaded);
                let separators = entries::normalize(&mut loaded);
                if !duplicates.is_empty() || !separators.is_empty() {
                    log::warn!(
                        "repaired {}: dropped {} duplicate item(s) and {} stray separator(s)",
                        repository.location(),
                        duplicates.len(),
                        separators.len()
                    );
                }
                loaded
            }
            Err(err) => {
                log::warn!("{err}; starting with an empty list");
                load_error = Some(err);
                Vec::new()
            }
        };
        log::info!(
            "loaded {} entries from {}",
            entries.len(),
            repository.location()
        );
        Self {
            entries,
            repository,
            load_error,
        }
    }

    /// Why the stored list was ignored at startup, if it was. Yields it once.
    pub fn take_load_error(&mut self) -> Option<LaunchbarError> {
        self.load_error.take()
    }

    /// Deep copy of the current list.
    pub fn list(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        entries::position(&self.entries, url).is_some()
    }

    pub fn item(&self, url: &str) -> Option<Item> {
        entries::position(&self.entries, url)
            .and_then(|idx| self.entries[idx].as_item())
            .cloned()
    }

    pub fn add_item(&mut self, item: Item) -> Result<Commit<usize>> {
        self.ensure_free(&item.url)?;

        let mut working = self.entries.clone();
        working.push(Entry::Item(item.clone()));
        let index = working.len() - 1;

        Ok(self.commit(
            working,
            index,
            vec![Notification::EntryAppended {
                entry: Entry::Item(item),
            }],
        ))
    }

    pub fn insert_item_after(&mut self, after_url: &str, item: Item) -> Result<Commit<usize>> {
        self.ensure_free(&item.url)?;
        let anchor = self.index_of(after_url)?;
        Ok(self.insert_after(anchor, Entry::Item(item)))
    }

    /// Puts a separator right after `url`. Asking again while one already
    /// follows changes nothing.
    pub fn insert_separator_after(&mut self, url: &str) -> Result<Commit<()>> {
        let anchor = self.index_of(url)?;
        if self
            .entries
            .get(anchor + 1)
            .is_some_and(Entry::is_separator)
        {
            return Ok(Commit::unchanged(()));
        }
        let commit = self.insert_after(anchor, Entry::Separator);
        Ok(Commit {
            value: (),
            notifications: commit.notifications,
            write_error: commit.write_error,
        })
    }

    pub fn update_item(&mut self, url: &str, patch: ItemPatch) -> Result<Commit<Item>> {
        let index = self.index_of(url)?;
        if let Some(new_url) = patch.url.as_deref() {
            if new_url != url {
                self.ensure_free(new_url)?;
            }
        }

        let mut working = self.entries.clone();
        let Entry::Item(item) = &mut working[index] else {
            return Err(LaunchbarError::NotFound(url.to_string()));
        };
        if patch.is_empty() {
            return Ok(Commit::unchanged(item.clone()));
        }
        patch.apply_to(item);
        let updated = item.clone();

        Ok(self.commit(
            working,
            updated,
            vec![Notification::EntryUpdated {
                url: url.to_string(),
                patch,
            }],
        ))
    }

    pub fn remove_item(&mut self, url: &str) -> Result<Commit<Item>> {
        let index = self.index_of(url)?;

        let mut working = self.entries.clone();
        let Entry::Item(removed) = working.remove(index) else {
            return Err(LaunchbarError::NotFound(url.to_string()));
        };

        Ok(self.commit(
            working,
            removed,
            vec![Notification::EntryRemoved {
                url: url.to_string(),
            }],
        ))
    }

    /// Nudges an item one logical position. At a boundary this is a no-op and
    /// the current index is returned.
    pub fn move_item(&mut self, url: &str, direction: Direction) -> Result<Commit<usize>> {
        let index = self.index_of(url)?;
        let Some(step) = entries::plan_step(&self.entries, index, direction) else {
            log::debug!("{url} is already at the {direction} boundary");
            return Ok(Commit::unchanged(index));
        };

        let mut working = self.entries.clone();
        entries::relocate(&mut working, step.from, direction, step.skip);

        let mut commit = self.commit(
            working,
            step.to,
            vec![Notification::EntryMoved {
                url: url.to_string(),
                direction,
                skip: step.skip,
            }],
        );
        // Normalization may have shifted the item.
        commit.value = entries::position(&self.entries, url).unwrap_or(step.to);
        Ok(commit)
    }

    fn insert_after(&mut self, anchor: usize, entry: Entry) -> Commit<usize> {
        let mut working = self.entries.clone();
        let index = anchor + 1;
        let notification = if index == working.len() {
            Notification::EntryAppended {
                entry: entry.clone(),
            }
        } else {
            Notification::EntryInserted {
                after_url: working[anchor].url().unwrap_or_default().to_string(),
                entry: entry.clone(),
            }
        };
        working.insert(index, entry);
        self.commit(working, index, vec![notification])
    }

    /// Restores the separator invariants on `working`, swaps it in and writes
    /// it out.
    fn commit<T>(
        &mut self,
        mut working: Vec<Entry>,
        value: T,
        mut notifications: Vec<Notification>,
    ) -> Commit<T> {
        notifications.extend(
            entries::normalize(&mut working)
                .into_iter()
                .map(|anchor_url| Notification::SeparatorRemoved { anchor_url }),
        );
        debug_assert!(entries::is_well_formed(&working));
        self.entries = working;

        let write_error = match self.repository.save(&self.entries) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("change kept in memory only: {err}");
                Some(err)
            }
        };

        Commit {
            value,
            notifications,
            write_error,
        }
    }

    fn index_of(&self, url: &str) -> Result<usize> {
        entries::position(&self.entries, url).ok_or_else(|| LaunchbarError::NotFound(url.to_string()))
    }

    fn ensure_free(&self, url: &str) -> Result<()> {
        if self.contains(url) {
            Err(LaunchbarError::DuplicateUrl(url.to_string()))
        } else {
            Ok(())
        }
    }
}
