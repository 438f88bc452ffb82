use crate::app::notification::Notification;
use crate::domain::entries;
use crate::domain::models::Entry;
use crate::error::{LaunchbarError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolbarMirror {
    entries: Vec<Entry>,
    open_view: Option<String>,
}

impl ToolbarMirror {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The url whose surface is showing, as last announced.
    pub fn open_view(&self) -> Option<&str> {
        self.open_view.as_deref()
    }

    /// Applies one notification. `NotFound` means the mirror has drifted and
    /// the surface should reattach for a new snapshot.
    pub fn apply(&mut self, notification: &Notification) -> Result<()> {
        match notification {
            Notification::Snapshot { entries } => {
                self.entries = entries.clone();
            }
            Notification::EntryAppended { entry } => {
                self.entries.push(entry.clone());
            }
            Notification::EntryInserted { after_url, entry } => {
                let index = self.index_of(after_url)?;
                self.entries.insert(index + 1, entry.clone());
            }
            Notification::EntryRemoved { url } => {
                let index = self.index_of(url)?;
                self.entries.remove(index);
                if self.open_view.as_deref() == Some(url.as_str()) {
                    self.open_view = None;
                }
            }
            Notification::SeparatorRemoved { anchor_url } => {
                let index = match anchor_url {
                    Some(url) => self.index_of(url)? + 1,
                    None => 0,
                };
                match self.entries.get(index) {
                    Some(Entry::Separator) => {
                        self.entries.remove(index);
                    }
                    _ => {
                        return Err(LaunchbarError::NotFound(format!(
                            "separator after {}",
                            anchor_url.as_deref().unwrap_or("start")
                        )))
                    }
                }
            }
            Notification::EntryUpdated { url, patch } => {
                let index = self.index_of(url)?;
                if let Entry::Item(item) = &mut self.entries[index] {
                    patch.apply_to(item);
                }
            }
            Notification::EntryMoved {
                url,
                direction,
                skip,
            } => {
                let index = self.index_of(url)?;
                entries::relocate(&mut self.entries, index, *direction, *skip);
            }
            Notification::ViewShown { url } => {
                self.open_view = Some(url.clone());
            }
            Notification::ViewsClosed => {
                self.open_view = None;
            }
            Notification::Warning { warning } => {
                log::warn!("coordinator: {}", warning.message);
            }
        }
        Ok(())
    }

    fn index_of(&self, url: &str) -> Result<usize> {
        entries::position(&self.entries, url).ok_or_else(|| LaunchbarError::NotFound(url.to_string()))
    }
}
