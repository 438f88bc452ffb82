use crate::app::warning::Warning;
use crate::domain::models::{Direction, Entry, ItemPatch};
use serde::{Deserialize, Serialize};

/// Push messages from the coordinator to presentation surfaces.
///
/// Each one describes a single committed transition so a surface can patch its
/// mirror in place. Ordering holds per list; a surface that falls behind
/// recovers from the `Snapshot` it gets when it reattaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Replace the whole mirror.
    Snapshot { entries: Vec<Entry> },
    EntryAppended { entry: Entry },
    EntryInserted { after_url: String, entry: Entry },
    EntryRemoved { url: String },
    /// A separator dropped by normalization: the first separator following
    /// `anchor_url`, or the leading one when `anchor_url` is null.
    SeparatorRemoved { anchor_url: Option<String> },
    EntryUpdated { url: String, patch: ItemPatch },
    /// `skip` separators were hopped; zero means one neighbouring item was.
    EntryMoved {
        url: String,
        direction: Direction,
        skip: usize,
    },
    ViewShown { url: String },
    ViewsClosed,
    Warning { warning: Warning },
}
