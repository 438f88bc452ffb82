use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A launchable shortcut. `url` is its identity everywhere in the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl Item {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            picture: None,
        }
    }

    #[must_use]
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub enum Entry {
    Item(Item),
    Separator,
}

impl Entry {
    pub fn is_separator(&self) -> bool {
        matches!(self, Entry::Separator)
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Separator => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.as_item().map(|item| item.url.as_str())
    }
}

// On disk and on the wire a separator is the bare string "separator".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Marker(SeparatorTag),
    Item(Item),
}

#[derive(Serialize, Deserialize)]
enum SeparatorTag {
    #[serde(rename = "separator")]
    Separator,
}

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Marker(SeparatorTag::Separator) => Entry::Separator,
            RawEntry::Item(item) => Entry::Item(item),
        }
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Separator => RawEntry::Marker(SeparatorTag::Separator),
            Entry::Item(item) => RawEntry::Item(item),
        }
    }
}

/// Partial update of an item. Absent fields are left untouched; `picture: null`
/// clears the picture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub picture: Option<Option<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.name.is_none() && self.picture.is_none()
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(url) = &self.url {
            item.url = url.clone();
        }
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(picture) = &self.picture {
            item.picture = picture.clone();
        }
    }
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}
