use super::models::{Direction, Entry};
use std::collections::HashSet;

pub fn position(entries: &[Entry], url: &str) -> Option<usize> {
    entries.iter().position(|e| e.url() == Some(url))
}

/// Drops every separator that sits at the head of the list or directly after
/// another separator, in a single pass.
///
/// Returns one anchor per dropped separator: the url of the closest item kept
/// before it, or `None` when the separator was leading.
pub fn normalize(entries: &mut Vec<Entry>) -> Vec<Option<String>> {
    let mut dropped = Vec::new();
    let mut kept: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut anchor: Option<String> = None;

    for entry in entries.drain(..) {
        match entry {
            Entry::Separator if kept.last().map_or(true, Entry::is_separator) => {
                dropped.push(anchor.clone());
            }
            Entry::Item(ref item) => {
                anchor = Some(item.url.clone());
                kept.push(entry);
            }
            Entry::Separator => kept.push(entry),
        }
    }

    *entries = kept;
    dropped
}

/// Removes items whose url already appeared earlier in the list. Returns the
/// urls that were dropped.
pub fn dedup_urls(entries: &mut Vec<Entry>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dropped = Vec::new();
    entries.retain(|entry| match entry {
        Entry::Item(item) => {
            if seen.insert(item.url.clone()) {
                true
            } else {
                dropped.push(item.url.clone());
                false
            }
        }
        Entry::Separator => true,
    });
    dropped
}

pub fn is_well_formed(entries: &[Entry]) -> bool {
    if entries.first().is_some_and(Entry::is_separator) {
        return false;
    }
    if entries
        .windows(2)
        .any(|pair| pair[0].is_separator() && pair[1].is_separator())
    {
        return false;
    }
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(Entry::url)
        .all(|url| seen.insert(url))
}

/// A single logical step of an item: `skip` separators hopped, or one
/// neighbouring item when `skip` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: usize,
    pub to: usize,
    pub skip: usize,
}

/// Works out where the item at `index` lands when nudged one logical position.
/// `None` means it already sits at the boundary for that direction.
pub fn plan_step(entries: &[Entry], index: usize, direction: Direction) -> Option<Step> {
    match direction {
        Direction::Up => {
            let mut skip = 0;
            while skip < index && entries[index - 1 - skip].is_separator() {
                skip += 1;
            }
            if skip == index {
                return None;
            }
            Some(Step {
                from: index,
                to: index - skip.max(1),
                skip,
            })
        }
        Direction::Down => {
            let mut skip = 0;
            while index + 1 + skip < entries.len() && entries[index + 1 + skip].is_separator() {
                skip += 1;
            }
            // Only trailing separators below: nothing to move past.
            if index + 1 + skip >= entries.len() {
                return None;
            }
            Some(Step {
                from: index,
                to: index + skip.max(1),
                skip,
            })
        }
    }
}

/// Moves the entry at `from` one logical step, hopping `skip` separators.
pub fn relocate(entries: &mut Vec<Entry>, from: usize, direction: Direction, skip: usize) {
    let hop = skip.max(1);
    let to = match direction {
        Direction::Up => from.saturating_sub(hop),
        Direction::Down => (from + hop).min(entries.len() - 1),
    };
    let entry = entries.remove(from);
    entries.insert(to, entry);
}
