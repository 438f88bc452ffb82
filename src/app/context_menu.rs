use crate::app::command::Command;
use crate::domain::entries;
use crate::domain::models::{Direction, Entry};
use crate::error::{LaunchbarError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Delete,
    Edit,
    AddSeparatorAfter,
    MoveUp,
    MoveDown,
}

impl Verb {
    /// The single command a click on this verb sends.
    pub fn command(self, url: &str) -> Command {
        let url = url.to_string();
        match self {
            Verb::Delete => Command::RemoveItem { url },
            Verb::Edit => Command::Edit { url },
            Verb::AddSeparatorAfter => Command::AddSeparatorAfter { url },
            Verb::MoveUp => Command::Move {
                url,
                direction: Direction::Up,
            },
            Verb::MoveDown => Command::Move {
                url,
                direction: Direction::Down,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuVerb {
    pub verb: Verb,
    pub text: String,
    pub title: String,
    pub disabled: bool,
}

/// Verbs offered for the item at `url`. Edit mode exposes the reordering verbs,
/// normal mode only delete and edit.
pub fn verbs_for(list: &[Entry], url: &str, edit_mode: bool) -> Result<Vec<MenuVerb>> {
    let index = entries::position(list, url).ok_or_else(|| LaunchbarError::NotFound(url.to_string()))?;
    let name = list[index].as_item().map(|item| item.name.as_str()).unwrap_or(url);

    let delete = MenuVerb {
        verb: Verb::Delete,
        text: "Delete".to_string(),
        title: format!("Delete \"{name}\""),
        disabled: false,
    };

    if !edit_mode {
        return Ok(vec![
            delete,
            MenuVerb {
                verb: Verb::Edit,
                text: "Edit".to_string(),
                title: format!("Edit \"{name}\""),
                disabled: false,
            },
        ]);
    }

    let separator_follows = list.get(index + 1).is_some_and(Entry::is_separator);
    Ok(vec![
        delete,
        MenuVerb {
            verb: Verb::AddSeparatorAfter,
            text: "Add separator below".to_string(),
            title: "Adds a separator below".to_string(),
            disabled: separator_follows,
        },
        MenuVerb {
            verb: Verb::MoveUp,
            text: "Move up".to_string(),
            title: format!("Moves \"{name}\" up"),
            disabled: entries::plan_step(list, index, Direction::Up).is_none(),
        },
        MenuVerb {
            verb: Verb::MoveDown,
            text: "Move down".to_string(),
            title: format!("Moves \"{name}\" down"),
            disabled: entries::plan_step(list, index, Direction::Down).is_none(),
        },
    ])
}
