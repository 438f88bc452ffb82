use crate::app::context_menu::MenuVerb;
use crate::app::notification::Notification;
use crate::domain::models::{Direction, Entry, Item, ItemPatch};
use crate::error::LaunchbarError;
use serde::{Deserialize, Serialize};

/// Requests from a presentation surface (or the context menu) to the
/// coordinator. Each one is answered by exactly one `Reply` or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    List,
    AddItem {
        item: Item,
    },
    InsertItemAfter {
        after_url: String,
        item: Item,
    },
    AddSeparatorAfter {
        url: String,
    },
    UpdateItem {
        url: String,
        patch: ItemPatch,
    },
    RemoveItem {
        url: String,
    },
    Move {
        url: String,
        direction: Direction,
    },
    // Current data for an edit dialog
    Edit {
        url: String,
    },
    ContextMenu {
        url: String,
        #[serde(default)]
        edit_mode: bool,
    },
    OpenView {
        url: String,
    },
    CloseView {
        url: String,
    },
    KillView {
        url: String,
        #[serde(default)]
        reopen_externally: Option<bool>,
    },
    RefreshView {
        url: String,
    },
    CloseAllViews,
}

impl Command {
    /// The url the command targets, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Command::List | Command::CloseAllViews => None,
            Command::AddItem { item } => Some(&item.url),
            Command::InsertItemAfter { after_url, .. } => Some(after_url),
            Command::AddSeparatorAfter { url }
            | Command::UpdateItem { url, .. }
            | Command::RemoveItem { url }
            | Command::Move { url, .. }
            | Command::Edit { url }
            | Command::ContextMenu { url, .. }
            | Command::OpenView { url }
            | Command::CloseView { url }
            | Command::KillView { url, .. }
            | Command::RefreshView { url } => Some(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Done,
    Index(usize),
    Entries(Vec<Entry>),
    Item(Item),
    Menu(Vec<MenuVerb>),
}

/// A command as it arrives on the wire, with the id its reply echoes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: u64,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub code: String,
    pub message: String,
}

impl From<&LaunchbarError> for ErrorReply {
    fn from(err: &LaunchbarError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Everything the coordinator writes to a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Reply {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ok: Option<Reply>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorReply>,
    },
    Push {
        notification: Notification,
    },
}

impl Outbound {
    pub fn reply(id: u64, result: &Result<Reply, LaunchbarError>) -> Self {
        match result {
            Ok(reply) => Outbound::Reply {
                id,
                ok: Some(reply.clone()),
                error: None,
            },
            Err(err) => Outbound::Reply {
                id,
                ok: None,
                error: Some(err.into()),
            },
        }
    }
}
