//! Router output: which screen to render next and with what data.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::ReminderOption;
use crate::pagination::PageInfo;
use crate::router::token::{ListSource, Token};
use crate::types::{AirdropRecord, ReminderEntry};

/// One row of the reminders overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderLine {
    /// Title of the airdrop the entry refers to
    pub title: String,
    pub entry: ReminderEntry,
}

/// Logical screen handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewDescriptor {
    MainMenu,
    Help,
    DropsList {
        source: ListSource,
        page: usize,
        items: Vec<AirdropRecord>,
        page_info: PageInfo,
    },
    /// The selected list has nothing to show
    EmptyList { source: ListSource },
    AirdropDetail {
        record: AirdropRecord,
        is_wishlisted: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        banner: Option<PathBuf>,
    },
    ReminderOptions {
        record: AirdropRecord,
        options: Vec<ReminderOption>,
    },
    RemindersList {
        entries: Vec<ReminderLine>,
        /// Entries in the whole log, including ones not shown
        total_logged: usize,
    },
    NotFound,
    ErrorGeneric,
}

impl ViewDescriptor {
    /// Navigation tokens for the previous and next page of a list screen.
    pub fn page_tokens(&self) -> (Option<Token>, Option<Token>) {
        match self {
            ViewDescriptor::DropsList {
                source, page_info, ..
            } => (
                page_info.prev_page.map(|page| Token::list(*source, page)),
                page_info.next_page.map(|page| Token::list(*source, page)),
            ),
            _ => (None, None),
        }
    }
}

/// Short-lived message shown alongside (or instead of) a screen change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    NotFound,
    AddedToWishlist { title: String },
    RemovedFromWishlist { title: String },
    ReminderSet { title: String, remind_time: String },
    Failed,
}

/// Result of routing one token. `view: None` keeps the current screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub view: Option<ViewDescriptor>,
    pub notice: Option<Notice>,
}

impl Transition {
    pub fn to(view: ViewDescriptor) -> Self {
        Self {
            view: Some(view),
            notice: None,
        }
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            view: None,
            notice: Some(notice),
        }
    }

    pub fn with_notice(view: ViewDescriptor, notice: Notice) -> Self {
        Self {
            view: Some(view),
            notice: Some(notice),
        }
    }

    /// Nothing changes on screen.
    pub fn unchanged() -> Self {
        Self::default()
    }
}
