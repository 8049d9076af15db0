//! Navigation tokens exchanged with the presentation layer.
//!
//! Tokens are parsed into [`Token`] once at the boundary; nothing past the
//! router ever looks at the raw string again. `Display` produces the exact
//! wire form, so buttons are built from typed tokens too.

use serde::Serialize;
use std::fmt;

use crate::error::TokenError;

/// Which records a list screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    /// Every catalog record
    All,
    /// The user's wishlist, in wishlist order
    Mine,
    /// Records with hot status
    Hot,
}

impl ListSource {
    fn prefix(self) -> &'static str {
        match self {
            ListSource::All => "all_drops_",
            ListSource::Mine => "my_drops_",
            ListSource::Hot => "hot_drops_",
        }
    }
}

/// A parsed navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    List { source: ListSource, page: i64 },
    /// Same screen as `List { source: All, .. }`
    BackToDrops { page: i64 },
    Detail(String),
    WishlistAdd(String),
    WishlistRemove(String),
    ReminderOptions(String),
    /// `label` is the display form, with spaces
    SetReminder { airdrop_id: String, label: String },
    Reminders,
    Help,
    Refresh,
    BackToMain,
}

const SET_REMINDER: &str = "set_reminder_";
const REMOVE_WISHLIST: &str = "remove_wishlist_";
const WISHLIST: &str = "wishlist_";
const REMIND: &str = "remind_";
const AIRDROP: &str = "airdrop_";
const BACK_TO_DROPS: &str = "back_to_drops_";

impl Token {
    /// Parse a raw token.
    ///
    /// `reminder_labels` are the configured display labels. They let
    /// `set_reminder_<id>_<label>` split correctly when the id itself holds
    /// `_`; an unknown label falls back to splitting at the first `_`.
    pub fn parse<S: AsRef<str>>(raw: &str, reminder_labels: &[S]) -> Result<Token, TokenError> {
        match raw {
            "reminders" => return Ok(Token::Reminders),
            "help" => return Ok(Token::Help),
            "refresh" => return Ok(Token::Refresh),
            "back_to_main" => return Ok(Token::BackToMain),
            _ => {}
        }

        for source in [ListSource::All, ListSource::Mine, ListSource::Hot] {
            if let Some(page) = raw.strip_prefix(source.prefix()) {
                return Ok(Token::List {
                    source,
                    page: parse_page(page)?,
                });
            }
        }

        if let Some(page) = raw.strip_prefix(BACK_TO_DROPS) {
            return Ok(Token::BackToDrops {
                page: parse_page(page)?,
            });
        }

        if let Some(rest) = raw.strip_prefix(REMOVE_WISHLIST) {
            return Ok(Token::WishlistRemove(parse_id(rest)?));
        }
        if let Some(rest) = raw.strip_prefix(WISHLIST) {
            return Ok(Token::WishlistAdd(parse_id(rest)?));
        }
        if let Some(rest) = raw.strip_prefix(SET_REMINDER) {
            return parse_set_reminder(rest, reminder_labels);
        }
        if let Some(rest) = raw.strip_prefix(REMIND) {
            return Ok(Token::ReminderOptions(parse_id(rest)?));
        }
        if let Some(rest) = raw.strip_prefix(AIRDROP) {
            return Ok(Token::Detail(parse_id(rest)?));
        }

        Err(TokenError::Unrecognized(raw.to_string()))
    }

    /// Token for a list screen page.
    pub fn list(source: ListSource, page: usize) -> Token {
        Token::List {
            source,
            page: i64::try_from(page).unwrap_or(i64::MAX),
        }
    }
}

fn parse_page(raw: &str) -> Result<i64, TokenError> {
    if raw.is_empty() {
        return Err(TokenError::MissingArgument("page"));
    }
    raw.parse::<i64>()
        .map_err(|_| TokenError::InvalidPage(raw.to_string()))
}

fn parse_id(raw: &str) -> Result<String, TokenError> {
    if raw.is_empty() {
        return Err(TokenError::MissingArgument("airdrop id"));
    }
    Ok(raw.to_string())
}

fn parse_set_reminder<S: AsRef<str>>(
    rest: &str,
    reminder_labels: &[S],
) -> Result<Token, TokenError> {
    let known = reminder_labels
        .iter()
        .map(|label| label.as_ref())
        .filter_map(|label| {
            let suffix = format!("_{}", label.replace(' ', "_"));
            rest.strip_suffix(suffix.as_str())
                .filter(|id| !id.is_empty())
                .map(|id| (id, label.len()))
        })
        .max_by_key(|(_, len)| *len);

    let (airdrop_id, label) = match known {
        Some((id, _)) => (id, &rest[id.len() + 1..]),
        None => rest
            .split_once('_')
            .ok_or(TokenError::MissingArgument("reminder label"))?,
    };

    if airdrop_id.is_empty() {
        return Err(TokenError::MissingArgument("airdrop id"));
    }
    if label.is_empty() {
        return Err(TokenError::MissingArgument("reminder label"));
    }

    Ok(Token::SetReminder {
        airdrop_id: airdrop_id.to_string(),
        label: label.replace('_', " "),
    })
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::List { source, page } => write!(f, "{}{}", source.prefix(), page),
            Token::BackToDrops { page } => write!(f, "{}{}", BACK_TO_DROPS, page),
            Token::Detail(id) => write!(f, "{}{}", AIRDROP, id),
            Token::WishlistAdd(id) => write!(f, "{}{}", WISHLIST, id),
            Token::WishlistRemove(id) => write!(f, "{}{}", REMOVE_WISHLIST, id),
            Token::ReminderOptions(id) => write!(f, "{}{}", REMIND, id),
            Token::SetReminder { airdrop_id, label } => {
                write!(f, "{}{}_{}", SET_REMINDER, airdrop_id, label.replace(' ', "_"))
            }
            Token::Reminders => f.write_str("reminders"),
            Token::Help => f.write_str("help"),
            Token::Refresh => f.write_str("refresh"),
            Token::BackToMain => f.write_str("back_to_main"),
        }
    }
}
