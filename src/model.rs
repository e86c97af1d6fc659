use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// Raw item detail payload as returned by `/data/wow/item/{id}`.
pub type ItemData = Value;

/// Slot type (e.g. "HEAD") -> equipped item detail.
pub type Equipment = BTreeMap<String, ItemData>;

/// Outcome of a data call. `Unavailable` is a per-call failure the caller
/// skips over, never a reason to abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Data(T),
    Unavailable(String),
}

impl<T> Fetch<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Data(v) => Fetch::Data(f(v)),
            Fetch::Unavailable(reason) => Fetch::Unavailable(reason),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Fetch<U>) -> Fetch<U> {
        match self {
            Fetch::Data(v) => f(v),
            Fetch::Unavailable(reason) => Fetch::Unavailable(reason),
        }
    }

    #[cfg(test)]
    pub fn data(self) -> Option<T> {
        match self {
            Fetch::Data(v) => Some(v),
            Fetch::Unavailable(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Fetch::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Realm {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_at: OffsetDateTime,
}

impl Token {
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}

/// One line of the exported spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub id: u64,
    pub name: String,
    pub level: u32,
    pub slot: String,
    pub rank: f64,
    pub equipped: String,
    pub wowhead_url: String,
}

/// Configuration values the setup wizard can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ClientId,
    ClientSecret,
    Locale,
    Region,
    Realm,
    Character,
    StatWeights,
}

#[derive(Debug, Clone)]
pub enum Prompt {
    Text {
        field: Field,
        label: String,
        value: String,
        masked: bool,
    },
    Choice {
        field: Field,
        label: String,
        choices: Vec<String>,
    },
}

impl Prompt {
    pub fn field(&self) -> Field {
        match self {
            Prompt::Text { field, .. } | Prompt::Choice { field, .. } => *field,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Prompt::Text { label, .. } | Prompt::Choice { label, .. } => label,
        }
    }
}
