//! The todo item value type.

use crate::error::CodecError;
use crate::timestamp::Timestamp;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How important an item is.
///
/// `Basic` is the default and counts as "no importance" in both file
/// formats: it is never written out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Importance {
    /// Low priority.
    Low,
    /// Default priority.
    #[default]
    Basic,
    /// High priority.
    Important,
}

impl Importance {
    /// Lowercase name used on every wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Basic => "basic",
            Importance::Important => "important",
        }
    }

    /// Returns true for the default importance.
    #[must_use]
    pub const fn is_basic(&self) -> bool {
        matches!(self, Importance::Basic)
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Importance::Low),
            "basic" => Ok(Importance::Basic),
            "important" => Ok(Importance::Important),
            other => Err(CodecError::invalid_field("importance", other)),
        }
    }
}

/// A single task record.
///
/// Items are immutable: edits build a new value through the `with_*`
/// methods and replace the old entry in the store. The `id` never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: String,
    text: String,
    importance: Importance,
    deadline: Option<Timestamp>,
    done: bool,
    created_at: Timestamp,
    changed_at: Option<Timestamp>,
    color: Option<String>,
}

impl Item {
    /// Creates an item with the given identity and defaults for the rest.
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            importance: Importance::Basic,
            deadline: None,
            done: false,
            created_at,
            changed_at: None,
            color: None,
        }
    }

    /// Creates a brand new item with a random id, created now.
    pub fn create(text: impl Into<String>) -> Self {
        Self::new(Self::generate_id(), text, Timestamp::now())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string().to_uppercase()
    }

    /// Returns a copy with different text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns a copy with a different importance.
    #[must_use]
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Returns a copy with a different deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Timestamp>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns a copy with a different completion flag.
    #[must_use]
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Returns a copy with a different change time.
    #[must_use]
    pub fn with_changed_at(mut self, changed_at: Option<Timestamp>) -> Self {
        self.changed_at = changed_at;
        self
    }

    /// Returns a copy with a different color tag.
    #[must_use]
    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    /// Returns a copy marked as edited at `now`.
    #[must_use]
    pub fn edited(self, now: Timestamp) -> Self {
        self.with_changed_at(Some(now))
    }

    /// Unique identifier, the store's primary key.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Free-form text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Importance.
    #[must_use]
    pub fn importance(&self) -> Importance {
        self.importance
    }

    /// Optional deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Completion flag.
    #[must_use]
    pub fn done(&self) -> bool {
        self.done
    }

    /// Creation time, never changes.
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Time of the last edit, absent for never-edited items.
    #[must_use]
    pub fn changed_at(&self) -> Option<Timestamp> {
        self.changed_at
    }

    /// Optional `#RRGGBB` color tag, carried opaquely.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}
