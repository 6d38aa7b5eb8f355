//! Change detection between two roster generations.
//!
//! [`detect`] compares the committed generation with a freshly built one and
//! returns the [`Notification`]s to announce, grouped per character in the
//! order the characters appear in the new generation.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::jobs;
use crate::roster::Generation;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single notable change for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RosterEvent {
    /// The character's level increased.
    LevelUp { name: String, level: u32 },
    /// The character moved from at-or-below `other` to strictly above it.
    Passed { name: String, other: String },
    /// The character ended the cycle at the same level as `other`.
    Tied { name: String, other: String },
    /// The character's job code changed.
    JobChanged { name: String, job: &'static str },
}

impl fmt::Display for RosterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelUp { name, level } => write!(f, "{name} is now level {level}!"),
            Self::Passed { name, other } => write!(f, "{name} has passed {other}!"),
            Self::Tied { name, other } => write!(f, "{name} is now the same level as {other}!"),
            Self::JobChanged { name, job } => write!(f, "{name} is now a {job}!"),
        }
    }
}

/// One outbound message: a head event plus any sub-events folded into it.
///
/// A level-up carries its crossing and tie events; a job change always
/// stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    events: Vec<RosterEvent>,
}

impl Notification {
    fn new(head: RosterEvent) -> Self {
        Self { events: vec![head] }
    }

    pub fn events(&self) -> &[RosterEvent] {
        &self.events
    }

    /// The rendered text, e.g. `"A is now level 13! A has passed B!"`.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{event}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tracked names
// ---------------------------------------------------------------------------

/// Which characters a levelling character is compared against for
/// crossing and tie detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackedNames {
    /// Every character in the new generation.
    #[default]
    All,
    /// An explicit watch-list, compared in the listed order.
    Only(Vec<String>),
}

impl TrackedNames {
    /// An empty list means "track everybody". Repeated names are kept
    /// once, at their first position.
    pub fn from_list(names: Vec<String>) -> Self {
        if names.is_empty() {
            return Self::All;
        }
        let unique: IndexSet<String> = names.into_iter().collect();
        Self::Only(unique.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Diff two generations.
///
/// Both generations are frozen for the whole call, so every comparison
/// target is evaluated against its own previous/current pair. Characters
/// that exist in only one of the generations never produce events.
pub fn detect(
    previous: &Generation,
    current: &Generation,
    tracked: &TrackedNames,
) -> Vec<Notification> {
    // Each other character is compared at most once.
    let watch: IndexSet<&str> = match tracked {
        TrackedNames::All => current.names().collect(),
        TrackedNames::Only(names) => names.iter().map(String::as_str).collect(),
    };

    let mut notifications = Vec::new();

    for now in current.iter() {
        let name = now.name();
        let Some(before) = previous.get(name) else {
            continue;
        };

        if now.level() > before.level() {
            let mut notification = Notification::new(RosterEvent::LevelUp {
                name: name.to_string(),
                level: now.level(),
            });

            for &other in &watch {
                if other == name {
                    continue;
                }
                let (Some(other_before), Some(other_now)) =
                    (previous.get(other), current.get(other))
                else {
                    tracing::debug!(
                        character = name,
                        tracked = other,
                        "Tracked character missing from a generation, skipping comparison"
                    );
                    continue;
                };

                if before.level() <= other_before.level() && now.level() > other_now.level() {
                    notification.events.push(RosterEvent::Passed {
                        name: name.to_string(),
                        other: other.to_string(),
                    });
                }
                if now.level() == other_now.level() {
                    notification.events.push(RosterEvent::Tied {
                        name: name.to_string(),
                        other: other.to_string(),
                    });
                }
            }

            notifications.push(notification);
        }

        if now.job_code() != before.job_code() {
            notifications.push(Notification::new(RosterEvent::JobChanged {
                name: name.to_string(),
                job: jobs::lookup(now.job_code()),
            }));
        }
    }

    notifications
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
