//! The character record produced for every row of a poll.

use serde::Serialize;

use crate::jobs;

/// One polled character.
///
/// Records are immutable once built; a character whose stats change in a
/// later poll is represented by a new record in the next generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    name: String,
    level: u32,
    job_code: i32,
    /// Empty when the character is not in a guild.
    guild: String,
}

impl Character {
    /// Create a guildless character.
    pub fn new(name: impl Into<String>, level: u32, job_code: i32) -> Self {
        Self {
            name: name.into(),
            level,
            job_code,
            guild: String::new(),
        }
    }

    /// Attach a guild name. An empty string means "no guild".
    pub fn with_guild(mut self, guild: impl Into<String>) -> Self {
        self.guild = guild.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn job_code(&self) -> i32 {
        self.job_code
    }

    /// The class name for [`job_code`](Self::job_code), or `"Unknown"`.
    ///
    /// Does not log; [`jobs::lookup`] is the reporting variant.
    pub fn job_name(&self) -> &'static str {
        jobs::try_lookup(self.job_code).unwrap_or(jobs::UNKNOWN_JOB)
    }

    /// The guild name, or `None` when the character has no guild.
    pub fn guild(&self) -> Option<&str> {
        if self.guild.is_empty() {
            None
        } else {
            Some(&self.guild)
        }
    }
}
