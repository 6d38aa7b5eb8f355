//! Character row model.

use maplewatch_core::Character;
use sqlx::FromRow;

use crate::source::SourceError;

/// A row of the roster query (`characters` joined with `guilds`).
///
/// Numeric columns are selected as signed 64-bit so unsigned and narrow
/// column types across server forks decode the same way.
#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub name: String,
    pub level: i64,
    pub job: i64,
    /// `NULL` when the character has no guild.
    pub guild: Option<String>,
}

impl TryFrom<CharacterRow> for Character {
    type Error = SourceError;

    fn try_from(row: CharacterRow) -> Result<Self, Self::Error> {
        let level = u32::try_from(row.level).map_err(|_| SourceError::InvalidRow {
            name: row.name.clone(),
            reason: format!("level {} is out of range", row.level),
        })?;
        let job = i32::try_from(row.job).map_err(|_| SourceError::InvalidRow {
            name: row.name.clone(),
            reason: format!("job code {} is out of range", row.job),
        })?;

        Ok(Character::new(row.name, level, job).with_guild(row.guild.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn row(level: i64, job: i64, guild: Option<&str>) -> CharacterRow {
        CharacterRow {
            name: "Alice".to_string(),
            level,
            job,
            guild: guild.map(str::to_string),
        }
    }

    #[test]
    fn converts_valid_row() {
        let c = Character::try_from(row(120, 112, Some("Maplers"))).unwrap();
        assert_eq!(c.name(), "Alice");
        assert_eq!(c.level(), 120);
        assert_eq!(c.job_code(), 112);
        assert_eq!(c.guild(), Some("Maplers"));
    }

    #[test]
    fn null_guild_becomes_no_guild() {
        let c = Character::try_from(row(1, 0, None)).unwrap();
        assert!(c.guild().is_none());
    }

    #[test]
    fn negative_level_is_rejected() {
        assert_matches!(
            Character::try_from(row(-1, 0, None)),
            Err(SourceError::InvalidRow { name, .. }) if name == "Alice"
        );
    }

    #[test]
    fn oversized_job_code_is_rejected() {
        assert_matches!(
            Character::try_from(row(10, i64::MAX, None)),
            Err(SourceError::InvalidRow { .. })
        );
    }
}
