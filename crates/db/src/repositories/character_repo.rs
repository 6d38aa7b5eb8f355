//! Repository for the `characters` table.

use sqlx::MySqlPool;

use crate::models::character::CharacterRow;

/// Roster projection: name, level, job and guild name.
const ROSTER_SELECT: &str = "SELECT c.name, \
        CAST(c.level AS SIGNED) AS level, \
        CAST(c.job AS SIGNED) AS job, \
        g.name AS guild \
     FROM characters c \
     LEFT JOIN guilds g ON g.guildid = c.guildid";

/// Read-only queries against the game server's characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// List every character except the `excluded` names, in id order.
    pub async fn list_roster(
        pool: &MySqlPool,
        excluded: &[String],
    ) -> Result<Vec<CharacterRow>, sqlx::Error> {
        let query = roster_query(excluded.len());
        let mut q = sqlx::query_as::<_, CharacterRow>(&query);
        for name in excluded {
            q = q.bind(name);
        }
        q.fetch_all(pool).await
    }
}

/// Build the roster query with one placeholder per excluded name.
fn roster_query(excluded: usize) -> String {
    if excluded == 0 {
        return format!("{ROSTER_SELECT} ORDER BY c.id");
    }
    let placeholders = vec!["?"; excluded].join(", ");
    format!("{ROSTER_SELECT} WHERE c.name NOT IN ({placeholders}) ORDER BY c.id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_without_exclusions_has_no_where_clause() {
        let q = roster_query(0);
        assert!(!q.contains("WHERE"));
        assert!(q.ends_with("ORDER BY c.id"));
    }

    #[test]
    fn query_has_one_placeholder_per_exclusion() {
        let q = roster_query(3);
        assert!(q.contains("WHERE c.name NOT IN (?, ?, ?)"));
    }

    #[test]
    fn query_joins_guild_names() {
        assert!(roster_query(1).contains("LEFT JOIN guilds g ON g.guildid = c.guildid"));
    }
}
