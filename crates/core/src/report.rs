//! Plain-text rank report.
//!
//! Renders the top characters of a generation as a fixed-width table:
//!
//! ```text
//! +--------------+-------+----------------------+
//! | Name         | Level | Job                  |
//! +==============+=======+======================+
//! | Alice        | 120   | Hero                 |
//! | Bob          | 97    | Bishop               |
//! +--------------+-------+----------------------+
//! ```
//!
//! A `Guild` column is added when any character in the generation has one.

use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{ColumnConstraint, Table, TableComponent, Width};

use crate::character::Character;
use crate::error::RosterError;
use crate::jobs::{self, UNKNOWN_JOB};
use crate::roster::Generation;

/// Number of rows shown by the rank command unless configured otherwise.
pub const DEFAULT_REPORT_ROWS: usize = 14;

/// Fixed widths, in characters, of the cell contents.
const NAME_WIDTH: u16 = 12;
const LEVEL_WIDTH: u16 = 5;
const JOB_WIDTH: u16 = 20;
const GUILD_WIDTH: u16 = 12;

/// One space either side of every cell.
const CELL_PADDING: u16 = 2;

/// The top `limit` characters by level, highest first.
///
/// Equal levels keep generation order. Asking for more rows than the
/// generation holds is a [`RosterError::ReportRange`].
pub fn rank(generation: &Generation, limit: usize) -> Result<Vec<&Character>, RosterError> {
    if limit > generation.len() {
        return Err(RosterError::ReportRange {
            requested: limit,
            available: generation.len(),
        });
    }

    let mut ranked: Vec<&Character> = generation.iter().collect();
    // `sort_by` is stable, which preserves generation order among ties.
    ranked.sort_by(|a, b| b.level().cmp(&a.level()));
    ranked.truncate(limit);
    Ok(ranked)
}

/// Render the rank table for the top `limit` characters.
///
/// The result has no trailing newline so callers can wrap it freely.
pub fn render(generation: &Generation, limit: usize) -> Result<String, RosterError> {
    let rows = rank(generation, limit)?;
    let with_guild = generation.iter().any(|c| c.guild().is_some());

    let mut widths = vec![NAME_WIDTH, LEVEL_WIDTH, JOB_WIDTH];
    let mut header = vec!["Name", "Level", "Job"];
    if with_guild {
        widths.push(GUILD_WIDTH);
        header.push("Guild");
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_style(TableComponent::MiddleHeaderIntersections, '+')
        .set_header(header);

    for c in rows {
        // Unknown codes are logged where job changes are detected, not per render.
        let job = jobs::try_lookup(c.job_code()).unwrap_or(UNKNOWN_JOB);
        let mut cells = vec![
            clip(c.name(), NAME_WIDTH),
            clip(&c.level().to_string(), LEVEL_WIDTH),
            clip(job, JOB_WIDTH),
        ];
        if with_guild {
            cells.push(clip(c.guild().unwrap_or_default(), GUILD_WIDTH));
        }
        table.add_row(cells);
    }

    // Cells are clipped beforehand, so a fixed width never wraps.
    table.set_constraints(
        widths
            .iter()
            .map(|&w| ColumnConstraint::Absolute(Width::Fixed(w + CELL_PADDING))),
    );

    Ok(table.to_string())
}

/// Truncate to at most `width` characters without splitting a code point.
fn clip(value: &str, width: u16) -> String {
    value.chars().take(usize::from(width)).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn roster(count: u32) -> Generation {
        Generation::from_characters(
            1,
            (0..count).map(|i| Character::new(format!("Char{i:02}"), 10 + (i * 7) % 23, 100)),
        )
    }

    fn body_rows(table: &str) -> Vec<&str> {
        // Skip top rule, header, header rule; drop bottom rule.
        let lines: Vec<&str> = table.lines().collect();
        lines[3..lines.len() - 1].to_vec()
    }

    #[test]
    fn twenty_characters_limited_to_fourteen() {
        let generation = roster(20);
        let ranked = rank(&generation, DEFAULT_REPORT_ROWS).unwrap();
        assert_eq!(ranked.len(), 14);
        assert!(ranked.windows(2).all(|w| w[0].level() >= w[1].level()));

        let table = render(&generation, DEFAULT_REPORT_ROWS).unwrap();
        assert_eq!(body_rows(&table).len(), 14);
    }

    #[test]
    fn requesting_more_rows_than_available_fails() {
        let generation = roster(20);
        assert_matches!(
            render(&generation, 25),
            Err(RosterError::ReportRange {
                requested: 25,
                available: 20
            })
        );
    }

    #[test]
    fn exact_row_count_is_allowed() {
        let generation = roster(3);
        assert_eq!(rank(&generation, 3).unwrap().len(), 3);
    }

    #[test]
    fn ties_keep_generation_order() {
        let generation = Generation::from_characters(
            1,
            [
                Character::new("Low", 5, 0),
                Character::new("TieFirst", 50, 0),
                Character::new("Top", 90, 0),
                Character::new("TieSecond", 50, 0),
            ],
        );
        let names: Vec<&str> = rank(&generation, 4)
            .unwrap()
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, ["Top", "TieFirst", "TieSecond", "Low"]);
    }

    #[test]
    fn renders_header_and_job_names() {
        let generation = Generation::from_characters(
            1,
            [Character::new("Alice", 120, 112), Character::new("Bob", 97, 232)],
        );
        let table = render(&generation, 2).unwrap();
        let expected = "\
+--------------+-------+----------------------+
| Name         | Level | Job                  |
+==============+=======+======================+
| Alice        | 120   | Hero                 |
| Bob          | 97    | Bishop               |
+--------------+-------+----------------------+";
        assert_eq!(table, expected);
    }

    #[test]
    fn long_values_are_truncated_not_wrapped() {
        let generation = Generation::from_characters(
            1,
            [Character::new("AVeryLongCharacterName", 10, 212)],
        );
        let table = render(&generation, 1).unwrap();
        let row = body_rows(&table)[0];
        assert!(row.contains("| AVeryLongCha |"));
        assert!(row.contains("Arch Mage (Fire/Pois"));
        // All lines share the same width.
        let width = table.lines().next().unwrap().chars().count();
        assert!(table.lines().all(|l| l.chars().count() == width));
    }

    #[test]
    fn guild_column_appears_when_any_character_has_a_guild() {
        let generation = Generation::from_characters(
            1,
            [
                Character::new("Alice", 120, 112).with_guild("Maplers"),
                Character::new("Bob", 97, 232),
            ],
        );
        let table = render(&generation, 2).unwrap();
        assert!(table.lines().nth(1).unwrap().contains("Guild"));
        assert!(table.contains("| Maplers      |"));
    }

    #[test]
    fn zero_rows_renders_only_header() {
        let table = render(&Generation::empty(), 0).unwrap();
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn unknown_job_renders_without_warning() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct WarnCounter(Arc<AtomicUsize>);

        impl<S: Subscriber> Layer<S> for WarnCounter {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let generation = Generation::from_characters(1, [Character::new("Odd", 10, 99999)]);

        let table = tracing::subscriber::with_default(subscriber, || {
            let table = render(&generation, 1).unwrap();
            let _ = render(&generation, 1).unwrap();
            assert_eq!(warnings.load(Ordering::SeqCst), 0);

            // The logging lookup used by detection still reports the code.
            jobs::lookup(99999);
            table
        });

        assert_eq!(warnings.load(Ordering::SeqCst), 1);
        assert!(table.contains("| Unknown "));
    }

    #[test]
    fn clip_respects_multibyte_characters() {
        assert_eq!(clip("ÄÖÜßé", 3), "ÄÖÜ");
        assert_eq!(clip("abc", 10), "abc");
    }
}
