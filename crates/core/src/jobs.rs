//! Job code table for the game server's `characters.job` column.
//!
//! Codes encode the class tree: the hundreds digit picks the branch, the
//! tens digit the specialisation, and the units digit the advancement tier
//! (e.g. `112` = Warrior -> Fighter line -> Hero). Cygnus Knights live in
//! `1000..=1512` and the Legend classes (Aran, Evan) in `2000..=2218`.

/// Label returned for codes that are not in the table.
pub const UNKNOWN_JOB: &str = "Unknown";

/// Look up the class name for a job code, or `None` if it is unmapped.
pub fn try_lookup(code: i32) -> Option<&'static str> {
    let name = match code {
        0 => "Beginner",

        // Warrior
        100 => "Warrior",
        110 => "Fighter",
        111 => "Crusader",
        112 => "Hero",
        120 => "Page",
        121 => "White Knight",
        122 => "Paladin",
        130 => "Spearman",
        131 => "Dragon Knight",
        132 => "Dark Knight",

        // Magician
        200 => "Magician",
        210 => "Wizard (Fire/Poison)",
        211 => "Mage (Fire/Poison)",
        212 => "Arch Mage (Fire/Poison)",
        220 => "Wizard (Ice/Lightning)",
        221 => "Mage (Ice/Lightning)",
        222 => "Arch Mage (Ice/Lightning)",
        230 => "Cleric",
        231 => "Priest",
        232 => "Bishop",

        // Bowman
        300 => "Bowman",
        310 => "Hunter",
        311 => "Ranger",
        312 => "Bowmaster",
        320 => "Crossbowman",
        321 => "Sniper",
        322 => "Marksman",

        // Thief
        400 => "Thief",
        410 => "Assassin",
        411 => "Hermit",
        412 => "Night Lord",
        420 => "Bandit",
        421 => "Chief Bandit",
        422 => "Shadower",

        // Pirate
        500 => "Pirate",
        510 => "Brawler",
        511 => "Marauder",
        512 => "Buccaneer",
        520 => "Gunslinger",
        521 => "Outlaw",
        522 => "Corsair",

        // Staff
        800 => "Maple Leaf Brigadier",
        900 => "GM",
        910 => "Super GM",

        // Cygnus Knights
        1000 => "Noblesse",
        1100 => "Dawn Warrior (1st)",
        1110 => "Dawn Warrior (2nd)",
        1111 => "Dawn Warrior (3rd)",
        1112 => "Dawn Warrior (4th)",
        1200 => "Blaze Wizard (1st)",
        1210 => "Blaze Wizard (2nd)",
        1211 => "Blaze Wizard (3rd)",
        1212 => "Blaze Wizard (4th)",
        1300 => "Wind Archer (1st)",
        1310 => "Wind Archer (2nd)",
        1311 => "Wind Archer (3rd)",
        1312 => "Wind Archer (4th)",
        1400 => "Night Walker (1st)",
        1410 => "Night Walker (2nd)",
        1411 => "Night Walker (3rd)",
        1412 => "Night Walker (4th)",
        1500 => "Thunder Breaker (1st)",
        1510 => "Thunder Breaker (2nd)",
        1511 => "Thunder Breaker (3rd)",
        1512 => "Thunder Breaker (4th)",

        // Legends
        2000 => "Legend",
        2001 => "Evan (Beginner)",
        2100 => "Aran (1st)",
        2110 => "Aran (2nd)",
        2111 => "Aran (3rd)",
        2112 => "Aran (4th)",
        2200 => "Evan (1st)",
        2210 => "Evan (2nd)",
        2211 => "Evan (3rd)",
        2212 => "Evan (4th)",
        2213 => "Evan (5th)",
        2214 => "Evan (6th)",
        2215 => "Evan (7th)",
        2216 => "Evan (8th)",
        2217 => "Evan (9th)",
        2218 => "Evan (10th)",

        _ => return None,
    };
    Some(name)
}

/// Look up the class name for a job code.
///
/// Unmapped codes never abort processing: they are logged and resolve to
/// [`UNKNOWN_JOB`].
pub fn lookup(code: i32) -> &'static str {
    match try_lookup(code) {
        Some(name) => name,
        None => {
            tracing::warn!(job_code = code, "Unknown job code");
            UNKNOWN_JOB
        }
    }
}
