use crate::models::Character;

/// Player-surrogate names across the series.
pub const PROTAGONIST_NAMES: [&str; 6] = [
    "Vault Dweller",
    "Chosen One",
    "Lone Wanderer",
    "Courier",
    "Sole Survivor",
    "Resident",
];

/// Decides whether a character may be used as a daily answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityPolicy {
    /// Also reject player characters (any name containing one of
    /// [`PROTAGONIST_NAMES`]). Off unless configured.
    pub exclude_protagonists: bool,
}

impl ValidityPolicy {
    pub fn new(exclude_protagonists: bool) -> Self {
        Self {
            exclude_protagonists,
        }
    }

    pub fn is_valid(&self, c: &Character) -> bool {
        if !is_valid(c) {
            return false;
        }
        !(self.exclude_protagonists && is_protagonist(c))
    }
}

/// Whether the name contains one of the series' player-character names.
pub fn is_protagonist(c: &Character) -> bool {
    PROTAGONIST_NAMES.iter().any(|p| c.name.contains(p))
}

/// Base rule: named, has a race, appears in at least one game and has not
/// been played yet.
pub fn is_valid(c: &Character) -> bool {
    !c.name.is_empty()
        && !c.race.is_empty()
        && (!c.games.is_empty() || !c.main_game.is_empty())
        && c.played_at.is_none()
}
