use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game_code::display_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Storage id, 0 until the record has been persisted.
    pub id: i64,
    /// Original wiki page title, unique across records.
    pub wiki_title: String,
    pub name: String,
    pub games: Vec<String>,
    pub mentions: Vec<String>,
    pub race: String,
    pub gender: String,
    pub status: String,
    pub affiliation: Vec<String>,
    pub role: String,
    pub titles: Vec<String>,
    pub main_game: String,
    pub image_url: String,
    pub played_at: Option<DateTime<Utc>>,
}

impl Character {
    /// Empty record for a wiki page, named after the page.
    pub fn new(wiki_title: impl Into<String>) -> Self {
        let wiki_title = wiki_title.into();
        Self {
            id: 0,
            name: wiki_title.clone(),
            wiki_title,
            games: Vec::new(),
            mentions: Vec::new(),
            race: String::new(),
            gender: String::new(),
            status: String::new(),
            affiliation: Vec::new(),
            role: String::new(),
            titles: Vec::new(),
            main_game: String::new(),
            image_url: String::new(),
            played_at: None,
        }
    }

    /// First listed game, or empty when the character has none.
    pub fn first_game(&self) -> &str {
        self.games.first().map(String::as_str).unwrap_or_default()
    }

    pub fn compact(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.name.is_empty() {
            parts.push(self.name.clone());
        }
        if self.id != 0 {
            parts.push(format!("ID:{}", self.id));
        }
        if !self.race.is_empty() {
            parts.push(self.race.clone());
        }
        if !self.main_game.is_empty() {
            parts.push(self.main_game.clone());
        }
        format!("Character{{{}}}", parts.join(", "))
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, items: &[&str]) -> fmt::Result {
    let items: Vec<&str> = items.iter().copied().filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {}: {}", label, items.join(", "))
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Character")?;
        if self.id != 0 {
            write!(f, " #{}", self.id)?;
        }
        if !self.name.is_empty() {
            write!(f, ": {}", self.name)?;
        }
        writeln!(f)?;

        for (label, value) in [
            ("Race", &self.race),
            ("Gender", &self.gender),
            ("Status", &self.status),
            ("Role", &self.role),
            ("Main Game", &self.main_game),
        ] {
            if !value.is_empty() {
                writeln!(f, "  {}: {}", label, value)?;
            }
        }

        let games: Vec<&str> = self.games.iter().map(|g| display_name(g)).collect();
        write_list(f, "Appears in", &games)?;
        let mentions: Vec<&str> = self.mentions.iter().map(|g| display_name(g)).collect();
        write_list(f, "Mentioned in", &mentions)?;
        let affiliation: Vec<&str> = self.affiliation.iter().map(String::as_str).collect();
        write_list(f, "Affiliations", &affiliation)?;
        let titles: Vec<&str> = self.titles.iter().map(String::as_str).collect();
        write_list(f, "Titles", &titles)?;

        if !self.wiki_title.is_empty() {
            writeln!(f, "  Wiki: {}", self.wiki_title)?;
        }
        if !self.image_url.is_empty() {
            writeln!(f, "  Image: {}", self.image_url)?;
        }
        if let Some(played_at) = self.played_at {
            writeln!(f, "  Played: {}", played_at.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}
