use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::Character;

use super::markup::{clean_text, parse_affiliation, parse_game_list, parse_image, parse_titles};

// Non-greedy: stops at the first `}}`, so a nested template inside the
// infobox ends the block early.
static RE_INFOBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{Infobox character(.*?)\}\}").expect("invalid regex: infobox")
});

/// Infobox keys that map onto a character field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoboxField {
    Name,
    Games,
    Mentions,
    Race,
    Gender,
    Status,
    Affiliation,
    Role,
    Titles,
    Image,
}

impl InfoboxField {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "games" => Some(Self::Games),
            "mentions" => Some(Self::Mentions),
            "race" => Some(Self::Race),
            "gender" => Some(Self::Gender),
            "status" => Some(Self::Status),
            "affiliation" => Some(Self::Affiliation),
            "role" => Some(Self::Role),
            "titles" => Some(Self::Titles),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Interior of the first character infobox on the page.
pub fn extract_infobox<'a>(title: &str, content: &'a str) -> Result<&'a str> {
    RE_INFOBOX
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::NoInfobox(title.to_string()))
}

/// Split a field line on `|`, ignoring pipes inside `[[...]]` and `{{...}}`.
fn split_top_level(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let doubled = bytes.get(i + 1) == Some(&bytes[i]);
        match bytes[i] {
            b'[' | b'{' if doubled => {
                depth += 1;
                i += 2;
                continue;
            }
            b']' | b'}' if doubled => {
                depth = depth.saturating_sub(1);
                i += 2;
                continue;
            }
            b'|' if depth == 0 => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&line[start..]);
    parts
}

/// Recognized `key=value` pairs of an infobox body, in document order.
///
/// Only lines starting with `|` are read. A value that wraps onto
/// following lines keeps just its first line; continuation lines are
/// dropped rather than joined.
pub fn parse_fields(infobox: &str) -> Vec<(InfoboxField, &str)> {
    infobox
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|'))
        .flat_map(split_top_level)
        .filter_map(|field| {
            let (key, value) = field.split_once('=')?;
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            InfoboxField::from_key(key.trim()).map(|kind| (kind, value))
        })
        .collect()
}

/// Assemble a character from infobox fields. Never fails: a page with no
/// recognized fields still produces a record named after the page.
pub fn build_character(title: &str, fields: &[(InfoboxField, &str)]) -> Character {
    let mut c = Character::new(title);

    for &(field, value) in fields {
        match field {
            InfoboxField::Name => {
                let name = clean_text(value);
                if !name.is_empty() {
                    c.name = name;
                }
            }
            InfoboxField::Games => c.games = parse_game_list(value),
            InfoboxField::Mentions => c.mentions = parse_game_list(value),
            InfoboxField::Race => c.race = clean_text(value),
            InfoboxField::Gender => c.gender = clean_text(value),
            InfoboxField::Status => c.status = clean_text(value),
            InfoboxField::Affiliation => c.affiliation = parse_affiliation(value),
            InfoboxField::Role => c.role = clean_text(value),
            InfoboxField::Titles => c.titles = parse_titles(value),
            InfoboxField::Image => c.image_url = parse_image(value),
        }
    }

    c.main_game = c.first_game().to_string();
    c
}

/// Parse a character from the raw markup of its wiki page.
pub fn parse_character(title: &str, content: &str) -> Result<Character> {
    let infobox = extract_infobox(title, content)?;
    let fields = parse_fields(infobox);
    tracing::debug!("Parsed {} infobox fields from {}", fields.len(), title);
    Ok(build_character(title, &fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAXSON_PAGE: &str = r#"{{Infobox character
|name        =Roger Maxson
|image       =Roger Maxson.png
|race        =[[Human]]
|gender      =Male
|affiliation =[[United States Army]]
|role        =Founder of the [[Brotherhood of Steel]]
|titles      ="Elder" "Founder"
|status      =Deceased<ref>''[[Fallout Bible 0]]''</ref>
|games       =FO1, FOT
|mentions    =FO2, FO3
|quests      =None
|footer      =
}}
'''Roger Maxson''' was the founder of the [[Brotherhood of Steel]].
"#;

    #[test]
    fn test_single_line_infobox() {
        let content = "{{Infobox character|name=Roger Maxson|race=[[Human]]|gender=Male|status=Deceased|games=FO1,FOT}}";
        let c = parse_character("Roger Maxson", content).unwrap();

        assert_eq!(c.name, "Roger Maxson");
        assert_eq!(c.race, "Human");
        assert_eq!(c.gender, "Male");
        assert_eq!(c.status, "Deceased");
        assert_eq!(c.games, vec!["FO1", "FOT"]);
        assert_eq!(c.main_game, "FO1");
        assert_eq!(c.wiki_title, "Roger Maxson");
    }

    #[test]
    fn test_multi_line_infobox() {
        let c = parse_character("Roger_Maxson", MAXSON_PAGE).unwrap();

        assert_eq!(c.name, "Roger Maxson");
        assert_eq!(c.image_url, "Roger Maxson.png");
        assert_eq!(c.affiliation, vec!["United States Army"]);
        assert_eq!(c.role, "Founder of the Brotherhood of Steel");
        assert_eq!(c.titles, vec!["Elder", "Founder"]);
        assert_eq!(c.status, "Deceased");
        assert_eq!(c.mentions, vec!["FO2", "FO3"]);
        assert_eq!(c.main_game, "FO1");
        assert!(c.played_at.is_none());
    }

    #[test]
    fn test_pipes_inside_links_do_not_split_fields() {
        let content = "{{Infobox character|race=[[Human|Humans]]|gender=Female}}";
        let c = parse_character("Sarah Lyons", content).unwrap();
        assert_eq!(c.race, "Humans");
        assert_eq!(c.gender, "Female");
    }

    #[test]
    fn test_missing_infobox() {
        let err = parse_character("Vault 13", "{{Infobox location\n|name=Vault 13\n}}").unwrap_err();
        assert!(matches!(err, AppError::NoInfobox(ref t) if t == "Vault 13"));
    }

    #[test]
    fn test_empty_infobox_still_builds_record() {
        let c = parse_character("Mysterious Stranger", "{{Infobox character\n}}").unwrap();
        assert_eq!(c.name, "Mysterious Stranger");
        assert!(c.games.is_empty());
        assert_eq!(c.main_game, "");
        assert_eq!(c.race, "");
    }

    #[test]
    fn test_name_defaults_when_empty_or_markup_only() {
        let content = "{{Infobox character\n|name=\n|race=Ghoul\n}}";
        assert_eq!(parse_character("Harold", content).unwrap().name, "Harold");

        let content = "{{Infobox character\n|name=<br>\n}}";
        assert_eq!(parse_character("Harold", content).unwrap().name, "Harold");
    }

    #[test]
    fn test_continuation_lines_are_dropped() {
        let content = "{{Infobox character\n|affiliation=*[[Brotherhood of Steel]]\n*[[Vault 13]]\n|race=Human\n}}";
        let c = parse_character("Jon Maxson", content).unwrap();
        assert_eq!(c.affiliation, vec!["Brotherhood of Steel"]);
        assert_eq!(c.race, "Human");
    }

    #[test]
    fn test_unknown_keys_and_malformed_lines_are_ignored() {
        let fields = parse_fields("\n|quests=Find the water chip\n|no equals sign\n|race = Super mutant\nrace=Human\n");
        assert_eq!(fields, vec![(InfoboxField::Race, "Super mutant")]);
    }

    #[test]
    fn test_first_infobox_wins() {
        let content = "{{Infobox character\n|name=First\n}}\n{{Infobox character\n|name=Second\n}}";
        assert_eq!(parse_character("Twins", content).unwrap().name, "First");
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let lines = [
            "|name=Moira Brown",
            "|race=[[Human]]",
            "|gender=Female",
            "|status=Alive",
            "|affiliation=[[Craterside Supply]]",
            "|role=Shopkeeper",
            "|titles=\"Author\"",
            "|games=FO3",
            "|mentions=FO4",
            "|image=Moira Brown.png",
        ];
        let build = |order: &[usize]| {
            let body: Vec<&str> = order.iter().map(|&i| lines[i]).collect();
            let content = format!("{{{{Infobox character\n{}\n}}}}", body.join("\n"));
            parse_character("Moira Brown", &content).unwrap()
        };

        let forward: Vec<usize> = (0..lines.len()).collect();
        let reversed: Vec<usize> = forward.iter().rev().copied().collect();
        let interleaved: Vec<usize> = forward
            .iter()
            .filter(|i| *i % 2 == 1)
            .chain(forward.iter().filter(|i| *i % 2 == 0))
            .copied()
            .collect();

        let expected = build(&forward);
        assert_eq!(expected.games, vec!["FO3"]);
        assert_eq!(build(&reversed), expected);
        assert_eq!(build(&interleaved), expected);
    }
}
