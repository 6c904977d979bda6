use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").expect("invalid regex: wiki link")
});

// Self-closing refs first so `<ref name="x"/>` does not swallow text up to the next `</ref>`
static RE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ref[^>]*/>|<ref[^>]*>.*?</ref>").expect("invalid regex: ref tag")
});

static RE_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex: html tag"));

// Innermost templates only; nested ones are peeled off one level per pass
static RE_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("invalid regex: template"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex: whitespace"));

static RE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("invalid regex: quoted title"));

/// Reduce wiki markup to plain text.
///
/// Links become their display text (or target when there is none), ref
/// tags are dropped together with their content, remaining HTML tags and
/// `{{...}}` templates are removed, and whitespace runs collapse to a
/// single space.
pub fn clean_text(text: &str) -> String {
    let text = RE_LINK.replace_all(text, |caps: &Captures| {
        match caps.get(2).map(|m| m.as_str().split('|').next().unwrap_or_default()) {
            Some(display) if !display.is_empty() => display.to_string(),
            _ => caps[1].to_string(),
        }
    });
    let text = RE_REF.replace_all(&text, "");
    let text = RE_HTML_TAG.replace_all(&text, "");
    let text = strip_templates(&text);
    let text = RE_WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn strip_templates(text: &str) -> String {
    let mut text = text.to_string();
    while RE_TEMPLATE.is_match(&text) {
        text = RE_TEMPLATE.replace_all(&text, "").into_owned();
    }
    text
}

/// Comma separated game codes, e.g. `FO1, FO2`. Order is kept and
/// duplicates are not removed.
pub fn parse_game_list(value: &str) -> Vec<String> {
    clean_text(value)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Affiliations are usually a bulleted list, one per line. Values with no
/// usable lines fall back to comma separation.
pub fn parse_affiliation(value: &str) -> Vec<String> {
    let affiliations: Vec<String> = value
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .map(clean_text)
        .filter(|clean| !clean.is_empty())
        .collect();

    if !affiliations.is_empty() {
        return affiliations;
    }

    value
        .split(',')
        .map(|part| clean_text(part.trim()))
        .filter(|clean| !clean.is_empty())
        .collect()
}

/// Every double-quoted string in the value is one title.
pub fn parse_titles(value: &str) -> Vec<String> {
    RE_QUOTED
        .captures_iter(value)
        .map(|caps| clean_text(&caps[1]))
        .filter(|title| !title.is_empty())
        .collect()
}

/// Image file name as written in the infobox.
pub fn parse_image(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_links() {
        assert_eq!(clean_text("[[Human]]"), "Human");
        assert_eq!(
            clean_text("[[Brotherhood of Steel|the Brotherhood]] member"),
            "the Brotherhood member"
        );
        assert_eq!(clean_text("[[Ghoul|]]"), "Ghoul");
    }

    #[test]
    fn test_clean_text_strips_refs_tags_and_templates() {
        assert_eq!(
            clean_text("Deceased<ref name=\"bible\">Fallout Bible 0</ref>"),
            "Deceased"
        );
        assert_eq!(clean_text("Alive<ref name=\"a\"/> {{cn}}"), "Alive");
        assert_eq!(clean_text("<small>Male</small>"), "Male");
        assert_eq!(clean_text("Human<br />Ghoul"), "HumanGhoul");
    }

    #[test]
    fn test_clean_text_strips_nested_templates() {
        assert_eq!(clean_text("Human{{Icon|{{small|x}}}}"), "Human");
        assert_eq!(clean_text("{{a|{{b|{{c}}}}}} Ghoul {{d}}"), "Ghoul");
        // Unbalanced braces are left alone
        assert_eq!(clean_text("Human {{Icon"), "Human {{Icon");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Elder \n\n of   the\tBrotherhood "), "Elder of the Brotherhood");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_game_list() {
        assert_eq!(parse_game_list("FO1,FOT"), vec!["FO1", "FOT"]);
        assert_eq!(parse_game_list(" FO3 , , FNV,FO3 "), vec!["FO3", "FNV", "FO3"]);
        assert!(parse_game_list(" , ").is_empty());
    }

    #[test]
    fn test_affiliation_bullets() {
        assert_eq!(
            parse_affiliation("*[[Brotherhood of Steel]]\n*[[Vault 13]]"),
            vec!["Brotherhood of Steel", "Vault 13"]
        );
    }

    #[test]
    fn test_affiliation_single_line_is_one_item() {
        assert_eq!(
            parse_affiliation("[[Enclave]], [[Vault-Tec]]"),
            vec!["Enclave, Vault-Tec"]
        );
    }

    #[test]
    fn test_affiliation_comma_fallback() {
        // No line survives cleaning, so the raw value is split on commas
        // without bullet stripping
        assert_eq!(parse_affiliation("*{{cn}}"), vec!["*"]);
        assert!(parse_affiliation("{{cn}}<br>").is_empty());
    }

    #[test]
    fn test_titles() {
        assert_eq!(parse_titles(r#""Elder" "Founder""#), vec!["Elder", "Founder"]);
        assert_eq!(
            parse_titles(r#""The [[Lone Wanderer]]", "Messiah""#),
            vec!["The Lone Wanderer", "Messiah"]
        );
        assert!(parse_titles("Elder, Founder").is_empty());
    }

    #[test]
    fn test_titles_with_empty_quotes() {
        assert_eq!(parse_titles(r#""" "Elder""#), vec!["Elder"]);
        assert_eq!(
            parse_titles(r#""Elder" "" "Founder""#),
            vec!["Elder", "Founder"]
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(parse_image("  Roger Maxson.png \n"), "Roger Maxson.png");
    }
}
