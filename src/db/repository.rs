use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::game::ValidityPolicy;
use crate::models::Character;

use super::schema::SCHEMA;
use super::store::CharacterStore;

const CHARACTER_COLUMNS: &str = "id, wiki_title, name, games, mentions, race, gender, status, \
     affiliation, role, titles, main_game, image_url, played_at";

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
    policy: ValidityPolicy,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            policy: ValidityPolicy::default(),
        })
    }

    /// Policy applied by [`Repository::get_all_valid_characters`].
    pub fn with_policy(mut self, policy: ValidityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Insert a character, or refresh the parsed fields of the character
    /// with the same wiki title. `played_at` is never overwritten.
    pub async fn add(&self, character: Character) -> Result<i64> {
        let games = serde_json::to_string(&character.games)?;
        let mentions = serde_json::to_string(&character.mentions)?;
        let affiliation = serde_json::to_string(&character.affiliation)?;
        let titles = serde_json::to_string(&character.titles)?;

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO characters (wiki_title, name, games, mentions, race, gender, status,
                                               affiliation, role, titles, main_game, image_url)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                       ON CONFLICT(wiki_title) DO UPDATE SET
                           name = excluded.name,
                           games = excluded.games,
                           mentions = excluded.mentions,
                           race = excluded.race,
                           gender = excluded.gender,
                           status = excluded.status,
                           affiliation = excluded.affiliation,
                           role = excluded.role,
                           titles = excluded.titles,
                           main_game = excluded.main_game,
                           image_url = excluded.image_url,
                           updated_at = datetime('now')"#,
                    params![
                        character.wiki_title,
                        character.name,
                        games,
                        mentions,
                        character.race,
                        character.gender,
                        character.status,
                        affiliation,
                        character.role,
                        titles,
                        character.main_game,
                        character.image_url,
                    ],
                )?;
                let id: i64 = conn.query_row(
                    "SELECT id FROM characters WHERE wiki_title = ?1",
                    params![character.wiki_title],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    pub async fn get_all_characters(&self) -> Result<Vec<Character>> {
        self.select_characters("ORDER BY name").await
    }

    /// Unplayed characters that pass the repository's validity policy.
    pub async fn get_all_valid_characters(&self) -> Result<Vec<Character>> {
        let characters = self
            .select_characters("WHERE played_at IS NULL ORDER BY name")
            .await?;
        let policy = self.policy;
        Ok(characters
            .into_iter()
            .filter(|c| policy.is_valid(c))
            .collect())
    }

    #[allow(dead_code)]
    pub async fn get_by_id(&self, id: i64) -> Result<Character> {
        if id <= 0 {
            return Err(AppError::InvalidIdentifier(format!("character id {}", id)));
        }
        self.select_one("id = ?1", Value::Integer(id))
            .await?
            .ok_or_else(|| AppError::RecordNotFound(format!("id {}", id)))
    }

    pub async fn get_by_wiki_title(&self, wiki_title: &str) -> Result<Character> {
        self.select_one("wiki_title = ?1", Value::Text(wiki_title.to_string()))
            .await?
            .ok_or_else(|| AppError::RecordNotFound(wiki_title.to_string()))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Character> {
        self.select_one("name = ?1", Value::Text(name.to_string()))
            .await?
            .ok_or_else(|| AppError::RecordNotFound(name.to_string()))
    }

    pub async fn mark_as_played(&self, id: i64) -> Result<()> {
        if id <= 0 {
            return Err(AppError::InvalidIdentifier(format!("character id {}", id)));
        }

        let played_at = Utc::now().to_rfc3339();
        let updated = self
            .conn
            .call(move |conn| {
                let updated = conn.execute(
                    "UPDATE characters SET played_at = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![played_at, id],
                )?;
                Ok(updated)
            })
            .await?;

        if updated == 0 {
            return Err(AppError::RecordNotFound(format!("id {}", id)));
        }
        Ok(())
    }

    pub async fn count_characters(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    async fn select_characters(&self, clause: &'static str) -> Result<Vec<Character>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM characters {}",
                    CHARACTER_COLUMNS, clause
                ))?;
                let rows = stmt
                    .query_map([], character_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(CharacterRow::into_character).collect()
    }

    async fn select_one(&self, condition: &'static str, value: Value) -> Result<Option<Character>> {
        let row = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM characters WHERE {}",
                    CHARACTER_COLUMNS, condition
                ))?;
                let row = stmt
                    .query_row(params![value], character_row)
                    .optional()?;
                Ok(row)
            })
            .await?;
        row.map(CharacterRow::into_character).transpose()
    }
}

impl CharacterStore for Repository {
    async fn get_all_valid_characters(&self) -> Result<Vec<Character>> {
        Repository::get_all_valid_characters(self).await
    }

    async fn get_by_wiki_title(&self, title: &str) -> Result<Character> {
        Repository::get_by_wiki_title(self, title).await
    }

    async fn mark_as_played(&self, id: i64) -> Result<()> {
        Repository::mark_as_played(self, id).await
    }

    async fn add(&self, character: Character) -> Result<i64> {
        Repository::add(self, character).await
    }
}

/// Column values as stored; list columns are still JSON text.
struct CharacterRow {
    id: i64,
    wiki_title: String,
    name: String,
    games: String,
    mentions: String,
    race: String,
    gender: String,
    status: String,
    affiliation: String,
    role: String,
    titles: String,
    main_game: String,
    image_url: String,
    played_at: Option<String>,
}

impl CharacterRow {
    fn into_character(self) -> Result<Character> {
        Ok(Character {
            id: self.id,
            wiki_title: self.wiki_title,
            name: self.name,
            games: serde_json::from_str(&self.games)?,
            mentions: serde_json::from_str(&self.mentions)?,
            race: self.race,
            gender: self.gender,
            status: self.status,
            affiliation: serde_json::from_str(&self.affiliation)?,
            role: self.role,
            titles: serde_json::from_str(&self.titles)?,
            main_game: self.main_game,
            image_url: self.image_url,
            played_at: self.played_at.and_then(|s| parse_datetime(&s)),
        })
    }
}

fn character_row(row: &Row) -> rusqlite::Result<CharacterRow> {
    Ok(CharacterRow {
        id: row.get(0)?,
        wiki_title: row.get(1)?,
        name: row.get(2)?,
        games: row.get(3)?,
        mentions: row.get(4)?,
        race: row.get(5)?,
        gender: row.get(6)?,
        status: row.get(7)?,
        affiliation: row.get(8)?,
        role: row.get(9)?,
        titles: row.get(10)?,
        main_game: row.get(11)?,
        image_url: row.get(12)?,
        played_at: row.get(13)?,
    })
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn open_repo() -> (Repository, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.db");
        let repo = Repository::new(path.to_str().unwrap()).await.unwrap();
        (repo, dir)
    }

    fn maxson() -> Character {
        let mut c = Character::new("Roger Maxson");
        c.race = "Human".to_string();
        c.gender = "Male".to_string();
        c.status = "Deceased".to_string();
        c.games = vec!["FO1".to_string(), "FOT".to_string()];
        c.mentions = vec!["FO2".to_string()];
        c.affiliation = vec!["Brotherhood of Steel".to_string(), "United States Army".to_string()];
        c.titles = vec!["Elder".to_string(), "Founder".to_string()];
        c.main_game = "FO1".to_string();
        c.image_url = "Roger Maxson.png".to_string();
        c
    }

    #[tokio::test]
    async fn test_add_and_read_back() {
        let (repo, _dir) = open_repo().await;

        let id = repo.add(maxson()).await.unwrap();
        assert!(id > 0);

        let stored = repo.get_by_wiki_title("Roger Maxson").await.unwrap();
        assert_eq!(stored, Character { id, ..maxson() });
        assert_eq!(repo.get_by_id(id).await.unwrap(), stored);
        assert_eq!(repo.get_by_name("Roger Maxson").await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_add_refreshes_existing_title_but_keeps_played_at() {
        let (repo, _dir) = open_repo().await;

        let id = repo.add(maxson()).await.unwrap();
        repo.mark_as_played(id).await.unwrap();

        let mut edited = maxson();
        edited.status = "Alive".to_string();
        let same_id = repo.add(edited).await.unwrap();
        assert_eq!(same_id, id);

        let stored = repo.get_by_id(id).await.unwrap();
        assert_eq!(stored.status, "Alive");
        assert!(stored.played_at.is_some());
        assert_eq!(repo.count_characters().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_valid_listing_filters_played_and_incomplete() {
        let (repo, _dir) = open_repo().await;

        let played = repo.add(maxson()).await.unwrap();
        repo.mark_as_played(played).await.unwrap();

        let mut no_race = Character::new("Mysterious Stranger");
        no_race.games = vec!["FO1".to_string()];
        repo.add(no_race).await.unwrap();

        let mut tandi = Character::new("Tandi");
        tandi.race = "Human".to_string();
        tandi.games = vec!["FO1".to_string()];
        tandi.main_game = "FO1".to_string();
        repo.add(tandi).await.unwrap();

        let mut dweller = Character::new("Vault Dweller");
        dweller.race = "Human".to_string();
        dweller.games = vec!["FO1".to_string()];
        repo.add(dweller).await.unwrap();

        let names = |cs: Vec<Character>| cs.into_iter().map(|c| c.name).collect::<Vec<_>>();

        let valid = repo.get_all_valid_characters().await.unwrap();
        assert_eq!(names(valid), vec!["Tandi", "Vault Dweller"]);

        let strict = repo.clone().with_policy(ValidityPolicy::new(true));
        let valid = strict.get_all_valid_characters().await.unwrap();
        assert_eq!(names(valid), vec!["Tandi"]);

        assert_eq!(repo.get_all_characters().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_mark_as_played_errors() {
        let (repo, _dir) = open_repo().await;

        assert!(matches!(
            repo.mark_as_played(0).await,
            Err(AppError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            repo.mark_as_played(42).await,
            Err(AppError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_records() {
        let (repo, _dir) = open_repo().await;

        assert!(matches!(
            repo.get_by_wiki_title("Nobody").await,
            Err(AppError::RecordNotFound(t)) if t == "Nobody"
        ));
        assert!(matches!(
            repo.get_by_id(-3).await,
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_selection_against_sqlite() {
        let (repo, _dir) = open_repo().await;
        repo.add(maxson()).await.unwrap();

        let service = crate::game::DailySelection::new(repo.clone(), ValidityPolicy::default());
        let today = service.get_today().await.unwrap();
        assert_eq!(today.wiki_title, "Roger Maxson");

        let stored = repo.get_by_wiki_title("Roger Maxson").await.unwrap();
        assert!(stored.played_at.is_some());
        tokio_test::assert_ok!(service.get_today().await);
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2026-01-11T12:34:56+00:00").is_some());
        assert!(parse_datetime("2026-01-11 12:34:56").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }
}
