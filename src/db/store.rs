use std::future::Future;

use crate::error::Result;
use crate::models::Character;

/// Persistence operations the game needs from a character store.
pub trait CharacterStore: Sync {
    /// Every stored character that passes the store's validity policy.
    fn get_all_valid_characters(&self) -> impl Future<Output = Result<Vec<Character>>> + Send;

    /// Fails with `RecordNotFound` when no character has this title.
    fn get_by_wiki_title(&self, title: &str) -> impl Future<Output = Result<Character>> + Send;

    /// Stamp the character as played now.
    fn mark_as_played(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Insert or refresh a character keyed by its wiki title; returns its id.
    fn add(&self, character: Character) -> impl Future<Output = Result<i64>> + Send;
}
