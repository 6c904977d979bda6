use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::db::CharacterStore;
use crate::error::{AppError, Result};
use crate::models::Character;

use super::validity::ValidityPolicy;

/// The character picked for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyAnswer {
    pub date: NaiveDate,
    pub character: Character,
}

/// Picks and caches today's character.
///
/// The cache check, the draw and the cache write all happen under one
/// lock, so concurrent callers on a new day trigger a single draw and
/// a single `mark_as_played`.
pub struct DailySelection<S> {
    store: S,
    policy: ValidityPolicy,
    current: Mutex<Option<DailyAnswer>>,
}

impl<S: CharacterStore> DailySelection<S> {
    pub fn new(store: S, policy: ValidityPolicy) -> Self {
        Self {
            store,
            policy,
            current: Mutex::new(None),
        }
    }

    pub async fn get_today(&self) -> Result<Character> {
        self.get_today_at(Utc::now()).await
    }

    /// Today's character as of `now`. The first call of a UTC day draws a
    /// new character; later calls that day return it without touching the
    /// store. On error the cached answer is left as it was.
    pub async fn get_today_at(&self, now: DateTime<Utc>) -> Result<Character> {
        let today = now.date_naive();
        let mut current = self.current.lock().await;

        if let Some(answer) = current.as_ref().filter(|a| a.date == today) {
            return Ok(answer.character.clone());
        }

        tracing::info!("No character selected for {}, drawing a new one", today);
        let character = self.create_today().await?;
        tracing::info!("Selected {} for {}", character.compact(), today);

        *current = Some(DailyAnswer {
            date: today,
            character: character.clone(),
        });
        Ok(character)
    }

    #[allow(dead_code)]
    pub async fn current(&self) -> Option<DailyAnswer> {
        self.current.lock().await.clone()
    }

    /// Draw candidates at random without replacement until one is still
    /// valid when re-read from the store, then mark it played.
    async fn create_today(&self) -> Result<Character> {
        let mut candidates = self.store.get_all_valid_characters().await?;
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
        let mut rng = StdRng::seed_from_u64(seed);

        while !candidates.is_empty() {
            let drawn = candidates.swap_remove(rng.gen_range(0..candidates.len()));

            // The listing may be stale if another request marked it meanwhile
            let fresh = match self.store.get_by_wiki_title(&drawn.wiki_title).await {
                Ok(c) => c,
                Err(AppError::RecordNotFound(_)) => {
                    tracing::debug!("{} disappeared before selection", drawn.wiki_title);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !self.policy.is_valid(&fresh) {
                tracing::debug!("{} is no longer valid, drawing again", fresh.compact());
                continue;
            }

            self.store.mark_as_played(fresh.id).await?;
            return Ok(fresh);
        }

        Err(AppError::NoCharactersAvailable)
    }
}
