//! Random article sampling with validity and recency filters.

use chrono::{NaiveDate, TimeZone, Utc};
use tracing::debug;

use super::api::{WikiClient, WikiError};

/// Sampling rounds before giving up on a batch request.
const MAX_SAMPLING_ROUNDS: usize = 100;
const MAX_SAMPLING_ROUNDS_CUTOFF: usize = 200;

/// Samples random (start, target) article pairs for attempts.
pub struct ArticleSampler {
    api: WikiClient,
}

impl ArticleSampler {
    pub fn new(api: WikiClient) -> Self {
        Self { api }
    }

    /// Whether an article qualifies as a game endpoint. Disambiguation
    /// pages and list articles make degenerate starts and targets.
    pub async fn is_valid_article(&self, title: &str) -> Result<bool, WikiError> {
        if title.starts_with("List of ") || title.contains("(disambiguation)") {
            return Ok(false);
        }
        Ok(!self.api.is_disambiguation(title).await?)
    }

    /// Whether an article was created after the cutoff date.
    pub async fn is_post_cutoff(&self, title: &str, cutoff: NaiveDate) -> Result<bool, WikiError> {
        let Some(created) = self.api.page_creation_date(title).await? else {
            return Ok(false);
        };
        let cutoff_dt = Utc.from_utc_datetime(&cutoff.and_hms_opt(0, 0, 0).expect("valid midnight"));
        Ok(created > cutoff_dt)
    }

    /// Sample valid articles, optionally restricted to post-cutoff pages.
    /// Resamples in batches until the count is reached or the round
    /// budget runs out; callers must tolerate a short result.
    pub async fn sample_valid_articles(
        &self,
        count: usize,
        cutoff: Option<NaiveDate>,
    ) -> Result<Vec<String>, WikiError> {
        let max_rounds = if cutoff.is_some() {
            MAX_SAMPLING_ROUNDS_CUTOFF
        } else {
            MAX_SAMPLING_ROUNDS
        };

        let mut valid: Vec<String> = Vec::new();
        let mut rounds = 0usize;

        while valid.len() < count && rounds < max_rounds {
            let batch_size = 20.min((count - valid.len()) * 3).max(1);
            let candidates = self.api.random_articles(batch_size).await?;
            rounds += 1;

            for title in candidates {
                if valid.len() >= count {
                    break;
                }
                if !self.is_valid_article(&title).await? {
                    continue;
                }
                if let Some(cutoff) = cutoff {
                    if !self.is_post_cutoff(&title, cutoff).await? {
                        debug!(title = %title, "Rejected pre-cutoff article");
                        continue;
                    }
                }
                valid.push(title);
            }
        }

        Ok(valid)
    }

    /// Sample (start, target) pairs. With a cutoff, both members of every
    /// pair must qualify.
    pub async fn sample_article_pairs(
        &self,
        count: usize,
        cutoff: Option<NaiveDate>,
    ) -> Result<Vec<(String, String)>, WikiError> {
        let articles = self.sample_valid_articles(count * 2, cutoff).await?;

        let mut pairs = Vec::new();
        let mut iter = articles.into_iter();
        while pairs.len() < count {
            let (Some(start), Some(target)) = (iter.next(), iter.next()) else {
                break;
            };
            pairs.push((start, target));
        }

        Ok(pairs)
    }
}
