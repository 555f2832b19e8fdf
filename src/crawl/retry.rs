// Single-retry fetch wrapper and per-site warning suppression.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use super::fetcher::{FetchedPage, PageFetcher};
use crate::error::FetchError;

/// How many times an identical warning is logged before it is suppressed.
const MAX_SIMILAR_WARNINGS: u32 = 3;

/// Fetch `url`, retrying once after `backoff` when the first failure is
/// transient. Permanent failures return immediately.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &Url,
    backoff: Duration,
) -> Result<FetchedPage, FetchError> {
    match fetcher.fetch(url).await {
        Ok(page) => Ok(page),
        Err(err) if err.is_transient() => {
            debug!(
                url = %url,
                error = %err,
                backoff_ms = backoff.as_millis() as u64,
                "Transient fetch failure, retrying once"
            );
            tokio::time::sleep(backoff).await;
            fetcher.fetch(url).await
        }
        Err(err) => Err(err),
    }
}

/// Logs at most `MAX_SIMILAR_WARNINGS` warnings per key. The key is usually
/// the failure reason, so one broken template linked from every page does
/// not flood the log.
///
/// Owned by a single site's crawl, so nothing is shared between sites.
#[derive(Debug, Default)]
pub struct WarningLimiter {
    counts: HashMap<String, u32>,
}

impl WarningLimiter {
    /// Log `message` unless `key` has already been logged too often.
    /// Returns whether it was emitted.
    pub fn warn(&mut self, key: &str, message: &str) -> bool {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        if *count >= MAX_SIMILAR_WARNINGS {
            return false;
        }
        *count += 1;
        if *count == MAX_SIMILAR_WARNINGS {
            warn!("{message} (suppressing further similar warnings)");
        } else {
            warn!("{message}");
        }
        true
    }
}
