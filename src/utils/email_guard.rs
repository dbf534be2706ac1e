//! Fast email-availability checks for registration.
//!
//! Layering: cuckoo filter for a cheap negative ("definitely unseen"), moka
//! cache for a cheap positive ("seen recently"), database as fallback. The
//! UNIQUE key on users.email remains the final authority either way.

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::{DateTime, Duration, Utc};
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration as StdDuration;

const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// key present => email is TAKEN
static EMAIL_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(StdDuration::from_secs(86400)) // 24h TTL
        .build()
});

#[inline]
fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Record a freshly registered email in both layers
pub async fn note_registered(email: &str) {
    let email = normalize(email);
    EMAIL_FILTER
        .write()
        .expect("email filter poisoned")
        .add(&email);
    EMAIL_CACHE.insert(email, true).await;
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_available(email: &str, pool: &MySqlPool) -> bool {
    let email = normalize(email);

    // filter miss means the email was never seen
    let might_exist = EMAIL_FILTER
        .read()
        .expect("email filter poisoned")
        .contains(&email);
    if !might_exist {
        return true;
    }

    if EMAIL_CACHE.get(&email).await.unwrap_or(false) {
        return false;
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe: treat lookup failure as taken

    !exists
}

/// Streams all registered emails into the filter; emails with a login inside
/// `recent_days` additionally go into the cache. One pass, batched.
pub async fn warmup(pool: &MySqlPool, recent_days: i64, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, Option<DateTime<Utc>>)>(
        "SELECT email, last_login_at FROM users",
    )
    .fetch(pool);

    let recent_cutoff = Utc::now() - Duration::days(recent_days);

    let mut filter_batch = Vec::with_capacity(batch_size);
    let mut cache_batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut recent = 0usize;

    while let Some(row) = stream.next().await {
        let (email, last_login_at) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        let email = normalize(&email);
        total += 1;

        if last_login_at.is_some_and(|t| t >= recent_cutoff) {
            recent += 1;
            cache_batch.push(email.clone());
        }
        filter_batch.push(email);

        if filter_batch.len() == batch_size {
            insert_filter_batch(&filter_batch);
            filter_batch.clear();
        }
        if cache_batch.len() == batch_size {
            insert_cache_batch(&cache_batch).await;
            cache_batch.clear();
        }
    }

    if !filter_batch.is_empty() {
        insert_filter_batch(&filter_batch);
    }
    if !cache_batch.is_empty() {
        insert_cache_batch(&cache_batch).await;
    }

    log::info!(
        "Email guard warmup complete: {} users, {} recent (last {} days)",
        total,
        recent,
        recent_days
    );
    Ok(())
}

fn insert_filter_batch(emails: &[String]) {
    let mut filter = EMAIL_FILTER.write().expect("email filter poisoned");
    for email in emails {
        filter.add(email);
    }
}

async fn insert_cache_batch(emails: &[String]) {
    let futures: Vec<_> = emails
        .iter()
        .map(|e| EMAIL_CACHE.insert(e.clone(), true))
        .collect();

    futures::future::join_all(futures).await;
}
