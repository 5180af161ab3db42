//! Startup connectivity: open the PostgreSQL connection under an exponential
//! backoff policy with a bounded total elapsed time.

use rand::Rng;
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff with randomization and a total time budget.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub initial_interval: Duration,
    pub multiplier: f64,
    /// Each wait is drawn from `interval * [1 - factor, 1 + factor]`.
    pub randomization_factor: f64,
    pub max_interval: Duration,
    /// Retrying stops once the elapsed time plus the next wait would exceed this.
    pub max_elapsed_time: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(5 * 60),
        }
    }
}

impl BackoffPolicy {
    pub fn with_max_elapsed_time(self, max_elapsed_time: Duration) -> Self {
        Self {
            max_elapsed_time,
            ..self
        }
    }

    fn randomize(&self, interval: Duration) -> Duration {
        if self.randomization_factor <= 0.0 {
            return interval;
        }
        let secs = interval.as_secs_f64();
        let delta = self.randomization_factor * secs;
        let low = (secs - delta).max(0.0);
        let high = secs + delta;
        Duration::from_secs_f64(rand::thread_rng().gen_range(low..=high))
    }

    fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_interval)
    }
}

/// Runs `op` until it succeeds or the policy's elapsed budget is spent.
///
/// `notify` is called with the error and the upcoming wait before every retry.
/// When giving up, the error of the last attempt is returned.
pub async fn retry_with_backoff<T, E, F, Fut, N>(
    policy: &BackoffPolicy,
    mut op: F,
    mut notify: N,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(&E, Duration),
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let wait = policy.randomize(interval);
                interval = policy.next_interval(interval);
                if started.elapsed() + wait > policy.max_elapsed_time {
                    return Err(err);
                }
                notify(&err, wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Opens the database and verifies it with a ping, retrying under `policy`.
#[tracing::instrument(skip(url))]
pub async fn connect_with_retry(
    url: &str,
    policy: &BackoffPolicy,
) -> Result<DatabaseConnection, DbErr> {
    let db = retry_with_backoff(
        policy,
        || connect_and_ping(url),
        |err, wait| {
            tracing::warn!(
                "Error connecting to database: {}. Retrying in {:?}",
                err,
                wait
            )
        },
    )
    .await?;
    tracing::info!("Successfully connected to the database");
    Ok(db)
}

async fn connect_and_ping(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(url).await?;
    if let Err(err) = db.ping().await {
        if let Err(close_err) = db.close().await {
            tracing::debug!("Failed to close unverified connection: {}", close_err);
        }
        return Err(err);
    }
    Ok(db)
}
