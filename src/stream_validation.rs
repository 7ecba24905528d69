use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use futures_util::{stream, StreamExt};
use serde_json::json;

use crate::{
    config::ValidatorConfig,
    logging::logger,
    playlist::PlaylistEntry,
    stream_probe::{ProbeFailure, ProbeOutcome, StreamProber},
};

#[derive(Debug, Clone)]
pub struct StreamValidator {
    config: ValidatorConfig,
    prober: StreamProber,
}

/// Outcome of probing one entry; `index` is the entry's position in the input.
#[derive(Debug)]
pub struct ProbeResult<'a> {
    pub index: usize,
    pub entry: &'a PlaylistEntry,
    pub outcome: ProbeOutcome,
}

impl ProbeResult<'_> {
    pub fn playable(&self) -> bool {
        self.outcome.is_playable()
    }

    pub fn reason(&self) -> String {
        self.outcome.reason()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub dead: usize,
    pub elapsed: Duration,
    pub reasons: BTreeMap<String, usize>,
}

#[derive(Debug)]
pub struct ValidationReport {
    /// Playable entries, in input order.
    pub entries: Vec<PlaylistEntry>,
    pub summary: ValidationSummary,
}

impl StreamValidator {
    pub fn new(config: ValidatorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let prober = StreamProber::new(&config)?;
        Ok(Self { config, prober })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Rough upper bound on the run time: every worker slot hitting the
    /// timeout, one full batch after another.
    pub fn estimated_duration(&self, entry_count: usize) -> Duration {
        let batches = (entry_count / self.config.max_workers.max(1)) as u32;
        self.config.timeout() * batches
    }

    pub async fn validate(&self, entries: Vec<PlaylistEntry>) -> ValidationReport {
        let started = Instant::now();
        let total = entries.len();
        let mut playable = vec![false; total];
        let mut reasons: BTreeMap<String, usize> = BTreeMap::new();
        let mut completed = 0usize;
        let mut valid = 0usize;
        let mut dead = 0usize;

        let mut results = stream::iter(entries.iter().enumerate())
            .map(move |(index, entry)| self.probe_entry(index, entry))
            .buffer_unordered(self.config.max_workers.max(1));

        while let Some(result) = results.next().await {
            completed += 1;
            if result.playable() {
                playable[result.index] = true;
                valid += 1;
            } else {
                let reason = result.reason();
                logger().debug(
                    "validation.dead_stream",
                    json!({
                        "title": result.entry.title(),
                        "url": result.entry.url,
                        "reason": reason,
                    }),
                );
                *reasons.entry(reason).or_default() += 1;
                dead += 1;
            }

            if completed % self.config.progress_interval.max(1) == 0 {
                logger().info(
                    "validation.progress",
                    json!({
                        "completed": completed,
                        "total": total,
                        "progress": format!("{completed}/{total}"),
                        "percent": percent(completed, total),
                    }),
                );
            }
        }
        drop(results);

        let entries = entries
            .into_iter()
            .zip(playable)
            .filter_map(|(entry, ok)| ok.then_some(entry))
            .collect();

        ValidationReport {
            entries,
            summary: ValidationSummary {
                total,
                valid,
                dead,
                elapsed: started.elapsed(),
                reasons,
            },
        }
    }

    // The probe runs as its own task so a panic inside it is contained to
    // this entry and counted as dead.
    async fn probe_entry<'a>(&self, index: usize, entry: &'a PlaylistEntry) -> ProbeResult<'a> {
        let prober = self.prober.clone();
        let url = entry.url.clone();
        let outcome = match tokio::spawn(async move { prober.probe(&url).await }).await {
            Ok(outcome) => outcome,
            Err(error) => ProbeOutcome::Dead(ProbeFailure::Aborted(error.to_string())),
        };
        ProbeResult {
            index,
            entry,
            outcome,
        }
    }
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let raw = completed as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn validator(max_workers: usize, timeout_ms: u64) -> StreamValidator {
        StreamValidator::new(ValidatorConfig {
            max_workers,
            timeout_ms,
            ..ValidatorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn estimate_uses_whole_batches() {
        let validator = validator(50, 3000);
        assert_eq!(validator.estimated_duration(49), Duration::ZERO);
        assert_eq!(validator.estimated_duration(120), Duration::from_secs(6));
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(50, 150), 33.3);
        assert_eq!(percent(0, 0), 100.0);
    }

    #[test]
    fn rejects_zero_worker_budget() {
        let result = StreamValidator::new(ValidatorConfig {
            max_workers: 0,
            ..ValidatorConfig::default()
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_input_produces_empty_report() {
        let report = validator(4, 100).validate(Vec::new()).await;
        assert!(report.entries.is_empty());
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.valid + report.summary.dead, 0);
    }

    #[tokio::test]
    async fn malformed_urls_are_counted_dead() {
        let entries = vec![
            PlaylistEntry::new("#EXTINF:-1,Broken", "not a url"),
            PlaylistEntry::new("#EXTINF:-1,Also broken", "ftp//missing-colon"),
        ];
        let report = validator(2, 500).validate(entries).await;
        assert!(report.entries.is_empty());
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.dead, 2);
        assert_eq!(report.summary.reasons.values().sum::<usize>(), 2);
    }
}
