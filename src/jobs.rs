use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::json;

use crate::{
    config::{Config, ValidatorConfig},
    logging::logger,
    playlist::{read_playlist, validated_output_path, write_playlist, PlaylistEntry},
    radio_browser::RadioBrowserClient,
    radio_garden::RadioGardenClient,
    stations::{unique_sorted_by_title, LogoResolver, StationRecord},
    stream_validation::{StreamValidator, ValidationSummary},
};

const SUMMARY_RULE: &str = "------------------------------";

pub struct ValidationRun {
    pub output_path: PathBuf,
    pub summary: ValidationSummary,
}

impl ValidationRun {
    pub fn summary_block(&self) -> String {
        [
            SUMMARY_RULE.to_string(),
            format!(
                "Validation Complete in {:.1} seconds.",
                self.summary.elapsed.as_secs_f64()
            ),
            format!("Total Streams: {}", self.summary.total),
            format!("Working Streams: {}", self.summary.valid),
            format!("Dead Streams: {}", self.summary.dead),
            format!("Saved clean playlist to: {}", self.output_path.display()),
            SUMMARY_RULE.to_string(),
        ]
        .join("\n")
    }
}

pub struct ExportResult {
    pub output_path: PathBuf,
    pub total: usize,
}

/// Probes every entry of `input` and writes the playable ones next to it.
///
/// An unreadable or empty playlist is reported and yields `Ok(None)`.
pub async fn run_validation(
    input: &Path,
    config: &ValidatorConfig,
) -> anyhow::Result<Option<ValidationRun>> {
    let validator = StreamValidator::new(config.clone())?;
    let input_display = input.display().to_string();

    logger().info("validation.reading", json!({ "path": input_display }));
    let entries = match read_playlist(input).await {
        Ok(entries) => entries,
        Err(error) => {
            logger().error(
                "playlist.read_failed",
                json!({ "path": input_display, "error": error.to_string() }),
            );
            Vec::new()
        }
    };
    if entries.is_empty() {
        logger().warn(
            "validation.no_entries",
            json!({ "path": input_display, "message": "No entries found or file error." }),
        );
        return Ok(None);
    }

    let estimate = validator.estimated_duration(entries.len());
    logger().info(
        "validation.started",
        json!({
            "streams": entries.len(),
            "workers": config.max_workers,
            "estimatedMinutes": (estimate.as_secs_f64() / 60.0 * 10.0).round() / 10.0,
        }),
    );

    let report = validator.validate(entries).await;
    let output_path = validated_output_path(input);
    write_playlist(&output_path, &report.entries)
        .await
        .context("failed to save validated playlist")?;

    logger().info(
        "validation.completed",
        json!({
            "total": report.summary.total,
            "valid": report.summary.valid,
            "dead": report.summary.dead,
            "elapsedSeconds": report.summary.elapsed.as_secs_f64(),
            "reasons": report.summary.reasons,
            "output": output_path.display().to_string(),
        }),
    );

    Ok(Some(ValidationRun {
        output_path,
        summary: report.summary,
    }))
}

pub async fn run_radio_browser_export(config: &Config) -> anyhow::Result<Option<ExportResult>> {
    let country = config.target_country.as_str();
    let client = RadioBrowserClient::new(&config.radio_browser, LogoResolver::new(&config.logos))?;

    logger().info("radio_browser.fetch", json!({ "country": country }));
    let stations = client
        .fetch_country(country)
        .await
        .with_context(|| format!("failed to fetch Radio Browser stations for {country}"))?;

    let path = config
        .output_dir
        .join(format!("Radio Browser - {country}.m3u"));
    write_export("radio_browser", &path, &stations).await
}

pub async fn run_radio_garden_export(config: &Config) -> anyhow::Result<Option<ExportResult>> {
    let country = config.target_country.as_str();
    let client = RadioGardenClient::new(&config.radio_garden, LogoResolver::new(&config.logos))?;

    logger().info("radio_garden.scan", json!({ "country": country }));
    let stations = client
        .scan_country(country)
        .await
        .with_context(|| format!("failed to scan Radio Garden places for {country}"))?;

    let path = config.output_dir.join(format!("{country}.m3u"));
    write_export("radio_garden", &path, &unique_sorted_by_title(stations)).await
}

async fn write_export(
    source: &str,
    path: &Path,
    stations: &[StationRecord],
) -> anyhow::Result<Option<ExportResult>> {
    if stations.is_empty() {
        logger().warn("export.no_stations", json!({ "source": source }));
        return Ok(None);
    }

    let entries: Vec<PlaylistEntry> = stations.iter().map(StationRecord::to_entry).collect();
    write_playlist(path, &entries)
        .await
        .with_context(|| format!("failed to save {source} playlist"))?;

    logger().info(
        "export.saved",
        json!({
            "source": source,
            "stations": entries.len(),
            "output": path.display().to_string(),
        }),
    );
    Ok(Some(ExportResult {
        output_path: path.to_path_buf(),
        total: entries.len(),
    }))
}
