use reqwest::{Client, Url};
use serde::Deserialize;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    config::RadioBrowserConfig,
    stations::{clean_text, LogoResolver, StationRecord},
};

const RADIO_BROWSER_FALLBACK_HOSTS: &[&str] = &[
    "https://de1.api.radio-browser.info",
    "https://de2.api.radio-browser.info",
    "https://de3.api.radio-browser.info",
    "https://fr1.api.radio-browser.info",
    "https://nl1.api.radio-browser.info",
    "https://ru1.api.radio-browser.info",
];

const BY_COUNTRY_PATH: &str = "json/stations/bycountry";

#[derive(Clone)]
pub struct RadioBrowserClient {
    client: Client,
    logos: LogoResolver,
    host_pool: Vec<String>,
    host_cursor: Arc<AtomicUsize>,
}

impl RadioBrowserClient {
    pub fn new(config: &RadioBrowserConfig, logos: LogoResolver) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let mut host_pool: Vec<String> = Vec::new();
        if !config.default_base_url.trim().is_empty() {
            host_pool.push(config.default_base_url.trim().to_string());
        }
        if config.use_mirrors {
            for candidate in RADIO_BROWSER_FALLBACK_HOSTS {
                let normalized = candidate.trim();
                if !host_pool
                    .iter()
                    .any(|existing| existing.eq_ignore_ascii_case(normalized))
                {
                    host_pool.push(normalized.to_string());
                }
            }
        }
        if host_pool.is_empty() {
            return Err(anyhow::anyhow!(
                "RADIO_BROWSER_BASE_URL must be configured when mirrors are disabled"
            ));
        }
        Ok(Self {
            client,
            logos,
            host_pool,
            host_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn ordered_hosts(&self) -> Vec<String> {
        let len = self.host_pool.len();
        let start = self.host_cursor.fetch_add(1, Ordering::Relaxed) % len;
        let mut ordered = Vec::with_capacity(len);
        for offset in 0..len {
            ordered.push(self.host_pool[(start + offset) % len].clone());
        }
        ordered
    }

    /// Stations of `country`, most clicked first. Each mirror is asked once;
    /// the first successful answer wins.
    pub async fn fetch_country(&self, country: &str) -> anyhow::Result<Vec<StationRecord>> {
        let mut last_error = None;
        for base in self.ordered_hosts() {
            match self.fetch_country_from_host(&base, country).await {
                Ok(stations) => return Ok(stations),
                Err(error) => {
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Radio Browser request failed")))
    }

    async fn fetch_country_from_host(
        &self,
        base_url: &str,
        country: &str,
    ) -> anyhow::Result<Vec<StationRecord>> {
        let mut stations_url = Url::parse(base_url)?;
        stations_url.set_path(&format!(
            "{BY_COUNTRY_PATH}/{}",
            urlencoding::encode(country)
        ));

        let response = self.client.get(stations_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "radio browser returned {}",
                response.status()
            ));
        }

        let mut raw: Vec<RadioBrowserStation> = response.json().await?;
        raw.sort_by(|a, b| {
            b.clickcount
                .unwrap_or_default()
                .cmp(&a.clickcount.unwrap_or_default())
        });

        Ok(raw
            .into_iter()
            .filter_map(|entry| normalize_station(entry, country, &self.logos))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct RadioBrowserStation {
    name: Option<String>,
    url_resolved: Option<String>,
    homepage: Option<String>,
    favicon: Option<String>,
    state: Option<String>,
    clickcount: Option<i64>,
}

fn normalize_station(
    raw: RadioBrowserStation,
    country: &str,
    logos: &LogoResolver,
) -> Option<StationRecord> {
    let stream_url = clean_text(raw.url_resolved.as_deref())?;
    let name = raw.name.as_deref().unwrap_or("Unknown").trim().to_string();
    let logo_url = logos.resolve(raw.favicon.as_deref(), raw.homepage.as_deref(), &name);

    let title = match clean_text(raw.state.as_deref()) {
        Some(state) => format!("{name} - {state}"),
        None => name,
    };

    Some(StationRecord {
        title,
        stream_url,
        logo_url,
        group: country.to_string(),
        radio: true,
    })
}
