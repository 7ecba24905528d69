use std::time::Duration;

use futures_util::{stream, StreamExt};
use reqwest::{header, redirect, Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tokio::time::timeout;

use crate::{
    config::RadioGardenConfig,
    logging::logger,
    stations::{clean_text, LogoResolver, StationRecord},
};

// The listen endpoint only redirects browser-looking clients to the origin stream.
const RESOLVE_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36",
    ),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub id: Option<String>,
    pub title: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    data: PlacesData,
}

#[derive(Debug, Default, Deserialize)]
struct PlacesData {
    #[serde(default)]
    list: Vec<Place>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    data: ChannelsData,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelsData {
    #[serde(default)]
    content: Vec<ContentSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentSection {
    #[serde(default)]
    items: Vec<ContentItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentItem {
    page: Option<ChannelPage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelPage {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    website: Option<String>,
    country: Option<Titled>,
}

#[derive(Debug, Default, Deserialize)]
struct Titled {
    title: Option<String>,
}

#[derive(Clone)]
pub struct RadioGardenClient {
    client: Client,
    resolver: Client,
    base_url: Url,
    config: RadioGardenConfig,
    logos: LogoResolver,
}

impl RadioGardenClient {
    pub fn new(config: &RadioGardenConfig, logos: LogoResolver) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        let resolver = Client::builder()
            .redirect(redirect::Policy::none())
            .default_headers(build_resolve_headers())
            .build()?;
        Ok(Self {
            client,
            resolver,
            base_url: Url::parse(&config.base_url)?,
            config: config.clone(),
            logos,
        })
    }

    /// Every station of every place in `country`, in place order.
    pub async fn scan_country(&self, country: &str) -> anyhow::Result<Vec<StationRecord>> {
        let places = self.fetch_places(country).await?;
        let total = places.len();
        if total == 0 {
            logger().warn("radio_garden.no_places", json!({ "country": country }));
            return Ok(Vec::new());
        }

        let per_place = stream::iter(places.into_iter().enumerate())
            .map(move |(idx, place)| async move {
                let name = place.title.clone().unwrap_or_default();
                logger().info(
                    "radio_garden.place_scan",
                    json!({
                        "index": idx + 1,
                        "total": total,
                        "place": name,
                    }),
                );
                match self.fetch_place_stations(&place, country).await {
                    Ok(stations) => stations,
                    Err(error) => {
                        logger().warn(
                            "radio_garden.place_failed",
                            json!({
                                "place": name,
                                "error": error.to_string(),
                            }),
                        );
                        Vec::new()
                    }
                }
            })
            .buffered(self.config.place_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        Ok(per_place.into_iter().flatten().collect())
    }

    pub async fn fetch_places(&self, country: &str) -> anyhow::Result<Vec<Place>> {
        let url = self.base_url.join("api/ara/content/places")?;
        let response = timeout(
            Duration::from_millis(self.config.places_timeout_ms),
            self.client.get(url).send(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("radio garden places request timed out"))??;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "radio garden places returned {}",
                response.status()
            ));
        }

        let payload: PlacesResponse = response.json().await?;
        let places: Vec<Place> = payload
            .data
            .list
            .into_iter()
            .filter(|place| place.country.as_deref() == Some(country) && place.id.is_some())
            .collect();
        logger().info(
            "radio_garden.places_found",
            json!({ "country": country, "places": places.len() }),
        );
        Ok(places)
    }

    async fn fetch_place_stations(
        &self,
        place: &Place,
        country: &str,
    ) -> anyhow::Result<Vec<StationRecord>> {
        let Some(place_id) = place.id.as_deref() else {
            return Ok(Vec::new());
        };
        let url = self
            .base_url
            .join(&format!("api/ara/content/page/{place_id}/channels"))?;
        let response = timeout(
            Duration::from_millis(self.config.page_timeout_ms),
            self.client.get(url).send(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("radio garden channels request timed out"))??;
        if response.status() != StatusCode::OK {
            return Ok(Vec::new());
        }

        let payload: ChannelsResponse = response.json().await?;
        let mut stations = Vec::new();
        for page in payload
            .data
            .content
            .into_iter()
            .flat_map(|section| section.items)
            .filter_map(|item| item.page)
            .filter(|page| page.kind.as_deref() == Some("channel"))
        {
            let Some(channel_id) = page.url.as_deref().and_then(extract_channel_id) else {
                continue;
            };
            stations.push(self.build_station(page, &channel_id, country).await?);
        }
        Ok(stations)
    }

    async fn build_station(
        &self,
        page: ChannelPage,
        channel_id: &str,
        country: &str,
    ) -> anyhow::Result<StationRecord> {
        let title = page
            .title
            .unwrap_or_else(|| "Unknown Station".to_string());
        let group = page
            .country
            .and_then(|titled| titled.title)
            .unwrap_or_else(|| country.to_string());

        let initial = self.listen_url(channel_id)?;
        let stream_url = self.resolve_stream_url(&initial, channel_id).await;
        let logo_url = self.logos.resolve(None, page.website.as_deref(), &title);

        Ok(StationRecord {
            title,
            stream_url,
            logo_url,
            group,
            radio: false,
        })
    }

    fn listen_url(&self, channel_id: &str) -> anyhow::Result<String> {
        Ok(self
            .base_url
            .join(&format!("api/ara/content/listen/{channel_id}/channel.mp3"))?
            .to_string())
    }

    /// Follows a single 302 from the listen endpoint to the station's own
    /// stream. Any other answer keeps the listen URL.
    pub async fn resolve_stream_url(&self, initial_url: &str, channel_id: &str) -> String {
        let request = self.resolver.head(initial_url).send();
        match timeout(
            Duration::from_millis(self.config.resolve_timeout_ms),
            request,
        )
        .await
        {
            Ok(Ok(response)) if response.status() == StatusCode::FOUND => {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| clean_text(Some(value)));
                match location {
                    Some(final_url) => {
                        logger().debug(
                            "radio_garden.stream_resolved",
                            json!({ "channel": channel_id, "url": final_url }),
                        );
                        return final_url;
                    }
                    None => logger().warn(
                        "radio_garden.missing_location",
                        json!({ "channel": channel_id }),
                    ),
                }
            }
            Ok(Ok(response)) => logger().warn(
                "radio_garden.unexpected_status",
                json!({
                    "channel": channel_id,
                    "status": response.status().as_u16(),
                }),
            ),
            Ok(Err(error)) => logger().error(
                "radio_garden.resolve_failed",
                json!({
                    "channel": channel_id,
                    "error": error.to_string(),
                }),
            ),
            Err(_) => logger().error(
                "radio_garden.resolve_timeout",
                json!({ "channel": channel_id }),
            ),
        }
        initial_url.to_string()
    }
}

/// Last non-empty path segment, e.g. `/listen/radio-zu/AbC123` gives `AbC123`.
pub fn extract_channel_id(url_path: &str) -> Option<String> {
    url_path
        .trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn build_resolve_headers() -> header::HeaderMap {
    let mut map = header::HeaderMap::new();
    for (key, value) in RESOLVE_HEADERS {
        if let (Ok(name), Ok(val)) = (
            header::HeaderName::from_lowercase(key.as_bytes()),
            header::HeaderValue::from_str(value),
        ) {
            map.insert(name, val);
        }
    }
    map
}
