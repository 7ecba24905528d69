use url::Url;

use super::{clean_text, homepage_domain};
use crate::config::LogoConfig;

const LOGO_DEV_BASE_URL: &str = "https://img.logo.dev";
const PLACEHOLDER_BASE_URL: &str = "https://ui-avatars.com/api/";

// Social and hosting domains would yield the platform's logo, not the station's.
const GENERIC_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "youtube.com",
    "t.co",
    "goo.gl",
    "shoutcast.com",
    "zeno.fm",
];

#[derive(Debug, Clone, Default)]
pub struct LogoResolver {
    logo_dev_token: Option<String>,
}

impl LogoResolver {
    pub fn new(config: &LogoConfig) -> Self {
        Self {
            logo_dev_token: config.logo_dev_token.clone(),
        }
    }

    /// Picks the directory favicon, then a logo.dev image for the homepage
    /// domain, then a generated placeholder keyed by the station name.
    pub fn resolve(&self, favicon: Option<&str>, homepage: Option<&str>, name: &str) -> String {
        clean_text(favicon)
            .or_else(|| homepage.and_then(|homepage| self.from_homepage(homepage)))
            .unwrap_or_else(|| placeholder_logo(name))
    }

    pub fn from_homepage(&self, homepage: &str) -> Option<String> {
        let token = self.logo_dev_token.as_deref()?;
        let domain = homepage_domain(homepage)?;
        if is_generic_domain(&domain) {
            return None;
        }
        let mut url = Url::parse(LOGO_DEV_BASE_URL).ok()?;
        url.set_path(&domain);
        url.query_pairs_mut().append_pair("token", token);
        Some(url.to_string())
    }
}

pub fn placeholder_logo(name: &str) -> String {
    let mut url = match Url::parse(PLACEHOLDER_BASE_URL) {
        Ok(url) => url,
        Err(_) => return PLACEHOLDER_BASE_URL.to_string(),
    };
    url.query_pairs_mut()
        .append_pair("name", name)
        .append_pair("background", "random")
        .append_pair("color", "fff")
        .append_pair("size", "128");
    url.to_string()
}

fn is_generic_domain(domain: &str) -> bool {
    GENERIC_DOMAINS.iter().any(|generic| {
        domain == *generic
            || domain
                .strip_suffix(*generic)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
