use url::Url;

/// Trims a directory field, mapping blank values to `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Lowercased host of a homepage URL without a leading `www.`.
pub fn homepage_domain(homepage: &str) -> Option<String> {
    let parsed = Url::parse(homepage.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}
