use url::Url;

use crate::foundation::error::{BotError, BotResult};

/// Medium tag attached to every tracking link.
pub const UTM_MEDIUM: &str = "smm";

const UTM_KEYS: [&str; 3] = ["utm_source", "utm_campaign", "utm_medium"];

/// Attribution tags appended to a tracked URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtmParameters {
    pub source: String,
    pub campaign: String,
    pub medium: &'static str,
}

impl UtmParameters {
    pub fn new(source: impl Into<String>, campaign: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            campaign: campaign.into(),
            medium: UTM_MEDIUM,
        }
    }

    /// Rewrite `base`'s query: earlier UTM tags are replaced, every other pair is kept in order.
    pub fn apply(&self, base: &str) -> BotResult<String> {
        let mut url = Url::parse(base.trim())
            .map_err(|e| BotError::url_build_failed(format!("cannot parse '{base}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(BotError::url_build_failed(format!(
                "'{base}' cannot carry query parameters"
            )));
        }

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !UTM_KEYS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("utm_source", &self.source)
            .append_pair("utm_campaign", &self.campaign)
            .append_pair("utm_medium", self.medium);
        Ok(url.into())
    }
}

/// Build a tracking URL for `base` with the given source and campaign.
pub fn build_utm_url(base: &str, source: &str, campaign: &str) -> BotResult<String> {
    UtmParameters::new(source, campaign).apply(base)
}

/// `true` when `text` starts with a scheme the UTM flow accepts.
pub fn has_supported_scheme(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// Last non-empty path segment of `url`, offered as the default campaign name.
pub fn suggest_campaign(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    parsed
        .path()
        .trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "../../tests/unit/links/utm.rs"]
mod tests;
