use pinmap_shared::feed::{FeedLoader, FeedPlan, FeedSource, with_cache_buster};
use pinmap_shared::{FeedError, Pin};

/// Fetch a feed body as text. Non-2xx responses are errors.
pub async fn fetch_text(url: &str) -> Result<String, FeedError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FeedError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.ok() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }

    resp.text().await.map_err(|e| FeedError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

async fn load_source(
    source: &FeedSource,
    loader: &FeedLoader,
    stamp: u64,
) -> Result<Vec<Pin>, FeedError> {
    let text = fetch_text(&with_cache_buster(&source.url, stamp)).await?;
    loader.load(source.format, &text)
}

/// Load the primary feed, falling back once to the secondary source.
pub async fn load_pins(
    plan: &FeedPlan,
    loader: &FeedLoader,
    stamp: u64,
) -> Result<Vec<Pin>, FeedError> {
    match load_source(&plan.primary, loader, stamp).await {
        Ok(pins) => Ok(pins),
        Err(e) => {
            let Some(fallback) = &plan.fallback else {
                return Err(e);
            };
            web_sys::console::warn_1(
                &format!("pin feed {} failed, falling back to {}: {e}", plan.primary.url, fallback.url)
                    .into(),
            );
            load_source(fallback, loader, stamp).await
        }
    }
}
