//! Template API client with a read-through cache

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::cache::{CacheError, TemplateCache};
use crate::config::{ApiConfig, CacheConfig};
use crate::metrics::{CacheMetrics, FetchMetrics};

use super::types::{Template, TemplateError, TemplateId, TemplateResult};

/// Fetches templates from the template API.
///
/// When caching is enabled, a cached entry under `key_prefix + id` is
/// returned without touching the network, and every successful fetch is
/// written back with the configured TTL. Failed fetches never populate
/// the cache. No retries are attempted; concurrent misses for the same
/// ID each issue their own request.
pub struct TemplateFetcher {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<dyn TemplateCache>,
    cache_config: CacheConfig,
}

impl TemplateFetcher {
    /// Create a fetcher from explicit API and cache settings.
    pub fn new(
        api: &ApiConfig,
        cache_config: &CacheConfig,
        cache: Arc<dyn TemplateCache>,
    ) -> TemplateResult<Self> {
        let mut builder = reqwest::Client::builder();
        // 0 means no timeout
        if api.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(api.timeout_seconds));
        }
        let client = builder.build().map_err(TemplateError::Client)?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api.key.clone().filter(|key| !key.is_empty()),
            cache,
            cache_config: cache_config.clone(),
        })
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_config.enabled
    }

    /// Cache key for a template: configured prefix + stringified ID
    pub fn cache_key(&self, template_id: &TemplateId) -> String {
        format!("{}{}", self.cache_config.key_prefix, template_id)
    }

    pub fn template_url(&self, template_id: &TemplateId) -> String {
        format!("{}/templates/{}", self.base_url, template_id)
    }

    /// Fetch a template, going through the cache when enabled.
    ///
    /// # Errors
    ///
    /// - `TemplateError::NotFound` when the API answers 404
    /// - `TemplateError::ApiFailure` for any other non-success status, a
    ///   transport fault (including timeouts) or a body that is not a JSON
    ///   object
    #[tracing::instrument(name = "template.fetch", skip_all, fields(template_id = %template_id))]
    pub async fn fetch_template(&self, template_id: &TemplateId) -> TemplateResult<Template> {
        let cache_key = self.cache_key(template_id);

        if self.cache_config.enabled {
            match self.cache.get(&cache_key).await {
                Ok(Some(template)) => {
                    FetchMetrics::record_cache_hit();
                    tracing::debug!(cache_key = %cache_key, "Template served from cache");
                    return Ok(template);
                }
                Ok(None) => {}
                Err(e) => {
                    // Cache faults degrade to a miss
                    CacheMetrics::record_error("get");
                    tracing::warn!(
                        cache_key = %cache_key,
                        error = %e,
                        "Template cache read failed, fetching from API"
                    );
                }
            }
        }

        let started = Instant::now();
        let result = self.request_template(template_id).await;
        let elapsed = started.elapsed().as_secs_f64();

        let template = match result {
            Ok(template) => {
                FetchMetrics::record_fetched(elapsed);
                template
            }
            Err(e) => {
                if e.is_not_found() {
                    FetchMetrics::record_not_found(elapsed);
                    tracing::info!("Template not found");
                } else {
                    FetchMetrics::record_api_error(elapsed);
                    tracing::warn!(status = ?e.status(), error = %e, "Template fetch failed");
                }
                return Err(e);
            }
        };

        if self.cache_config.enabled {
            let ttl = self.cache_config.ttl_seconds;
            if let Err(e) = self.cache.put(&cache_key, &template, ttl).await {
                CacheMetrics::record_error("put");
                tracing::warn!(
                    cache_key = %cache_key,
                    error = %e,
                    "Failed to cache fetched template"
                );
            }
        }

        tracing::debug!(elapsed_secs = elapsed, "Template fetched from API");

        Ok(template)
    }

    async fn request_template(&self, template_id: &TemplateId) -> TemplateResult<Template> {
        let url = self.template_url(template_id);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(TemplateError::api_transport)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TemplateError::NotFound(template_id.clone()));
        }

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("failed to read response body: {}", e),
            };
            return Err(TemplateError::api_status(status.as_u16(), body));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(TemplateError::api_transport)?;

        Template::from_value(value).ok_or_else(|| TemplateError::ApiFailure {
            status: None,
            message: "response body is not a JSON object".to_string(),
            source: None,
        })
    }

    /// Remove the cached entry for one template. Missing entries are fine.
    pub async fn clear_cache(&self, template_id: &TemplateId) -> Result<(), CacheError> {
        let cache_key = self.cache_key(template_id);

        self.cache.forget(&cache_key).await.inspect_err(|_| {
            CacheMetrics::record_error("forget");
        })?;

        tracing::debug!(cache_key = %cache_key, "Template cache entry cleared");
        Ok(())
    }

    /// Remove every cached template under this fetcher's key prefix.
    ///
    /// Entries outside the prefix are left alone.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub async fn clear_all_cache(&self) -> Result<usize, CacheError> {
        let prefix = &self.cache_config.key_prefix;

        let removed = self.cache.clear_prefix(prefix).await.inspect_err(|_| {
            CacheMetrics::record_error("clear");
        })?;

        CacheMetrics::record_cleared(removed);
        tracing::info!(prefix = %prefix, removed = removed, "Template cache cleared");

        Ok(removed)
    }
}
