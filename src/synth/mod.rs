//! Commit message synthesis: cache, fallback chain, repair and the
//! rule-based last resort.

pub mod backend;
pub mod cache;
pub mod prompt;
pub mod repair;

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analysis::Classification;
use crate::metrics::{GenerationMetric, MetricsSink};

pub use backend::{
    BackendChain, GenerationBackend, OpenRouterClient, FALLBACK_MODELS,
    GENERATION_TIMEOUT_SECS,
};
pub use cache::{CacheStats, ResponseCache, DEFAULT_TTL};
pub use prompt::{build_request, GenerationRequest};
pub use repair::{
    repair_message, rule_based_message, validate_message, MAX_MESSAGE_CHARS,
    MIN_MESSAGE_CHARS,
};

/// Turns a [`Classification`] into a committed-quality message.
///
/// Walks the backend chain until one attempt survives repair and
/// validation; falls back to the rule-based generator when the chain is
/// exhausted. Every outcome except a cache hit records a metric.
pub struct Synthesizer {
    backend: Box<dyn GenerationBackend>,
    chain: BackendChain,
    cache: ResponseCache,
    metrics: Box<dyn MetricsSink>,
    language: String,
}

impl Synthesizer {
    pub fn new(
        backend: Box<dyn GenerationBackend>,
        chain: BackendChain,
        metrics: Box<dyn MetricsSink>,
        language: String,
    ) -> Self {
        Synthesizer {
            backend,
            chain,
            cache: ResponseCache::default(),
            metrics,
            language,
        }
    }

    /// Synthesize a message. Infallible: the rule-based generator backs
    /// every failure mode.
    pub async fn synthesize(&mut self, classification: &Classification) -> String {
        let started = Instant::now();
        let key = ResponseCache::key(classification.category, &classification.diff_text);

        if let Some(hit) = self.cache.get(key) {
            debug!("cache hit, reusing previous message");
            return hit;
        }

        let request = prompt::build_request(classification, &self.language);
        let models: Vec<String> = self.chain.models().to_vec();

        for model in &models {
            match self.backend.generate(model, &request).await {
                Ok(raw) => {
                    let repaired = repair::repair_message(
                        &raw,
                        classification.category,
                        &classification.scope,
                    );
                    if repair::validate_message(&repaired, classification.category) {
                        info!(model = %model, "generated commit message");
                        self.cache.put(key, repaired.clone());
                        self.record(classification, &repaired, true, model, started);
                        return repaired;
                    }
                    warn!(model = %model, "unrepairable backend output, trying next backend");
                }
                Err(err) => {
                    warn!(model = err.model(), "backend attempt failed: {err}");
                }
            }
        }

        let fallback = repair::rule_based_message(classification);
        info!("all backends exhausted, using rule-based message");
        self.record(classification, &fallback, false, "rule-based", started);
        fallback
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Metric recording never fails synthesis.
    fn record(
        &self,
        classification: &Classification,
        message: &str,
        success: bool,
        backend_used: &str,
        started: Instant,
    ) {
        let metric = GenerationMetric {
            timestamp: Utc::now(),
            category: classification.category.id().to_string(),
            confidence: classification.confidence,
            message_length: message.chars().count(),
            file_count: classification.file_count(),
            success,
            backend_used: backend_used.to_string(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };
        if let Err(err) = self.metrics.append(&metric) {
            warn!("failed to record generation metric: {err}");
        }
    }
}
