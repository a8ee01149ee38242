use crate::error::AnalysisError;
use crate::models::SequenceWindow;
use crate::services::{CacheKey, SequenceSource, WindowCache};

/// Default number of context bases around a variant
pub const DEFAULT_WINDOW_SIZE: u64 = 8192;

/// 0-based half-open interval to request from the sequence service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: u64,
    pub end: u64,
}

impl WindowBounds {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Centre a window on a 1-based position
///
/// `start` is clamped at 0 near the 5' end of a chromosome. `end` is not
/// clamped; the sequence service truncates at the chromosome length. Both
/// saturate at `u64::MAX`, so `start < end` holds for every position.
#[inline]
pub fn window_bounds(position: u64, window_size: u64) -> WindowBounds {
    let half_window = window_size / 2;
    let zero_based = position.saturating_sub(1);

    WindowBounds {
        start: zero_based.saturating_sub(half_window),
        end: zero_based.saturating_add(half_window).saturating_add(1),
    }
}

/// Retrieves reference windows from a sequence source
pub struct WindowFetcher<S> {
    source: S,
    window_size: u64,
    strict_length: bool,
    cache: Option<WindowCache>,
}

impl<S: SequenceSource> WindowFetcher<S> {
    pub fn new(source: S, window_size: u64) -> Self {
        Self {
            source,
            window_size,
            strict_length: false,
            cache: None,
        }
    }

    /// Fail instead of warning when upstream returns a short sequence
    pub fn with_strict_length(mut self, strict: bool) -> Self {
        self.strict_length = strict;
        self
    }

    pub fn with_cache(mut self, cache: WindowCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the window centred on `position` (1-based)
    pub async fn fetch(
        &self,
        position: u64,
        genome_build: &str,
        chromosome: &str,
    ) -> Result<SequenceWindow, AnalysisError> {
        let bounds = window_bounds(position, self.window_size);
        let key = CacheKey::window(genome_build, chromosome, bounds.start, bounds.end);

        if let Some(cache) = &self.cache {
            if let Some(window) = cache.get(&key).await {
                return Ok(window);
            }
        }

        let response = self
            .source
            .fetch_sequence(genome_build, chromosome, bounds.start, bounds.end)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Sequence fetch failed for {}:{}-{} ({}): {}",
                    chromosome, bounds.start, bounds.end, genome_build, e
                );
                AnalysisError::from(e)
            })?;

        let dna = match response.dna {
            Some(dna) => dna,
            None => {
                let upstream = response.error.unwrap_or_else(|| "Unknown error".to_string());
                return Err(AnalysisError::UpstreamDataError(upstream));
            }
        };

        let window = SequenceWindow::new(&dna, bounds.start, bounds.end)?;

        if window.is_truncated() {
            if self.strict_length {
                return Err(AnalysisError::UpstreamDataError(format!(
                    "received sequence length ({}) differs from expected ({})",
                    window.len(),
                    bounds.len()
                )));
            }
            tracing::warn!(
                "Received sequence length ({}) differs from expected ({}) for {}:{}-{}",
                window.len(),
                bounds.len(),
                chromosome,
                bounds.start,
                bounds.end
            );
        }

        if let Some(cache) = &self.cache {
            cache.insert(key, window.clone()).await;
        }

        Ok(window)
    }
}
