//! Search runner
//!
//! Walks the candidate space, running the scenario for every candidate and
//! stopping at the first whose turn order matches the target.
//!
//! # Determinism
//!
//! The first match in enumeration order is reported whether the search
//! runs on one thread or many. In parallel mode each value of the outer
//! dimension is one work item and `find_map_first` keeps the earliest
//! item's match. Only cancellation can make the reported match differ
//! from the sequential one.
//!
//! # Example
//!
//! ```rust
//! use speed_tune_core_rs::search::{
//!     Dimension, LowerBound, SearchConfig, SearchOptions, SearchOutcome, SearchSpace,
//!     SpeedTuneSearch,
//! };
//!
//! let mut config = SearchConfig::spider_den();
//! config.space = SearchSpace::new(vec![
//!     Dimension::new("Renegade", LowerBound::Fixed(150), 150),
//!     Dimension::new("Crypt King", LowerBound::Fixed(255), 255),
//!     Dimension::new("Ignatius", LowerBound::Fixed(255), 255),
//!     Dimension::new("CH2", LowerBound::Fixed(300), 300),
//!     Dimension::new("CH1", LowerBound::Fixed(300), 300),
//! ]);
//!
//! let report = SpeedTuneSearch::new(config).unwrap().run(&SearchOptions::default()).unwrap();
//! assert!(matches!(report.outcome, SearchOutcome::Found(_)));
//! assert_eq!(report.candidates_checked, 1);
//! ```

use super::config::SearchConfig;
use super::SearchError;
use crate::core::meter::Speed;
use crate::orchestrator::compute_config_hash;
use crate::scenario::ScenarioResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared flag that stops a running search
///
/// Clones share the flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How to run a search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Worker threads; 1 runs on the calling thread
    pub threads: usize,

    pub cancel: CancelToken,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            cancel: CancelToken::new(),
        }
    }
}

/// Speed chosen for one tuned actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunedSpeed {
    pub name: String,
    pub speed: Speed,
}

/// A satisfying assignment and the turn order it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedTuneMatch {
    /// Tuned speeds in dimension order
    pub speeds: Vec<TunedSpeed>,

    pub result: ScenarioResult,
}

impl SpeedTuneMatch {
    /// Speed chosen for a tuned actor
    pub fn speed_of(&self, name: &str) -> Option<Speed> {
        self.speeds.iter().find(|s| s.name == name).map(|s| s.speed)
    }
}

/// How a search ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// First satisfying candidate in enumeration order
    Found(Box<SpeedTuneMatch>),

    /// Every candidate was tried, none matched
    Exhausted,

    /// Stopped by the cancel token before a match was found
    Cancelled,
}

/// Outcome plus bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// SHA-256 of the canonical search config
    pub config_hash: String,

    /// Total candidates in the space
    pub space_size: u64,

    /// Candidates evaluated (in parallel mode, includes work done by other
    /// workers before they noticed the search was over)
    pub candidates_checked: u64,

    pub outcome: SearchOutcome,
}

/// Validated search ready to run
#[derive(Debug, Clone)]
pub struct SpeedTuneSearch {
    config: SearchConfig,

    /// Dimension index feeding each roster slot
    slot_dims: Vec<Option<usize>>,
}

impl SpeedTuneSearch {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let slot_dims = config.slot_dimensions();
        Ok(Self { config, slot_dims })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the scenario for one candidate; `Some` if it hits the target
    ///
    /// Truncated scenario runs never match. `values` must hold one speed per
    /// dimension, otherwise `SearchError::InvalidConfig` is returned.
    pub fn evaluate(&self, values: &[u32]) -> Result<Option<SpeedTuneMatch>, SearchError> {
        let roster = self.config.roster_with(&self.slot_dims, values)?;
        let result = self.config.scenario.run(&roster)?;

        if !result.is_complete() || !self.config.target.matches(&result.turns) {
            return Ok(None);
        }

        let speeds = self
            .config
            .space
            .names()
            .zip(values)
            .map(|(name, &value)| TunedSpeed {
                name: name.to_string(),
                speed: Speed::from_whole(value),
            })
            .collect();

        Ok(Some(SpeedTuneMatch { speeds, result }))
    }

    /// Search until the first match, exhaustion or cancellation
    pub fn run(&self, options: &SearchOptions) -> Result<SearchReport, SearchError> {
        let config_hash = compute_config_hash(&self.config)?;
        let space_size = self.config.space.size()?;
        let outer: Vec<u32> = self.config.space.outer_values()?.collect();
        let checked = AtomicU64::new(0);
        // Lowest outer value known to hold a match; later values can stop early
        let best_outer = AtomicU32::new(u32::MAX);

        info!(
            config_hash = %config_hash,
            space_size,
            threads = options.threads,
            "starting speed-tune search"
        );

        let scan = |outer_value: u32| -> Option<Result<SpeedTuneMatch, SearchError>> {
            let candidates = match self.config.space.candidates_with_outer(outer_value) {
                Ok(candidates) => candidates,
                Err(e) => return Some(Err(e)),
            };
            for values in candidates {
                if options.cancel.is_cancelled() || outer_value > best_outer.load(Ordering::Relaxed) {
                    return None;
                }
                checked.fetch_add(1, Ordering::Relaxed);
                match self.evaluate(&values) {
                    Ok(Some(found)) => {
                        best_outer.fetch_min(outer_value, Ordering::Relaxed);
                        return Some(Ok(found));
                    }
                    Ok(None) => {}
                    Err(e) => return Some(Err(e)),
                }
            }
            debug!(outer_value, "outer value exhausted");
            None
        };

        let found = if options.threads <= 1 || outer.len() <= 1 {
            outer.iter().copied().find_map(scan)
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .build()
                .map_err(|e| SearchError::ThreadPool(e.to_string()))?;
            pool.install(|| outer.par_iter().copied().find_map_first(scan))
        };

        let outcome = match found.transpose()? {
            Some(tune) => {
                info!(speeds = ?tune.speeds, "speed tune found");
                SearchOutcome::Found(Box::new(tune))
            }
            None if options.cancel.is_cancelled() => {
                info!("speed-tune search cancelled");
                SearchOutcome::Cancelled
            }
            None => {
                info!("speed-tune search exhausted without a match");
                SearchOutcome::Exhausted
            }
        };

        Ok(SearchReport {
            config_hash,
            space_size,
            candidates_checked: checked.load(Ordering::Relaxed),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_pre_cancelled_search_checks_nothing() {
        let search = SpeedTuneSearch::new(SearchConfig::spider_den()).unwrap();
        let options = SearchOptions::default();
        options.cancel.cancel();

        let report = search.run(&options).unwrap();
        assert_eq!(report.outcome, SearchOutcome::Cancelled);
        assert_eq!(report.candidates_checked, 0);
        assert!(report.space_size > 0);
    }
}
