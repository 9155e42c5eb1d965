//! Mutation iterator: ID-space probing and gap-tolerant walking.
//!
//! The source offers no enumerate-all operation and its ID space is
//! sparse. The iterator first estimates the populated range by probing
//! a fixed ladder of IDs, then walks the range sequentially, treating
//! gaps as ordinary data and stopping after a configurable run of
//! consecutive misses.

use ebmig_core::mutation::Mutation;
use ebmig_shared::{MigrateResult, ProgressBus, ProgressEvent};
use tracing::{debug, info, warn};

use crate::source::MutationSource;

/// Probe ladder: powers of ten plus a few interior points.
const PROBE_LADDER: &[i64] = &[
    1, 10, 100, 1_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000, 1_000_000, 2_500_000,
    5_000_000, 10_000_000,
];

/// Iterator tuning knobs.
#[derive(Debug, Clone)]
pub struct IteratorConfig {
    /// Stop after this many consecutive missing IDs.
    pub max_consecutive_miss: u32,
    /// Give up a boundary walk after this run of misses.
    pub walk_miss_run: u32,
    /// Hard cap on boundary-walk steps from one anchor.
    pub walk_step_cap: u32,
    /// Emit a progress event every this many checked IDs.
    pub progress_interval: u64,
    /// Range assumed when no probe hits anything.
    pub default_range: (i64, i64),
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self {
            max_consecutive_miss: 100,
            walk_miss_run: 25,
            walk_step_cap: 500,
            progress_interval: 50,
            default_range: (1, 1_000_000),
        }
    }
}

/// Counters for one iteration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationStats {
    /// IDs checked.
    pub checked: u64,
    /// Mutations found.
    pub found: u64,
    /// Gaps encountered.
    pub missed: u64,
    /// True when the consecutive-miss cap ended the pass early.
    pub stopped_early: bool,
}

/// Gap-tolerant walker over the source mutation ID space.
pub struct MutationIterator<'a, S: MutationSource + ?Sized> {
    source: &'a S,
    config: IteratorConfig,
}

impl<'a, S: MutationSource + ?Sized> MutationIterator<'a, S> {
    /// Creates an iterator with default tuning.
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, IteratorConfig::default())
    }

    /// Creates an iterator with custom tuning.
    pub fn with_config(source: &'a S, config: IteratorConfig) -> Self {
        Self { source, config }
    }

    /// Estimates the populated `(low, high)` ID range.
    ///
    /// Both bounds are IDs known to exist. Falls back to a wide default
    /// when no ladder probe hits.
    pub async fn estimate_id_range(&self) -> MigrateResult<(i64, i64)> {
        let mut lowest_hit = None;
        let mut highest_hit = None;

        for &id in PROBE_LADDER {
            if self.exists(id).await? {
                lowest_hit.get_or_insert(id);
                highest_hit = Some(id);
            }
        }

        let (Some(low_anchor), Some(high_anchor)) = (lowest_hit, highest_hit) else {
            info!(
                low = self.config.default_range.0,
                high = self.config.default_range.1,
                "no probe hit, assuming default range"
            );
            return Ok(self.config.default_range);
        };

        let low = self.walk_boundary(low_anchor, -1).await?;
        let high = self.walk_boundary(high_anchor, 1).await?;
        info!(low, high, "estimated mutation ID range");
        Ok((low, high))
    }

    /// Walks from an anchor in `direction` (-1 or 1) until the boundary
    /// is found or a step cap is hit. Returns the outermost existing ID.
    async fn walk_boundary(&self, anchor: i64, direction: i64) -> MigrateResult<i64> {
        let mut outermost = anchor;
        let mut miss_run = 0u32;
        let mut id = anchor + direction;

        for _ in 0..self.config.walk_step_cap {
            if id < 1 {
                break;
            }
            if self.exists(id).await? {
                outermost = id;
                miss_run = 0;
            } else {
                miss_run += 1;
                if miss_run >= self.config.walk_miss_run {
                    break;
                }
            }
            id += direction;
        }

        Ok(outermost)
    }

    /// Walks `[low, high]`, invoking `on_found` for every mutation.
    ///
    /// Each found ID is emitted exactly once, in ascending order. The
    /// pass ends early once `max_consecutive_miss` gaps are seen in a
    /// row, surfacing a warning through the progress bus.
    pub async fn iterate<F>(
        &self,
        low: i64,
        high: i64,
        progress: &dyn ProgressBus,
        mut on_found: F,
    ) -> MigrateResult<IterationStats>
    where
        F: FnMut(Mutation),
    {
        let mut stats = IterationStats::default();
        let mut consecutive_miss = 0u32;

        for id in low..=high {
            stats.checked += 1;

            match self.fetch_valid(id).await? {
                Some(mutation) => {
                    consecutive_miss = 0;
                    stats.found += 1;
                    on_found(mutation);
                }
                None => {
                    consecutive_miss += 1;
                    stats.missed += 1;
                    if consecutive_miss >= self.config.max_consecutive_miss {
                        warn!(
                            last_id = id,
                            misses = consecutive_miss,
                            "stopping early after consecutive misses"
                        );
                        progress.publish(ProgressEvent::message(format!(
                            "Stopped at ID {id} after {consecutive_miss} consecutive misses \
                             ({} found)",
                            stats.found
                        )));
                        stats.stopped_early = true;
                        break;
                    }
                }
            }

            if stats.checked % self.config.progress_interval == 0 {
                progress.publish(ProgressEvent::message(format!(
                    "Checked {} IDs: {} found, {} missed",
                    stats.checked, stats.found, stats.missed
                )));
            }
        }

        Ok(stats)
    }

    /// Fetches one ID: detail first, then summary, with one detail
    /// retry for mismatched or zero-ID payloads.
    async fn fetch_valid(&self, id: i64) -> MigrateResult<Option<Mutation>> {
        if let Some(m) = self.source.mutation_detail(id).await?
            && Self::payload_matches(&m, id)
        {
            return Ok(Some(m));
        }

        match self.source.mutation_by_id(id).await? {
            Some(m) if Self::payload_matches(&m, id) => Ok(Some(m)),
            Some(bad) => {
                debug!(
                    requested = id,
                    returned = bad.id,
                    "mismatched payload, retrying via detail"
                );
                Ok(self
                    .source
                    .mutation_detail(id)
                    .await?
                    .filter(|m| Self::payload_matches(m, id)))
            }
            None => Ok(None),
        }
    }

    /// Probe helper: true when a valid payload exists for this ID.
    async fn exists(&self, id: i64) -> MigrateResult<bool> {
        Ok(self.fetch_valid(id).await?.is_some())
    }

    fn payload_matches(mutation: &Mutation, requested: i64) -> bool {
        mutation.id != 0 && mutation.id == requested
    }
}
