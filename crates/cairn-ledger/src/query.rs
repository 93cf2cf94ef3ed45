use cairn_types::{SegmentId, SegmentTag};

use crate::error::LedgerError;
use crate::traits::SegmentReader;

/// Bounds the query engine enforces on every call.
#[derive(Clone, Copy, Debug)]
pub struct QueryLimits {
    /// Maximum number of ordinals a single range request may cover, and the
    /// maximum result count for scans.
    pub max_view_batch: u64,
    /// Maximum height span a block-range scan may cover.
    pub observation_window: u64,
}

/// Aggregate statistics over an ordinal range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeStats {
    pub count: u64,
    pub sum: u128,
    pub min: u64,
    pub max: u64,
}

/// Read-only engine for bounded aggregations over the append log.
///
/// All ordinal ranges are 1-based and inclusive. Any window larger than the
/// view-batch maximum is rejected outright rather than truncated; the bound
/// is a cost ceiling, not a pagination default.
pub struct RangeQuery<'a, R: SegmentReader> {
    reader: &'a R,
    limits: QueryLimits,
}

impl<'a, R: SegmentReader> RangeQuery<'a, R> {
    pub fn new(reader: &'a R, limits: QueryLimits) -> Self {
        Self { reader, limits }
    }

    /// Raw value listing over `[start, end]`.
    pub fn values_in_range(&self, start: u64, end: u64) -> Result<Vec<u64>, LedgerError> {
        self.check_range(start, end)?;
        let mut values = Vec::with_capacity((end - start + 1) as usize);
        for ordinal in start..=end {
            values.push(self.reader.get_by_ordinal(ordinal)?.value);
        }
        Ok(values)
    }

    /// Sum of values over `[start, end]`.
    pub fn sum_in_range(&self, start: u64, end: u64) -> Result<u128, LedgerError> {
        self.check_range(start, end)?;
        let mut sum: u128 = 0;
        for ordinal in start..=end {
            sum += self.reader.get_by_ordinal(ordinal)?.value as u128;
        }
        Ok(sum)
    }

    /// Count, sum, minimum, and maximum over `[start, end]`.
    pub fn stats_in_range(&self, start: u64, end: u64) -> Result<RangeStats, LedgerError> {
        self.check_range(start, end)?;
        let mut sum: u128 = 0;
        let mut min = u64::MAX;
        let mut max = u64::MIN;
        for ordinal in start..=end {
            let value = self.reader.get_by_ordinal(ordinal)?.value;
            sum += value as u128;
            min = min.min(value);
            max = max.max(value);
        }
        Ok(RangeStats {
            count: end - start + 1,
            sum,
            min,
            max,
        })
    }

    /// Arithmetic mean over `[start, end]`, truncating. The range is never
    /// empty here: `start > end` is already rejected by validation.
    pub fn average_in_range(&self, start: u64, end: u64) -> Result<u64, LedgerError> {
        let stats = self.stats_in_range(start, end)?;
        Ok((stats.sum / stats.count as u128) as u64)
    }

    /// Weighted sum over `[start, end]`: each value multiplied by its
    /// weight, with weight `0` treated as multiplier 1.
    pub fn weighted_sum_in_range(&self, start: u64, end: u64) -> Result<u128, LedgerError> {
        self.check_range(start, end)?;
        let mut sum: u128 = 0;
        for ordinal in start..=end {
            let record = self.reader.get_by_ordinal(ordinal)?;
            let weight = match self.reader.weight_of(&record.id) {
                0 => 1,
                w => w,
            };
            sum += record.value as u128 * weight as u128;
        }
        Ok(sum)
    }

    /// Identifiers of segments carrying `tag`, in ordinal order.
    ///
    /// Scans the full ordinal log but stops as soon as `max_results`
    /// matches are collected. `max_results` must be in
    /// `1..=max_view_batch`.
    pub fn segments_with_tag(
        &self,
        tag: SegmentTag,
        max_results: u64,
    ) -> Result<Vec<SegmentId>, LedgerError> {
        if max_results == 0 || max_results > self.limits.max_view_batch {
            return Err(LedgerError::BatchTooLarge {
                requested: max_results,
                max: self.limits.max_view_batch,
            });
        }

        let total = self.reader.stats().total_segments;
        let mut matches = Vec::new();
        for ordinal in 1..=total {
            let record = self.reader.get_by_ordinal(ordinal)?;
            if self.reader.tag_of(&record.id) == tag {
                matches.push(record.id);
                if matches.len() as u64 == max_results {
                    break;
                }
            }
        }
        Ok(matches)
    }

    /// Identifiers of segments recorded at heights in `[from, to]`, in
    /// ordinal order. The scan is linear and caps its result list at the
    /// view-batch maximum regardless of how many segments match; the height
    /// span itself may not exceed the observation window.
    pub fn segments_in_height_range(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<SegmentId>, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidRange {
                start: from,
                end: to,
            });
        }
        let span = to - from + 1;
        if span > self.limits.observation_window {
            return Err(LedgerError::WindowExceeded {
                span,
                window: self.limits.observation_window,
            });
        }

        let total = self.reader.stats().total_segments;
        let mut matches = Vec::new();
        for ordinal in 1..=total {
            let record = self.reader.get_by_ordinal(ordinal)?;
            if record.recorded_at >= from && record.recorded_at <= to {
                matches.push(record.id);
                if matches.len() as u64 == self.limits.max_view_batch {
                    break;
                }
            }
        }
        Ok(matches)
    }

    /// Shared range validation: malformed bounds first, then the cost cap.
    fn check_range(&self, start: u64, end: u64) -> Result<(), LedgerError> {
        let total = self.reader.stats().total_segments;
        if start == 0 || start > end || end > total {
            return Err(LedgerError::InvalidRange { start, end });
        }
        let requested = end - start + 1;
        if requested > self.limits.max_view_batch {
            return Err(LedgerError::BatchTooLarge {
                requested,
                max: self.limits.max_view_batch,
            });
        }
        Ok(())
    }
}
