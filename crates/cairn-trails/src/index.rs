use std::collections::{HashMap, HashSet};

use cairn_types::{SegmentId, TrailId};

use crate::error::TrailError;
use crate::types::TrailRecord;

/// Secondary index mapping segments into named, lockable trails.
///
/// References segment identifiers; it never owns segment records. The
/// caller confirms a segment exists in the store and supplies its recorded
/// value so aggregate totals stay exact.
#[derive(Debug)]
pub struct TrailIndex {
    capacity: usize,
    trails: HashMap<TrailId, TrailRecord>,
    membership: HashMap<SegmentId, TrailId>,
}

impl TrailIndex {
    /// `capacity` is the fixed per-trail segment limit.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            trails: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    pub fn create(&mut self, id: TrailId, created_at: u64) -> Result<(), TrailError> {
        if id.is_zero() {
            return Err(TrailError::ZeroTrailId);
        }
        if self.trails.contains_key(&id) {
            return Err(TrailError::TrailExists { id });
        }
        self.trails.insert(id, TrailRecord::new(id, created_at));
        Ok(())
    }

    /// Attach a segment to a trail. First attach wins: a segment already in
    /// any trail is rejected.
    pub fn attach(
        &mut self,
        segment: SegmentId,
        value: u64,
        trail_id: TrailId,
    ) -> Result<(), TrailError> {
        self.check_attach(&segment, &trail_id)?;
        self.apply_attach(segment, value, trail_id);
        Ok(())
    }

    /// All-or-nothing batch attach: every per-item check (including
    /// intra-batch duplicates and capacity accounting for the whole batch)
    /// runs before the first mutation; any failure aborts the call with no
    /// state change.
    pub fn attach_batch(
        &mut self,
        entries: &[(SegmentId, u64)],
        trail_id: TrailId,
    ) -> Result<(), TrailError> {
        let trail = self.trails.get(&trail_id).ok_or(TrailError::TrailNotFound)?;
        if trail.locked {
            return Err(TrailError::TrailLocked);
        }
        if trail.segment_count as usize + entries.len() > self.capacity {
            return Err(TrailError::TrailFull {
                capacity: self.capacity,
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for (segment, _) in entries {
            if let Some(existing) = self.membership.get(segment) {
                return Err(TrailError::AlreadyAttached {
                    segment: *segment,
                    trail: *existing,
                });
            }
            if !seen.insert(*segment) {
                return Err(TrailError::AlreadyAttached {
                    segment: *segment,
                    trail: trail_id,
                });
            }
        }

        for (segment, value) in entries {
            self.apply_attach(*segment, *value, trail_id);
        }
        Ok(())
    }

    /// One-way lock. Re-locking a locked trail is a conflict.
    pub fn lock(&mut self, trail_id: &TrailId) -> Result<(), TrailError> {
        let trail = self
            .trails
            .get_mut(trail_id)
            .ok_or(TrailError::TrailNotFound)?;
        if trail.locked {
            return Err(TrailError::AlreadyLocked);
        }
        trail.locked = true;
        Ok(())
    }

    pub fn get(&self, trail_id: &TrailId) -> Result<&TrailRecord, TrailError> {
        self.trails.get(trail_id).ok_or(TrailError::TrailNotFound)
    }

    /// Member identifiers in attach order.
    pub fn members(&self, trail_id: &TrailId) -> Result<&[SegmentId], TrailError> {
        self.get(trail_id).map(|t| t.members.as_slice())
    }

    /// The trail a segment belongs to, if any.
    pub fn trail_of(&self, segment: &SegmentId) -> Option<TrailId> {
        self.membership.get(segment).copied()
    }

    pub fn contains(&self, trail_id: &TrailId) -> bool {
        self.trails.contains_key(trail_id)
    }

    /// Number of trails.
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn check_attach(&self, segment: &SegmentId, trail_id: &TrailId) -> Result<(), TrailError> {
        let trail = self.trails.get(trail_id).ok_or(TrailError::TrailNotFound)?;
        if trail.locked {
            return Err(TrailError::TrailLocked);
        }
        if let Some(existing) = self.membership.get(segment) {
            return Err(TrailError::AlreadyAttached {
                segment: *segment,
                trail: *existing,
            });
        }
        if trail.segment_count as usize >= self.capacity {
            return Err(TrailError::TrailFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn apply_attach(&mut self, segment: SegmentId, value: u64, trail_id: TrailId) {
        let trail = self
            .trails
            .get_mut(&trail_id)
            .expect("attach applied to checked trail");
        trail.segment_count += 1;
        trail.total_value += value as u128;
        trail.members.push(segment);
        self.membership.insert(segment, trail_id);
    }
}
