use std::sync::RwLock;

use tracing::{debug, info};

use cairn_crypto::{ChainFault, ChainVerifier};
use cairn_fabric::{EventBus, EventFilter, EventPayload, EventStream, LedgerEvent};
use cairn_ledger::{
    EpochRecorder, EpochSnapshot, LedgerStats, QueryLimits, RangeQuery, RangeStats, SegmentReader,
    SegmentRecord, SegmentStore, StoreLimits,
};
use cairn_trails::{TrailIndex, TrailRecord};
use cairn_types::{ActorId, ChainLink, SegmentId, SegmentTag, TrailId};

use crate::config::{limits, LedgerConfig};
use crate::error::GateError;
use crate::role::{Role, Roles};

const LOCK_MSG: &str = "ledger state lock poisoned";

/// Everything the gate mutates, behind one lock.
struct CoreState {
    store: SegmentStore,
    trails: TrailIndex,
    epochs: EpochRecorder,
    frozen: bool,
}

/// The external-facing ledger contract.
///
/// The gate is the only path to the ledger. Every mutating call runs
/// frozen-barrier, role, and validation checks before delegating, observes
/// the epoch cadence inline, and emits structured notifications on success.
/// All state sits behind a single `RwLock`: mutations are strictly
/// serialized and each call either commits fully or changes nothing.
pub struct LedgerGate {
    config: LedgerConfig,
    roles: Roles,
    inner: RwLock<CoreState>,
    bus: EventBus,
}

impl LedgerGate {
    /// Initialize a ledger with its deployment configuration and the two
    /// fixed role holders.
    pub fn new(config: LedgerConfig, trailhead: ActorId, relayer: ActorId) -> Self {
        let fingerprint = config.deployment_fingerprint();
        let store = SegmentStore::new(StoreLimits {
            max_segment_value: config.max_segment_value,
            min_gap: config.min_gap,
            origin_height: config.origin_height,
            max_weight: limits::MAX_WEIGHT,
        });
        Self {
            config,
            roles: Roles::new(trailhead, relayer),
            inner: RwLock::new(CoreState {
                store,
                trails: TrailIndex::new(limits::TRAIL_CAPACITY),
                epochs: EpochRecorder::new(limits::EPOCH_CADENCE, fingerprint),
                frozen: false,
            }),
            bus: EventBus::default(),
        }
    }

    // ------------------------------------------------------------------
    // Trailhead operations
    // ------------------------------------------------------------------

    /// Record a single segment. Returns its assigned ordinal.
    pub fn record_segment(
        &self,
        caller: &ActorId,
        id: SegmentId,
        value: u64,
        recorded_at: u64,
    ) -> Result<u64, GateError> {
        let mut events = Vec::new();
        let ordinal = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            let ordinal = core.store.append(id, value, recorded_at)?;
            Self::push_append_events(&mut core, id, ordinal, value, recorded_at, &mut events);
            ordinal
        };
        self.emit(recorded_at, events);
        Ok(ordinal)
    }

    /// Seal a segment. One-way; the single-item form rejects re-sealing.
    pub fn seal_segment(&self, caller: &ActorId, id: SegmentId) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            core.store.seal(&id)?;
            let stats = core.store.stats();
            (
                core.store.last_recorded_at(),
                vec![EventPayload::SegmentSealed {
                    segment: id,
                    sealed_count: stats.sealed_count,
                }],
            )
        };
        self.emit(height, events);
        Ok(())
    }

    /// Best-effort batch seal: already-sealed entries are skipped silently;
    /// unknown identifiers fail the whole call before any flag flips.
    pub fn seal_segments(&self, caller: &ActorId, ids: &[SegmentId]) -> Result<u64, GateError> {
        let (height, newly_sealed, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;
            Self::check_batch_len(ids.len())?;

            let newly_sealed = core.store.seal_batch(ids)?;
            let stats = core.store.stats();
            (
                core.store.last_recorded_at(),
                newly_sealed,
                vec![EventPayload::SegmentsSealed {
                    newly_sealed,
                    sealed_count: stats.sealed_count,
                }],
            )
        };
        self.emit(height, events);
        Ok(newly_sealed)
    }

    /// Permanently freeze the ledger. Requires the freeze delay to have
    /// elapsed since the origin; terminal once set.
    pub fn freeze(&self, caller: &ActorId, at_height: u64) -> Result<(), GateError> {
        let (total, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            let required = self.config.origin_height + limits::FREEZE_DELAY;
            if at_height < required {
                return Err(GateError::FreezeDelayNotElapsed {
                    at_height,
                    required,
                });
            }

            core.frozen = true;
            let total = core.store.stats().total_segments;
            (
                total,
                vec![EventPayload::LedgerFrozen {
                    total_segments: total,
                }],
            )
        };
        info!(at_height, total_segments = total, "ledger frozen");
        self.emit(at_height, events);
        Ok(())
    }

    /// Create an empty trail.
    pub fn create_trail(
        &self,
        caller: &ActorId,
        trail_id: TrailId,
        created_at: u64,
    ) -> Result<(), GateError> {
        let events = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            core.trails.create(trail_id, created_at)?;
            debug!(trail = %trail_id.short_hex(), "created trail");
            vec![EventPayload::TrailCreated { trail: trail_id }]
        };
        self.emit(created_at, events);
        Ok(())
    }

    /// Attach a recorded segment to a trail. First attach wins.
    pub fn attach_segment(
        &self,
        caller: &ActorId,
        segment: SegmentId,
        trail_id: TrailId,
    ) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            let value = core.store.get(&segment)?.value;
            core.trails.attach(segment, value, trail_id)?;
            let trail = core.trails.get(&trail_id)?;
            (
                core.store.last_recorded_at(),
                vec![EventPayload::SegmentAttached {
                    segment,
                    trail: trail_id,
                    segment_count: trail.segment_count,
                    total_value: trail.total_value,
                }],
            )
        };
        self.emit(height, events);
        Ok(())
    }

    /// All-or-nothing batch attach: any per-item failure aborts the whole
    /// call with no state change.
    pub fn attach_segments(
        &self,
        caller: &ActorId,
        segments: &[SegmentId],
        trail_id: TrailId,
    ) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;
            Self::check_batch_len(segments.len())?;

            // Resolve every segment's value before the first mutation.
            let entries = segments
                .iter()
                .map(|id| core.store.get(id).map(|record| (record.id, record.value)))
                .collect::<Result<Vec<_>, _>>()?;

            core.trails.attach_batch(&entries, trail_id)?;

            let trail = core.trails.get(&trail_id)?;
            let batch_total: u128 = entries.iter().map(|(_, value)| *value as u128).sum();
            let mut count = trail.segment_count - entries.len() as u64;
            let mut total = trail.total_value - batch_total;
            let mut events = Vec::with_capacity(entries.len());
            for (segment, value) in &entries {
                count += 1;
                total += *value as u128;
                events.push(EventPayload::SegmentAttached {
                    segment: *segment,
                    trail: trail_id,
                    segment_count: count,
                    total_value: total,
                });
            }
            (core.store.last_recorded_at(), events)
        };
        self.emit(height, events);
        Ok(())
    }

    /// Lock a trail. One-way; locked trails reject all further attaches.
    pub fn lock_trail(&self, caller: &ActorId, trail_id: TrailId) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            core.trails.lock(&trail_id)?;
            debug!(trail = %trail_id.short_hex(), "locked trail");
            (
                core.store.last_recorded_at(),
                vec![EventPayload::TrailLocked { trail: trail_id }],
            )
        };
        self.emit(height, events);
        Ok(())
    }

    /// Assign a tag to a segment. Last write wins; the zero tag clears.
    pub fn set_tag(
        &self,
        caller: &ActorId,
        segment: SegmentId,
        tag: SegmentTag,
    ) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            core.store.set_tag(&segment, tag)?;
            (
                core.store.last_recorded_at(),
                vec![EventPayload::TagAssigned { segment, tag }],
            )
        };
        self.emit(height, events);
        Ok(())
    }

    /// Assign a weight to a segment, bounded by [`limits::MAX_WEIGHT`].
    pub fn set_weight(
        &self,
        caller: &ActorId,
        segment: SegmentId,
        weight: u64,
    ) -> Result<(), GateError> {
        let (height, events) = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Trailhead, caller)?;

            core.store.set_weight(&segment, weight)?;
            (
                core.store.last_recorded_at(),
                vec![EventPayload::WeightAssigned { segment, weight }],
            )
        };
        self.emit(height, events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Relayer operations
    // ------------------------------------------------------------------

    /// Batch append, all-or-nothing. The whole batch is validated
    /// (including intra-batch duplicates) before the first item is
    /// applied; epoch cadence is observed after every individual append,
    /// so mid-batch crossings capture mid-batch counters.
    pub fn record_segments(
        &self,
        caller: &ActorId,
        entries: &[(SegmentId, u64)],
        recorded_at: u64,
    ) -> Result<Vec<u64>, GateError> {
        let mut events = Vec::new();
        let ordinals = {
            let mut core = self.inner.write().expect(LOCK_MSG);
            Self::check_unfrozen(&core)?;
            self.roles.require(Role::Relayer, caller)?;
            Self::check_batch_len(entries.len())?;

            core.store.check_append_batch(entries, recorded_at)?;

            // The pre-flight covered every item; appends cannot fail now.
            let mut ordinals = Vec::with_capacity(entries.len());
            for (id, value) in entries {
                let ordinal = core.store.append(*id, *value, recorded_at)?;
                Self::push_append_events(
                    &mut core,
                    *id,
                    ordinal,
                    *value,
                    recorded_at,
                    &mut events,
                );
                ordinals.push(ordinal);
            }
            ordinals
        };
        self.emit(recorded_at, events);
        Ok(ordinals)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn segment(&self, id: &SegmentId) -> Result<SegmentRecord, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(core.store.get(id)?.clone())
    }

    pub fn segment_id_by_ordinal(&self, ordinal: u64) -> Result<SegmentId, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(core.store.get_by_ordinal(ordinal)?.id)
    }

    pub fn contains_segment(&self, id: &SegmentId) -> bool {
        self.inner.read().expect(LOCK_MSG).store.exists(id)
    }

    /// Recompute the segment's chain link from stored state. `false` for
    /// unrecorded identifiers; never errors.
    pub fn verify_segment(&self, id: &SegmentId) -> bool {
        self.inner.read().expect(LOCK_MSG).store.verify(id)
    }

    /// Offline-style verification of the entire chain prefix.
    pub fn verify_ledger(&self) -> Result<(), ChainFault> {
        let core = self.inner.read().expect(LOCK_MSG);
        ChainVerifier::verify_chain(core.store.records())
    }

    pub fn stats(&self) -> LedgerStats {
        self.inner.read().expect(LOCK_MSG).store.stats()
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.read().expect(LOCK_MSG).frozen
    }

    pub fn head_link(&self) -> ChainLink {
        self.inner.read().expect(LOCK_MSG).store.head_link()
    }

    pub fn epoch(&self, index: u64) -> Result<EpochSnapshot, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(*core.epochs.get(index)?)
    }

    pub fn current_epoch_index(&self) -> u64 {
        self.inner.read().expect(LOCK_MSG).epochs.current_index()
    }

    pub fn trail(&self, trail_id: &TrailId) -> Result<TrailRecord, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(core.trails.get(trail_id)?.clone())
    }

    pub fn trail_members(&self, trail_id: &TrailId) -> Result<Vec<SegmentId>, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(core.trails.members(trail_id)?.to_vec())
    }

    pub fn trail_of(&self, segment: &SegmentId) -> Option<TrailId> {
        self.inner.read().expect(LOCK_MSG).trails.trail_of(segment)
    }

    pub fn tag_of(&self, segment: &SegmentId) -> SegmentTag {
        self.inner.read().expect(LOCK_MSG).store.tag_of(segment)
    }

    pub fn weight_of(&self, segment: &SegmentId) -> u64 {
        self.inner.read().expect(LOCK_MSG).store.weight_of(segment)
    }

    pub fn values_in_range(&self, start: u64, end: u64) -> Result<Vec<u64>, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).values_in_range(start, end)?)
    }

    pub fn sum_in_range(&self, start: u64, end: u64) -> Result<u128, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).sum_in_range(start, end)?)
    }

    pub fn stats_in_range(&self, start: u64, end: u64) -> Result<RangeStats, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).stats_in_range(start, end)?)
    }

    pub fn average_in_range(&self, start: u64, end: u64) -> Result<u64, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).average_in_range(start, end)?)
    }

    pub fn weighted_sum_in_range(&self, start: u64, end: u64) -> Result<u128, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).weighted_sum_in_range(start, end)?)
    }

    pub fn segments_with_tag(
        &self,
        tag: SegmentTag,
        max_results: u64,
    ) -> Result<Vec<SegmentId>, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).segments_with_tag(tag, max_results)?)
    }

    pub fn segments_in_height_range(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<SegmentId>, GateError> {
        let core = self.inner.read().expect(LOCK_MSG);
        Ok(self.query(&core).segments_in_height_range(from, to)?)
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        self.bus.subscribe(filter)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_unfrozen(core: &CoreState) -> Result<(), GateError> {
        if core.frozen {
            Err(GateError::Frozen)
        } else {
            Ok(())
        }
    }

    fn check_batch_len(len: usize) -> Result<(), GateError> {
        if len > limits::BATCH_APPEND_LIMIT {
            return Err(GateError::BatchTooLarge {
                requested: len,
                max: limits::BATCH_APPEND_LIMIT,
            });
        }
        Ok(())
    }

    /// Shared post-append bookkeeping: the record event plus any epoch
    /// snapshot the cadence observation captured.
    fn push_append_events(
        core: &mut CoreState,
        id: SegmentId,
        ordinal: u64,
        value: u64,
        recorded_at: u64,
        events: &mut Vec<EventPayload>,
    ) {
        let stats = core.store.stats();
        events.push(EventPayload::SegmentRecorded {
            segment: id,
            ordinal,
            value,
            total_segments: stats.total_segments,
            cumulative_value: stats.cumulative_value,
        });
        if let Some(snapshot) = core.epochs.observe_append(&stats, recorded_at).copied() {
            events.push(EventPayload::EpochCaptured {
                index: snapshot.index,
                at_segment_count: snapshot.at_segment_count,
                fingerprint: snapshot.fingerprint,
            });
        }
    }

    fn query<'a>(&self, core: &'a CoreState) -> RangeQuery<'a, SegmentStore> {
        RangeQuery::new(
            &core.store,
            QueryLimits {
                max_view_batch: limits::MAX_VIEW_BATCH,
                observation_window: self.config.observation_window,
            },
        )
    }

    fn emit(&self, height: u64, payloads: Vec<EventPayload>) {
        for payload in payloads {
            self.bus.publish(&LedgerEvent::new(height, payload));
        }
    }
}
