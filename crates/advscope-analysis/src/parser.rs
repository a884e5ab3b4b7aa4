//! Splitting a scan transcript into batches.
//!
//! All sources are merged into one stream ordered by timestamp, ties broken
//! by source. Each `(source, payload)` key has at most one open batch; a
//! record extends it while the gap stays within the payload's `max_gap`.
//! Interleaved records of other keys never break a batch, so two devices
//! advertising at once or two series of one device overlapping in time are
//! split cleanly. A closed batch whose payload is shared by series of
//! different intervals is then cut where the interval changed.

use std::collections::BTreeMap;

use advscope_catalog::{PayloadBuilder, PduType, SeriesDefinition, shared_payload_groups};
use advscope_errors::CatalogError;
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::capture::{DeviceCapture, ScanTranscript, hex, nanos_to_s};
use crate::config::ParserConfig;
use crate::diagnostics::{DiscardReason, Discarded};
use crate::transition::{possible_transitions, split_at_transitions};

/// Maps each payload the expected series can send to the series sending it.
#[derive(Debug, Clone)]
pub struct PayloadIndex<'a> {
    series: &'a [SeriesDefinition],
    groups: BTreeMap<Vec<u8>, Vec<usize>>,
    pinned: BTreeMap<usize, Vec<usize>>,
}

impl<'a> PayloadIndex<'a> {
    /// Build the payload of every shared-payload group with `builder`.
    ///
    /// Distinct templates that happen to build to the same bytes end up in
    /// one entry.
    ///
    /// # Errors
    ///
    /// Returns the builder's error for the first template it cannot encode.
    pub fn new<B: PayloadBuilder>(series: &'a [SeriesDefinition], builder: &B) -> Result<Self, CatalogError> {
        let mut groups: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();
        for group in shared_payload_groups(series) {
            let payload = builder.build(group.template)?;
            groups.entry(payload).or_default().extend(group.members.iter().copied());
        }
        for members in groups.values_mut() {
            members.sort_unstable();
            members.dedup();
        }
        debug!(series = series.len(), payloads = groups.len(), "payload index built");
        Ok(Self {
            series,
            groups,
            pinned: BTreeMap::new(),
        })
    }

    /// Pair the `i`-th shared-payload group with the `i`-th payload `device` sent.
    ///
    /// Used when the device profile is unknown, e.g. when replaying a
    /// recorded transcript. Groups beyond the captured payloads get no entry.
    #[must_use]
    pub fn by_first_seen(series: &'a [SeriesDefinition], device: &DeviceCapture) -> Self {
        let mut groups: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();
        for (group, capture) in shared_payload_groups(series).iter().zip(&device.advertising) {
            groups
                .entry(capture.payload.clone())
                .or_default()
                .extend(group.members.iter().copied());
        }
        Self {
            series,
            groups,
            pinned: BTreeMap::new(),
        }
    }

    /// Attribute every payload of `source` to the series at `series_index`.
    ///
    /// A prepairing DUT advertises its prepairing series on a second address
    /// whose payload is not built from a template.
    #[must_use]
    pub fn pin_source(mut self, source: usize, series_index: usize) -> Self {
        self.pinned.insert(source, vec![series_index]);
        self
    }

    /// The expected series list.
    #[must_use]
    pub fn series(&self) -> &'a [SeriesDefinition] {
        self.series
    }

    /// Series sending `payload`, ascending.
    #[must_use]
    pub fn candidates(&self, payload: &[u8]) -> Option<&[usize]> {
        self.groups.get(payload).map(Vec::as_slice)
    }

    /// Series a record of `source` carrying `payload` may belong to.
    #[must_use]
    pub fn candidates_for(&self, source: usize, payload: &[u8]) -> Option<&[usize]> {
        match self.pinned.get(&source) {
            Some(pinned) => Some(pinned.as_slice()),
            None => self.candidates(payload),
        }
    }

    /// Number of distinct payloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no payload is expected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Payloads with their series, in byte order.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &[usize])> {
        self.groups.iter().map(|(p, m)| (p.as_slice(), m.as_slice()))
    }

    /// Largest gap that still extends a batch sending the payload of `candidates`.
    ///
    /// Allows `max_missed` lost packets at the slowest period, then stays
    /// under half the shortest duty-cycle off-time so distinct windows never
    /// merge.
    #[must_use]
    pub fn max_gap_ms(&self, candidates: &[usize], config: &ParserConfig) -> f64 {
        let defs = candidates.iter().filter_map(|&i| self.series.get(i));
        let mut gap = 0.0_f64;
        let mut shortest_off = f64::INFINITY;
        for def in defs {
            let missed = if def.interval.is_high_duty_cycle() {
                config.hdc_max_missed_packets
            } else {
                config.ldc_max_missed_packets
            };
            gap = gap.max(f64::from(missed.saturating_add(1)) * def.interval.period_ms());
            let off_s = def.window.off_s();
            if def.window.is_duty_cycled() && off_s > 0.0 {
                shortest_off = shortest_off.min(off_s * 1e3);
            }
        }
        gap.min(shortest_off / 2.0)
    }
}

/// Batches and everything that did not make it into one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Batches ordered by first timestamp, then source
    pub batches: Vec<Batch>,
    /// Dropped records
    pub discarded: Vec<Discarded>,
}

impl ParseOutcome {
    /// Records dropped for `reason`.
    #[must_use]
    pub fn discarded_count(&self, reason: DiscardReason) -> usize {
        self.discarded
            .iter()
            .filter(|d| d.reason == reason)
            .map(|d| d.count)
            .sum()
    }
}

struct OpenBatch {
    pdu_type: PduType,
    timestamps_ns: Vec<u64>,
    max_gap_ns: u64,
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "gaps are small and clamped non-negative"
)]
fn ms_to_nanos(ms: f64) -> u64 {
    if ms.is_finite() {
        (ms.max(0.0) * 1e6).round() as u64
    } else {
        u64::MAX
    }
}

fn note(discarded: &mut Vec<Discarded>, source: usize, payload: &[u8], timestamp_ns: u64, reason: DiscardReason) {
    let key = hex(payload);
    match discarded
        .iter_mut()
        .find(|d| d.source == source && d.reason == reason && d.payload == key)
    {
        Some(entry) => entry.count = entry.count.saturating_add(1),
        None => discarded.push(Discarded::new(source, payload, timestamp_ns, reason)),
    }
}

/// Split every advertising record of `transcript` into batches.
///
/// Never fails: unknown payloads, duplicates and runs too short to carry an
/// interval are reported in [`ParseOutcome::discarded`].
#[must_use]
pub fn split_into_batches(transcript: &ScanTranscript, index: &PayloadIndex<'_>, config: &ParserConfig) -> ParseOutcome {
    let mut open: BTreeMap<(usize, &[u8]), OpenBatch> = BTreeMap::new();
    let mut closed: Vec<((usize, &[u8]), OpenBatch)> = Vec::new();
    let mut unknown: Vec<Discarded> = Vec::new();
    let mut duplicates: Vec<Discarded> = Vec::new();

    for record in transcript.records() {
        let key = (record.source, record.payload);
        let Some(candidates) = index.candidates_for(record.source, record.payload) else {
            note(&mut unknown, record.source, record.payload, record.timestamp_ns, DiscardReason::UnknownPayload);
            continue;
        };

        if let Some(batch) = open.get_mut(&key) {
            let last = batch.timestamps_ns.last().copied().unwrap_or(record.timestamp_ns);
            let gap = record.timestamp_ns.saturating_sub(last);
            if gap == 0 {
                note(&mut duplicates, record.source, record.payload, record.timestamp_ns, DiscardReason::Duplicate);
                continue;
            }
            if gap <= batch.max_gap_ns {
                batch.timestamps_ns.push(record.timestamp_ns);
                continue;
            }
            if let Some(done) = open.remove(&key) {
                closed.push((key, done));
            }
        }

        open.insert(
            key,
            OpenBatch {
                pdu_type: record.pdu_type,
                timestamps_ns: vec![record.timestamp_ns],
                max_gap_ns: ms_to_nanos(index.max_gap_ms(candidates, config)),
            },
        );
    }
    closed.extend(open);

    let mut outcome = ParseOutcome::default();
    for ((source, payload), batch) in closed {
        let candidates = index
            .candidates_for(source, payload)
            .map(<[usize]>::to_vec)
            .unwrap_or_default();
        let transitions = possible_transitions(index.series(), &candidates);
        let pieces = split_at_transitions(batch.timestamps_ns, &transitions);
        if pieces.len() > 1 {
            debug!(source, payload = %hex(payload), pieces = pieces.len(), "interval change inside batch");
        }
        for timestamps_ns in pieces {
            if timestamps_ns.len() < config.min_batch_len {
                let first = timestamps_ns.first().copied().unwrap_or_default();
                let mut entry = Discarded::new(source, payload, first, DiscardReason::TooShort);
                entry.count = timestamps_ns.len();
                outcome.discarded.push(entry);
                continue;
            }
            outcome.batches.push(Batch {
                source,
                pdu_type: batch.pdu_type,
                payload: payload.to_vec(),
                timestamps_ns,
                candidates: candidates.clone(),
            });
        }
    }

    outcome
        .batches
        .sort_by_key(|b| (b.first_ns().unwrap_or_default(), b.source));
    outcome
        .discarded
        .sort_by_key(|d| (d.first_timestamp_ns, d.source));

    for bucket in &unknown {
        warn!(
            source = bucket.source,
            payload = %bucket.payload,
            count = bucket.count,
            "payload matches no expected series"
        );
    }
    let origin = outcome.batches.first().and_then(Batch::first_ns).unwrap_or_default();
    for batch in &outcome.batches {
        debug!(
            source = batch.source,
            packets = batch.len(),
            start_s = batch.start_s(origin),
            duration_s = batch.duration_s(),
            "batch"
        );
    }
    debug!(
        batches = outcome.batches.len(),
        discarded = outcome.discarded.len() + unknown.len() + duplicates.len(),
        span_s = nanos_to_s(transcript.time_span_ns().map_or(0, |(lo, hi)| hi.saturating_sub(lo))),
        "transcript split"
    );

    outcome.discarded.extend(unknown);
    outcome.discarded.extend(duplicates);
    outcome
}
