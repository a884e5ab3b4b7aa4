//! Series sharing a payload.
//!
//! Several series in one expected list may send bit-identical payloads
//! (A and B for instance). Batches of such a payload can only be told apart
//! by interval, so the analysis needs to know which series share what.

use advscope_errors::CatalogError;

use crate::series::SeriesDefinition;
use crate::template::PacketTemplate;

/// A class of series with an identical template.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedGroup<'a> {
    /// The shared template
    pub template: &'a PacketTemplate,
    /// Indices into the expected series list, ascending
    pub members: Vec<usize>,
}

impl SharedGroup<'_> {
    /// Member names joined with commas.
    #[must_use]
    pub fn label(&self, series: &[SeriesDefinition]) -> String {
        self.members
            .iter()
            .filter_map(|&i| series.get(i).map(|s| s.name.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn group_by<'a>(
    series: &'a [SeriesDefinition],
    key: impl Fn(&'a SeriesDefinition) -> &'a PacketTemplate,
) -> Vec<SharedGroup<'a>> {
    let mut groups: Vec<SharedGroup<'a>> = Vec::new();
    for (index, s) in series.iter().enumerate() {
        let template = key(s);
        match groups.iter_mut().find(|g| g.template == template) {
            Some(group) => group.members.push(index),
            None => groups.push(SharedGroup {
                template,
                members: vec![index],
            }),
        }
    }
    groups
}

/// Partition `series` by advertising template, classes in first-seen order.
#[must_use]
pub fn shared_payload_groups(series: &[SeriesDefinition]) -> Vec<SharedGroup<'_>> {
    group_by(series, |s| &s.packet_template)
}

/// Partition `series` by scan-response template, classes in first-seen order.
#[must_use]
pub fn shared_scan_response_groups(series: &[SeriesDefinition]) -> Vec<SharedGroup<'_>> {
    group_by(series, |s| &s.scan_response_template)
}

/// Check that series sharing a payload can always be told apart.
///
/// Two series with the same advertising template must either never be alive
/// at the same time or use different intervals.
///
/// # Errors
///
/// Returns [`CatalogError::DuplicateSeries`] when a name repeats and
/// [`CatalogError::Indistinguishable`] for the first offending pair.
pub fn check_distinguishable(series: &[SeriesDefinition]) -> Result<(), CatalogError> {
    for (i, a) in series.iter().enumerate() {
        for b in series.iter().skip(i + 1) {
            if a.name == b.name {
                return Err(CatalogError::DuplicateSeries(a.name.clone()));
            }
            let same_payload = a.packet_template == b.packet_template;
            let alive_together = a.start_s < b.stop_s && b.start_s < a.stop_s;
            let same_interval = a.interval == b.interval;
            if same_payload && alive_together && same_interval {
                return Err(CatalogError::indistinguishable(&a.name, &b.name));
            }
        }
    }
    Ok(())
}
