//! Prelude module for convenient imports.

pub use crate::{
    AdStructure, AdType, AdvertisingInterval, CatalogSeries, DeviceProfile, FieldContent,
    PacketTemplate, PairingCapabilities, PayloadBuilder, PduType, SeriesDefinition, SharedGroup,
    TemplatePayloadBuilder, TimelineSegment, Window, application_pairing_series,
    check_distinguishable, encode_ad_structures, expected_timeline, parse_ad_structures,
    scan_time, scan_time_for_interval_count, scan_time_one_window_each, shared_payload_groups,
    shared_scan_response_groups,
};
pub use advscope_errors::{CatalogError, Result};
