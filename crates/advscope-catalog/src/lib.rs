//! BLE advertising series catalog.
//!
//! A device under test advertises in *series*: runs of advertising windows
//! with a fixed interval, payload and lifetime. This crate holds the static
//! knowledge about those series and the pure queries built on it:
//!
//! - [`types`]: PDU types, intervals and window shapes
//! - [`template`]: packet templates (which AD structures a payload carries)
//! - [`series`]: series definitions and the named catalog `A`..`U`
//! - [`ad`]: length/type/value AD-structure codec
//! - [`payload`]: turning a template into bytes for a concrete device
//! - [`groups`]: which series share a payload
//! - [`timeline`]: expected priority timeline and scan-time helpers
//! - [`pairing`]: application-pairing series selection
//!
//! Nothing here performs I/O.
//!
//! # Example
//!
//! ```
//! use advscope_catalog::prelude::*;
//!
//! let series = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
//! assert_eq!(scan_time(&series, None), 180.0);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod ad;
pub mod groups;
pub mod pairing;
pub mod payload;
pub mod prelude;
pub mod series;
pub mod template;
pub mod timeline;
pub mod types;

pub use ad::{AdStructure, encode_ad_structures, parse_ad_structures};
pub use groups::{
    SharedGroup, check_distinguishable, shared_payload_groups, shared_scan_response_groups,
};
pub use pairing::{PairingCapabilities, application_pairing_series};
pub use payload::{BleProIdentity, DeviceProfile, PayloadBuilder, TemplatePayloadBuilder};
pub use series::{CatalogSeries, SeriesDefinition};
pub use template::{AdFlags, AdType, FieldContent, ModelField, NameLength, PacketTemplate, TemplateField};
pub use timeline::{
    TimelineSegment, expected_timeline, scan_time, scan_time_for_interval_count,
    scan_time_one_window_each,
};
pub use types::{
    AdvertisingInterval, HDC_MAX_DURATION_S, HDC_MAX_INTERVAL_MS, HDC_NOMINAL_INTERVAL_MS, PduType,
    Window,
};
