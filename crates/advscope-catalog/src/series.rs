//! Series definitions and the named catalog.

use core::fmt;
use core::str::FromStr;

use advscope_errors::CatalogError;
use serde::{Deserialize, Serialize};

use crate::template::{
    AdFlags, AdType, FieldContent, ModelField, NameLength, PacketTemplate, SWIFT_PAIR_BEACON,
    TemplateField, UUID_BLE_PRO, UUID_HID,
};
use crate::types::{AdvertisingInterval, PduType, Window};

/// Immutable description of one advertising series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDefinition {
    /// Series name, unique within an expected list
    pub name: String,
    /// Seconds after time zero the series starts
    pub start_s: f64,
    /// Seconds after time zero the series stops
    pub stop_s: f64,
    /// Advertising interval
    pub interval: AdvertisingInterval,
    /// Window shape
    pub window: Window,
    /// Advertising payload template
    pub packet_template: PacketTemplate,
    /// Scan response template
    pub scan_response_template: PacketTemplate,
    /// PDU type
    pub pdu_type: PduType,
    /// Skip the stop-time check while a higher-priority series overlaps this one
    #[serde(default)]
    pub stop_exempt_when_overlapped: bool,
}

impl SeriesDefinition {
    /// Whether both lifetimes intersect (closed intervals).
    #[must_use]
    pub fn lifetime_overlaps(&self, other: &SeriesDefinition) -> bool {
        !(other.start_s > self.stop_s || other.stop_s < self.start_s)
    }

    /// Whether the series is advertising at `t_s`.
    #[must_use]
    pub fn is_active_at(&self, t_s: f64) -> bool {
        t_s >= self.start_s && t_s < self.stop_s && self.window.is_on_at(t_s - self.start_s)
    }
}

/// Named series of the advertising catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogSeries {
    /// Swift Pair, 30 ms, interlaced, first 30 s
    A,
    /// Swift Pair, 100 ms, interlaced after A
    B,
    /// BLE Pro + Fast Pair, 100 ms, interlaced
    C,
    /// Prepairing, directed high duty cycle bursts
    D,
    /// Swift Pair + BLE Pro, 30 ms, first 30 s
    E,
    /// Swift Pair + BLE Pro, 100 ms after E
    F,
    /// Reconnection, directed high duty cycle
    G,
    /// Reconnection, undirected 20 ms
    H,
    /// Bootloader reconnection, directed high duty cycle
    I,
    /// Bootloader reconnection, directed 20 ms, long windows
    J,
    /// Bootloader reconnection, directed high duty cycle, short windows
    K,
    /// Bootloader discovery with BLE Pro
    L,
    /// Bootloader long-term discovery with BLE Pro
    M,
    /// Bootloader discovery
    N,
    /// Bootloader long-term Fast Pair discovery
    O,
    /// Fast Pair companion of A/B, interlaced
    P,
    /// Swift Pair only, 30 ms
    Q,
    /// Swift Pair only, 100 ms after Q
    R,
    /// Plain HID, interlaced with C
    S,
    /// BLE Pro only
    T,
    /// No pairing extensions
    U,
}

const START: f64 = 0.0;
const SECOND: f64 = 30.0;
const SECOND_INTERLACED: f64 = 32.0;
const INTERLACED: f64 = 2.0;
const FAST_SECOND_BOOTLOADER: f64 = 5.0;
const SLOW_SECOND_BOOTLOADER: f64 = 20.0;
const THIRD_BOOTLOADER: f64 = 180.0;

const EARLY: f64 = 30.0;
const STANDARD: f64 = 180.0;
const RECONNECTION: f64 = 5.0;
const END_FAST_BOOTLOADER: f64 = 5.0;
const END_SLOW_BOOTLOADER: f64 = 7200.0;

fn field(ad_type: AdType, content: FieldContent) -> TemplateField {
    TemplateField::new(ad_type, content)
}

fn flags(f: AdFlags) -> TemplateField {
    field(AdType::Flags, FieldContent::Flags(f))
}

fn model(ad_type: AdType, m: ModelField) -> TemplateField {
    field(ad_type, FieldContent::Model(m))
}

fn short_name(len: NameLength) -> TemplateField {
    model(AdType::ShortenedLocalName, ModelField::Name(len))
}

fn complete_name(len: NameLength) -> TemplateField {
    model(AdType::CompleteLocalName, ModelField::Name(len))
}

fn uuids(list: &[u16]) -> TemplateField {
    field(AdType::Complete16BitServiceUuids, FieldContent::Uuids16(list.to_vec()))
}

fn swift_pair() -> TemplateField {
    field(
        AdType::ManufacturerSpecificData,
        FieldContent::Constant(SWIFT_PAIR_BEACON.to_vec()),
    )
}

fn app_appearance() -> TemplateField {
    model(AdType::Appearance, ModelField::ApplicationAppearance)
}

fn boot_appearance() -> TemplateField {
    model(AdType::Appearance, ModelField::BootloaderAppearance)
}

fn tx_power() -> TemplateField {
    model(AdType::TxPowerLevel, ModelField::TxPower)
}

fn ble_pro_data() -> TemplateField {
    model(AdType::ServiceData16, ModelField::BleProData)
}

fn fast_pair_data() -> TemplateField {
    model(AdType::ServiceData16, ModelField::FastPairData)
}

fn limited() -> TemplateField {
    flags(AdFlags::LimitedDiscoverable)
}

/// Swift Pair application packet with an 11 or 9 character short name.
fn swift_pair_packet(name: NameLength, uuid_list: &[u16]) -> PacketTemplate {
    PacketTemplate::new(vec![
        limited(),
        app_appearance(),
        uuids(uuid_list),
        swift_pair(),
        short_name(name),
    ])
}

/// BLE Pro scan response with TX power and a 14 character name.
fn ble_pro_scan_response() -> PacketTemplate {
    PacketTemplate::new(vec![ble_pro_data(), tx_power(), complete_name(NameLength::Chars14)])
}

fn tx_and_name14() -> PacketTemplate {
    PacketTemplate::new(vec![tx_power(), complete_name(NameLength::Chars14)])
}

fn name17() -> PacketTemplate {
    PacketTemplate::new(vec![complete_name(NameLength::Chars17)])
}

fn bootloader_ble_pro_packet() -> PacketTemplate {
    PacketTemplate::new(vec![
        limited(),
        boot_appearance(),
        complete_name(NameLength::Full),
        uuids(&[UUID_BLE_PRO]),
    ])
}

struct Row {
    interval: AdvertisingInterval,
    pdu_type: PduType,
    start_s: f64,
    stop_s: f64,
    window: Window,
}

const fn undirected(interval: AdvertisingInterval, start_s: f64, stop_s: f64, window: Window) -> Row {
    Row {
        interval,
        pdu_type: PduType::ConnectableUndirected,
        start_s,
        stop_s,
        window,
    }
}

const fn directed(interval: AdvertisingInterval, start_s: f64, stop_s: f64, window: Window) -> Row {
    Row {
        interval,
        pdu_type: PduType::ConnectableDirected,
        start_s,
        stop_s,
        window,
    }
}

impl CatalogSeries {
    /// Every catalog series in name order.
    pub const ALL: [CatalogSeries; 21] = [
        CatalogSeries::A,
        CatalogSeries::B,
        CatalogSeries::C,
        CatalogSeries::D,
        CatalogSeries::E,
        CatalogSeries::F,
        CatalogSeries::G,
        CatalogSeries::H,
        CatalogSeries::I,
        CatalogSeries::J,
        CatalogSeries::K,
        CatalogSeries::L,
        CatalogSeries::M,
        CatalogSeries::N,
        CatalogSeries::O,
        CatalogSeries::P,
        CatalogSeries::Q,
        CatalogSeries::R,
        CatalogSeries::S,
        CatalogSeries::T,
        CatalogSeries::U,
    ];

    /// Series name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CatalogSeries::A => "A",
            CatalogSeries::B => "B",
            CatalogSeries::C => "C",
            CatalogSeries::D => "D",
            CatalogSeries::E => "E",
            CatalogSeries::F => "F",
            CatalogSeries::G => "G",
            CatalogSeries::H => "H",
            CatalogSeries::I => "I",
            CatalogSeries::J => "J",
            CatalogSeries::K => "K",
            CatalogSeries::L => "L",
            CatalogSeries::M => "M",
            CatalogSeries::N => "N",
            CatalogSeries::O => "O",
            CatalogSeries::P => "P",
            CatalogSeries::Q => "Q",
            CatalogSeries::R => "R",
            CatalogSeries::S => "S",
            CatalogSeries::T => "T",
            CatalogSeries::U => "U",
        }
    }

    fn row(self) -> Row {
        use AdvertisingInterval as Iv;
        match self {
            CatalogSeries::A => undirected(Iv::SHORT, START, EARLY, Window::INTERLACED_ALTERNATING),
            CatalogSeries::B => undirected(Iv::LONG, SECOND_INTERLACED, STANDARD, Window::INTERLACED_ALTERNATING),
            CatalogSeries::C => undirected(Iv::LONG, INTERLACED, STANDARD, Window::INTERLACED_ALTERNATING),
            CatalogSeries::D => directed(Iv::HighDutyCycle, START, STANDARD, Window::PREPARING),
            CatalogSeries::E => undirected(Iv::SHORT, START, EARLY, Window::Continuous),
            CatalogSeries::F => undirected(Iv::LONG, SECOND, STANDARD, Window::Continuous),
            CatalogSeries::G => directed(
                Iv::HighDutyCycle,
                START,
                RECONNECTION,
                Window::RECONNECTION_HIGH_DUTY_CYCLE,
            ),
            CatalogSeries::H => undirected(Iv::EXTRA_SHORT, START, RECONNECTION, Window::Continuous),
            CatalogSeries::I => directed(Iv::HighDutyCycle, START, END_FAST_BOOTLOADER, Window::Continuous),
            CatalogSeries::J => directed(
                Iv::EXTRA_SHORT,
                FAST_SECOND_BOOTLOADER,
                END_SLOW_BOOTLOADER,
                Window::BOOTLOADER_ALTERNATING_LONG,
            ),
            CatalogSeries::K => directed(
                Iv::HighDutyCycle,
                SLOW_SECOND_BOOTLOADER,
                END_SLOW_BOOTLOADER,
                Window::BOOTLOADER_ALTERNATING_SHORT,
            ),
            CatalogSeries::L => undirected(Iv::LONG, START, STANDARD, Window::Continuous),
            CatalogSeries::M => undirected(Iv::LONG, THIRD_BOOTLOADER, END_SLOW_BOOTLOADER, Window::Continuous),
            CatalogSeries::N => undirected(Iv::LONG, START, STANDARD, Window::Continuous),
            CatalogSeries::O => undirected(Iv::LONG, THIRD_BOOTLOADER, END_SLOW_BOOTLOADER, Window::Continuous),
            CatalogSeries::P => undirected(Iv::LONG, INTERLACED, STANDARD, Window::INTERLACED_ALTERNATING),
            CatalogSeries::Q => undirected(Iv::SHORT, START, EARLY, Window::Continuous),
            CatalogSeries::R => undirected(Iv::LONG, SECOND, STANDARD, Window::Continuous),
            CatalogSeries::S => undirected(Iv::LONG, START, STANDARD, Window::INTERLACED_ALTERNATING),
            CatalogSeries::T => undirected(Iv::LONG, START, STANDARD, Window::Continuous),
            CatalogSeries::U => undirected(Iv::LONG, START, STANDARD, Window::Continuous),
        }
    }

    fn templates(self) -> (PacketTemplate, PacketTemplate) {
        match self {
            CatalogSeries::A | CatalogSeries::B => {
                (swift_pair_packet(NameLength::Chars11, &[UUID_HID]), name17())
            }
            CatalogSeries::C => (
                PacketTemplate::new(vec![limited(), uuids(&[UUID_BLE_PRO]), tx_power(), fast_pair_data()]),
                PacketTemplate::new(vec![ble_pro_data(), complete_name(NameLength::Chars17)]),
            ),
            CatalogSeries::D
            | CatalogSeries::G
            | CatalogSeries::I
            | CatalogSeries::J
            | CatalogSeries::K => (PacketTemplate::empty(), PacketTemplate::empty()),
            CatalogSeries::E | CatalogSeries::F => (
                swift_pair_packet(NameLength::Chars9, &[UUID_HID, UUID_BLE_PRO]),
                ble_pro_scan_response(),
            ),
            CatalogSeries::H => (
                PacketTemplate::new(vec![
                    flags(AdFlags::NonDiscoverable),
                    app_appearance(),
                    uuids(&[UUID_HID, UUID_BLE_PRO]),
                    short_name(NameLength::Chars9),
                ]),
                ble_pro_scan_response(),
            ),
            CatalogSeries::L | CatalogSeries::M => (
                bootloader_ble_pro_packet(),
                PacketTemplate::new(vec![ble_pro_data(), tx_power()]),
            ),
            CatalogSeries::N => (
                PacketTemplate::new(vec![limited(), boot_appearance(), complete_name(NameLength::Full)]),
                PacketTemplate::new(vec![tx_power()]),
            ),
            CatalogSeries::O => (
                PacketTemplate::new(vec![limited(), tx_power(), fast_pair_data()]),
                PacketTemplate::new(vec![tx_power()]),
            ),
            CatalogSeries::P => (
                PacketTemplate::new(vec![limited(), boot_appearance(), complete_name(NameLength::Full)]),
                name17(),
            ),
            CatalogSeries::Q | CatalogSeries::R => {
                (swift_pair_packet(NameLength::Chars9, &[UUID_HID]), tx_and_name14())
            }
            CatalogSeries::S => (
                PacketTemplate::new(vec![
                    limited(),
                    app_appearance(),
                    uuids(&[UUID_HID]),
                    short_name(NameLength::Chars11),
                ]),
                name17(),
            ),
            CatalogSeries::T => (
                PacketTemplate::new(vec![
                    limited(),
                    app_appearance(),
                    uuids(&[UUID_HID, UUID_BLE_PRO]),
                    short_name(NameLength::Chars9),
                ]),
                ble_pro_scan_response(),
            ),
            CatalogSeries::U => (
                PacketTemplate::new(vec![
                    limited(),
                    app_appearance(),
                    uuids(&[UUID_HID]),
                    short_name(NameLength::Chars9),
                ]),
                tx_and_name14(),
            ),
        }
    }

    /// Full definition of this series.
    #[must_use]
    pub fn definition(self) -> SeriesDefinition {
        let row = self.row();
        let (packet_template, scan_response_template) = self.templates();
        SeriesDefinition {
            name: self.name().to_string(),
            start_s: row.start_s,
            stop_s: row.stop_s,
            interval: row.interval,
            window: row.window,
            packet_template,
            scan_response_template,
            pdu_type: row.pdu_type,
            // A overshoots its stop time while the prepairing series overlaps it; known firmware issue
            stop_exempt_when_overlapped: matches!(self, CatalogSeries::A),
        }
    }

    /// Definitions for a list of series, order preserved.
    #[must_use]
    pub fn definitions(series: &[CatalogSeries]) -> Vec<SeriesDefinition> {
        series.iter().map(|s| s.definition()).collect()
    }

    /// Parse a comma-separated list such as `"A,B,C"`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSeries`] for an unknown name and
    /// [`CatalogError::DuplicateSeries`] when a name repeats.
    pub fn parse_list(list: &str) -> Result<Vec<CatalogSeries>, CatalogError> {
        let mut out: Vec<CatalogSeries> = Vec::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let series: CatalogSeries = name.parse()?;
            if out.contains(&series) {
                return Err(CatalogError::DuplicateSeries(series.name().to_string()));
            }
            out.push(series);
        }
        Ok(out)
    }
}

impl fmt::Display for CatalogSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogSeries {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogSeries::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::unknown_series(s))
    }
}
