//! Packet templates.
//!
//! A template lists, in order, the AD structures a payload carries. Some
//! values are fixed (flags, UUID lists, the Swift Pair beacon); others depend
//! on the device model and are resolved by a [`PayloadBuilder`](crate::PayloadBuilder).

use core::fmt;

use serde::{Deserialize, Serialize};

/// AD type codes used by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AdType {
    /// Flags
    Flags = 0x01,
    /// Complete list of 16-bit service UUIDs
    Complete16BitServiceUuids = 0x03,
    /// Shortened local name
    ShortenedLocalName = 0x08,
    /// Complete local name
    CompleteLocalName = 0x09,
    /// TX power level
    TxPowerLevel = 0x0A,
    /// Service data, 16-bit UUID
    ServiceData16 = 0x16,
    /// Appearance
    Appearance = 0x19,
    /// Manufacturer specific data
    ManufacturerSpecificData = 0xFF,
}

impl AdType {
    /// Raw AD type byte.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a known AD type.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(AdType::Flags),
            0x03 => Some(AdType::Complete16BitServiceUuids),
            0x08 => Some(AdType::ShortenedLocalName),
            0x09 => Some(AdType::CompleteLocalName),
            0x0A => Some(AdType::TxPowerLevel),
            0x16 => Some(AdType::ServiceData16),
            0x19 => Some(AdType::Appearance),
            0xFF => Some(AdType::ManufacturerSpecificData),
            _ => None,
        }
    }
}

/// Discoverability flags byte (BR/EDR not supported is always set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AdFlags {
    /// LE limited discoverable
    LimitedDiscoverable = 0x05,
    /// LE general discoverable
    GeneralDiscoverable = 0x06,
    /// Not discoverable
    NonDiscoverable = 0x04,
}

/// Maximum name length carried by a name field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameLength {
    /// First 9 characters
    Chars9,
    /// First 11 characters
    Chars11,
    /// First 14 characters
    Chars14,
    /// First 17 characters
    Chars17,
    /// Whole name
    Full,
}

impl NameLength {
    /// Character budget, `None` for the full name.
    #[must_use]
    pub const fn max_chars(self) -> Option<usize> {
        match self {
            NameLength::Chars9 => Some(9),
            NameLength::Chars11 => Some(11),
            NameLength::Chars14 => Some(14),
            NameLength::Chars17 => Some(17),
            NameLength::Full => None,
        }
    }
}

/// A field whose value depends on the device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelField {
    /// Device name truncated to a length
    Name(NameLength),
    /// TX power level
    TxPower,
    /// Appearance while running the application
    ApplicationAppearance,
    /// Appearance while in bootloader (always zero)
    BootloaderAppearance,
    /// Fast Pair service data
    FastPairData,
    /// BLE Pro service data
    BleProData,
}

/// Content of one AD structure in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldContent {
    /// Flags byte
    Flags(AdFlags),
    /// Model-specific value
    Model(ModelField),
    /// List of 16-bit UUIDs, encoded little-endian
    Uuids16(Vec<u16>),
    /// Fixed bytes
    Constant(Vec<u8>),
}

/// One AD structure of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateField {
    /// AD type
    pub ad_type: AdType,
    /// Value description
    pub content: FieldContent,
}

impl TemplateField {
    /// Create a field.
    #[must_use]
    pub const fn new(ad_type: AdType, content: FieldContent) -> Self {
        Self { ad_type, content }
    }
}

/// Ordered list of AD structures making up a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketTemplate {
    /// Fields in transmission order
    pub fields: Vec<TemplateField>,
}

/// Human Interface Device service.
pub const UUID_HID: u16 = 0x1812;

/// BLE Pro service.
pub const UUID_BLE_PRO: u16 = 0xFD72;

/// Fast Pair service.
pub const UUID_FAST_PAIR: u16 = 0xFE2C;

/// Swift Pair manufacturer-specific beacon.
pub const SWIFT_PAIR_BEACON: [u8; 5] = [0x06, 0x00, 0x03, 0x00, 0x80];

impl PacketTemplate {
    /// Empty template, used by directed advertising.
    #[must_use]
    pub const fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a template from fields.
    #[must_use]
    pub fn new(fields: Vec<TemplateField>) -> Self {
        Self { fields }
    }

    /// Whether the template carries no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields carrying 16-bit service data, in order.
    pub fn service_data_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields
            .iter()
            .filter(|f| f.ad_type == AdType::ServiceData16)
    }
}

impl fmt::Display for PacketTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "(empty)");
        }
        let mut first = true;
        for field in &self.fields {
            if !first {
                write!(f, " | ")?;
            }
            first = false;
            write!(f, "{:#04x}", field.ad_type.code())?;
        }
        Ok(())
    }
}
