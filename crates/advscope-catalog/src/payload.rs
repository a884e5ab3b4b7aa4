//! Building payload bytes from templates.

use advscope_errors::CatalogError;
use serde::{Deserialize, Serialize};

use crate::ad::{AdStructure, encode_ad_structures};
use crate::template::{FieldContent, ModelField, PacketTemplate, UUID_BLE_PRO, UUID_FAST_PAIR};

/// Turns a packet template into the bytes the DUT is expected to send.
pub trait PayloadBuilder {
    /// Build the payload for `template`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when a template field cannot be resolved.
    fn build(&self, template: &PacketTemplate) -> Result<Vec<u8>, CatalogError>;
}

impl<T: PayloadBuilder + ?Sized> PayloadBuilder for &T {
    fn build(&self, template: &PacketTemplate) -> Result<Vec<u8>, CatalogError> {
        (**self).build(template)
    }
}

/// Identity fields carried in the BLE Pro service data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleProIdentity {
    /// Protocol type
    pub protocol_type: u8,
    /// BLE Pro feature version
    pub feature_version: u8,
    /// Device state
    pub device_state: u8,
    /// Bluetooth product id
    pub bluetooth_pid: u16,
    /// Authentication method
    pub authentication: u8,
    /// Device type, 4 bits
    pub device_type: u8,
    /// Extended model id
    pub extended_model_id: u8,
}

impl Default for BleProIdentity {
    fn default() -> Self {
        Self {
            protocol_type: 0x10,
            feature_version: 0,
            device_state: 0,
            bluetooth_pid: 0,
            authentication: 0,
            device_type: 0,
            extended_model_id: 0,
        }
    }
}

/// Model-specific values needed to build a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Marketing name
    pub name: String,
    /// Advertised TX power in dBm
    pub tx_power_dbm: i8,
    /// GAP appearance while running the application
    pub appearance: u16,
    /// Fast Pair model id (3 bytes)
    pub fast_pair_model_id: Vec<u8>,
    /// BLE Pro identity
    pub ble_pro: BleProIdentity,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            tx_power_dbm: 0,
            // generic HID
            appearance: 0x03C0,
            fast_pair_model_id: Vec::new(),
            ble_pro: BleProIdentity::default(),
        }
    }
}

/// Default [`PayloadBuilder`]: encodes a template for one device profile.
#[derive(Debug, Clone, Default)]
pub struct TemplatePayloadBuilder {
    profile: DeviceProfile,
}

impl TemplatePayloadBuilder {
    /// Create a builder for `profile`.
    #[must_use]
    pub fn new(profile: DeviceProfile) -> Self {
        Self { profile }
    }

    /// The profile in use.
    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Resolve a template into AD structures.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidProfileField`] for a profile value that
    /// cannot be encoded.
    pub fn structures(&self, template: &PacketTemplate) -> Result<Vec<AdStructure>, CatalogError> {
        template
            .fields
            .iter()
            .map(|field| {
                let data = self.value(&field.content)?;
                Ok(AdStructure::new(field.ad_type.code(), data))
            })
            .collect()
    }

    fn value(&self, content: &FieldContent) -> Result<Vec<u8>, CatalogError> {
        match content {
            FieldContent::Flags(flags) => Ok(vec![*flags as u8]),
            FieldContent::Uuids16(list) => Ok(list.iter().flat_map(|u| u.to_le_bytes()).collect()),
            FieldContent::Constant(bytes) => Ok(bytes.clone()),
            FieldContent::Model(field) => self.model_value(*field),
        }
    }

    fn model_value(&self, field: ModelField) -> Result<Vec<u8>, CatalogError> {
        let p = &self.profile;
        match field {
            ModelField::Name(length) => {
                let name: String = match length.max_chars() {
                    Some(n) => p.name.chars().take(n).collect(),
                    None => p.name.clone(),
                };
                Ok(name.into_bytes())
            }
            ModelField::TxPower => Ok(p.tx_power_dbm.to_le_bytes().to_vec()),
            ModelField::ApplicationAppearance => Ok(p.appearance.to_le_bytes().to_vec()),
            ModelField::BootloaderAppearance => Ok(vec![0x00, 0x00]),
            ModelField::FastPairData => {
                let mut data = UUID_FAST_PAIR.to_le_bytes().to_vec();
                data.extend_from_slice(&p.fast_pair_model_id);
                Ok(data)
            }
            ModelField::BleProData => {
                let id = &p.ble_pro;
                if id.device_type >= 0x10 {
                    return Err(CatalogError::invalid_profile_field(
                        "ble_pro.device_type",
                        format!("{:#04x} does not fit in 4 bits", id.device_type),
                    ));
                }
                let mut data = UUID_BLE_PRO.to_le_bytes().to_vec();
                data.extend_from_slice(&[id.protocol_type, id.feature_version, id.device_state]);
                data.extend_from_slice(&id.bluetooth_pid.to_le_bytes());
                data.extend_from_slice(&[id.authentication, id.device_type, id.extended_model_id]);
                Ok(data)
            }
        }
    }
}

impl PayloadBuilder for TemplatePayloadBuilder {
    fn build(&self, template: &PacketTemplate) -> Result<Vec<u8>, CatalogError> {
        encode_ad_structures(&self.structures(template)?)
    }
}
