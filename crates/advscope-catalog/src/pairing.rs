//! Application-pairing series selection.

use core::fmt;

use advscope_errors::CatalogError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::CatalogSeries;
use crate::template::{AdType, FieldContent, ModelField};

/// Pairing extensions a product supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingCapabilities {
    /// Windows Swift Pair beacon
    pub swift_pair: bool,
    /// BLE Pro receiver pairing
    pub ble_pro: bool,
    /// Google Fast Pair
    pub fast_pair: bool,
}

impl fmt::Display for PairingCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.swift_pair {
            parts.push("Swift Pair");
        }
        if self.ble_pro {
            parts.push("BLE Pro");
        }
        if self.fast_pair {
            parts.push("Fast Pair");
        }
        if parts.is_empty() {
            write!(f, "no pairing extension")
        } else {
            write!(f, "{}", parts.join(" + "))
        }
    }
}

/// Series a device advertises in application pairing, lowest priority first.
///
/// Prepairing appends `D`. With BLE Pro enabled the selection is refused when
/// a scan response puts other service data before the BLE Pro service data,
/// which older receivers cannot parse.
///
/// # Errors
///
/// Returns [`CatalogError::UndefinedPairingConfiguration`] for Fast Pair
/// alone and [`CatalogError::IncompatibleServiceDataOrder`] for the check
/// above.
pub fn application_pairing_series(
    caps: PairingCapabilities,
    prepairing: bool,
) -> Result<Vec<CatalogSeries>, CatalogError> {
    use CatalogSeries::{A, B, C, D, E, F, P, Q, R, S, T, U};

    let mut series = match (caps.swift_pair, caps.ble_pro, caps.fast_pair) {
        (true, true, true) => vec![A, B, C],
        (true, true, false) => vec![E, F],
        (true, false, true) => vec![A, B, P],
        (true, false, false) => vec![Q, R],
        (false, true, true) => vec![S, C],
        (false, true, false) => vec![T],
        (false, false, true) => {
            return Err(CatalogError::UndefinedPairingConfiguration(caps.to_string()));
        }
        (false, false, false) => vec![U],
    };
    if prepairing {
        series.push(D);
    }

    if caps.ble_pro {
        for s in &series {
            check_service_data_order(*s)?;
        }
    }
    debug!(capabilities = %caps, prepairing, count = series.len(), "pairing series selected");
    Ok(series)
}

fn check_service_data_order(series: CatalogSeries) -> Result<(), CatalogError> {
    let def = series.definition();
    let mut leading: Option<&FieldContent> = None;
    for field in def
        .scan_response_template
        .fields
        .iter()
        .filter(|f| f.ad_type == AdType::ServiceData16)
    {
        if field.content == FieldContent::Model(ModelField::BleProData) {
            if let Some(found) = leading {
                return Err(CatalogError::IncompatibleServiceDataOrder {
                    series: def.name.clone(),
                    found: format!("{found:?}"),
                });
            }
        } else if leading.is_none() {
            leading = Some(&field.content);
        }
    }
    Ok(())
}
