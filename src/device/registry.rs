//! Static registry of supported devices.
//!
//! Every supported (vendor id, product id) pair maps to a constructor that
//! builds the cooling controller for that device family. The table is
//! compiled in and resolved by lookup, with no runtime discovery of drivers.

use std::fmt;

use crate::config::DEFAULT_CRITICAL_TEMPERATURE;
use crate::cooling::CoolingController;
use crate::error::{LiquidError, Result};
use crate::protocol::{KRAKEN_X2_PROFILE_TEMPS, ProfileSupport, SpeedChannel};
use crate::storage::{MemoryStorage, RuntimeStorage};

// =============================================================================
// Constants
// =============================================================================

/// NZXT Vendor ID.
pub const NZXT_VID: u16 = 0x1e71;

/// Corsair Vendor ID.
pub const CORSAIR_VID: u16 = 0x1b1c;

/// Asetek (EVGA CLC, NZXT Kraken gen2) Vendor ID.
pub const ASETEK_VID: u16 = 0x2433;

/// Seasonic (NZXT E-series PSU) Vendor ID.
pub const SEASONIC_VID: u16 = 0x7793;

const ASETEK_PROFILE_POINTS: usize = 6;
const PLATINUM_PROFILE_POINTS: usize = 7;

// =============================================================================
// Device Entry
// =============================================================================

/// A supported device and the constructor of its cooling controller.
#[derive(Clone, Copy)]
pub struct DeviceEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    pub description: &'static str,
    pub build: fn() -> CoolingController,
}

impl DeviceEntry {
    /// `vvvv:pppp` in hex.
    pub fn id(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// Runtime storage prefix, `vvvv_pppp` in hex.
    pub fn storage_prefix(&self) -> String {
        format!("{:04x}_{:04x}", self.vendor_id, self.product_id)
    }

    /// Build the controller, keeping the state of stateful devices in
    /// runtime storage between invocations.
    pub fn open(&self) -> Result<CoolingController> {
        let controller = (self.build)();
        if !controller.keeps_state() {
            return Ok(controller);
        }
        let store = RuntimeStorage::new(&[&self.storage_prefix()])?;
        Ok(controller.with_store(Box::new(store)))
    }
}

impl fmt::Debug for DeviceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceEntry")
            .field("id", &self.id())
            .field("description", &self.description)
            .finish()
    }
}

// =============================================================================
// Constructors
// =============================================================================

fn kraken_x2() -> CoolingController {
    CoolingController::new(
        DEFAULT_CRITICAL_TEMPERATURE,
        vec![
            SpeedChannel::new("fan", 25, 100, ProfileSupport::Sampled(&KRAKEN_X2_PROFILE_TEMPS)),
            SpeedChannel::new("pump", 50, 100, ProfileSupport::Sampled(&KRAKEN_X2_PROFILE_TEMPS)),
        ],
    )
}

// all fans are written in one message, so channel state is kept in a store
fn hydro_platinum() -> CoolingController {
    let fan = |name: &'static str| {
        SpeedChannel::new(name, 0, 100, ProfileSupport::Padded(PLATINUM_PROFILE_POINTS))
            .with_fixed_duty_mode()
    };
    CoolingController::new(DEFAULT_CRITICAL_TEMPERATURE, vec![fan("fan1"), fan("fan2")])
        .with_store(Box::new(MemoryStorage::new()))
}

fn asetek_690lc() -> CoolingController {
    CoolingController::new(
        DEFAULT_CRITICAL_TEMPERATURE,
        vec![
            SpeedChannel::new("fan", 0, 100, ProfileSupport::Padded(ASETEK_PROFILE_POINTS)),
            SpeedChannel::new("pump", 50, 100, ProfileSupport::FixedOnly),
        ],
    )
}

fn legacy_690lc() -> CoolingController {
    CoolingController::new(
        DEFAULT_CRITICAL_TEMPERATURE,
        vec![
            SpeedChannel::new("fan", 0, 100, ProfileSupport::FixedOnly),
            SpeedChannel::new("pump", 50, 100, ProfileSupport::FixedOnly),
        ],
    )
}

fn corsair_hxi() -> CoolingController {
    CoolingController::new(
        DEFAULT_CRITICAL_TEMPERATURE,
        vec![SpeedChannel::new("fan", 0, 100, ProfileSupport::FixedOnly)],
    )
}

fn no_cooling_control() -> CoolingController {
    CoolingController::new(DEFAULT_CRITICAL_TEMPERATURE, Vec::new())
}

// =============================================================================
// Registry
// =============================================================================

const fn entry(
    vendor_id: u16,
    product_id: u16,
    description: &'static str,
    build: fn() -> CoolingController,
) -> DeviceEntry {
    DeviceEntry {
        vendor_id,
        product_id,
        description,
        build,
    }
}

/// All supported devices.
///
/// The Asetek 690LC id is shared by the modern (EVGA CLC) and legacy
/// (NZXT Kraken X gen2) protocols; the modern entry comes first.
pub const SUPPORTED_DEVICES: &[DeviceEntry] = &[
    entry(NZXT_VID, 0x170e, "NZXT Kraken X (X42, X52, X62 or X72)", kraken_x2),
    entry(NZXT_VID, 0x1715, "NZXT Kraken M22", no_cooling_control),
    entry(CORSAIR_VID, 0x0c18, "Corsair H100i Platinum (experimental)", hydro_platinum),
    entry(CORSAIR_VID, 0x0c17, "Corsair H115i Platinum (experimental)", hydro_platinum),
    entry(CORSAIR_VID, 0x0c20, "Corsair H100i PRO XT (experimental)", hydro_platinum),
    entry(CORSAIR_VID, 0x0c21, "Corsair H115i PRO XT (experimental)", hydro_platinum),
    entry(ASETEK_VID, 0xb200, "Asetek 690LC (assuming EVGA CLC)", asetek_690lc),
    entry(
        ASETEK_VID,
        0xb200,
        "Asetek 690LC (assuming NZXT Kraken X) (experimental)",
        legacy_690lc,
    ),
    entry(CORSAIR_VID, 0x0c02, "Corsair Hydro H80i GT (experimental)", asetek_690lc),
    entry(CORSAIR_VID, 0x0c03, "Corsair Hydro H100i GTX (experimental)", asetek_690lc),
    entry(CORSAIR_VID, 0x0c07, "Corsair Hydro H110i GTX (experimental)", asetek_690lc),
    entry(CORSAIR_VID, 0x0c08, "Corsair Hydro H80i v2", asetek_690lc),
    entry(CORSAIR_VID, 0x0c09, "Corsair Hydro H100i v2", asetek_690lc),
    entry(CORSAIR_VID, 0x0c0a, "Corsair Hydro H115i", asetek_690lc),
    entry(CORSAIR_VID, 0x1c05, "Corsair HX750i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c06, "Corsair HX850i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c07, "Corsair HX1000i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c08, "Corsair HX1200i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c0a, "Corsair RM650i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c0b, "Corsair RM750i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c0c, "Corsair RM850i (experimental)", corsair_hxi),
    entry(CORSAIR_VID, 0x1c0d, "Corsair RM1000i (experimental)", corsair_hxi),
    entry(SEASONIC_VID, 0x5911, "NZXT E500 (experimental)", no_cooling_control),
    entry(SEASONIC_VID, 0x5912, "NZXT E650 (experimental)", no_cooling_control),
    entry(SEASONIC_VID, 0x2500, "NZXT E850 (experimental)", no_cooling_control),
];

/// All entries for a vendor/product id pair, in registry order.
pub fn matching(vendor_id: u16, product_id: u16) -> impl Iterator<Item = &'static DeviceEntry> {
    SUPPORTED_DEVICES
        .iter()
        .filter(move |e| e.vendor_id == vendor_id && e.product_id == product_id)
}

/// The entry for a vendor/product id pair; `pick` selects among shared ids.
pub fn find(vendor_id: u16, product_id: u16, pick: usize) -> Result<&'static DeviceEntry> {
    matching(vendor_id, product_id).nth(pick).ok_or_else(|| {
        LiquidError::InvalidInput(format!(
            "No supported device {:04x}:{:04x} (match #{})",
            vendor_id, product_id, pick
        ))
    })
}
