//! NZXT HUE 2 accessory identifiers.
//!
//! Accessories report a one-byte id. Ids missing from the table are kept as
//! [`Hue2Accessory::Unknown`] so that they still round-trip and compare.

use std::fmt;

/// Accessories with a known id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownAccessory {
    HuePlusLedStrip,
    AerRgb1Fan,
    Hue2LedStrip300,
    Hue2LedStrip250,
    Hue2LedStrip200,
    Hue2CableComb,
    Hue2Underglow300,
    Hue2Underglow200,
    AerRgb2_120,
    AerRgb2_140,
    KrakenXGen4Ring,
    KrakenXGen4Logo,
}

impl KnownAccessory {
    pub const ALL: [KnownAccessory; 12] = [
        KnownAccessory::HuePlusLedStrip,
        KnownAccessory::AerRgb1Fan,
        KnownAccessory::Hue2LedStrip300,
        KnownAccessory::Hue2LedStrip250,
        KnownAccessory::Hue2LedStrip200,
        KnownAccessory::Hue2CableComb,
        KnownAccessory::Hue2Underglow300,
        KnownAccessory::Hue2Underglow200,
        KnownAccessory::AerRgb2_120,
        KnownAccessory::AerRgb2_140,
        KnownAccessory::KrakenXGen4Ring,
        KnownAccessory::KrakenXGen4Logo,
    ];

    /// (id, identifier, display name)
    const fn details(self) -> (u8, &'static str, &'static str) {
        match self {
            KnownAccessory::HuePlusLedStrip => (0x01, "HUE_PLUS_LED_STRIP", "HUE+ LED Strip"),
            KnownAccessory::AerRgb1Fan => (0x02, "AER_RGB1_FAN", "AER RGB 1"),
            KnownAccessory::Hue2LedStrip300 => {
                (0x04, "HUE2_LED_STRIP_300", "HUE 2 LED Strip 300 mm")
            }
            KnownAccessory::Hue2LedStrip250 => {
                (0x05, "HUE2_LED_STRIP_250", "HUE 2 LED Strip 250 mm")
            }
            KnownAccessory::Hue2LedStrip200 => {
                (0x06, "HUE2_LED_STRIP_200", "HUE 2 LED Strip 200 mm")
            }
            KnownAccessory::Hue2CableComb => (0x07, "HUE2_CABLE_COMB", "HUE 2 Cable Comb"),
            KnownAccessory::Hue2Underglow300 => {
                (0x09, "HUE2_UNDERGLOW_300", "HUE 2 Underglow 300 mm")
            }
            KnownAccessory::Hue2Underglow200 => {
                (0x0a, "HUE2_UNDERGLOW_200", "HUE 2 Underglow 200 mm")
            }
            KnownAccessory::AerRgb2_120 => (0x0b, "AER_RGB2_120", "AER RGB 2 120 mm"),
            KnownAccessory::AerRgb2_140 => (0x0c, "AER_RGB2_140", "AER RGB 2 140 mm"),
            KnownAccessory::KrakenXGen4Ring => (
                0x10,
                "KRAKENX_GEN4_RING",
                "Kraken X (X53, X63 or X73) Pump Ring",
            ),
            KnownAccessory::KrakenXGen4Logo => (
                0x11,
                "KRAKENX_GEN4_LOGO",
                "Kraken X (X53, X63 or X73) Pump Logo",
            ),
        }
    }

    pub const fn id(self) -> u8 {
        self.details().0
    }

    pub const fn identifier(self) -> &'static str {
        self.details().1
    }

    pub const fn name(self) -> &'static str {
        self.details().2
    }
}

/// An accessory attached to a HUE 2 lighting channel.
#[derive(Debug, Clone, Copy, Eq)]
pub enum Hue2Accessory {
    Known(KnownAccessory),
    Unknown(u8),
}

impl Hue2Accessory {
    /// Map a raw accessory id.
    pub fn from_id(id: u8) -> Self {
        KnownAccessory::ALL
            .into_iter()
            .find(|known| known.id() == id)
            .map_or(Hue2Accessory::Unknown(id), Hue2Accessory::Known)
    }

    pub fn id(&self) -> u8 {
        match self {
            Hue2Accessory::Known(known) => known.id(),
            Hue2Accessory::Unknown(id) => *id,
        }
    }

    /// Identifier, e.g. `HUE2_LED_STRIP_300` or `UNKNOWN_59`.
    pub fn identifier(&self) -> String {
        match self {
            Hue2Accessory::Known(known) => known.identifier().to_string(),
            Hue2Accessory::Unknown(id) => format!("UNKNOWN_{}", id),
        }
    }

    /// Display name, "Unknown" for ids missing from the table.
    pub fn name(&self) -> &'static str {
        match self {
            Hue2Accessory::Known(known) => known.name(),
            Hue2Accessory::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for Hue2Accessory {
    fn from(id: u8) -> Self {
        Self::from_id(id)
    }
}

impl PartialEq for Hue2Accessory {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Display for Hue2Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_accessory() {
        let accessory = Hue2Accessory::from_id(4);
        assert_eq!(accessory, Hue2Accessory::Known(KnownAccessory::Hue2LedStrip300));
        assert_eq!(accessory.to_string(), "HUE 2 LED Strip 300 mm");
        assert_eq!(accessory.identifier(), "HUE2_LED_STRIP_300");
        assert_eq!(accessory.id(), 4);
    }

    #[test]
    fn test_unknown_accessory() {
        let accessory = Hue2Accessory::from(59);
        assert_eq!(accessory, Hue2Accessory::Unknown(59));
        assert_eq!(accessory.to_string(), "Unknown");
        assert_eq!(accessory.identifier(), "UNKNOWN_59");
        assert_ne!(accessory, Hue2Accessory::from(58));
    }

    #[test]
    fn test_every_known_id_round_trips() {
        for known in KnownAccessory::ALL {
            assert_eq!(Hue2Accessory::from_id(known.id()), Hue2Accessory::Known(known));
        }
    }

    #[test]
    fn test_known_ids_are_distinct() {
        for (i, a) in KnownAccessory::ALL.iter().enumerate() {
            for b in &KnownAccessory::ALL[i + 1..] {
                assert_ne!(a.id(), b.id());
                assert_ne!(a.identifier(), b.identifier());
            }
        }
        assert_eq!(KnownAccessory::HuePlusLedStrip.id(), 0x01);
        assert_eq!(KnownAccessory::KrakenXGen4Logo.id(), 0x11);
    }
}
