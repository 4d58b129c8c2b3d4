use serde::{Deserialize, Serialize};
use std::fmt;

/// A ROM offset with the hardware bank bias stripped.
///
/// Scripts may write either form (`0x800000` or `0x08800000`); both normalize
/// to the same offset and compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pointer(u32);

impl Pointer {
    /// Bias added to a ROM offset to form the address the hardware sees.
    pub const BANK_BIAS: u32 = 0x0800_0000;

    /// Offsets at or above this are not ROM offsets and are never biased.
    pub const ROM_CEILING: u32 = 0x0200_0000;

    /// Normalizes a value taken from source or from a decoded parameter.
    pub fn from_raw(raw: u32) -> Self {
        if raw >= Self::BANK_BIAS {
            Pointer(raw - Self::BANK_BIAS)
        } else {
            Pointer(raw)
        }
    }

    pub fn offset(self) -> u32 {
        self.0
    }

    /// Wire form of the pointer.
    pub fn to_raw(self, autobank: bool) -> u32 {
        if autobank && self.0 < Self::ROM_CEILING {
            self.0 + Self::BANK_BIAS
        } else {
            self.0
        }
    }

    pub fn to_bytes(self, autobank: bool) -> [u8; 4] {
        self.to_raw(autobank).to_le_bytes()
    }

    /// True when the raw value lies in the ROM bank window, i.e. it can be
    /// followed into the image.
    pub fn is_rom(raw: u32) -> bool {
        (Self::BANK_BIAS..Self::BANK_BIAS + Self::ROM_CEILING).contains(&raw)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl From<u32> for Pointer {
    fn from(raw: u32) -> Self {
        Pointer::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_autobank() {
        for offset in [0, 1, 0x80_0000, 0x72_0000, 0x01FF_FFFF] {
            let bytes = Pointer::from_raw(offset).to_bytes(true);
            assert_eq!(Pointer::from_raw(u32::from_le_bytes(bytes)).offset(), offset);
        }
    }

    #[test]
    fn strips_bias() {
        assert_eq!(Pointer::from_raw(0x0880_0000).offset(), 0x80_0000);
        assert_eq!(Pointer::from_raw(0x0880_0000), Pointer::from_raw(0x80_0000));
    }

    #[test]
    fn no_autobank() {
        assert_eq!(Pointer::from_raw(0x80_0000).to_raw(false), 0x80_0000);
        assert_eq!(Pointer::from_raw(0x0880_0000).to_raw(false), 0x80_0000);
    }

    #[test]
    fn ram_untouched() {
        assert_eq!(Pointer::from_raw(0x0203_0000).to_raw(true), 0x0203_0000);
        assert!(!Pointer::is_rom(0x0203_0000));
        assert!(Pointer::is_rom(0x0880_0000));
    }
}
