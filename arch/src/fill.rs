use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Value of unused ROM bytes, searched for when placing dynamic blocks and
/// written back when erasing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum FillByte {
    Zero = 0x00,
    #[default]
    Full = 0xFF,
}

impl FillByte {
    pub fn byte(self) -> u8 {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_byte() {
        assert_eq!(FillByte::try_from(0x00), Ok(FillByte::Zero));
        assert_eq!(FillByte::try_from(0xFF), Ok(FillByte::Full));
        assert!(FillByte::try_from(0x12).is_err());
        assert_eq!(FillByte::default().byte(), 0xFF);
    }
}
