//! The PIE TYPE flag register.
//!
//! The engine parses TYPE as a decimal-digit-encoded multi-field register,
//! not a bitmask: each flag contributes a fixed additive weight at a decimal
//! digit position that does not overlap the others. The weight table must
//! not be "cleaned up" into powers of two.

use serde::Deserialize;

/// Weight of each flag inside the TYPE register.
const W_ADR_OFF: u32 = 1;
const W_ADR_ON: u32 = 2;
const W_PMR: u32 = 4;
const W_ROLL: u32 = 10;
const W_PITCH: u32 = 20;
const W_RESERVED: u32 = 200;
const W_STRETCH: u32 = 1000;
const W_TC_MASK: u32 = 10000;

/// Boolean rendering/physics flags combined into the TYPE register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeFlags {
    pub adr_off: bool,
    pub adr_on: bool,
    pub pmr: bool,
    pub roll: bool,
    pub pitch: bool,
    pub reserved: bool,
    pub stretch: bool,
    pub tc_mask: bool,
}

impl TypeFlags {
    /// Combine the flags into the decimal-digit TYPE register.
    pub fn mask(self) -> u32 {
        let mut result = 0;

        if self.adr_off {
            result += W_ADR_OFF;
        }
        if self.adr_on {
            result += W_ADR_ON;
        }
        if self.pmr {
            result += W_PMR;
        }
        if self.roll {
            result += W_ROLL;
        }
        if self.pitch {
            result += W_PITCH;
        }
        if self.reserved {
            result += W_RESERVED;
        }
        if self.stretch {
            result += W_STRETCH;
        }
        if self.tc_mask {
            result += W_TC_MASK;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_are_zero() {
        assert_eq!(TypeFlags::default().mask(), 0);
    }

    #[test]
    fn decimal_digit_positions_not_bitwise() {
        // pmr + stretch land in different decimal digits: 4 + 1000, not 4 | 8.
        let flags = TypeFlags {
            pmr: true,
            stretch: true,
            ..TypeFlags::default()
        };
        assert_eq!(flags.mask(), 1004);
    }

    #[test]
    fn all_flags_sum_weights() {
        let flags = TypeFlags {
            adr_off: true,
            adr_on: true,
            pmr: true,
            roll: true,
            pitch: true,
            reserved: true,
            stretch: true,
            tc_mask: true,
        };
        assert_eq!(flags.mask(), 11237);
    }

    #[test]
    fn roll_and_pitch_share_the_tens_digit() {
        let flags = TypeFlags {
            roll: true,
            pitch: true,
            ..TypeFlags::default()
        };
        assert_eq!(flags.mask(), 30);
    }
}
