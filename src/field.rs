//! Register field catalog and the masked read-modify-write engine.
//!
//! Every configurable setting of the AS3935 is a bit-range inside one 8-bit
//! register. A [`Field`] names that range; [`write_field`] and [`read_field`]
//! move values in and out of it without disturbing the neighbouring bits.
//! The catalog is checked at compile time: masks are derived from offset and
//! width, and no two fields of the same register may overlap.

use crate::error::{Error, Result};
use crate::interface::As3935Interface;
use crate::registers::{
    REG_AFE_GAIN, REG_CALIB_SRCO, REG_CALIB_TRCO, REG_DISTANCE, REG_ENERGY_LSB, REG_ENERGY_MMSB,
    REG_ENERGY_MSB, REG_FREQ_DISP_IRQ, REG_INT_MASK_ANT, REG_LIGHTNING, REG_MAX, REG_THRESHOLD,
};

/// A named bit-range within one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    register: u8,
    mask: u8,
    offset: u8,
    width: u8,
}

impl Field {
    /// Declares a field of `width` bits starting at bit `offset` of `register`.
    ///
    /// Panics during const evaluation when the range does not fit the
    /// register or the register lies outside the sensor's address space.
    pub const fn new(register: u8, offset: u8, width: u8) -> Self {
        assert!(register <= REG_MAX, "register outside the AS3935 address space");
        assert!(width >= 1, "field must be at least one bit wide");
        assert!(offset < 8 && width <= 8 - offset, "field does not fit an 8-bit register");

        let mask = (((1u16 << width) - 1) << offset) as u8;
        Self {
            register,
            mask,
            offset,
            width,
        }
    }

    /// Register address holding the field.
    pub const fn register(self) -> u8 {
        self.register
    }

    /// Bits of the register covered by the field.
    pub const fn mask(self) -> u8 {
        self.mask
    }

    /// Position of the least significant bit of the field.
    pub const fn offset(self) -> u8 {
        self.offset
    }

    /// Number of bits in the field.
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Largest raw value the field can hold.
    pub const fn max_value(self) -> u8 {
        self.mask >> self.offset
    }

    /// Returns `true` when `value` fits in the field.
    pub const fn accepts(self, value: u8) -> bool {
        value <= self.max_value()
    }

    /// Replaces the field bits of `current` with `value`.
    ///
    /// `value` must fit the field; extra high bits are discarded rather than
    /// spilling into the neighbouring fields.
    pub const fn insert(self, current: u8, value: u8) -> u8 {
        (current & !self.mask) | ((value << self.offset) & self.mask)
    }

    /// Extracts the field value from a raw register byte.
    pub const fn extract(self, raw: u8) -> u8 {
        (raw & self.mask) >> self.offset
    }

    /// Returns `true` when both fields share at least one bit of the same register.
    pub const fn overlaps(self, other: Field) -> bool {
        self.register == other.register && self.mask & other.mask != 0
    }
}

/// `PWD`, power-down (`0x00[0]`).
pub const POWER_DOWN: Field = Field::new(REG_AFE_GAIN, 0, 1);
/// `AFE_GB`, analog front-end gain boost (`0x00[5:1]`).
pub const AFE_GAIN: Field = Field::new(REG_AFE_GAIN, 1, 5);
/// `WDTH`, watchdog threshold (`0x01[3:0]`).
pub const WATCHDOG_THRESHOLD: Field = Field::new(REG_THRESHOLD, 0, 4);
/// `NF_LEV`, noise floor level (`0x01[6:4]`).
pub const NOISE_FLOOR: Field = Field::new(REG_THRESHOLD, 4, 3);
/// `SREJ`, spike rejection (`0x02[3:0]`).
pub const SPIKE_REJECTION: Field = Field::new(REG_LIGHTNING, 0, 4);
/// `MIN_NUM_LIGH`, minimum number of strikes (`0x02[5:4]`).
pub const MIN_NUM_LIGHTNING: Field = Field::new(REG_LIGHTNING, 4, 2);
/// `CL_STAT`, clear statistics (`0x02[6]`).
pub const CLEAR_STATISTICS: Field = Field::new(REG_LIGHTNING, 6, 1);
/// `INT`, interrupt source (`0x03[3:0]`).
pub const INTERRUPT: Field = Field::new(REG_INT_MASK_ANT, 0, 4);
/// `MASK_DIST`, disturber mask (`0x03[5]`).
pub const MASK_DISTURBER: Field = Field::new(REG_INT_MASK_ANT, 5, 1);
/// `LCO_FDIV`, antenna frequency division ratio (`0x03[7:6]`).
pub const DIVISION_RATIO: Field = Field::new(REG_INT_MASK_ANT, 6, 2);
/// `S_LIG_L`, energy bits 7:0 (`0x04`).
pub const ENERGY_LSB: Field = Field::new(REG_ENERGY_LSB, 0, 8);
/// `S_LIG_M`, energy bits 15:8 (`0x05`).
pub const ENERGY_MSB: Field = Field::new(REG_ENERGY_MSB, 0, 8);
/// `S_LIG_MM`, energy bits 20:16 (`0x06[4:0]`).
pub const ENERGY_MMSB: Field = Field::new(REG_ENERGY_MMSB, 0, 5);
/// `DISTANCE`, estimated distance to the storm front (`0x07[5:0]`).
pub const DISTANCE: Field = Field::new(REG_DISTANCE, 0, 6);
/// `TUN_CAP`, internal tuning capacitors (`0x08[3:0]`).
pub const TUNING_CAP: Field = Field::new(REG_FREQ_DISP_IRQ, 0, 4);
/// `DISP_TRCO`, route the timer RC oscillator to IRQ (`0x08[5]`).
pub const DISPLAY_TRCO: Field = Field::new(REG_FREQ_DISP_IRQ, 5, 1);
/// `DISP_SRCO`, route the system RC oscillator to IRQ (`0x08[6]`).
pub const DISPLAY_SRCO: Field = Field::new(REG_FREQ_DISP_IRQ, 6, 1);
/// `DISP_LCO`, route the antenna LC oscillator to IRQ (`0x08[7]`).
pub const DISPLAY_LCO: Field = Field::new(REG_FREQ_DISP_IRQ, 7, 1);
/// `TRCO_CALIB_NOK` (`0x3A[6]`).
pub const TRCO_CALIB_NOK: Field = Field::new(REG_CALIB_TRCO, 6, 1);
/// `TRCO_CALIB_DONE` (`0x3A[7]`).
pub const TRCO_CALIB_DONE: Field = Field::new(REG_CALIB_TRCO, 7, 1);
/// `SRCO_CALIB_NOK` (`0x3B[6]`).
pub const SRCO_CALIB_NOK: Field = Field::new(REG_CALIB_SRCO, 6, 1);
/// `SRCO_CALIB_DONE` (`0x3B[7]`).
pub const SRCO_CALIB_DONE: Field = Field::new(REG_CALIB_SRCO, 7, 1);

/// Every field of the catalog.
pub const FIELDS: [Field; 22] = [
    POWER_DOWN,
    AFE_GAIN,
    WATCHDOG_THRESHOLD,
    NOISE_FLOOR,
    SPIKE_REJECTION,
    MIN_NUM_LIGHTNING,
    CLEAR_STATISTICS,
    INTERRUPT,
    MASK_DISTURBER,
    DIVISION_RATIO,
    ENERGY_LSB,
    ENERGY_MSB,
    ENERGY_MMSB,
    DISTANCE,
    TUNING_CAP,
    DISPLAY_TRCO,
    DISPLAY_SRCO,
    DISPLAY_LCO,
    TRCO_CALIB_NOK,
    TRCO_CALIB_DONE,
    SRCO_CALIB_NOK,
    SRCO_CALIB_DONE,
];

/// Returns `true` when no two fields in `fields` overlap.
pub const fn disjoint(fields: &[Field]) -> bool {
    let mut i = 0;
    while i < fields.len() {
        let mut j = i + 1;
        while j < fields.len() {
            if fields[i].overlaps(fields[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(disjoint(&FIELDS), "overlapping fields in the register catalog");

/// Writes `value` into `field` with a read-modify-write cycle.
///
/// The register is read, the field bits are replaced and the byte is always
/// written back, even when it did not change. Values wider than the field are
/// rejected before the bus is touched.
pub fn write_field<IFACE>(interface: &mut IFACE, field: Field, value: u8) -> Result<(), IFACE::Error>
where
    IFACE: As3935Interface,
{
    if !field.accepts(value) {
        return Err(Error::InvalidValue);
    }

    let current = interface.read_register(field.register)?;
    let updated = field.insert(current, value);
    trace!("write reg {=u8:#x}: {=u8:#x} -> {=u8:#x}", field.register, current, updated);
    interface.write_register(field.register, updated)?;
    Ok(())
}

/// Reads the value of `field`.
pub fn read_field<IFACE>(interface: &mut IFACE, field: Field) -> Result<u8, IFACE::Error>
where
    IFACE: As3935Interface,
{
    let raw = interface.read_register(field.register)?;
    Ok(field.extract(raw))
}

/// Assembles the raw lightning energy from its three registers.
///
/// Registers are read from most to least significant.
pub fn read_energy<IFACE>(interface: &mut IFACE) -> Result<u32, IFACE::Error>
where
    IFACE: As3935Interface,
{
    let mmsb = read_field(interface, ENERGY_MMSB)? as u32;
    let msb = read_field(interface, ENERGY_MSB)? as u32;
    let lsb = read_field(interface, ENERGY_LSB)? as u32;
    Ok((mmsb << 16) | (msb << 8) | lsb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeInterface;

    const SURROUNDINGS: [u8; 6] = [0x00, 0xFF, 0xA5, 0x5A, 0x0F, 0xF0];

    // xorshift8, enough to vary the untouched bits between iterations.
    fn next(state: &mut u8) -> u8 {
        *state ^= *state << 3;
        *state ^= *state >> 5;
        *state ^= *state << 1;
        *state
    }

    #[test]
    fn masks_cover_exactly_offset_and_width() {
        for field in FIELDS {
            let expected = (0..field.width()).fold(0u8, |acc, bit| acc | 1 << (field.offset() + bit));
            assert_eq!(field.mask(), expected, "{field:?}");
            assert_eq!(field.max_value() as u16, (1u16 << field.width()) - 1);
        }
    }

    #[test]
    #[should_panic(expected = "field does not fit")]
    fn oversized_offset_is_refused_at_runtime() {
        let offset = core::hint::black_box(255);
        let _ = Field::new(REG_AFE_GAIN, offset, 1);
    }

    #[test]
    #[should_panic(expected = "field does not fit")]
    fn oversized_width_is_refused_at_runtime() {
        let width = core::hint::black_box(250);
        let _ = Field::new(REG_AFE_GAIN, 7, width);
    }

    #[test]
    fn widest_ranges_still_fit() {
        assert_eq!(Field::new(REG_AFE_GAIN, 0, 8).mask(), 0xFF);
        assert_eq!(Field::new(REG_AFE_GAIN, 7, 1).mask(), 0x80);
    }

    #[test]
    fn catalog_is_disjoint_and_detects_overlap() {
        assert!(disjoint(&FIELDS));
        assert!(!disjoint(&[NOISE_FLOOR, Field::new(REG_THRESHOLD, 3, 2)]));
        assert!(disjoint(&[NOISE_FLOOR, Field::new(REG_LIGHTNING, 4, 3)]));
    }

    #[test]
    fn set_then_get_round_trips_and_preserves_neighbours() {
        let mut seed = 0x5D;
        for field in FIELDS {
            for value in 0..=field.max_value() {
                let mut patterns = SURROUNDINGS;
                patterns[0] = next(&mut seed);
                for before in patterns {
                    let mut fake = FakeInterface::new();
                    fake.registers[field.register() as usize] = before;

                    write_field(&mut fake, field, value).unwrap();
                    let after = fake.registers[field.register() as usize];

                    assert_eq!(read_field(&mut fake, field).unwrap(), value, "{field:?}");
                    assert_eq!(after & !field.mask(), before & !field.mask(), "{field:?}");
                }
            }
        }
    }

    #[test]
    fn write_always_stores_even_when_unchanged() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_LIGHTNING as usize] = 0b0100_0010;

        write_field(&mut fake, CLEAR_STATISTICS, 1).unwrap();

        assert_eq!(fake.writes(), &[(REG_LIGHTNING, 0b0100_0010)]);
    }

    #[test]
    fn oversized_value_is_rejected_without_bus_traffic() {
        let mut fake = FakeInterface::new();

        assert_eq!(write_field(&mut fake, NOISE_FLOOR, 8), Err(Error::InvalidValue));
        assert_eq!(write_field(&mut fake, POWER_DOWN, 2), Err(Error::InvalidValue));
        assert_eq!(fake.reads(), 0);
        assert!(fake.writes().is_empty());
    }

    #[test]
    fn insert_never_spills_outside_mask() {
        assert_eq!(MIN_NUM_LIGHTNING.insert(0x00, 0xFF), 0b0011_0000);
        assert_eq!(AFE_GAIN.insert(0b1100_0001, 0b1_0010), 0b1110_0101);
    }

    #[test]
    fn energy_is_assembled_from_three_registers() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_ENERGY_LSB as usize] = 0xAB;
        fake.registers[REG_ENERGY_MSB as usize] = 0xCD;
        fake.registers[REG_ENERGY_MMSB as usize] = 0xEE;

        assert_eq!(read_energy(&mut fake).unwrap(), 0x0ECDAB);
        assert_eq!(
            fake.read_log(),
            &[REG_ENERGY_MMSB, REG_ENERGY_MSB, REG_ENERGY_LSB]
        );
    }

    #[test]
    fn energy_with_nibble_only() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_ENERGY_LSB as usize] = 0xAB;
        fake.registers[REG_ENERGY_MSB as usize] = 0xCD;
        fake.registers[REG_ENERGY_MMSB as usize] = 0x0E;

        assert_eq!(read_energy(&mut fake).unwrap(), (0x0E << 16) | (0xCD << 8) | 0xAB);
    }
}
