//! RC oscillator calibration sequence for the AS3935 driver.
//!
//! The sensor trims its timer (TRCO) and system (SRCO) RC oscillators against
//! the antenna's LC oscillator, so the antenna should be tuned first. The
//! sequence is idempotent and may be repeated when it reports a failure.

use embedded_hal::delay::DelayNs;

use crate::error::Result;
use crate::field::{
    self, Field, DISPLAY_TRCO, SRCO_CALIB_DONE, SRCO_CALIB_NOK, TRCO_CALIB_DONE, TRCO_CALIB_NOK,
};
use crate::interface::As3935Interface;
use crate::registers::{DIRECT_COMMAND, REG_CALIB_RCO};

/// Time the TRCO must stay routed to IRQ for the trim to settle, in milliseconds.
pub const CALIBRATION_SETTLE_MS: u32 = 2;

/// Status of one RC oscillator after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStatus {
    /// `CALIB_DONE`, the trim has completed.
    pub done: bool,
    /// `CALIB_NOK`, the trim was unsuccessful.
    pub failed: bool,
}

impl CalibrationStatus {
    /// Returns `true` when the oscillator reports a successful trim.
    pub fn calibrated(self) -> bool {
        !self.failed
    }
}

/// Result produced by the calibration routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    /// Status read back from `CALIB_TRCO`.
    pub trco: CalibrationStatus,
    /// Status read back from `CALIB_SRCO`.
    pub srco: CalibrationStatus,
}

impl CalibrationReport {
    /// Indicates whether both oscillators report a successful trim.
    pub fn passed(&self) -> bool {
        self.trco.calibrated() && self.srco.calibrated()
    }
}

/// Executes the oscillator calibration sequence as described in the datasheet.
///
/// Sends the `CALIB_RCO` direct command, routes the TRCO to IRQ for
/// [`CALIBRATION_SETTLE_MS`], then reads back both status registers.
pub fn run_calibration<IFACE>(
    interface: &mut IFACE,
    delay: &mut impl DelayNs,
) -> Result<CalibrationReport, IFACE::Error>
where
    IFACE: As3935Interface,
{
    interface.write_register(REG_CALIB_RCO, DIRECT_COMMAND)?;

    field::write_field(interface, DISPLAY_TRCO, 1)?;
    delay.delay_ms(CALIBRATION_SETTLE_MS);
    field::write_field(interface, DISPLAY_TRCO, 0)?;

    let trco = read_status(interface, TRCO_CALIB_DONE, TRCO_CALIB_NOK)?;
    let srco = read_status(interface, SRCO_CALIB_DONE, SRCO_CALIB_NOK)?;
    let report = CalibrationReport { trco, srco };

    debug!("oscillator calibration passed: {=bool}", report.passed());
    Ok(report)
}

// Both flags live in the same status register, one read covers them.
fn read_status<IFACE>(
    interface: &mut IFACE,
    done: Field,
    failed: Field,
) -> Result<CalibrationStatus, IFACE::Error>
where
    IFACE: As3935Interface,
{
    debug_assert_eq!(done.register(), failed.register());
    let raw = interface.read_register(done.register())?;
    Ok(CalibrationStatus {
        done: done.extract(raw) == 1,
        failed: failed.extract(raw) == 1,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::interface::Binding;
    use crate::registers::{REG_CALIB_SRCO, REG_CALIB_TRCO, REG_FREQ_DISP_IRQ};
    use crate::testing::FakeInterface;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Write(u8, u8),
        Delay(u32),
    }

    /// Register file that records writes on a timeline shared with [`TimelineDelay`].
    struct TimelineInterface<'a> {
        fake: FakeInterface,
        timeline: &'a RefCell<Vec<Step>>,
    }

    impl As3935Interface for TimelineInterface<'_> {
        type Error = Infallible;

        fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Infallible> {
            self.timeline.borrow_mut().push(Step::Write(register, value));
            self.fake.write_register(register, value)
        }

        fn read_register(&mut self, register: u8) -> core::result::Result<u8, Infallible> {
            self.fake.read_register(register)
        }

        fn probe(&mut self) -> core::result::Result<bool, Infallible> {
            self.fake.probe()
        }

        fn binding(&self) -> Binding {
            self.fake.binding()
        }
    }

    struct TimelineDelay<'a> {
        timeline: &'a RefCell<Vec<Step>>,
    }

    impl DelayNs for TimelineDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.timeline.borrow_mut().push(Step::Delay(ns));
        }
    }

    fn delay_ns_within(steps: &[Step]) -> u64 {
        steps
            .iter()
            .map(|step| match step {
                Step::Delay(ns) => u64::from(*ns),
                Step::Write(..) => 0,
            })
            .sum()
    }

    #[test]
    fn passes_when_both_oscillators_calibrated() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_CALIB_TRCO as usize] = 0x80;
        fake.registers[REG_CALIB_SRCO as usize] = 0x80;

        let report = run_calibration(&mut fake, &mut NoopDelay::new()).unwrap();

        assert!(report.passed());
        assert!(report.trco.done);
        assert!(report.srco.done);
    }

    #[test]
    fn fails_when_either_oscillator_reports_nok() {
        for (trco, srco) in [(0xC0, 0x80), (0x80, 0xC0), (0x40, 0x40)] {
            let mut fake = FakeInterface::new();
            fake.registers[REG_CALIB_TRCO as usize] = trco;
            fake.registers[REG_CALIB_SRCO as usize] = srco;

            let report = run_calibration(&mut fake, &mut NoopDelay::new()).unwrap();
            assert!(!report.passed(), "trco = {trco:#x}, srco = {srco:#x}");
        }
    }

    #[test]
    fn status_decodes_done_and_nok_bits_only() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_CALIB_TRCO as usize] = 0x3F;
        fake.registers[REG_CALIB_SRCO as usize] = 0xFF;

        let report = run_calibration(&mut fake, &mut NoopDelay::new()).unwrap();

        assert_eq!(
            report.trco,
            CalibrationStatus {
                done: false,
                failed: false,
            }
        );
        assert_eq!(
            report.srco,
            CalibrationStatus {
                done: true,
                failed: true,
            }
        );
    }

    #[test]
    fn sequence_orders_command_display_and_readback() {
        let mut fake = FakeInterface::new();
        fake.registers[REG_FREQ_DISP_IRQ as usize] = 0x07;

        run_calibration(&mut fake, &mut NoopDelay::new()).unwrap();

        assert_eq!(
            fake.writes(),
            &[
                (REG_CALIB_RCO, DIRECT_COMMAND),
                (REG_FREQ_DISP_IRQ, 0x27),
                (REG_FREQ_DISP_IRQ, 0x07),
            ]
        );
        assert_eq!(
            fake.read_log(),
            &[REG_FREQ_DISP_IRQ, REG_FREQ_DISP_IRQ, REG_CALIB_TRCO, REG_CALIB_SRCO]
        );
    }

    #[test]
    fn settle_delay_sits_between_trco_display_on_and_off() {
        let timeline = RefCell::new(Vec::new());
        let mut fake = FakeInterface::new();
        fake.registers[REG_FREQ_DISP_IRQ as usize] = 0x07;
        let mut interface = TimelineInterface {
            fake,
            timeline: &timeline,
        };
        let mut delay = TimelineDelay {
            timeline: &timeline,
        };

        run_calibration(&mut interface, &mut delay).unwrap();

        let steps = timeline.take();
        let on = steps
            .iter()
            .position(|step| *step == Step::Write(REG_FREQ_DISP_IRQ, 0x27))
            .unwrap();
        let off = steps
            .iter()
            .position(|step| *step == Step::Write(REG_FREQ_DISP_IRQ, 0x07))
            .unwrap();

        assert!(on < off);
        assert!(delay_ns_within(&steps[on..off]) >= 2_000_000);
        assert_eq!(delay_ns_within(&steps[..on]), 0);
        assert_eq!(delay_ns_within(&steps[off..]), 0);
    }
}
