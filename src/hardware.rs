//! Pin assignments for the Pico board.

use embassy_rp::gpio::{self, Level};
use embassy_time::Delay;

use crate::shift_register::{BusTiming, ShiftRegisterBus};

/// The register bus as wired on the board.
pub type BoardBus = ShiftRegisterBus<gpio::Output<'static>, Delay>;

pub struct Hardware {
    /// DATA on GP4, LATCH on GP5, CLOCK on GP6.
    pub bus: BoardBus,
    /// Register output enable (GP3), active low. Held low for the life of the program.
    pub output_enable: gpio::Output<'static>,
    /// Tube supply enable (GP7). Starts off; raise it only after the tubes are blanked.
    pub high_voltage: gpio::Output<'static>,
    /// PIR sensor on GP10.
    pub motion: gpio::Input<'static>,
}

impl Default for Hardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let output_enable = gpio::Output::new(peripherals.PIN_3, Level::Low);

        let bus = ShiftRegisterBus::new(
            gpio::Output::new(peripherals.PIN_4, Level::Low),
            gpio::Output::new(peripherals.PIN_6, Level::Low),
            gpio::Output::new(peripherals.PIN_5, Level::Low),
            Delay,
            BusTiming::default(),
        );

        let high_voltage = gpio::Output::new(peripherals.PIN_7, Level::Low);

        let motion = gpio::Input::new(peripherals.PIN_10, gpio::Pull::Down);

        Self {
            bus,
            output_enable,
            high_voltage,
            motion,
        }
    }
}
