use {
    crate::{
        chipset::Chipset,
        config::Options,
        i2c::{BusId, I2cBus, I2cBuses},
        regs::RegisterIo,
    },
    std::{rc::Rc, time::Duration},
};

/// Blocking delays between hardware steps.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Whether the host's PLL can produce a pixel clock.
pub trait ClockSynthesizer {
    fn has_solution(&self, clock_khz: u32) -> bool;
}

/// A synthesizer that can produce any clock in an inclusive range.
#[derive(Copy, Clone, Debug)]
pub struct PllRange {
    pub min_khz: u32,
    pub max_khz: u32,
}

impl ClockSynthesizer for PllRange {
    fn has_solution(&self, clock_khz: u32) -> bool {
        (self.min_khz..=self.max_khz).contains(&clock_khz)
    }
}

/// Everything the outputs of one graphics device share.
pub struct Device {
    pub chipset: Chipset,
    pub regs: Rc<dyn RegisterIo>,
    pub delay: Rc<dyn Sleeper>,
    pub clocks: Rc<dyn ClockSynthesizer>,
    pub buses: I2cBuses,
    pub options: Options,
}

impl Device {
    pub fn bus(&self, id: BusId) -> Option<&Rc<dyn I2cBus>> {
        self.buses[id].as_ref()
    }

    pub fn io(&self) -> &dyn RegisterIo {
        &*self.regs
    }
}
