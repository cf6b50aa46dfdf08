//! Flat panel power sequencing.
//!
//! Every sequence powers the panel up in a fixed rail order and powers it
//! down in exactly the reverse order. The backlight is always the last
//! thing switched on and the first thing switched off. Sequences are
//! open-loop: delays are fixed and the hardware is never polled.


use {
    crate::{
        device::Sleeper,
        regs::{Reg, RegisterIo, cr},
    },
    std::time::Duration,
};

/// Delay from enabling the sequencer to VDD.
pub const TD0_US: u64 = 200;
/// Delay from VDD to panel data.
pub const TD1_US: u64 = 25;
/// Delay from panel data to VEE.
pub const TD2_US: u64 = 0;
/// Delay from VEE to the backlight.
pub const TD3_US: u64 = 25;

/// A masked register write followed by a delay.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Step {
    pub reg: Reg,
    pub value: u8,
    pub mask: u8,
    pub delay_us: u64,
}

const fn step(reg: Reg, value: u8, mask: u8, delay_us: u64) -> Step {
    Step {
        reg,
        value,
        mask,
        delay_us,
    }
}

pub fn run_steps(io: &dyn RegisterIo, delay: &dyn Sleeper, steps: &[Step]) {
    for s in steps {
        io.mask(s.reg, s.value, s.mask);
        log::trace!(
            "{:?} 0x{:02x}: 0x{:02x}/0x{:02x}, wait {}us",
            s.reg.bank,
            s.reg.index,
            s.value,
            s.mask,
            s.delay_us,
        );
        if s.delay_us > 0 {
            delay.sleep(Duration::from_micros(s.delay_us));
        }
    }
}

/// CLE266 software sequence. CR6A[3] gates panel power, CR91[4:1] drive
/// the rails.
const CASTLE_ROCK_ON: [Step; 4] = [
    step(cr(0x6a), 0x08, 0x08, 0),
    step(cr(0x91), 0x10, 0x10, 25),
    step(cr(0x91), 0x08, 0x08, 510),
    step(cr(0x91), 0x06, 0x06, 1),
];

const CASTLE_ROCK_OFF: [Step; 4] = [
    step(cr(0x6a), 0x00, 0x08, 0),
    step(cr(0x91), 0x00, 0x06, 210),
    step(cr(0x91), 0x00, 0x08, 25),
    step(cr(0x91), 0x00, 0x10, 1),
];

pub fn castle_rock(io: &dyn RegisterIo, delay: &dyn Sleeper, on: bool) {
    let steps = if on { &CASTLE_ROCK_ON } else { &CASTLE_ROCK_OFF };
    run_steps(io, delay, steps);
    log::info!("Flat panel power (CLE266 sequence): {}", on_off(on));
}

/// Hardware sequencer of the primary panel interface. CR91[0] cleared
/// hands the ramp to the chip, CR6A[3] starts it, CR91[7] and CR91[6]
/// gate the display period and the backlight (0 = on).
const HARDWARE_ON: [Step; 4] = [
    step(cr(0x91), 0x00, 0x01, 0),
    step(cr(0x6a), 0x08, 0x08, 0),
    step(cr(0x91), 0x00, 0x80, 0),
    step(cr(0x91), 0x00, 0x40, 0),
];

const HARDWARE_OFF: [Step; 4] = [
    step(cr(0x91), 0x00, 0x01, 0),
    step(cr(0x91), 0x40, 0x40, 0),
    step(cr(0x91), 0x80, 0x80, 1),
    step(cr(0x6a), 0x00, 0x08, 0),
];

pub fn hardware_assisted(io: &dyn RegisterIo, delay: &dyn Sleeper, on: bool) {
    let steps = if on { &HARDWARE_ON } else { &HARDWARE_OFF };
    run_steps(io, delay, steps);
    log::info!("Flat panel power (hardware sequence): {}", on_off(on));
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rail {
    Sequencer,
    Vdd,
    Data,
    Vee,
    Backlight,
}

const RAILS: [(Rail, u8); 5] = [
    (Rail::Sequencer, 0x01),
    (Rail::Vdd, 0x10),
    (Rail::Data, 0x08),
    (Rail::Vee, 0x04),
    (Rail::Backlight, 0x02),
];

/// `RAIL_GAPS_US[i]` separates `RAILS[i]` from `RAILS[i + 1]`.
const RAIL_GAPS_US: [u64; 4] = [TD0_US, TD1_US, TD2_US, TD3_US];

/// Integrated LVDS transmitter channels with software rail control.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LvdsChannel {
    First,
    Second,
}

impl LvdsChannel {
    fn rail_reg(self) -> Reg {
        match self {
            LvdsChannel::First => cr(0x91),
            LvdsChannel::Second => cr(0xd3),
        }
    }

    /// Write that puts the channel under software control.
    fn software_control(self) -> Step {
        match self {
            LvdsChannel::First => step(cr(0x91), 0x00, 0x80, 0),
            LvdsChannel::Second => step(cr(0xd4), 0x00, 0x02, 0),
        }
    }
}

/// Register program that drives the rails of `channel` up or down.
pub fn software_rail_steps(channel: LvdsChannel, on: bool) -> Vec<Step> {
    let reg = channel.rail_reg();
    let mut steps = vec![];
    if on {
        steps.push(channel.software_control());
        for (i, &(_, bit)) in RAILS.iter().enumerate() {
            let delay = RAIL_GAPS_US.get(i).copied().unwrap_or(0);
            steps.push(step(reg, bit, bit, delay));
        }
    } else {
        for i in (1..RAILS.len()).rev() {
            let (_, bit) = RAILS[i];
            let delay = if i > 1 { RAIL_GAPS_US[i - 1] } else { 0 };
            steps.push(step(reg, 0, bit, delay));
        }
    }
    steps
}

pub fn software_rails(io: &dyn RegisterIo, delay: &dyn Sleeper, channel: LvdsChannel, on: bool) {
    run_steps(io, delay, &software_rail_steps(channel, on));
    log::info!("{:?} LVDS rails: {}", channel, on_off(on));
}

fn on_off(on: bool) -> &'static str {
    match on {
        true => "on",
        false => "off",
    }
}
