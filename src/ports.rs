
use {
    crate::regs::{RegisterIo, Reg, cr, sr},
    std::fmt::{Display, Formatter},
};

bitflags! {
    DiPort: u8;
    DIP0 = 1 << 0,
    DVP0 = 1 << 1,
    DVP1 = 1 << 2,
    FPDP_LOW = 1 << 3,
    FPDP_HIGH = 1 << 4,
    LVDS1 = 1 << 5,
    LVDS2 = 1 << 6,
}

const ALL_PORTS: [DiPort; 7] = [DIP0, DVP0, DVP1, FPDP_LOW, FPDP_HIGH, LVDS1, LVDS2];

impl DiPort {
    /// The individual ports contained in this set.
    pub fn iter(self) -> impl Iterator<Item = DiPort> {
        ALL_PORTS.into_iter().filter(move |p| self.contains(*p))
    }

    fn single_name(self) -> &'static str {
        match self {
            DIP0 => "DIP0",
            DVP0 => "DVP0",
            DVP1 => "DVP1",
            FPDP_LOW => "FPDP Low",
            FPDP_HIGH => "FPDP High",
            LVDS1 => "LVDS1",
            LVDS2 => "LVDS2",
            _ => "?",
        }
    }
}

impl Display for DiPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for p in self.iter() {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            f.write_str(p.single_name())?;
        }
        Ok(())
    }
}

/// One of the two independent display controllers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Iga {
    Iga1,
    Iga2,
}

impl Iga {
    pub fn from_index(index: u32) -> Self {
        match index & 1 {
            0 => Iga::Iga1,
            _ => Iga::Iga2,
        }
    }

    /// Value of the one-bit source select fields.
    pub fn bit(self) -> u8 {
        match self {
            Iga::Iga1 => 0,
            Iga::Iga2 => 1,
        }
    }
}

impl Display for Iga {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "IGA{}", self.bit() + 1)
    }
}

/// A bit field inside an indexed register.
#[derive(Copy, Clone, Debug)]
struct Field {
    reg: Reg,
    shift: u8,
    mask: u8,
}

const fn field(reg: Reg, shift: u8, width: u8) -> Field {
    Field {
        reg,
        shift,
        mask: (((1u16 << width) - 1) as u8) << shift,
    }
}

impl Field {
    fn set(self, io: &dyn RegisterIo, value: u8) {
        io.mask(self.reg, value << self.shift, self.mask);
    }
}

fn io_pad_field(port: DiPort) -> Option<Field> {
    let f = match port {
        DVP0 => field(sr(0x1e), 6, 2),
        DVP1 => field(sr(0x1e), 4, 2),
        FPDP_LOW => field(sr(0x2a), 2, 2),
        FPDP_HIGH => field(sr(0x2a), 0, 2),
        LVDS1 => field(sr(0x2a), 0, 2),
        LVDS2 => field(sr(0x2a), 2, 2),
        _ => return None,
    };
    Some(f)
}

fn display_source_field(port: DiPort) -> Option<Field> {
    let f = match port {
        DIP0 => field(cr(0x6c), 7, 1),
        DVP0 => field(cr(0x96), 4, 1),
        DVP1 => field(cr(0x9b), 4, 1),
        FPDP_LOW | LVDS1 => field(cr(0x99), 4, 1),
        FPDP_HIGH | LVDS2 => field(cr(0x97), 4, 1),
        _ => return None,
    };
    Some(f)
}

fn delay_tap_field(port: DiPort) -> Option<Field> {
    let f = match port {
        DVP0 => field(cr(0x96), 0, 4),
        DVP1 => field(cr(0x9b), 0, 4),
        FPDP_LOW | LVDS1 => field(cr(0x99), 0, 4),
        FPDP_HIGH | LVDS2 => field(cr(0x97), 0, 4),
        _ => return None,
    };
    Some(f)
}

/// Switches the I/O pads of every port in `ports`. `state` is the raw
/// two-bit pad setting, 0x03 being fully on.
pub fn set_io_pads(io: &dyn RegisterIo, ports: DiPort, state: u8) {
    for port in ports.iter() {
        if let Some(f) = io_pad_field(port) {
            f.set(io, state & 0x03);
            log::debug!("{} I/O pad state: 0x{:x}", port, state & 0x03);
        }
    }
}

pub fn set_display_source(io: &dyn RegisterIo, ports: DiPort, iga: Iga) {
    for port in ports.iter() {
        if let Some(f) = display_source_field(port) {
            f.set(io, iga.bit());
            log::info!("{} display output source: {}", port, iga);
        }
    }
}

pub fn set_delay_tap(io: &dyn RegisterIo, ports: DiPort, tap: u8) {
    for port in ports.iter() {
        if let Some(f) = delay_tap_field(port) {
            f.set(io, tap & 0x0f);
            log::info!("{} delay tap: {}", port, tap & 0x0f);
        }
    }
}

/// Power state of the integrated LVDS transmitters. CRD2[7] and CRD2[6]
/// power down LVDS1 and LVDS2 respectively.
pub fn set_lvds_power(io: &dyn RegisterIo, ports: DiPort, on: bool) {
    for port in ports.iter() {
        let bit = match port {
            LVDS1 => 0x80,
            LVDS2 => 0x40,
            _ => continue,
        };
        io.mask_crtc(0xd2, if on { 0 } else { bit }, bit);
        log::info!("{} power: {}", port, if on { "on" } else { "off" });
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LvdsFormat {
    Spwg,
    OpenLdi,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LvdsOutputFormat {
    Rotation,
    Sequential,
}

pub fn set_lvds_format(io: &dyn RegisterIo, ports: DiPort, format: LvdsFormat) {
    let v = (format == LvdsFormat::OpenLdi) as u8;
    for port in ports.iter() {
        let f = match port {
            LVDS1 => field(cr(0xd2), 1, 1),
            LVDS2 => field(cr(0xd2), 0, 1),
            _ => continue,
        };
        f.set(io, v);
        log::debug!("{} format: {:?}", port, format);
    }
}

pub fn set_lvds_output_format(io: &dyn RegisterIo, ports: DiPort, format: LvdsOutputFormat) {
    let v = (format == LvdsOutputFormat::Sequential) as u8;
    for port in ports.iter() {
        let f = match port {
            LVDS1 => field(cr(0x88), 6, 1),
            LVDS2 => field(cr(0xd4), 6, 1),
            _ => continue,
        };
        f.set(io, v);
        log::debug!("{} output format: {:?}", port, format);
    }
}

pub fn set_lvds_dithering(io: &dyn RegisterIo, ports: DiPort, dithering: bool) {
    for port in ports.iter() {
        let f = match port {
            LVDS1 => field(cr(0x88), 0, 1),
            LVDS2 => field(cr(0xd4), 0, 1),
            _ => continue,
        };
        f.set(io, dithering as u8);
        log::debug!(
            "{} dithering: {}",
            port,
            if dithering { "on (18 bit)" } else { "off (24 bit)" }
        );
    }
}

/// Clock pad drive strength of DVP0 and DVP1. Two bits, split across two
/// registers on DVP0.
pub fn set_clock_drive_strength(io: &dyn RegisterIo, port: DiPort, strength: u8) {
    match port {
        DVP0 => {
            io.mask_seq(0x1e, (strength & 0x01) << 2, 0x04);
            io.mask_seq(0x2a, (strength & 0x02) << 3, 0x10);
        }
        DVP1 => io.mask_seq(0x65, (strength & 0x03) << 2, 0x0c),
        _ => return,
    }
    log::debug!("{} clock drive strength: {}", port, strength & 0x03);
}

pub fn set_data_drive_strength(io: &dyn RegisterIo, port: DiPort, strength: u8) {
    match port {
        DVP0 => {
            io.mask_seq(0x1b, (strength & 0x01) << 1, 0x02);
            io.mask_seq(0x2a, (strength & 0x02) << 4, 0x20);
        }
        DVP1 => io.mask_seq(0x65, strength & 0x03, 0x03),
        _ => return,
    }
    log::debug!("{} data drive strength: {}", port, strength & 0x03);
}
