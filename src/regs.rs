
use {
    chrome_algorithms::scale::CrtcWrite,
    run_on_drop::on_drop,
    smallvec::SmallVec,
    std::fmt::{Display, Formatter},
};

/// Input status register 0. `LOAD_SENSE` reports the DAC comparator.
pub const INPUT_STATUS_0: u16 = 0x3c2;

pub const LOAD_SENSE: u8 = 0x20;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Bank {
    Seq,
    Crtc,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Reg {
    pub bank: Bank,
    pub index: u8,
}

pub const fn sr(index: u8) -> Reg {
    Reg {
        bank: Bank::Seq,
        index,
    }
}

pub const fn cr(index: u8) -> Reg {
    Reg {
        bank: Bank::Crtc,
        index,
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.bank {
            Bank::Seq => "SR",
            Bank::Crtc => "CR",
        };
        write!(f, "{}{:02X}", prefix, self.index)
    }
}

/// Access to the indexed sequencer and CRTC registers of the graphics
/// core. Implemented by the host.
///
/// The façade is not reentrant. All users share one instance and run on the
/// host's control thread.
pub trait RegisterIo {
    fn read_seq(&self, index: u8) -> u8;
    fn write_seq(&self, index: u8, value: u8);
    fn read_crtc(&self, index: u8) -> u8;
    fn write_crtc(&self, index: u8, value: u8);
    fn read_port(&self, port: u16) -> u8;

    fn mask_seq(&self, index: u8, value: u8, mask: u8) {
        let old = self.read_seq(index);
        self.write_seq(index, (old & !mask) | (value & mask));
    }

    fn mask_crtc(&self, index: u8, value: u8, mask: u8) {
        let old = self.read_crtc(index);
        self.write_crtc(index, (old & !mask) | (value & mask));
    }

    fn read(&self, reg: Reg) -> u8 {
        match reg.bank {
            Bank::Seq => self.read_seq(reg.index),
            Bank::Crtc => self.read_crtc(reg.index),
        }
    }

    fn write(&self, reg: Reg, value: u8) {
        match reg.bank {
            Bank::Seq => self.write_seq(reg.index, value),
            Bank::Crtc => self.write_crtc(reg.index, value),
        }
    }

    fn mask(&self, reg: Reg, value: u8, mask: u8) {
        match reg.bank {
            Bank::Seq => self.mask_seq(reg.index, value, mask),
            Bank::Crtc => self.mask_crtc(reg.index, value, mask),
        }
    }

    fn apply_crtc_writes(&self, writes: &[CrtcWrite]) {
        for w in writes {
            self.mask_crtc(w.index, w.value, w.mask);
        }
    }
}

/// Snapshots `regs` and returns a guard that writes the snapshot back when
/// it goes out of scope. Registers are restored in reverse order.
#[must_use]
pub fn save_registers<'a>(io: &'a dyn RegisterIo, regs: &[Reg]) -> impl Sized + 'a {
    let saved: SmallVec<[(Reg, u8); 4]> = regs.iter().map(|&r| (r, io.read(r))).collect();
    on_drop(move || {
        for &(reg, value) in saved.iter().rev() {
            io.write(reg, value);
        }
    })
}
