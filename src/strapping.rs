
use {
    crate::{
        chipset::{Chipset, Family},
        ports::{DIP0, DVP0, DVP1, DiPort, FPDP_HIGH, FPDP_LOW, LVDS1, LVDS2},
        regs::{RegisterIo, save_registers, sr},
        utils::bitflags::BitflagsExt,
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum StrappingError {
    #[error("DIP0 is strapped for a TV encoder, not a TMDS transmitter")]
    Dip0NotTmds,
    #[error("None of the external ports is strapped for a TMDS transmitter")]
    NoTmdsPort,
    #[error("DVP1 is strapped as a capture port")]
    Dvp1Capture,
}

/// Flat panels wired to the chipset according to its pin strapping.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PanelStrapping {
    pub fp1: Option<DiPort>,
    pub fp2: Option<DiPort>,
}

/// Runs `f` with SR5A[0] set so that SR12 and SR13 expose the alternate
/// strapping bits.
fn with_alternate_strapping<T>(io: &dyn RegisterIo, f: impl FnOnce() -> T) -> T {
    let _restore = save_registers(io, &[sr(0x5a)]);
    io.mask_seq(0x5a, 0x01, 0x01);
    f()
}

/// Runs `f` with SR5A[0] cleared so that SR12 and SR13 expose the primary
/// strapping bits.
fn with_primary_strapping<T>(io: &dyn RegisterIo, f: impl FnOnce() -> T) -> T {
    let _restore = save_registers(io, &[sr(0x5a)]);
    io.mask_seq(0x5a, 0x00, 0x01);
    f()
}

pub fn probe_panels(chipset: Chipset, io: &dyn RegisterIo, nano_book: bool) -> PanelStrapping {
    let sr12 = io.read_seq(0x12);
    let sr13 = io.read_seq(0x13);
    let cr3b = io.read_crtc(0x3b);
    log::debug!("SR12: 0x{:02x} SR13: 0x{:02x} CR3B: 0x{:02x}", sr12, sr13, cr3b);
    let single = |port| PanelStrapping {
        fp1: Some(port),
        fp2: None,
    };
    let res = match chipset.family() {
        Family::CastleRock => {
            if sr12.contains(0x10) || cr3b.contains(0x08) {
                single(DIP0)
            } else {
                PanelStrapping::default()
            }
        }
        Family::Km400 => {
            // SR13[3]: AGP pins are used by the flat panel port.
            if sr13.contains(0x08) && cr3b.contains(0x02) {
                single(FPDP_HIGH | FPDP_LOW)
            } else {
                PanelStrapping::default()
            }
        }
        Family::P4m890 => {
            if !cr3b.contains(0x02) {
                PanelStrapping::default()
            } else if sr12.contains(0x10) {
                single(FPDP_LOW | FPDP_HIGH)
            } else {
                single(FPDP_LOW)
            }
        }
        Family::Integrated => {
            let sr13 = with_alternate_strapping(io, || io.read_seq(0x13));
            log::debug!("Alternate SR13: 0x{:02x}", sr13);
            if !cr3b.contains(0x02) {
                PanelStrapping::default()
            } else if nano_book {
                PanelStrapping {
                    fp1: None,
                    fp2: Some(LVDS2),
                }
            } else {
                // SR13[7:6]: integrated LVDS / DVI mode select.
                match sr13 >> 6 {
                    0b00 => PanelStrapping {
                        fp1: Some(LVDS1),
                        fp2: Some(LVDS2),
                    },
                    0b01 => PanelStrapping {
                        fp1: None,
                        fp2: Some(LVDS2),
                    },
                    0b10 => single(LVDS1 | LVDS2),
                    _ => PanelStrapping::default(),
                }
            }
        }
    };
    log::info!(
        "Flat panel strapping: FP1 {}, FP2 {}",
        res.fp1.unwrap_or(DiPort::NONE),
        res.fp2.unwrap_or(DiPort::NONE),
    );
    res
}

/// The digital port an external TMDS transmitter is wired to.
pub fn tmds_port(chipset: Chipset, io: &dyn RegisterIo) -> Result<DiPort, StrappingError> {
    let read = || (io.read_seq(0x12), io.read_seq(0x13));
    let (sr12, sr13) = match chipset.family() {
        Family::Integrated => with_primary_strapping(io, read),
        _ => read(),
    };
    log::debug!("SR12: 0x{:02x} SR13: 0x{:02x}", sr12, sr13);
    let dvp0 = sr12.contains(0x40) && !sr12.contains(0x20);
    match chipset.family() {
        // SR12[5]: DIP0 is used by a TV encoder.
        Family::CastleRock if !sr12.contains(0x20) => Ok(DIP0),
        Family::CastleRock => Err(StrappingError::Dip0NotTmds),
        Family::Km400 if dvp0 => Ok(DVP0),
        Family::Km400 if sr13.contains(0x08) && !sr12.contains(0x10) => Ok(FPDP_LOW),
        Family::P4m890 if dvp0 => Ok(DVP0),
        Family::P4m890 if !sr12.contains(0x10) => Ok(FPDP_LOW),
        Family::Km400 | Family::P4m890 => Err(StrappingError::NoTmdsPort),
        // SR13[6]: DVP1 is used as a capture port.
        Family::Integrated if !sr13.contains(0x40) => Ok(DVP1),
        Family::Integrated => Err(StrappingError::Dvp1Capture),
    }
}
