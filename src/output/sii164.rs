use {
    crate::{
        detect::{DetectChain, DetectionResult, MonitorIdentity, TmdsSenseProbe},
        device::Device,
        i2c::{I2cBus, I2cDevice, I2cError},
        mode::{Mode, ModeList},
        output::{Dpms, ModeStatus, OutputBackend, OutputCaps, OutputKind},
        ports::{self, DiPort, Iga},
        utils::errorfmt::ErrorFmt,
    },
    std::{cell::Cell, rc::Rc},
    thiserror::Error,
};

pub const SII164_ADDR: u8 = 0x70;
pub const SII164_VENDOR: u16 = 0x0001;
pub const SII164_DEVICE: u16 = 0x0006;

/// Control register 0x08 bits.
const PDB: u8 = 1 << 0;
const EDGE: u8 = 1 << 1;
const DSEL: u8 = 1 << 3;
const HEN: u8 = 1 << 4;
const VEN: u8 = 1 << 5;

const SAVED_REGS: [u8; 4] = [0x08, 0x09, 0x0a, 0x0c];

#[derive(Debug, Error)]
pub enum TransmitterError {
    #[error("Unexpected transmitter identity {vendor:04x}:{device:04x}")]
    Identity { vendor: u16, device: u16 },
    #[error(transparent)]
    I2c(#[from] I2cError),
}

/// Pixel clocks the transmitter accepts, inclusive, in kHz.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockRange {
    pub min_khz: u32,
    pub max_khz: u32,
}

impl ClockRange {
    /// Decodes registers 0x06 and 0x07, which hold the limits in MHz, the
    /// upper one offset by 65.
    pub fn from_raw(min: u8, max: u8) -> Self {
        Self {
            min_khz: min as u32 * 1000,
            max_khz: (max as u32 + 65) * 1000,
        }
    }
}

/// A Silicon Image SiI 164 TMDS transmitter on a digital video port.
pub struct Sii164 {
    dev: Rc<Device>,
    transmitter: I2cDevice,
    port: DiPort,
    clocks: ClockRange,
    saved: Cell<Option<[u8; 4]>>,
    chain: DetectChain,
}

impl Sii164 {
    pub fn probe(
        dev: &Rc<Device>,
        bus: &Rc<dyn I2cBus>,
        port: DiPort,
    ) -> Result<Self, TransmitterError> {
        let transmitter = I2cDevice::probe(bus, SII164_ADDR, "SiI 164")?;
        let vendor = transmitter.read_u16(0x00)?;
        let device = transmitter.read_u16(0x02)?;
        log::debug!("Vendor ID: 0x{:04x}, device ID: 0x{:04x}", vendor, device);
        if vendor != SII164_VENDOR || device != SII164_DEVICE {
            return Err(TransmitterError::Identity { vendor, device });
        }
        let clocks =
            ClockRange::from_raw(transmitter.read_byte(0x06)?, transmitter.read_byte(0x07)?);
        log::info!(
            "SiI 164 on {} supports dot clocks from {} to {} MHz",
            bus.name(),
            clocks.min_khz / 1000,
            clocks.max_khz / 1000,
        );
        let chain = DetectChain::default().with(TmdsSenseProbe {
            transmitter: transmitter.clone(),
        });
        let res = Self {
            dev: dev.clone(),
            transmitter,
            port,
            clocks,
            saved: Cell::new(None),
            chain,
        };
        res.dump_registers();
        Ok(res)
    }

    pub fn clock_range(&self) -> ClockRange {
        self.clocks
    }

    pub fn port(&self) -> DiPort {
        self.port
    }

    fn dump_registers(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        for offset in 0..=0x0f {
            match self.transmitter.read_byte(offset) {
                Ok(v) => log::trace!("SiI 164: 0x{:02x}: 0x{:02x}", offset, v),
                Err(e) => log::trace!("SiI 164: 0x{:02x}: {}", offset, ErrorFmt(e)),
            }
        }
    }

    fn init_registers(&self) -> Result<(), I2cError> {
        let t = &self.transmitter;
        t.write_byte(0x08, VEN | HEN | DSEL | EDGE | PDB)?;
        // Route the receiver sense bit 0x09[2] to the MSEN pin.
        t.write_byte(0x09, 0x20)?;
        t.write_byte(0x0a, 0x00)?;
        t.write_byte(0x0c, 0x00)?;
        Ok(())
    }

    fn set_power(&self, on: bool) {
        let res = self.transmitter.mask_byte(0x08, if on { PDB } else { 0 }, PDB);
        match res {
            Ok(()) => log::info!("SiI 164 (DVI) power: {}", if on { "on" } else { "off" }),
            Err(e) => log::error!("Could not switch the SiI 164 power: {}", ErrorFmt(e)),
        }
    }

    fn read_saved(&self) -> Result<[u8; 4], I2cError> {
        let mut regs = [0; 4];
        for (v, offset) in regs.iter_mut().zip(SAVED_REGS) {
            *v = self.transmitter.read_byte(offset)?;
        }
        Ok(regs)
    }
}

impl OutputBackend for Sii164 {
    fn kind(&self) -> OutputKind {
        OutputKind::Tmds
    }

    fn caps(&self) -> OutputCaps {
        OutputCaps::default()
    }

    fn detect(&self, name: &str) -> DetectionResult {
        self.chain.run(name)
    }

    fn modes(&self, identity: Option<&MonitorIdentity>) -> ModeList {
        match identity.and_then(|id| id.edid.as_ref()) {
            Some(edid) => ModeList::from_edid(edid),
            None => ModeList::empty(),
        }
    }

    fn mode_valid(&self, mode: &Mode) -> ModeStatus {
        if mode.clock_khz < self.clocks.min_khz {
            return ModeStatus::ClockLow;
        }
        if mode.clock_khz > self.clocks.max_khz {
            return ModeStatus::ClockHigh;
        }
        if !self.dev.clocks.has_solution(mode.clock_khz) {
            return ModeStatus::NoClock;
        }
        ModeStatus::Ok
    }

    fn mode_set(&self, _requested: &Mode, _adjusted: &Mode, iga: Iga) {
        let io = self.dev.io();
        ports::set_clock_drive_strength(io, self.port, 0x03);
        ports::set_data_drive_strength(io, self.port, 0x03);
        ports::set_io_pads(io, self.port, 0x03);
        self.dump_registers();
        if let Err(e) = self.init_registers() {
            log::error!("Could not initialize the SiI 164: {}", ErrorFmt(e));
        }
        self.dump_registers();
        ports::set_display_source(io, self.port, iga);
    }

    fn dpms(&self, mode: Dpms) {
        self.set_power(mode.powered());
    }

    fn save(&self) {
        match self.read_saved() {
            Ok(regs) => self.saved.set(Some(regs)),
            Err(e) => log::warn!("Could not save the SiI 164 registers: {}", ErrorFmt(e)),
        }
    }

    fn restore(&self) {
        let Some(regs) = self.saved.get() else {
            log::debug!("No saved SiI 164 registers to restore");
            return;
        };
        for (value, offset) in regs.into_iter().zip(SAVED_REGS) {
            if let Err(e) = self.transmitter.write_byte(offset, value) {
                log::warn!("Could not restore SiI 164 register 0x{:02x}: {}", offset, ErrorFmt(e));
            }
        }
    }
}
