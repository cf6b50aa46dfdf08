#[cfg(test)]
mod tests;

use {
    crate::{
        chipset::Family,
        device::Device,
        edid::{MonitorInfo, SignalClass},
        i2c::{self, BusId, I2cBus, I2cDevice},
        panel_table::{PanelDescriptor, PanelIndex},
        regs::{INPUT_STATUS_0, LOAD_SENSE, cr, save_registers, sr},
        utils::{bitflags::BitflagsExt, errorfmt::ErrorFmt},
    },
    std::rc::Rc,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Unknown,
}

/// What a successful probe learned about the attached display.
#[derive(Clone, Debug)]
pub struct MonitorIdentity {
    pub signal: Option<SignalClass>,
    pub edid: Option<Rc<MonitorInfo>>,
    pub panel: Option<PanelDescriptor>,
}

impl MonitorIdentity {
    fn from_edid(info: MonitorInfo) -> Self {
        Self {
            signal: Some(info.signal),
            edid: Some(Rc::new(info)),
            panel: None,
        }
    }

    fn panel(panel: PanelDescriptor) -> Self {
        Self {
            signal: Some(SignalClass::Digital),
            edid: None,
            panel: Some(panel),
        }
    }
}

#[derive(Clone, Debug)]
pub enum DetectionResult {
    Connected(MonitorIdentity),
    Disconnected,
}

impl DetectionResult {
    pub fn status(&self) -> ConnectionStatus {
        match self {
            DetectionResult::Connected(_) => ConnectionStatus::Connected,
            DetectionResult::Disconnected => ConnectionStatus::Disconnected,
        }
    }

    pub fn identity(&self) -> Option<&MonitorIdentity> {
        match self {
            DetectionResult::Connected(id) => Some(id),
            DetectionResult::Disconnected => None,
        }
    }
}

/// One way of finding out whether a display is attached. A probe that
/// cannot reach its transport reports no answer.
pub trait DetectStrategy {
    fn name(&self) -> &'static str;
    fn probe(&self) -> Option<MonitorIdentity>;
}

/// Strategies in priority order. The first one that finds a display
/// decides the result and the remaining ones are not run.
#[derive(Default)]
pub struct DetectChain {
    strategies: Vec<Box<dyn DetectStrategy>>,
}

impl DetectChain {
    pub fn with(mut self, strategy: impl DetectStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|s| s.name())
    }

    pub fn run(&self, output: &str) -> DetectionResult {
        for strategy in &self.strategies {
            log::debug!("{}: probing via {}", output, strategy.name());
            if let Some(id) = strategy.probe() {
                log::info!("{}: display detected via {}", output, strategy.name());
                return DetectionResult::Connected(id);
            }
        }
        log::info!("{}: no display detected", output);
        DetectionResult::Disconnected
    }
}

/// Asks an external TMDS transmitter whether a receiver is attached and,
/// only then, reads a digital EDID over the transmitter's bus.
pub struct TmdsSenseProbe {
    pub transmitter: I2cDevice,
}

/// SiI 164 register 0x09[2]: receiver sense.
pub const TMDS_RECEIVER_SENSE: u8 = 0x04;

impl DetectStrategy for TmdsSenseProbe {
    fn name(&self) -> &'static str {
        "TMDS receiver sense"
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        let sensed = match self.transmitter.read_byte(0x09) {
            Ok(v) => v.contains(TMDS_RECEIVER_SENSE),
            Err(e) => {
                log::debug!("{}: {}", self.transmitter.name, ErrorFmt(e));
                return None;
            }
        };
        log::info!(
            "{} {} a TMDS receiver",
            self.transmitter.name,
            if sensed { "detected" } else { "did not detect" },
        );
        if !sensed {
            return None;
        }
        let info = match i2c::read_monitor_info(&*self.transmitter.bus) {
            Ok(info) => info,
            Err(e) => {
                log::info!("Could not obtain EDID over DVI: {}", ErrorFmt(e));
                return None;
            }
        };
        if !info.is_digital() {
            log::info!("Ignoring analog EDID on a DVI link");
            return None;
        }
        Some(MonitorIdentity::from_edid(info))
    }
}

/// Reads an EDID from one bus and accepts it only with the expected
/// signaling class.
pub struct EdidProbe {
    pub bus_id: BusId,
    pub bus: Option<Rc<dyn I2cBus>>,
    pub expect: SignalClass,
    /// Also require that a panel size can be derived from the EDID.
    pub panel_size: bool,
}

impl DetectStrategy for EdidProbe {
    fn name(&self) -> &'static str {
        match self.bus_id {
            BusId::Bus1 => "EDID on I2C bus 1",
            BusId::Bus2 => "EDID on I2C bus 2",
            BusId::Bus3 => "EDID on I2C bus 3",
        }
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        let Some(bus) = &self.bus else {
            log::debug!("{:?} is not available", self.bus_id);
            return None;
        };
        let info = match i2c::read_monitor_info(&**bus) {
            Ok(info) => info,
            Err(e) => {
                log::debug!("{}: {}", bus.name(), ErrorFmt(e));
                return None;
            }
        };
        if info.signal != self.expect {
            log::debug!(
                "{}: ignoring {:?} EDID, expected {:?}",
                bus.name(),
                info.signal,
                self.expect
            );
            return None;
        }
        if !self.panel_size {
            return Some(MonitorIdentity::from_edid(info));
        }
        let Some((width, height)) = info.panel_size() else {
            log::warn!("{}: unable to obtain the panel size from EDID", bus.name());
            return None;
        };
        let mut id = MonitorIdentity::from_edid(info);
        id.panel = Some(PanelDescriptor {
            width,
            height,
            dual_edge: false,
            dithering: false,
        });
        Some(id)
    }
}

/// Senses the load on the analog DAC outputs.
pub struct LoadDetectProbe {
    pub dev: Rc<Device>,
}

impl DetectStrategy for LoadDetectProbe {
    fn name(&self) -> &'static str {
        "DAC load detection"
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        let io = self.dev.io();
        let pulse_clear = self.dev.chipset.family() == Family::Integrated;
        let sensed = {
            let _restore = save_registers(io, &[cr(0x36), sr(0x01), sr(0x40)]);
            // Screen on and CRT DPMS on so that the DAC drives the pins.
            io.mask_seq(0x01, 0x00, 0x20);
            io.mask_crtc(0x36, 0x00, 0xf0);
            self.dev.delay.sleep(self.dev.options.device.load_detect_wait);
            io.mask_seq(0x40, 0x80, 0x80);
            if pulse_clear {
                io.mask_seq(0x40, 0x00, 0x80);
            }
            let sensed = io.read_port(INPUT_STATUS_0).contains(LOAD_SENSE);
            if pulse_clear {
                io.mask_seq(0x40, 0x00, 0x80);
            }
            sensed
        };
        sensed.then_some(MonitorIdentity {
            signal: Some(SignalClass::Analog),
            edid: None,
            panel: None,
        })
    }
}

/// Reads the panel index the video BIOS left in CR3F[3:0].
pub struct ScratchPadProbe {
    pub dev: Rc<Device>,
}

impl DetectStrategy for ScratchPadProbe {
    fn name(&self) -> &'static str {
        "BIOS scratch pad"
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        let raw = self.dev.io().read_crtc(0x3f) & 0x0f;
        let Some(index) = PanelIndex::from_raw(raw) else {
            log::error!("Scratch pad panel index {} is out of range", raw);
            return None;
        };
        let panel = *index.descriptor();
        log::info!("Scratch pad flat panel index: {}", index.raw());
        log::info!(
            "Flat panel native resolution: {}x{}",
            panel.width,
            panel.height
        );
        log::info!(
            "Flat panel dual edge transfer: {}",
            if panel.dual_edge { "on" } else { "off" }
        );
        Some(MonitorIdentity::panel(panel))
    }
}

/// A panel whose size is known up front.
pub struct FixedPanelProbe {
    pub panel: PanelDescriptor,
}

impl DetectStrategy for FixedPanelProbe {
    fn name(&self) -> &'static str {
        "fixed panel"
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        Some(MonitorIdentity::panel(self.panel))
    }
}
