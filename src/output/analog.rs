use {
    crate::{
        chipset::Family,
        detect::{DetectChain, DetectionResult, EdidProbe, LoadDetectProbe, MonitorIdentity},
        device::Device,
        edid::SignalClass,
        i2c::BusId,
        mode::{Mode, ModeList},
        output::{Dpms, ModeStatus, OutputBackend, OutputCaps, OutputKind},
        ports::Iga,
    },
    std::rc::Rc,
};

/// The VGA DAC.
pub struct Analog {
    dev: Rc<Device>,
    chain: DetectChain,
}

impl Analog {
    /// Returns `None` unless both DDC buses the connector uses exist.
    pub fn new(dev: &Rc<Device>) -> Option<Self> {
        if dev.bus(BusId::Bus1).is_none() || dev.bus(BusId::Bus2).is_none() {
            log::error!("I2C bus 1 or I2C bus 2 does not exist");
            return None;
        }
        let chain = DetectChain::default()
            .with(EdidProbe {
                bus_id: BusId::Bus1,
                bus: dev.bus(BusId::Bus1).cloned(),
                expect: SignalClass::Analog,
                panel_size: false,
            })
            .with(EdidProbe {
                bus_id: BusId::Bus2,
                bus: dev.bus(BusId::Bus2).cloned(),
                expect: SignalClass::Analog,
                panel_size: false,
            })
            .with(LoadDetectProbe { dev: dev.clone() });
        Some(Self {
            dev: dev.clone(),
            chain,
        })
    }

    fn set_dac(&self, on: bool) {
        // CR47[2]: DAC off.
        self.dev
            .io()
            .mask_crtc(0x47, if on { 0x00 } else { 0x04 }, 0x04);
        log::info!("Analog VGA output: {}", if on { "on" } else { "off" });
    }

    fn set_source(&self, iga: Iga) {
        self.dev.io().mask_seq(0x16, iga.bit() << 6, 0x40);
        log::info!("Analog VGA output source: {}", iga);
    }

    fn init_registers(&self) {
        let io = self.dev.io();
        io.mask_crtc(0x37, 0x04, 0xff);
        if self.dev.chipset.family() == Family::Integrated {
            // SR5E[0]: DAC power state is controlled by CR47.
            io.mask_seq(0x5e, 0x01, 0x01);
        }
    }
}

impl OutputBackend for Analog {
    fn kind(&self) -> OutputKind {
        OutputKind::Analog
    }

    fn caps(&self) -> OutputCaps {
        OutputCaps {
            interlace_allowed: true,
            double_scan_allowed: false,
        }
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
        if !self.dev.clocks.has_solution(mode.clock_khz) {
            return ModeStatus::NoClock;
        }
        ModeStatus::Ok
    }

    fn mode_set(&self, _requested: &Mode, _adjusted: &Mode, iga: Iga) {
        self.init_registers();
        self.set_source(iga);
    }

    fn dpms(&self, mode: Dpms) {
        self.set_dac(mode.powered());
    }
}
