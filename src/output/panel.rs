use {
    crate::{
        config::OutputOptions,
        detect::{
            DetectChain, DetectionResult, EdidProbe, FixedPanelProbe, MonitorIdentity,
            ScratchPadProbe,
        },
        device::Device,
        edid::SignalClass,
        i2c::BusId,
        mode::{Mode, ModeList, olpc_xo15_mode},
        output::{Dpms, ModeStatus, OutputBackend, OutputCaps, OutputKind},
        panel_chip::{PanelChip, panel_chip},
        panel_table::{PanelDescriptor, PanelIndex},
        ports::{self, DiPort, Iga},
    },
    chrome_algorithms::{
        fit::{self, Borders},
        scale,
    },
    std::{
        cell::{Cell, RefCell},
        rc::Rc,
    },
};

/// How the last fixed-up mode is mapped onto the panel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PanelFit {
    Native,
    Scaled,
    Centered(Borders),
}

/// An internal flat panel on one or two digital interface ports.
pub struct Panel {
    dev: Rc<Device>,
    chip: Rc<dyn PanelChip>,
    ports: DiPort,
    options: OutputOptions,
    olpc: bool,
    chain: DetectChain,
    panel: Cell<Option<PanelDescriptor>>,
    /// The EDID's detailed timing for the native size, if the panel has one.
    edid_native: RefCell<Option<Mode>>,
    fit: Cell<PanelFit>,
}

impl Panel {
    /// `bus` is the DDC bus assigned to this panel, if any.
    pub fn new(
        dev: &Rc<Device>,
        ports: DiPort,
        bus: Option<BusId>,
        options: OutputOptions,
    ) -> Self {
        let olpc = dev.options.device.olpc_xo15;
        let chain = if olpc {
            DetectChain::default().with(FixedPanelProbe {
                panel: *PanelIndex::OLPC_XO15.descriptor(),
            })
        } else {
            let mut chain = DetectChain::default();
            if let Some(id) = bus {
                chain = chain.with(EdidProbe {
                    bus_id: id,
                    bus: dev.bus(id).cloned(),
                    expect: SignalClass::Digital,
                    panel_size: true,
                });
            }
            chain.with(ScratchPadProbe { dev: dev.clone() })
        };
        let chip = panel_chip(dev.chipset);
        log::debug!("Flat panel on {} uses the {}", ports, chip.name());
        Self {
            dev: dev.clone(),
            chip,
            ports,
            options,
            olpc,
            chain,
            panel: Cell::new(None),
            edid_native: RefCell::new(None),
            fit: Cell::new(PanelFit::Native),
        }
    }

    pub fn ports(&self) -> DiPort {
        self.ports
    }

    pub fn panel(&self) -> Option<PanelDescriptor> {
        self.panel.get()
    }

    pub fn fit(&self) -> PanelFit {
        self.fit.get()
    }

    /// The timing the panel runs at natively. Panels without an EDID
    /// timing for their native size get a 60 Hz CVT timing.
    pub fn native_mode(&self) -> Option<Mode> {
        if self.olpc {
            return Some(olpc_xo15_mode());
        }
        if let Some(mode) = &*self.edid_native.borrow() {
            return Some(mode.clone());
        }
        let panel = self.panel.get()?;
        ModeList::native(panel.width, panel.height).iter().next()
    }

    fn native_size(&self) -> Option<(u16, u16)> {
        self.panel.get().map(|p| (p.width, p.height))
    }

    fn set_power(&self, on: bool) {
        self.chip.sequence_power(&self.dev, self.ports, on);
        ports::set_io_pads(self.dev.io(), self.ports, if on { 0x03 } else { 0x00 });
    }

    fn program_scaler(&self, requested: &Mode) {
        let generation = self.dev.chipset.scaler_generation();
        let downscaler = self.dev.chipset.has_downscaler();
        let writes = match (self.fit.get(), self.native_size()) {
            (PanelFit::Scaled, Some(native)) => {
                let factors = scale::compute_scale(requested.size(), native, generation);
                log::info!(
                    "Scaling {}x{} to {}x{}: {:?}",
                    requested.width(),
                    requested.height(),
                    native.0,
                    native.1,
                    factors,
                );
                scale::scale_writes(&factors, generation, downscaler)
            }
            _ => scale::disable_writes(generation, downscaler),
        };
        self.dev.io().apply_crtc_writes(&writes);
    }
}

impl OutputBackend for Panel {
    fn kind(&self) -> OutputKind {
        OutputKind::Panel
    }

    fn caps(&self) -> OutputCaps {
        OutputCaps::default()
    }

    fn detect(&self, name: &str) -> DetectionResult {
        let res = self.chain.run(name);
        if let Some(id) = res.identity()
            && let Some(panel) = id.panel
        {
            log::info!("{}: native size {}x{}", name, panel.width, panel.height);
            self.panel.set(Some(panel));
            let native = id.edid.as_ref().and_then(|edid| {
                ModeList::from_edid(edid)
                    .iter()
                    .find(|m| m.size() == (panel.width, panel.height))
            });
            if let Some(mode) = &native {
                log::debug!("{}: native timing {}", name, mode);
            }
            *self.edid_native.borrow_mut() = native;
        }
        res
    }

    fn modes(&self, identity: Option<&MonitorIdentity>) -> ModeList {
        if let Some(edid) = identity.and_then(|id| id.edid.as_ref()) {
            return ModeList::from_edid(edid);
        }
        if self.olpc {
            return ModeList::fixed(olpc_xo15_mode());
        }
        match self.native_size() {
            Some((w, h)) => ModeList::native(w, h),
            None => ModeList::empty(),
        }
    }

    fn mode_valid(&self, mode: &Mode) -> ModeStatus {
        let Some((w, h)) = self.native_size() else {
            return ModeStatus::Panel;
        };
        if mode.width() > w || mode.height() > h {
            return ModeStatus::Panel;
        }
        let native = mode.width() == w && mode.height() == h;
        if !native && !self.options.scaling && !self.options.center {
            return ModeStatus::Panel;
        }
        if !self.dev.clocks.has_solution(mode.clock_khz) {
            return ModeStatus::NoClock;
        }
        ModeStatus::Ok
    }

    fn mode_fixup(&self, requested: &Mode, adjusted: &Mode) -> Mode {
        let smaller = match self.native_size() {
            Some((w, h)) => requested.width() < w || requested.height() < h,
            None => false,
        };
        let native_mode = self.native_mode().filter(|_| smaller);
        let (Some(native), Some(mut res)) = (self.native_size(), native_mode) else {
            self.fit.set(PanelFit::Native);
            let mut res = adjusted.clone();
            res.set_crtc_blanking();
            return res;
        };
        if self.options.center {
            let borders = fit::center(&mut res.h, &mut res.v, requested.size(), native);
            log::debug!(
                "Centering {}x{} with borders {}x{}",
                requested.width(),
                requested.height(),
                borders.horizontal,
                borders.vertical,
            );
            self.fit.set(PanelFit::Centered(borders));
        } else {
            self.fit.set(PanelFit::Scaled);
        }
        res.name.clone_from(&requested.name);
        res
    }

    fn mode_set(&self, requested: &Mode, _adjusted: &Mode, iga: Iga) {
        self.program_scaler(requested);
        self.chip.set_delay_tap(&self.dev, self.ports);
        let dithering = self.panel.get().is_some_and(|p| p.dithering);
        self.chip
            .set_transfer_format(&self.dev, self.ports, dithering);
        self.chip.set_display_source(&self.dev, self.ports, iga);
    }

    fn dpms(&self, mode: Dpms) {
        self.set_power(mode.powered());
    }

    fn fixed_mm_size(&self) -> Option<(u32, u32)> {
        self.olpc.then_some((152, 114))
    }
}
