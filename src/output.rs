pub mod analog;
pub mod panel;
pub mod sii164;

use {
    crate::{
        detect::{ConnectionStatus, DetectionResult, MonitorIdentity},
        mode::{DOUBLE_SCAN, INTERLACE, Mode, ModeList},
        ports::Iga,
        registry::OutputId,
    },
    std::{
        cell::{Cell, RefCell},
        fmt::{Display, Formatter},
    },
};

/// Why a mode cannot be driven by an output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ModeStatus {
    Ok,
    ClockLow,
    ClockHigh,
    /// Larger than the panel, or not native while non-native modes are
    /// disabled.
    Panel,
    /// The PLL cannot synthesize the pixel clock.
    NoClock,
    NoInterlace,
    NoDoubleScan,
}

impl ModeStatus {
    pub fn is_ok(self) -> bool {
        self == ModeStatus::Ok
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dpms {
    On,
    Standby,
    Suspend,
    Off,
}

impl Dpms {
    /// Only `On` powers the output. The other states are not distinguished.
    pub fn powered(self) -> bool {
        self == Dpms::On
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OutputKind {
    Analog,
    Panel,
    Tmds,
}

impl OutputKind {
    pub fn prefix(self) -> &'static str {
        match self {
            OutputKind::Analog => "VGA",
            OutputKind::Panel => "FP",
            OutputKind::Tmds => "DVI",
        }
    }
}

impl Display for OutputKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputCaps {
    pub interlace_allowed: bool,
    pub double_scan_allowed: bool,
}

/// Per-type behavior of an output. The host drives every output through
/// the same sequence: detect, modes, mode_valid, mode_fixup, prepare,
/// mode_set, commit.
pub trait OutputBackend {
    fn kind(&self) -> OutputKind;

    fn caps(&self) -> OutputCaps;

    fn detect(&self, name: &str) -> DetectionResult;

    fn modes(&self, identity: Option<&MonitorIdentity>) -> ModeList;

    fn mode_valid(&self, mode: &Mode) -> ModeStatus;

    /// Returns the timing to program for `requested`. Never modifies
    /// either argument.
    fn mode_fixup(&self, requested: &Mode, adjusted: &Mode) -> Mode {
        let _ = requested;
        adjusted.clone()
    }

    fn prepare(&self) {
        self.dpms(Dpms::Off);
    }

    fn mode_set(&self, requested: &Mode, adjusted: &Mode, iga: Iga);

    fn commit(&self) {
        self.dpms(Dpms::On);
    }

    fn dpms(&self, mode: Dpms);

    fn save(&self) {}

    fn restore(&self) {}

    /// Physical size in millimeters when known without an EDID.
    fn fixed_mm_size(&self) -> Option<(u32, u32)> {
        None
    }
}

/// One physical display connector.
pub struct Output {
    pub id: OutputId,
    pub name: String,
    pub kind: OutputKind,
    pub caps: OutputCaps,
    status: Cell<ConnectionStatus>,
    iga: Cell<Option<Iga>>,
    identity: RefCell<Option<MonitorIdentity>>,
    backend: Box<dyn OutputBackend>,
}

impl Output {
    pub fn new(id: OutputId, name: String, backend: Box<dyn OutputBackend>) -> Self {
        Self {
            id,
            name,
            kind: backend.kind(),
            caps: backend.caps(),
            status: Cell::new(ConnectionStatus::Unknown),
            iga: Cell::new(None),
            identity: RefCell::new(None),
            backend,
        }
    }

    pub fn detect(&self) -> ConnectionStatus {
        let res = self.backend.detect(&self.name);
        let status = res.status();
        self.status.set(status);
        *self.identity.borrow_mut() = match res {
            DetectionResult::Connected(id) => Some(id),
            DetectionResult::Disconnected => None,
        };
        status
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    pub fn identity(&self) -> Option<MonitorIdentity> {
        self.identity.borrow().clone()
    }

    pub fn iga(&self) -> Option<Iga> {
        self.iga.get()
    }

    pub fn modes(&self) -> ModeList {
        self.backend.modes(self.identity.borrow().as_ref())
    }

    pub fn mode_valid(&self, mode: &Mode) -> ModeStatus {
        if mode.flags.contains(INTERLACE) && !self.caps.interlace_allowed {
            return ModeStatus::NoInterlace;
        }
        if mode.flags.contains(DOUBLE_SCAN) && !self.caps.double_scan_allowed {
            return ModeStatus::NoDoubleScan;
        }
        let status = self.backend.mode_valid(mode);
        if !status.is_ok() {
            log::debug!("{}: rejecting mode {}: {:?}", self.name, mode, status);
        }
        status
    }

    pub fn mode_fixup(&self, requested: &Mode, adjusted: &Mode) -> Mode {
        self.backend.mode_fixup(requested, adjusted)
    }

    pub fn prepare(&self) {
        self.backend.prepare();
    }

    pub fn mode_set(&self, requested: &Mode, adjusted: &Mode, iga: Iga) {
        log::info!("{}: setting mode {} on {}", self.name, requested, iga);
        self.iga.set(Some(iga));
        self.backend.mode_set(requested, adjusted, iga);
    }

    pub fn commit(&self) {
        self.backend.commit();
    }

    pub fn dpms(&self, mode: Dpms) {
        log::debug!("{}: DPMS {:?}", self.name, mode);
        self.backend.dpms(mode);
    }

    pub fn save(&self) {
        self.backend.save();
    }

    pub fn restore(&self) {
        self.backend.restore();
    }

    /// Physical size in millimeters.
    pub fn mm_size(&self) -> Option<(u32, u32)> {
        if let Some(size) = self.backend.fixed_mm_size() {
            return Some(size);
        }
        let identity = self.identity.borrow();
        let (w, h) = identity.as_ref()?.edid.as_ref()?.size_cm?;
        Some((w as u32 * 10, h as u32 * 10))
    }
}
