
/// Native timing properties of a flat panel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PanelDescriptor {
    pub width: u16,
    pub height: u16,
    pub dual_edge: bool,
    pub dithering: bool,
}

const fn p(width: u16, height: u16, dual_edge: bool, dithering: bool) -> PanelDescriptor {
    PanelDescriptor {
        width,
        height,
        dual_edge,
        dithering,
    }
}

/// Panels known to the video BIOS, in BIOS panel-index order.
static PANELS: [PanelDescriptor; 24] = [
    p(640, 480, false, true),
    p(800, 600, false, true),
    p(1024, 768, false, true),
    p(1280, 768, false, true),
    p(1280, 1024, true, true),
    p(1400, 1050, true, true),
    p(1600, 1200, true, true),
    p(1280, 800, false, true),
    p(800, 480, false, true),
    p(1024, 768, true, true),
    p(1366, 768, false, false),
    p(1024, 768, true, false),
    p(1280, 768, false, false),
    p(1280, 1024, true, false),
    p(1400, 1050, true, false),
    p(1600, 1200, true, false),
    p(1366, 768, false, false),
    p(1024, 600, false, true),
    p(1280, 768, true, true),
    p(1280, 800, false, true),
    p(1360, 768, false, false),
    p(1280, 768, true, false),
    p(480, 640, false, true),
    p(1200, 900, false, false),
];

/// A validated index into the BIOS panel table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PanelIndex(u8);

impl PanelIndex {
    pub const OLPC_XO15: Self = PanelIndex(23);

    pub fn from_raw(raw: u8) -> Option<Self> {
        ((raw as usize) < PANELS.len()).then_some(PanelIndex(raw))
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn descriptor(self) -> &'static PanelDescriptor {
        &PANELS[self.0 as usize]
    }
}

pub fn descriptors() -> &'static [PanelDescriptor] {
    &PANELS
}
