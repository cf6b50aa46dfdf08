
use {
    crate::edid::{DetailedTiming, MonitorInfo},
    chrome_algorithms::{cvt::cvt, timing::AxisTiming},
    std::{
        fmt::{Display, Formatter},
        rc::Rc,
    },
};

bitflags! {
    ModeFlags: u32;
    INTERLACE = 1 << 0,
    DOUBLE_SCAN = 1 << 1,
    PHSYNC = 1 << 2,
    NHSYNC = 1 << 3,
    PVSYNC = 1 << 4,
    NVSYNC = 1 << 5,
}

/// A display timing. Adjusted modes are always value copies of the mode
/// they were derived from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mode {
    pub name: String,
    pub clock_khz: u32,
    pub h: AxisTiming,
    pub v: AxisTiming,
    pub flags: ModeFlags,
    pub preferred: bool,
}

impl Mode {
    /// Builds a mode from `(active, sync_start, sync_end, total)` per axis.
    /// Blanking follows the sync pulse.
    pub fn new(clock_khz: u32, h: [u16; 4], v: [u16; 4], flags: ModeFlags) -> Self {
        let h = AxisTiming::new(h[0], h[1], h[2], h[3]);
        let v = AxisTiming::new(v[0], v[1], v[2], v[3]);
        Self {
            name: format!("{}x{}", h.active, v.active),
            clock_khz,
            h,
            v,
            flags,
            preferred: false,
        }
    }

    pub fn from_cvt(width: u16, height: u16, refresh_hz: f64) -> Self {
        let t = cvt(width, height, refresh_hz);
        let mut flags = ModeFlags::NONE;
        flags |= if t.hsync_positive { PHSYNC } else { NHSYNC };
        flags |= if t.vsync_positive { PVSYNC } else { NVSYNC };
        let mut mode = Self {
            name: String::new(),
            clock_khz: t.clock_khz,
            h: t.h,
            v: t.v,
            flags,
            preferred: false,
        };
        mode.name = format!("{}x{}_{}", width, height, refresh_hz.round() as u32);
        mode
    }

    pub fn from_detailed(t: &DetailedTiming) -> Self {
        let hs = t.h_active + t.h_front_porch;
        let vs = t.v_active + t.v_front_porch;
        let mut flags = ModeFlags::NONE;
        flags |= if t.hsync_positive { PHSYNC } else { NHSYNC };
        flags |= if t.vsync_positive { PVSYNC } else { NVSYNC };
        if t.interlaced {
            flags |= INTERLACE;
        }
        Self::new(
            t.clock_khz,
            [t.h_active, hs, hs + t.h_sync, t.h_active + t.h_blank],
            [t.v_active, vs, vs + t.v_sync, t.v_active + t.v_blank],
            flags,
        )
    }

    pub fn width(&self) -> u16 {
        self.h.active
    }

    pub fn height(&self) -> u16 {
        self.v.active
    }

    pub fn size(&self) -> (u16, u16) {
        (self.h.active, self.v.active)
    }

    pub fn set_crtc_blanking(&mut self) {
        self.h.set_crtc_blanking();
        self.v.set_crtc_blanking();
    }

    pub fn refresh_millihz(&self) -> u32 {
        let pixels = self.h.total as u64 * self.v.total as u64;
        if pixels == 0 {
            return 0;
        }
        (self.clock_khz as u64 * 1_000_000 / pixels) as u32
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" {:.3} {} {} {} {} {} {} {} {}",
            self.name,
            self.clock_khz as f64 / 1000.0,
            self.h.active,
            self.h.sync_start,
            self.h.sync_end,
            self.h.total,
            self.v.active,
            self.v.sync_start,
            self.v.sync_end,
            self.v.total,
        )
    }
}

/// The fixed panel mode of the OLPC XO-1.5.
pub fn olpc_xo15_mode() -> Mode {
    let mut mode = Mode::new(
        57275,
        [1200, 1208, 1216, 1240],
        [900, 905, 908, 912],
        NHSYNC | NVSYNC,
    );
    mode.preferred = true;
    mode
}

#[derive(Clone, Debug)]
enum ModeSource {
    Empty,
    Edid(Rc<MonitorInfo>),
    Native { width: u16, height: u16 },
    Fixed(Rc<Mode>),
}

/// Candidate modes of an output.
///
/// Modes are generated on demand. The list can be iterated any number of
/// times and always yields the same sequence.
#[derive(Clone, Debug)]
pub struct ModeList {
    source: ModeSource,
}

impl ModeList {
    pub fn empty() -> Self {
        Self {
            source: ModeSource::Empty,
        }
    }

    /// Detailed timings first, the first one preferred, then standard
    /// timings synthesized with CVT.
    pub fn from_edid(info: &Rc<MonitorInfo>) -> Self {
        Self {
            source: ModeSource::Edid(info.clone()),
        }
    }

    /// A single preferred CVT mode at 60 Hz.
    pub fn native(width: u16, height: u16) -> Self {
        if width == 0 || height == 0 {
            log::warn!("Invalid flat panel resolution {}x{}", width, height);
            return Self::empty();
        }
        Self {
            source: ModeSource::Native { width, height },
        }
    }

    pub fn fixed(mode: Mode) -> Self {
        Self {
            source: ModeSource::Fixed(Rc::new(mode)),
        }
    }

    pub fn iter(&self) -> Modes<'_> {
        Modes { list: self, pos: 0 }
    }

    fn nth(&self, n: usize) -> Option<Mode> {
        match &self.source {
            ModeSource::Empty => None,
            ModeSource::Native { width, height } => (n == 0).then(|| {
                let mut mode = Mode::from_cvt(*width, *height, 60.0);
                mode.preferred = true;
                mode
            }),
            ModeSource::Fixed(mode) => (n == 0).then(|| (**mode).clone()),
            ModeSource::Edid(info) => {
                let detailed = &info.detailed_timings;
                if let Some(t) = detailed.get(n) {
                    let mut mode = Mode::from_detailed(t);
                    mode.preferred = n == 0;
                    return Some(mode);
                }
                let t = info.standard_timings.get(n - detailed.len())?;
                Some(Mode::from_cvt(t.hsize, t.vsize, t.refresh_hz as f64))
            }
        }
    }
}

pub struct Modes<'a> {
    list: &'a ModeList,
    pos: usize,
}

impl Iterator for Modes<'_> {
    type Item = Mode;

    fn next(&mut self) -> Option<Self::Item> {
        let mode = self.list.nth(self.pos)?;
        self.pos += 1;
        Some(mode)
    }
}

impl<'a> IntoIterator for &'a ModeList {
    type Item = Mode;
    type IntoIter = Modes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
