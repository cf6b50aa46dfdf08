/// Timing of one scan axis, in pixels (horizontal) or lines (vertical).
///
/// All boundaries are measured from the start of the active region.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct AxisTiming {
    pub active: u16,
    pub blank_start: u16,
    pub blank_end: u16,
    pub sync_start: u16,
    pub sync_end: u16,
    pub total: u16,
}

impl AxisTiming {
    /// Creates a timing whose blanking interval is derived from the sync
    /// pulse and the total, the way a CRTC is programmed for a plain mode.
    pub fn new(active: u16, sync_start: u16, sync_end: u16, total: u16) -> Self {
        let mut res = Self {
            active,
            blank_start: 0,
            blank_end: 0,
            sync_start,
            sync_end,
            total,
        };
        res.set_crtc_blanking();
        res
    }

    pub fn set_crtc_blanking(&mut self) {
        self.blank_start = self.sync_start.min(self.active);
        self.blank_end = self.sync_end.max(self.total);
    }

    pub fn sync_width(&self) -> u16 {
        self.sync_end.saturating_sub(self.sync_start)
    }
}
