#[cfg(test)]
mod tests;

use crate::timing::AxisTiming;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Borders {
    pub horizontal: u16,
    pub vertical: u16,
}

/// Shrinks the active region of `timing` to `requested` and moves the
/// blanking and sync boundaries so that the image sits in the middle of a
/// `native` sized frame.
///
/// The sync pulse keeps its width and its distance from the start of
/// blanking. Odd size differences leave the extra pixel on the trailing
/// border. Returns the leading border.
pub fn center_axis(timing: &mut AxisTiming, requested: u16, native: u16) -> u16 {
    let border = native.saturating_sub(requested) / 2;
    let sync_width = timing.sync_width();
    let sync_offset = timing.sync_start.saturating_sub(timing.blank_start);
    let blank_start = border + requested;
    timing.active = requested;
    timing.blank_start = blank_start;
    timing.blank_end = timing.total.saturating_sub(border);
    timing.sync_start = blank_start + sync_offset;
    timing.sync_end = timing.sync_start + sync_width;
    border
}

pub fn center(
    h: &mut AxisTiming,
    v: &mut AxisTiming,
    requested: (u16, u16),
    native: (u16, u16),
) -> Borders {
    Borders {
        horizontal: center_axis(h, requested.0, native.0),
        vertical: center_axis(v, requested.1, native.1),
    }
}
