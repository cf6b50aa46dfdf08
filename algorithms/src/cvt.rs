//! VESA Coordinated Video Timings, standard blanking, progressive scan.


use crate::timing::AxisTiming;

const H_GRANULARITY: u32 = 8;
const MIN_V_PORCH: u32 = 3;
const MIN_VSYNC_BP_US: f64 = 550.0;
const HSYNC_PERCENTAGE: u32 = 8;
const CLOCK_STEP_KHZ: u32 = 250;
const C_PRIME: f64 = 30.0;
const M_PRIME: f64 = 300.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CvtTiming {
    pub clock_khz: u32,
    pub h: AxisTiming,
    pub v: AxisTiming,
    pub hsync_positive: bool,
    pub vsync_positive: bool,
}

fn vsync_width(h: u32, v: u32) -> u32 {
    if v % 3 == 0 && v * 4 / 3 == h {
        4
    } else if v % 9 == 0 && v * 16 / 9 == h {
        5
    } else if v % 10 == 0 && v * 16 / 10 == h {
        6
    } else if v % 4 == 0 && v * 5 / 4 == h {
        7
    } else if v % 9 == 0 && v * 15 / 9 == h {
        7
    } else {
        10
    }
}

pub fn cvt(width: u16, height: u16, refresh_hz: f64) -> CvtTiming {
    let h_display = width as u32 - width as u32 % H_GRANULARITY;
    let v_display = height as u32;
    let vsync = vsync_width(h_display, v_display);

    let h_period = (1_000_000.0 / refresh_hz - MIN_VSYNC_BP_US)
        / (v_display + MIN_V_PORCH) as f64;
    let mut vsync_and_back_porch = (MIN_VSYNC_BP_US / h_period) as u32 + 1;
    if vsync_and_back_porch < vsync + MIN_V_PORCH {
        vsync_and_back_porch = vsync + MIN_V_PORCH;
    }
    let v_total = v_display + vsync_and_back_porch + MIN_V_PORCH;

    let mut blank_percentage = C_PRIME - M_PRIME * h_period / 1000.0;
    if blank_percentage < 20.0 {
        blank_percentage = 20.0;
    }
    let mut h_blank = (h_display as f64 * blank_percentage / (100.0 - blank_percentage)) as u32;
    h_blank -= h_blank % (2 * H_GRANULARITY);
    let h_total = h_display + h_blank;

    let mut clock_khz = (h_total as f64 * 1000.0 / h_period) as u32;
    clock_khz -= clock_khz % CLOCK_STEP_KHZ;

    let h_sync_end = h_display + h_blank / 2;
    let mut h_sync_width = h_total * HSYNC_PERCENTAGE / 100;
    h_sync_width -= h_sync_width % H_GRANULARITY;
    let h_sync_start = h_sync_end - h_sync_width;

    let v_sync_start = v_display + MIN_V_PORCH;
    let v_sync_end = v_sync_start + vsync;

    CvtTiming {
        clock_khz,
        h: AxisTiming::new(
            h_display as u16,
            h_sync_start as u16,
            h_sync_end as u16,
            h_total as u16,
        ),
        v: AxisTiming::new(
            v_display as u16,
            v_sync_start as u16,
            v_sync_end as u16,
            v_total as u16,
        ),
        hsync_positive: false,
        vsync_positive: true,
    }
}
