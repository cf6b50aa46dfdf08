use crate::{
    fit::{Borders, center, center_axis},
    timing::AxisTiming,
};

fn panel_1024x768() -> (AxisTiming, AxisTiming) {
    (
        AxisTiming::new(1024, 1072, 1176, 1328),
        AxisTiming::new(768, 771, 775, 798),
    )
}

#[test]
fn center_800x600_in_1024x768() {
    let (mut h, mut v) = panel_1024x768();
    let borders = center(&mut h, &mut v, (800, 600), (1024, 768));
    assert_eq!(
        borders,
        Borders {
            horizontal: 112,
            vertical: 84,
        }
    );
    assert_eq!(h.active, 800);
    assert_eq!(h.blank_start, 912);
    assert_eq!(h.blank_end, 1328 - 112);
    assert_eq!(h.sync_start, 912 + 48);
    assert_eq!(h.sync_width(), 104);
    assert_eq!(h.total, 1328);
    assert_eq!(v.active, 600);
    assert_eq!(v.blank_start, 684);
    assert_eq!(v.blank_end, 798 - 84);
    assert_eq!(v.sync_start, 687);
    assert_eq!(v.sync_width(), 4);
    assert_eq!(v.total, 798);
}

#[test]
fn odd_difference_truncates() {
    let mut h = AxisTiming::new(1024, 1072, 1176, 1328);
    let border = center_axis(&mut h, 801, 1024);
    assert_eq!(border, 111);
    assert_eq!(h.blank_start, 111 + 801);
    assert_eq!(h.blank_end, 1328 - 111);
}

#[test]
fn recentering_is_a_no_op() {
    let (mut h, mut v) = panel_1024x768();
    center(&mut h, &mut v, (640, 480), (1024, 768));
    let (h1, v1) = (h, v);
    center(&mut h, &mut v, (640, 480), (1024, 768));
    assert_eq!(h, h1);
    assert_eq!(v, v1);
}

#[test]
fn native_size_keeps_timing() {
    let (mut h, mut v) = panel_1024x768();
    let (h0, v0) = (h, v);
    let borders = center(&mut h, &mut v, (1024, 768), (1024, 768));
    assert_eq!(borders, Borders::default());
    assert_eq!(h, h0);
    assert_eq!(v, v0);
}
