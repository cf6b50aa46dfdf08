use {
    crate::{
        config::{ConfigError, DEFAULT_LOAD_DETECT_WAIT, Options, parse_bool, parse_duration},
        fakes::init_logger,
    },
    std::time::Duration,
};

#[test]
fn defaults() {
    let o = Options::default();
    assert!(!o.output.center);
    assert!(o.output.scaling);
    assert_eq!(o.device.load_detect_wait, DEFAULT_LOAD_DETECT_WAIT);
    assert_eq!(DEFAULT_LOAD_DETECT_WAIT, Duration::from_micros(16));
    assert!(!o.device.olpc_xo15);
    assert!(!o.device.nano_book);
}

#[test]
fn names_are_loose() {
    init_logger();
    let o = Options::parse([
        ("center", "on"),
        ("SCALING", "no"),
        ("load_detect wait", "1ms"),
        ("olpc-xo15", "1"),
        ("NanoBook", "TRUE"),
    ]);
    assert!(o.output.center);
    assert!(!o.output.scaling);
    assert_eq!(o.device.load_detect_wait, Duration::from_millis(1));
    assert!(o.device.olpc_xo15);
    assert!(o.device.nano_book);
}

#[test]
fn bad_entries_are_skipped() {
    init_logger();
    let o = Options::parse([
        ("Center", "maybe"),
        ("Frobnicate", "yes"),
        ("LoadDetectWait", "soon"),
        ("Scaling", "off"),
    ]);
    assert!(!o.output.center);
    assert!(!o.output.scaling);
    assert_eq!(o.device.load_detect_wait, DEFAULT_LOAD_DETECT_WAIT);
}

#[test]
fn booleans() {
    for s in ["1", "on", "true", "yes", " Yes "] {
        assert!(parse_bool(s).unwrap(), "{}", s);
    }
    for s in ["0", "off", "false", "no"] {
        assert!(!parse_bool(s).unwrap(), "{}", s);
    }
    assert!(matches!(parse_bool("2"), Err(ConfigError::NotABool(_))));
}

#[test]
fn durations() {
    assert_eq!(parse_duration("16us").unwrap(), Duration::from_micros(16));
    assert_eq!(parse_duration(" 2ms ").unwrap(), Duration::from_millis(2));
    assert!(matches!(parse_duration("16"), Err(ConfigError::Duration(..))));
}

#[test]
fn output_scoped_entries() {
    init_logger();
    let o = Options::parse([
        ("FP-2:Center", "on"),
        ("Center", "off"),
        ("fp-1 : scaling", "no"),
        ("FP-1:NanoBook", "yes"),
        ("VGA-1:Center", "maybe"),
    ]);
    assert!(!o.device.nano_book);
    let fp1 = o.output_options("FP-1");
    assert!(!fp1.center);
    assert!(!fp1.scaling);
    let fp2 = o.output_options("FP-2");
    assert!(fp2.center);
    assert!(fp2.scaling);
    assert_eq!(o.output_options("VGA-1"), o.output);
    assert_eq!(o.output_options("FP-3"), o.output);
}
