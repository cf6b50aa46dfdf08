use {
    crate::{
        chipset::Chipset,
        config::Options,
        detect::{
            ConnectionStatus, DetectChain, DetectStrategy, EdidProbe, LoadDetectProbe,
            MonitorIdentity, ScratchPadProbe, TmdsSenseProbe,
        },
        edid::SignalClass,
        fakes::{EdidBuilder, Event, TestBed},
        i2c::{BusId, I2cBus, I2cDevice},
        regs::{INPUT_STATUS_0, LOAD_SENSE},
    },
    std::{cell::Cell, rc::Rc, time::Duration},
};

struct Counting {
    calls: Rc<Cell<u32>>,
    answer: bool,
}

impl DetectStrategy for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn probe(&self) -> Option<MonitorIdentity> {
        self.calls.set(self.calls.get() + 1);
        self.answer.then_some(MonitorIdentity {
            signal: None,
            edid: None,
            panel: None,
        })
    }
}

fn counting(answer: bool) -> (Rc<Cell<u32>>, Counting) {
    let calls = Rc::new(Cell::new(0));
    let strategy = Counting {
        calls: calls.clone(),
        answer,
    };
    (calls, strategy)
}

#[test]
fn first_success_short_circuits() {
    TestBed::new();
    let (a, sa) = counting(true);
    let (b, sb) = counting(true);
    let (c, sc) = counting(false);
    let chain = DetectChain::default().with(sa).with(sb).with(sc);
    assert_eq!(chain.run("test").status(), ConnectionStatus::Connected);
    assert_eq!((a.get(), b.get(), c.get()), (1, 0, 0));
}

#[test]
fn failures_fall_through() {
    TestBed::new();
    let (a, sa) = counting(false);
    let (b, sb) = counting(false);
    let chain = DetectChain::default().with(sa).with(sb);
    let res = chain.run("test");
    assert_eq!(res.status(), ConnectionStatus::Disconnected);
    assert!(res.identity().is_none());
    assert_eq!((a.get(), b.get()), (1, 1));
    assert_eq!(chain.names().count(), 2);
}

#[test]
fn tmds_sense_gates_the_edid_read() {
    let bed = TestBed::new();
    let bus = bed.bus(BusId::Bus2);
    bus.add_device(0x70, &[(0x09, 0x00)]);
    bus.set_edid(Some(EdidBuilder::new(true).build()));
    let dyn_bus = bus.clone() as Rc<dyn I2cBus>;
    let transmitter = I2cDevice::probe(&dyn_bus, 0x70, "SiI 164").unwrap();
    let (later, sl) = counting(true);
    let chain = DetectChain::default()
        .with(TmdsSenseProbe { transmitter })
        .with(sl);
    assert_eq!(chain.run("DVI-1").status(), ConnectionStatus::Connected);
    assert_eq!(bus.edid_reads.get(), 0);
    assert_eq!(later.get(), 1);

    bus.set_device_reg(0x70, 0x09, 0x04);
    let transmitter = I2cDevice::probe(&dyn_bus, 0x70, "SiI 164").unwrap();
    let (later, sl) = counting(true);
    let chain = DetectChain::default()
        .with(TmdsSenseProbe { transmitter })
        .with(sl);
    let res = chain.run("DVI-1");
    assert_eq!(res.identity().and_then(|i| i.signal), Some(SignalClass::Digital));
    assert_eq!(bus.edid_reads.get(), 1);
    assert_eq!(later.get(), 0);
}

#[test]
fn tmds_sense_rejects_analog_edid() {
    let bed = TestBed::new();
    let bus = bed.bus(BusId::Bus3);
    bus.add_device(0x70, &[(0x09, 0x04)]);
    bus.set_edid(Some(EdidBuilder::new(false).build()));
    let dyn_bus = bus.clone() as Rc<dyn I2cBus>;
    let probe = TmdsSenseProbe {
        transmitter: I2cDevice::probe(&dyn_bus, 0x70, "SiI 164").unwrap(),
    };
    assert!(probe.probe().is_none());
}

#[test]
fn edid_probe_filters_signal_class() {
    let bed = TestBed::new();
    bed.bus(BusId::Bus1)
        .set_edid(Some(EdidBuilder::new(true).build()));
    bed.bus(BusId::Bus2)
        .set_edid(Some(EdidBuilder::new(false).build()));
    let dev = bed.device(Chipset::Vx800, Options::default());
    let probe = |id| EdidProbe {
        bus_id: id,
        bus: dev.bus(id).cloned(),
        expect: SignalClass::Analog,
        panel_size: false,
    };
    assert!(probe(BusId::Bus1).probe().is_none());
    let id = probe(BusId::Bus2).probe().unwrap();
    assert!(id.edid.is_some());
    assert_eq!(id.signal, Some(SignalClass::Analog));
}

#[test]
fn missing_bus_is_no_answer() {
    let bed = TestBed::new();
    let probe = EdidProbe {
        bus_id: BusId::Bus3,
        bus: None,
        expect: SignalClass::Digital,
        panel_size: false,
    };
    assert!(probe.probe().is_none());
    assert_eq!(bed.bus(BusId::Bus3).edid_reads.get(), 0);
}

#[test]
fn panel_edid_needs_a_size() {
    let bed = TestBed::new();
    let dev = bed.device(Chipset::Vx855, Options::default());
    let probe = EdidProbe {
        bus_id: BusId::Bus2,
        bus: dev.bus(BusId::Bus2).cloned(),
        expect: SignalClass::Digital,
        panel_size: true,
    };
    bed.bus(BusId::Bus2)
        .set_edid(Some(EdidBuilder::new(true).build()));
    assert!(probe.probe().is_none());
    bed.bus(BusId::Bus2)
        .set_edid(Some(EdidBuilder::new(true).standard_4_3(0, 1024, 60).build()));
    let panel = probe.probe().and_then(|id| id.panel).unwrap();
    assert_eq!((panel.width, panel.height), (1024, 768));
}

fn load_detect(chipset: Chipset, present: bool) {
    let bed = TestBed::new();
    bed.regs.set_seq(0x01, 0x21);
    bed.regs.set_seq(0x40, 0x06);
    bed.regs.set_crtc(0x36, 0xb0);
    bed.regs
        .set_port(INPUT_STATUS_0, if present { LOAD_SENSE } else { 0 });
    let before = bed.regs.snapshot();
    let mut options = Options::default();
    options.device.load_detect_wait = Duration::from_micros(40);
    let probe = LoadDetectProbe {
        dev: bed.device(chipset, options),
    };
    let res = probe.probe();
    assert_eq!(res.is_some(), present);
    if let Some(id) = res {
        assert_eq!(id.signal, Some(SignalClass::Analog));
    }
    assert_eq!(bed.regs.snapshot(), before);
    assert_eq!(bed.log.sleeps(), vec![Duration::from_micros(40)]);
    let events = bed.log.events();
    let sleep = events
        .iter()
        .position(|e| matches!(e, Event::Sleep(_)))
        .unwrap();
    let read = events
        .iter()
        .position(|e| *e == Event::Port(INPUT_STATUS_0))
        .unwrap();
    assert!(sleep < read);
    // The DAC was forced on before the wait.
    assert!(events[..sleep].contains(&Event::Seq {
        index: 0x01,
        value: 0x01
    }));
    assert!(events[..sleep].contains(&Event::Crtc {
        index: 0x36,
        value: 0x00
    }));
}

#[test]
fn load_detect_restores_registers_when_connected() {
    load_detect(Chipset::P4m900, true);
    load_detect(Chipset::Vx900, true);
}

#[test]
fn load_detect_restores_registers_when_disconnected() {
    load_detect(Chipset::P4m900, false);
    load_detect(Chipset::Cx700, false);
}

#[test]
fn integrated_parts_clear_the_sense_bit() {
    let bed = TestBed::new();
    let probe = LoadDetectProbe {
        dev: bed.device(Chipset::Vx800, Options::default()),
    };
    probe.probe();
    let sr40: Vec<_> = bed
        .log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Seq { index: 0x40, value } => Some(value),
            _ => None,
        })
        .collect();
    // Set, clear, clear after the read, restore.
    assert_eq!(sr40, vec![0x80, 0x00, 0x00, 0x00]);
}

#[test]
fn scratch_pad_resolves_panel() {
    let bed = TestBed::new();
    bed.regs.set_crtc(0x3f, 0xa2);
    let probe = ScratchPadProbe {
        dev: bed.device(Chipset::Km400, Options::default()),
    };
    let panel = probe.probe().and_then(|id| id.panel).unwrap();
    assert_eq!((panel.width, panel.height), (1024, 768));
    assert!(!panel.dual_edge);
    assert!(panel.dithering);
}
