use {
    crate::{
        chipset::Chipset,
        config::Options,
        device::{Device, PllRange, Sleeper},
        edid::EDID_BLOCK_LEN,
        i2c::{BusId, I2cBus, I2cBuses, I2cError},
        regs::RegisterIo,
    },
    ahash::AHashMap,
    std::{
        cell::{Cell, RefCell},
        rc::Rc,
        sync::Once,
        time::Duration,
    },
};

pub fn init_logger() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = simplelog::TestLogger::init(log::LevelFilter::Trace, simplelog::Config::default());
    });
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Seq { index: u8, value: u8 },
    Crtc { index: u8, value: u8 },
    Port(u16),
    Sleep(Duration),
    I2cWrite { addr: u8, offset: u8, value: u8 },
}

#[derive(Default)]
pub struct EventLog {
    events: RefCell<Vec<Event>>,
}

impl EventLog {
    pub fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Register writes to the CRTC bank, in order.
    pub fn crtc_writes(&self) -> Vec<(u8, u8)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match *e {
                Event::Crtc { index, value } => Some((index, value)),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeRegs {
    pub log: Rc<EventLog>,
    seq: RefCell<[u8; 256]>,
    crtc: RefCell<[u8; 256]>,
    ports: RefCell<AHashMap<u16, u8>>,
}

impl FakeRegs {
    pub fn new(log: &Rc<EventLog>) -> Rc<Self> {
        Rc::new(Self {
            log: log.clone(),
            seq: RefCell::new([0; 256]),
            crtc: RefCell::new([0; 256]),
            ports: Default::default(),
        })
    }

    pub fn seq(&self, index: u8) -> u8 {
        self.seq.borrow()[index as usize]
    }

    pub fn crtc(&self, index: u8) -> u8 {
        self.crtc.borrow()[index as usize]
    }

    /// Presets a register without recording an event.
    pub fn set_seq(&self, index: u8, value: u8) {
        self.seq.borrow_mut()[index as usize] = value;
    }

    pub fn set_crtc(&self, index: u8, value: u8) {
        self.crtc.borrow_mut()[index as usize] = value;
    }

    pub fn set_port(&self, port: u16, value: u8) {
        self.ports.borrow_mut().insert(port, value);
    }

    pub fn snapshot(&self) -> ([u8; 256], [u8; 256]) {
        (*self.seq.borrow(), *self.crtc.borrow())
    }
}

impl RegisterIo for FakeRegs {
    fn read_seq(&self, index: u8) -> u8 {
        self.seq(index)
    }

    fn write_seq(&self, index: u8, value: u8) {
        self.log.push(Event::Seq { index, value });
        self.set_seq(index, value);
    }

    fn read_crtc(&self, index: u8) -> u8 {
        self.crtc(index)
    }

    fn write_crtc(&self, index: u8, value: u8) {
        self.log.push(Event::Crtc { index, value });
        self.set_crtc(index, value);
    }

    fn read_port(&self, port: u16) -> u8 {
        self.log.push(Event::Port(port));
        self.ports.borrow().get(&port).copied().unwrap_or(0)
    }
}

pub struct RecordingSleeper {
    pub log: Rc<EventLog>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.log.push(Event::Sleep(duration));
    }
}

pub struct FakeI2cBus {
    name: String,
    log: Rc<EventLog>,
    devices: RefCell<AHashMap<u8, [u8; 256]>>,
    edid: RefCell<Option<Vec<u8>>>,
    pub edid_reads: Cell<u32>,
    pub byte_reads: Cell<u32>,
}

impl FakeI2cBus {
    pub fn new(name: &str, log: &Rc<EventLog>) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            devices: Default::default(),
            edid: Default::default(),
            edid_reads: Default::default(),
            byte_reads: Default::default(),
        })
    }

    pub fn add_device(&self, addr: u8, regs: &[(u8, u8)]) {
        let mut mem = [0; 256];
        for &(offset, value) in regs {
            mem[offset as usize] = value;
        }
        self.devices.borrow_mut().insert(addr, mem);
    }

    pub fn device_reg(&self, addr: u8, offset: u8) -> Option<u8> {
        self.devices
            .borrow()
            .get(&addr)
            .map(|mem| mem[offset as usize])
    }

    pub fn set_device_reg(&self, addr: u8, offset: u8, value: u8) {
        if let Some(mem) = self.devices.borrow_mut().get_mut(&addr) {
            mem[offset as usize] = value;
        }
    }

    pub fn set_edid(&self, edid: Option<Vec<u8>>) {
        *self.edid.borrow_mut() = edid;
    }
}

impl I2cBus for FakeI2cBus {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe_address(&self, addr: u8) -> bool {
        self.devices.borrow().contains_key(&addr)
    }

    fn read_byte(&self, addr: u8, offset: u8) -> Result<u8, I2cError> {
        self.byte_reads.set(self.byte_reads.get() + 1);
        self.device_reg(addr, offset).ok_or(I2cError::NoDevice(addr))
    }

    fn write_byte(&self, addr: u8, offset: u8, value: u8) -> Result<(), I2cError> {
        if !self.probe_address(addr) {
            return Err(I2cError::NoDevice(addr));
        }
        self.log.push(Event::I2cWrite {
            addr,
            offset,
            value,
        });
        self.set_device_reg(addr, offset, value);
        Ok(())
    }

    fn read_edid(&self) -> Result<Vec<u8>, I2cError> {
        self.edid_reads.set(self.edid_reads.get() + 1);
        self.edid.borrow().clone().ok_or(I2cError::NoEdid)
    }
}

/// A device backed by fakes, with every I2C bus wired and a PLL that can
/// produce any clock.
pub struct TestBed {
    pub log: Rc<EventLog>,
    pub regs: Rc<FakeRegs>,
    pub buses: Vec<Rc<FakeI2cBus>>,
}

impl TestBed {
    pub fn new() -> Self {
        init_logger();
        let log = Rc::new(EventLog::default());
        Self {
            regs: FakeRegs::new(&log),
            buses: vec![
                FakeI2cBus::new("I2C bus 1", &log),
                FakeI2cBus::new("I2C bus 2", &log),
                FakeI2cBus::new("I2C bus 3", &log),
            ],
            log,
        }
    }

    pub fn bus(&self, id: BusId) -> &Rc<FakeI2cBus> {
        match id {
            BusId::Bus1 => &self.buses[0],
            BusId::Bus2 => &self.buses[1],
            BusId::Bus3 => &self.buses[2],
        }
    }

    pub fn device(&self, chipset: Chipset, options: Options) -> Rc<Device> {
        self.device_with_buses(chipset, options, &[BusId::Bus1, BusId::Bus2, BusId::Bus3])
    }

    pub fn device_with_buses(
        &self,
        chipset: Chipset,
        options: Options,
        wired: &[BusId],
    ) -> Rc<Device> {
        let mut buses = I2cBuses::default();
        for &id in wired {
            buses[id] = Some(self.bus(id).clone() as Rc<dyn I2cBus>);
        }
        Rc::new(Device {
            chipset,
            regs: self.regs.clone(),
            delay: Rc::new(RecordingSleeper {
                log: self.log.clone(),
            }),
            clocks: Rc::new(PllRange {
                min_khz: 0,
                max_khz: u32::MAX,
            }),
            buses,
            options,
        })
    }
}

/// Builds EDID base blocks with a valid checksum.
pub struct EdidBuilder {
    block: [u8; EDID_BLOCK_LEN],
}

impl EdidBuilder {
    pub fn new(digital: bool) -> Self {
        let mut block = [0; EDID_BLOCK_LEN];
        block[..8].copy_from_slice(&[0, 255, 255, 255, 255, 255, 255, 0]);
        // "VIA"
        block[8] = (22 << 2) | (9 >> 3);
        block[9] = ((9 & 0b111) << 5) | 1;
        block[10] = 0x34;
        block[11] = 0x12;
        block[18] = 1;
        block[19] = 3;
        block[20] = if digital { 0x80 } else { 0x00 };
        block[21] = 34;
        block[22] = 27;
        for i in 0..8 {
            block[38 + 2 * i] = 1;
            block[39 + 2 * i] = 1;
        }
        Self { block }
    }

    /// Adds a 4:3 standard timing.
    pub fn standard_4_3(mut self, slot: usize, hsize: u16, refresh_hz: u8) -> Self {
        self.block[38 + 2 * slot] = (hsize / 8 - 31) as u8;
        self.block[39 + 2 * slot] = (0b01 << 6) | (refresh_hz - 60);
        self
    }

    /// Adds a detailed timing with separate digital syncs, both negative.
    pub fn detailed(
        mut self,
        slot: usize,
        clock_khz: u32,
        h: (u16, u16, u16, u16),
        v: (u16, u16, u16, u16),
    ) -> Self {
        let (ha, hb, hfp, hs) = h;
        let (va, vb, vfp, vs) = v;
        let d = &mut self.block[54 + 18 * slot..72 + 18 * slot];
        let clock = (clock_khz / 10) as u16;
        d[0..2].copy_from_slice(&clock.to_le_bytes());
        d[2] = ha as u8;
        d[3] = hb as u8;
        d[4] = (((ha >> 8) as u8) << 4) | (hb >> 8) as u8;
        d[5] = va as u8;
        d[6] = vb as u8;
        d[7] = (((va >> 8) as u8) << 4) | (vb >> 8) as u8;
        d[8] = hfp as u8;
        d[9] = hs as u8;
        d[10] = ((vfp as u8 & 0xf) << 4) | (vs as u8 & 0xf);
        d[11] = (((hfp >> 8) as u8) << 6) | (((hs >> 8) as u8) << 4);
        d[17] = 0b11000;
        self
    }

    pub fn name(mut self, slot: usize, name: &str) -> Self {
        let d = &mut self.block[54 + 18 * slot..72 + 18 * slot];
        d[3] = 0xfc;
        let mut text = [b' '; 13];
        text[..name.len()].copy_from_slice(name.as_bytes());
        if name.len() < 13 {
            text[name.len()] = b'\n';
        }
        d[5..].copy_from_slice(&text);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let sum = self.block[..127]
            .iter()
            .fold(0u8, |a, &b| a.wrapping_add(b));
        self.block[127] = 0u8.wrapping_sub(sum);
        self.block.to_vec()
    }
}
