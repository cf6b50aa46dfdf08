
use {
    crate::{
        detect::ConnectionStatus,
        device::Device,
        i2c::{BusId, I2cError},
        output::{
            Output, OutputBackend, OutputKind, analog::Analog, panel::Panel,
            sii164::{Sii164, TransmitterError},
        },
        strapping,
        utils::errorfmt::ErrorFmt,
    },
    ahash::AHashMap,
    linearize::StaticMap,
    std::rc::Rc,
};

linear_ids!(OutputIds, OutputId);

/// Owns every output of one graphics device.
pub struct OutputRegistry {
    dev: Rc<Device>,
    ids: OutputIds,
    outputs: Vec<Rc<Output>>,
    names: AHashMap<String, OutputId>,
    per_kind: AHashMap<OutputKind, u32>,
}

impl OutputRegistry {
    pub fn new(dev: Rc<Device>) -> Self {
        Self {
            dev,
            ids: Default::default(),
            outputs: Default::default(),
            names: Default::default(),
            per_kind: Default::default(),
        }
    }

    /// Creates a registry populated with every output the hardware
    /// strapping and the I2C buses reveal.
    pub fn probe(dev: Rc<Device>) -> Self {
        let mut registry = Self::new(dev);
        registry.probe_outputs();
        registry
    }

    pub fn device(&self) -> &Rc<Device> {
        &self.dev
    }

    fn next_name(&mut self, kind: OutputKind) -> String {
        let n = self.per_kind.entry(kind).or_default();
        *n += 1;
        format!("{}-{}", kind.prefix(), n)
    }

    fn add(&mut self, backend: Box<dyn OutputBackend>) -> Rc<Output> {
        let name = self.next_name(backend.kind());
        self.add_named(name, backend)
    }

    fn add_named(&mut self, name: String, backend: Box<dyn OutputBackend>) -> Rc<Output> {
        let id = self.ids.next();
        log::info!("Created output {} ({})", name, id);
        let output = Rc::new(Output::new(id, name.clone(), backend));
        self.names.insert(name, id);
        self.outputs.push(output.clone());
        output
    }

    pub fn probe_outputs(&mut self) {
        let dev = self.dev.clone();
        let mut mapped = StaticMap::<BusId, bool>::default();
        if let Some(analog) = Analog::new(&dev) {
            self.add(Box::new(analog));
        }
        self.probe_transmitters(&dev, &mut mapped);
        let fp = strapping::probe_panels(dev.chipset, dev.io(), dev.options.device.nano_book);
        for ports in [fp.fp1, fp.fp2].into_iter().flatten() {
            let mut bus = None;
            if !mapped[BusId::Bus2] && dev.bus(BusId::Bus2).is_some() {
                mapped[BusId::Bus2] = true;
                bus = Some(BusId::Bus2);
            }
            let name = self.next_name(OutputKind::Panel);
            let options = dev.options.output_options(&name);
            self.add_named(name, Box::new(Panel::new(&dev, ports, bus, options)));
        }
    }

    fn probe_transmitters(&mut self, dev: &Rc<Device>, mapped: &mut StaticMap<BusId, bool>) {
        let port = match strapping::tmds_port(dev.chipset, dev.io()) {
            Ok(p) => p,
            Err(e) => {
                log::info!("Not probing for TMDS transmitters: {}", ErrorFmt(e));
                return;
            }
        };
        for id in [BusId::Bus2, BusId::Bus3] {
            let Some(bus) = dev.bus(id) else {
                continue;
            };
            match Sii164::probe(dev, bus, port) {
                Ok(t) => {
                    log::info!("SiI 164 TMDS transmitter on {:?} drives {}", id, port);
                    mapped[id] = true;
                    self.add(Box::new(t));
                }
                Err(TransmitterError::I2c(I2cError::NoDevice(addr))) => {
                    log::debug!("No TMDS transmitter at 0x{:02x} on {:?}", addr, id);
                }
                Err(e) => {
                    log::info!("SiI 164 not detected on {:?}: {}", id, ErrorFmt(e));
                }
            }
        }
    }

    pub fn get(&self, id: OutputId) -> Option<&Rc<Output>> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Rc<Output>> {
        let id = *self.names.get(name)?;
        self.get(id)
    }

    pub fn outputs(&self) -> &[Rc<Output>] {
        &self.outputs
    }

    pub fn detect_all(&self) -> Vec<(OutputId, ConnectionStatus)> {
        self.outputs.iter().map(|o| (o.id, o.detect())).collect()
    }

    pub fn save_all(&self) {
        for output in &self.outputs {
            output.save();
        }
    }

    /// Restores saved state and drops every output.
    pub fn teardown(&mut self) {
        for output in self.outputs.drain(..) {
            output.restore();
            log::debug!("Destroyed output {}", output.name);
        }
        self.names.clear();
        self.per_kind.clear();
    }
}
