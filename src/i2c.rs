use {
    crate::edid::{self, EdidError, MonitorInfo},
    linearize::{Linearize, StaticMap},
    std::rc::Rc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum I2cError {
    #[error("No device answers at address 0x{0:02x}")]
    NoDevice(u8),
    #[error("Device 0x{addr:02x} did not acknowledge offset 0x{offset:02x}")]
    NoAck { addr: u8, offset: u8 },
    #[error("{0:?} is not wired on this board")]
    BusAbsent(BusId),
    #[error("The monitor did not answer the EDID request")]
    NoEdid,
    #[error("The EDID block is invalid")]
    InvalidEdid(#[source] EdidError),
}

/// A DDC/I2C bus provided by the host.
pub trait I2cBus {
    fn name(&self) -> &str;
    fn probe_address(&self, addr: u8) -> bool;
    fn read_byte(&self, addr: u8, offset: u8) -> Result<u8, I2cError>;
    fn write_byte(&self, addr: u8, offset: u8, value: u8) -> Result<(), I2cError>;
    /// Reads the 128-byte EDID base block from the DDC address.
    fn read_edid(&self) -> Result<Vec<u8>, I2cError>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Linearize)]
pub enum BusId {
    Bus1,
    Bus2,
    Bus3,
}

pub type I2cBuses = StaticMap<BusId, Option<Rc<dyn I2cBus>>>;

pub fn read_monitor_info(bus: &dyn I2cBus) -> Result<MonitorInfo, I2cError> {
    let block = bus.read_edid()?;
    edid::parse(&block).map_err(I2cError::InvalidEdid)
}

/// A slave on an I2C bus.
#[derive(Clone)]
pub struct I2cDevice {
    pub bus: Rc<dyn I2cBus>,
    pub addr: u8,
    pub name: &'static str,
}

impl I2cDevice {
    /// Binds `addr` on `bus` if a device acknowledges it.
    pub fn probe(bus: &Rc<dyn I2cBus>, addr: u8, name: &'static str) -> Result<Self, I2cError> {
        if !bus.probe_address(addr) {
            return Err(I2cError::NoDevice(addr));
        }
        Ok(Self {
            bus: bus.clone(),
            addr,
            name,
        })
    }

    pub fn read_byte(&self, offset: u8) -> Result<u8, I2cError> {
        self.bus.read_byte(self.addr, offset)
    }

    pub fn write_byte(&self, offset: u8, value: u8) -> Result<(), I2cError> {
        self.bus.write_byte(self.addr, offset, value)
    }

    pub fn read_u16(&self, offset: u8) -> Result<u16, I2cError> {
        let lo = self.read_byte(offset)?;
        let hi = self.read_byte(offset + 1)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn mask_byte(&self, offset: u8, value: u8, mask: u8) -> Result<(), I2cError> {
        let old = self.read_byte(offset)?;
        self.write_byte(offset, (old & !mask) | (value & mask))
    }
}
