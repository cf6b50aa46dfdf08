use {
    crate::{
        chipset::{Chipset, Family},
        device::Device,
        ports::{
            self, DVP0, DVP1, DiPort, FPDP_HIGH, FPDP_LOW, Iga, LVDS1, LVDS2, LvdsFormat,
            LvdsOutputFormat,
        },
        power::{self, LvdsChannel},
    },
    std::rc::Rc,
};

/// Chipset specific parts of driving a flat panel. Chosen once per output
/// when the output is created.
pub trait PanelChip {
    fn name(&self) -> &'static str;

    fn sequence_power(&self, dev: &Device, ports: DiPort, on: bool);

    fn set_display_source(&self, dev: &Device, ports: DiPort, iga: Iga) {
        // A single half of the flat panel port also drives the DVP sharing
        // its pins.
        let ports = match ports {
            FPDP_LOW => FPDP_LOW | DVP1,
            FPDP_HIGH => FPDP_HIGH | DVP0,
            p => p,
        };
        ports::set_display_source(dev.io(), ports, iga);
    }

    fn set_delay_tap(&self, _dev: &Device, _ports: DiPort) {}

    fn set_transfer_format(&self, _dev: &Device, _ports: DiPort, _dithering: bool) {}
}

struct CastleRock;

impl PanelChip for CastleRock {
    fn name(&self) -> &'static str {
        "CLE266 soft sequence"
    }

    fn sequence_power(&self, dev: &Device, _ports: DiPort, on: bool) {
        power::castle_rock(dev.io(), &*dev.delay, on);
    }
}

struct PrimaryHard {
    delay_tap: Option<u8>,
}

impl PanelChip for PrimaryHard {
    fn name(&self) -> &'static str {
        "primary hardware sequence"
    }

    fn sequence_power(&self, dev: &Device, _ports: DiPort, on: bool) {
        power::hardware_assisted(dev.io(), &*dev.delay, on);
    }

    fn set_delay_tap(&self, dev: &Device, _ports: DiPort) {
        if let Some(tap) = self.delay_tap {
            ports::set_delay_tap(dev.io(), FPDP_LOW, tap);
        }
    }
}

fn integrated_transfer_format(dev: &Device, ports: DiPort, dithering: bool) {
    ports::set_lvds_format(dev.io(), ports, LvdsFormat::OpenLdi);
    ports::set_lvds_output_format(dev.io(), ports, LvdsOutputFormat::Sequential);
    ports::set_lvds_dithering(dev.io(), ports, dithering);
}

/// CX700 and VX800. Rails are driven by software.
struct SoftwareLvds;

impl PanelChip for SoftwareLvds {
    fn name(&self) -> &'static str {
        "integrated LVDS software sequence"
    }

    fn sequence_power(&self, dev: &Device, ports: DiPort, on: bool) {
        let channels = [(LVDS1, LvdsChannel::First), (LVDS2, LvdsChannel::Second)];
        for (port, channel) in channels {
            if ports.contains(port) {
                power::software_rails(dev.io(), &*dev.delay, channel, on);
                ports::set_lvds_power(dev.io(), port, on);
            }
        }
    }

    fn set_transfer_format(&self, dev: &Device, ports: DiPort, dithering: bool) {
        integrated_transfer_format(dev, ports, dithering);
    }
}

/// VX855 and VX900.
struct HardwareLvds;

impl PanelChip for HardwareLvds {
    fn name(&self) -> &'static str {
        "integrated LVDS hardware sequence"
    }

    fn sequence_power(&self, dev: &Device, _ports: DiPort, on: bool) {
        power::hardware_assisted(dev.io(), &*dev.delay, on);
        ports::set_lvds_power(dev.io(), LVDS1, on);
    }

    fn set_transfer_format(&self, dev: &Device, ports: DiPort, dithering: bool) {
        integrated_transfer_format(dev, ports, dithering);
    }
}

pub fn panel_chip(chipset: Chipset) -> Rc<dyn PanelChip> {
    match chipset.family() {
        Family::CastleRock => Rc::new(CastleRock),
        Family::Km400 | Family::P4m890 => Rc::new(PrimaryHard {
            delay_tap: (chipset == Chipset::P4m900).then_some(0x08),
        }),
        Family::Integrated => match chipset {
            Chipset::Cx700 | Chipset::Vx800 => Rc::new(SoftwareLvds),
            _ => Rc::new(HardwareLvds),
        },
    }
}
