use {
    chrome_algorithms::scale::ScalerGeneration,
    linearize::Linearize,
    std::fmt::{Display, Formatter},
};

/// Integrated graphics parts driven by this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Linearize)]
pub enum Chipset {
    Cle266,
    Km400,
    K8m800,
    Pm800,
    P4m800Pro,
    P4m890,
    K8m890,
    P4m900,
    Cx700,
    Vx800,
    Vx855,
    Vx900,
}

/// Groups of chipsets that share strapping layout and panel power control.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Family {
    /// CLE266.
    CastleRock,
    /// KM400, K8M800, PM800 and P4M800 Pro.
    Km400,
    /// P4M890, K8M890 and P4M900.
    P4m890,
    /// CX700, VX800, VX855 and VX900 with integrated LVDS transmitters.
    Integrated,
}

impl Chipset {
    pub fn family(self) -> Family {
        match self {
            Chipset::Cle266 => Family::CastleRock,
            Chipset::Km400 | Chipset::K8m800 | Chipset::Pm800 | Chipset::P4m800Pro => Family::Km400,
            Chipset::P4m890 | Chipset::K8m890 | Chipset::P4m900 => Family::P4m890,
            Chipset::Cx700 | Chipset::Vx800 | Chipset::Vx855 | Chipset::Vx900 => {
                Family::Integrated
            }
        }
    }

    pub fn scaler_generation(self) -> ScalerGeneration {
        match self {
            Chipset::Cle266 | Chipset::Km400 => ScalerGeneration::Legacy,
            _ => ScalerGeneration::Modern,
        }
    }

    /// Whether the part has the separate down-scaling engine at CR89.
    pub fn has_downscaler(self) -> bool {
        self == Chipset::Vx900
    }

    pub fn name(self) -> &'static str {
        match self {
            Chipset::Cle266 => "CLE266",
            Chipset::Km400 => "KM400",
            Chipset::K8m800 => "K8M800",
            Chipset::Pm800 => "PM800",
            Chipset::P4m800Pro => "P4M800 Pro",
            Chipset::P4m890 => "P4M890",
            Chipset::K8m890 => "K8M890",
            Chipset::P4m900 => "P4M900",
            Chipset::Cx700 => "CX700",
            Chipset::Vx800 => "VX800",
            Chipset::Vx855 => "VX855",
            Chipset::Vx900 => "VX900",
        }
    }
}

impl Display for Chipset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
