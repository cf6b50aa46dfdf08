
use smallvec::SmallVec;

/// Layout of the panel scaler registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScalerGeneration {
    /// 10-bit factors with a base of 1024 on both axes.
    Legacy,
    /// 12-bit horizontal factor (base 4096) and 11-bit vertical factor
    /// (base 2048) split across CR77, CR78, CR79 and CR9F.
    Modern,
}

impl ScalerGeneration {
    pub fn horizontal_base(self) -> u32 {
        match self {
            ScalerGeneration::Legacy => 1024,
            ScalerGeneration::Modern => 4096,
        }
    }

    pub fn vertical_base(self) -> u32 {
        match self {
            ScalerGeneration::Legacy => 1024,
            ScalerGeneration::Modern => 2048,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScaleFactors {
    pub horizontal: Option<u16>,
    pub vertical: Option<u16>,
}

impl ScaleFactors {
    pub fn enabled(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// A read-modify-write of one CRTC register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CrtcWrite {
    pub index: u8,
    pub value: u8,
    pub mask: u8,
}

pub type CrtcWrites = SmallVec<[CrtcWrite; 8]>;

const fn write(index: u8, value: u8, mask: u8) -> CrtcWrite {
    CrtcWrite { index, value, mask }
}

fn factor(requested: u16, native: u16, base: u32) -> Option<u16> {
    if requested >= native || requested == 0 {
        return None;
    }
    let f = (requested as u32 - 1) * base / (native as u32 - 1);
    Some(f as u16)
}

/// Computes the down-scaling factors that map a `requested` image onto a
/// `native` panel. An axis that does not shrink has no factor.
pub fn compute_scale(
    requested: (u16, u16),
    native: (u16, u16),
    generation: ScalerGeneration,
) -> ScaleFactors {
    ScaleFactors {
        horizontal: factor(requested.0, native.0, generation.horizontal_base()),
        vertical: factor(requested.1, native.1, generation.vertical_base()),
    }
}

/// CR77 holds HFactor[9:2], CR78 VFactor[8:1], CR79[5:4] HFactor[11:10] and
/// CR79[7:6] VFactor[10:9]. CR79[1:0] enables the scaler.
pub fn pack_legacy(factors: &ScaleFactors) -> CrtcWrites {
    let mut cr77 = 0;
    let mut cr78 = 0;
    let mut cr79 = 0;
    if let Some(h) = factors.horizontal {
        cr77 = ((h & 0x03fc) >> 2) as u8;
        cr79 |= (((h & 0x0c00) >> 10) as u8) << 4;
    }
    if let Some(v) = factors.vertical {
        cr78 = ((v & 0x01fe) >> 1) as u8;
        cr79 |= (((v & 0x0600) >> 9) as u8) << 6;
    }
    let mut res = CrtcWrites::new();
    res.push(write(0x77, cr77, 0xff));
    res.push(write(0x78, cr78, 0xff));
    res.push(write(0x79, cr79, 0xf8));
    res.push(write(0x79, 0x03, 0x03));
    res
}

/// Like the legacy layout, plus HFactor[1:0] in CR9F[1:0], VFactor[0] in
/// CR79[3] and the per-axis enables in CRA2[7:6] and CRA2[3].
pub fn pack_modern(factors: &ScaleFactors) -> CrtcWrites {
    let mut cr77 = 0;
    let mut cr78 = 0;
    let mut cr79 = 0;
    let mut cr9f = 0;
    let mut cra2 = 0;
    if let Some(h) = factors.horizontal {
        cra2 |= 0xc0;
        cr9f = (h & 0x0003) as u8;
        cr77 = ((h & 0x03fc) >> 2) as u8;
        cr79 |= (((h & 0x0c00) >> 10) as u8) << 4;
    }
    if let Some(v) = factors.vertical {
        cra2 |= 0x08;
        cr79 |= ((v & 0x0001) as u8) << 3;
        cr78 = ((v & 0x01fe) >> 1) as u8;
        cr79 |= (((v & 0x0600) >> 9) as u8) << 6;
    }
    let mut res = CrtcWrites::new();
    res.push(write(0x77, cr77, 0xff));
    res.push(write(0x78, cr78, 0xff));
    res.push(write(0x79, cr79, 0xf8));
    res.push(write(0x9f, cr9f, 0x03));
    res.push(write(0x79, 0x03, 0x03));
    res.push(write(0xa2, cra2, 0xc8));
    res
}

/// Turns the scaler off. `downscaler` additionally clears the separate
/// down-scaling engine found on the newest parts.
pub fn disable_writes(generation: ScalerGeneration, downscaler: bool) -> CrtcWrites {
    let mut res = CrtcWrites::new();
    res.push(write(0x79, 0x00, 0x01));
    if downscaler {
        res.push(write(0x89, 0x00, 0x01));
    }
    if generation == ScalerGeneration::Modern {
        res.push(write(0xa2, 0x00, 0xc8));
    }
    res
}

/// Register program for the given factors: the generation's packing when
/// any axis scales, the disable sequence otherwise.
pub fn scale_writes(
    factors: &ScaleFactors,
    generation: ScalerGeneration,
    downscaler: bool,
) -> CrtcWrites {
    if !factors.enabled() {
        return disable_writes(generation, downscaler);
    }
    match generation {
        ScalerGeneration::Legacy => pack_legacy(factors),
        ScalerGeneration::Modern => pack_modern(factors),
    }
}
