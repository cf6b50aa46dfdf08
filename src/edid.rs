
use {
    crate::utils::bitflags::BitflagsExt,
    bstr::{BString, ByteSlice},
    smallvec::SmallVec,
    thiserror::Error,
};

pub const EDID_BLOCK_LEN: usize = 128;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignalClass {
    Analog,
    Digital,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AspectRatio {
    A1_1,
    A16_10,
    A4_3,
    A5_4,
    A16_9,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StandardTiming {
    pub hsize: u16,
    pub vsize: u16,
    pub aspect_ratio: AspectRatio,
    pub refresh_hz: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DetailedTiming {
    pub clock_khz: u32,
    pub h_active: u16,
    pub h_blank: u16,
    pub h_front_porch: u16,
    pub h_sync: u16,
    pub v_active: u16,
    pub v_blank: u16,
    pub v_front_porch: u16,
    pub v_sync: u16,
    pub width_mm: u16,
    pub height_mm: u16,
    pub interlaced: bool,
    pub hsync_positive: bool,
    pub vsync_positive: bool,
}

/// The parts of an EDID base block that output detection and mode
/// enumeration care about.
#[derive(Clone, Debug)]
pub struct MonitorInfo {
    pub manufacturer: BString,
    pub product_code: u16,
    pub serial_number: u32,
    pub version: u8,
    pub revision: u8,
    pub signal: SignalClass,
    pub size_cm: Option<(u8, u8)>,
    pub standard_timings: SmallVec<[StandardTiming; 8]>,
    pub detailed_timings: SmallVec<[DetailedTiming; 4]>,
    pub name: Option<String>,
}

impl MonitorInfo {
    pub fn is_digital(&self) -> bool {
        self.signal == SignalClass::Digital
    }

    /// Native size of a panel as advertised by its EDID.
    ///
    /// The widest standard timing wider than 256 pixels wins. Without one,
    /// the widest detailed timing faster than 15 MHz is used.
    pub fn panel_size(&self) -> Option<(u16, u16)> {
        let std = self
            .standard_timings
            .iter()
            .filter(|t| t.hsize > 256)
            .fold(None, |acc: Option<&StandardTiming>, t| match acc {
                Some(a) if a.hsize >= t.hsize => Some(a),
                _ => Some(t),
            });
        if let Some(t) = std {
            return Some((t.hsize, t.vsize));
        }
        let det = self
            .detailed_timings
            .iter()
            .filter(|t| t.clock_khz > 15_000 && t.h_active > 0)
            .fold(None, |acc: Option<&DetailedTiming>, t| match acc {
                Some(a) if a.h_active >= t.h_active => Some(a),
                _ => Some(t),
            });
        det.map(|t| (t.h_active, t.v_active))
    }
}

#[derive(Debug, Error)]
pub enum EdidError {
    #[error("Unexpected end-of-file")]
    UnexpectedEof,
    #[error("Invalid magic header")]
    InvalidMagic(BString),
    #[error("Checksum mismatch (sum is 0x{0:02x})")]
    Checksum(u8),
}

struct EdidParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> EdidParser<'a> {
    fn read_n<const N: usize>(&mut self) -> Result<&'a [u8; N], EdidError> {
        let Some(rest) = self.data.get(self.pos..self.pos + N) else {
            return Err(EdidError::UnexpectedEof);
        };
        self.pos += N;
        rest.try_into().map_err(|_| EdidError::UnexpectedEof)
    }

    fn read_u8(&mut self) -> Result<u8, EdidError> {
        let &[a] = self.read_n()?;
        Ok(a)
    }

    fn read_u16(&mut self) -> Result<u16, EdidError> {
        let &[lo, hi] = self.read_n()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn read_u32(&mut self) -> Result<u32, EdidError> {
        let &b = self.read_n::<4>()?;
        Ok(u32::from_le_bytes(b))
    }

    fn parse_magic(&mut self) -> Result<(), EdidError> {
        let magic = self.read_n::<8>()?;
        if magic != &[0, 255, 255, 255, 255, 255, 255, 0] {
            return Err(EdidError::InvalidMagic(magic.as_bstr().to_owned()));
        }
        Ok(())
    }

    fn parse_manufacturer(&mut self) -> Result<BString, EdidError> {
        let name = self.read_n::<2>()?;
        let a = (name[0] >> 2) & 0b11111;
        let b = ((name[0] & 0b11) << 3) | (name[1] >> 5);
        let c = name[1] & 0b11111;
        Ok([a + b'@', b + b'@', c + b'@'].as_bstr().to_owned())
    }

    fn parse_standard_timing(revision: u8, a: u8, b: u8) -> Option<StandardTiming> {
        if a == 0 || (a, b) == (1, 1) {
            return None;
        }
        let hsize = (a as u16 + 31) * 8;
        let (aspect_ratio, vsize) = match b >> 6 {
            0b00 if revision < 3 => (AspectRatio::A1_1, hsize),
            0b00 => (AspectRatio::A16_10, hsize * 10 / 16),
            0b01 => (AspectRatio::A4_3, hsize * 3 / 4),
            0b10 => (AspectRatio::A5_4, hsize * 4 / 5),
            _ => (AspectRatio::A16_9, hsize * 9 / 16),
        };
        Some(StandardTiming {
            hsize,
            vsize,
            aspect_ratio,
            refresh_hz: 60 + (b & 0b111111),
        })
    }

    fn parse_detailed_timing(b: &[u8; 18]) -> DetailedTiming {
        let l = b[17];
        let digital_separate = l & 0b11000 == 0b11000;
        DetailedTiming {
            clock_khz: u16::from_le_bytes([b[0], b[1]]) as u32 * 10,
            h_active: u16::from_le_bytes([b[2], b[4] >> 4]),
            h_blank: u16::from_le_bytes([b[3], b[4] & 0b1111]),
            v_active: u16::from_le_bytes([b[5], b[7] >> 4]),
            v_blank: u16::from_le_bytes([b[6], b[7] & 0b1111]),
            h_front_porch: u16::from_le_bytes([b[8], b[11] >> 6]),
            h_sync: u16::from_le_bytes([b[9], (b[11] >> 4) & 0b11]),
            v_front_porch: ((b[10] >> 4) | ((b[11] & 0b1100) << 2)) as u16,
            v_sync: ((b[10] & 0b1111) | ((b[11] & 0b11) << 4)) as u16,
            width_mm: u16::from_le_bytes([b[12], b[14] >> 4]),
            height_mm: u16::from_le_bytes([b[13], b[14] & 0b1111]),
            interlaced: l.contains(0x80),
            hsync_positive: l.contains(0b10),
            vsync_positive: digital_separate && l.contains(0b100),
        }
    }

    fn parse_block(&mut self) -> Result<MonitorInfo, EdidError> {
        self.parse_magic()?;
        let manufacturer = self.parse_manufacturer()?;
        let product_code = self.read_u16()?;
        let serial_number = self.read_u32()?;
        let _week_and_year = self.read_n::<2>()?;
        let &[version, revision] = self.read_n()?;
        let signal = match self.read_u8()?.contains(0x80) {
            true => SignalClass::Digital,
            false => SignalClass::Analog,
        };
        let &[hor, vert] = self.read_n()?;
        let size_cm = (hor != 0 && vert != 0).then_some((hor, vert));
        // gamma, features, chromaticity, established timings
        let _ = self.read_n::<15>()?;
        let mut standard_timings = SmallVec::new();
        let bytes = self.read_n::<16>()?;
        for pair in bytes.chunks_exact(2) {
            standard_timings.extend(Self::parse_standard_timing(revision, pair[0], pair[1]));
        }
        let mut detailed_timings = SmallVec::new();
        let mut name = None;
        for _ in 0..4 {
            let b = self.read_n::<18>()?;
            if (b[0], b[1]) != (0, 0) {
                detailed_timings.push(Self::parse_detailed_timing(b));
                continue;
            }
            match b[3] {
                0xfc => {
                    let mut s = &b[5..];
                    if let Some(n) = s.find_byte(b'\n') {
                        s = &s[..n];
                    }
                    name = Some(s.to_str_lossy().trim_end().to_owned());
                }
                0xfa => {
                    for i in 0..6 {
                        let t = Self::parse_standard_timing(revision, b[5 + 2 * i], b[6 + 2 * i]);
                        standard_timings.extend(t);
                    }
                }
                _ => {}
            }
        }
        Ok(MonitorInfo {
            manufacturer,
            product_code,
            serial_number,
            version,
            revision,
            signal,
            size_cm,
            standard_timings,
            detailed_timings,
            name,
        })
    }
}

/// Parses the base block of an EDID blob. Extension blocks are ignored.
pub fn parse(data: &[u8]) -> Result<MonitorInfo, EdidError> {
    let Some(block) = data.get(..EDID_BLOCK_LEN) else {
        return Err(EdidError::UnexpectedEof);
    };
    let mut parser = EdidParser { data: block, pos: 0 };
    let info = parser.parse_block()?;
    let sum = block.iter().fold(0u8, |a, &b| a.wrapping_add(b));
    if sum != 0 {
        return Err(EdidError::Checksum(sum));
    }
    Ok(info)
}
