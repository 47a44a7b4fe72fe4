//! Built-in format identities.
//!
//! [`Format`] owns the magic-byte test and extension list of every
//! built-in codec. The registry registers codecs from it and resolves
//! paths through its own extension table.

/// Built-in image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable anymap (PGM/PPM).
    Pnm,
    /// Portable float map.
    Pfm,
    /// Khoros VIFF.
    Viff,
    /// Windows bitmap.
    Bmp,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from raw header bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() < 2 {
            return Format::Unknown;
        }

        // PNM: P2/P3 (ASCII), P5/P6 (binary) followed by whitespace
        if bytes[0] == b'P'
            && matches!(bytes[1], b'2' | b'3' | b'5' | b'6')
            && bytes.get(2).is_none_or(|c| c.is_ascii_whitespace())
        {
            return Format::Pnm;
        }

        // PFM: "Pf" grayscale, "PF" color
        if bytes[0] == b'P' && matches!(bytes[1], b'f' | b'F') {
            return Format::Pfm;
        }

        // VIFF: identifier 0xAB, file type 1
        if bytes[0..2] == [0xAB, 0x01] {
            return Format::Viff;
        }

        // BMP: "BM"
        if bytes[0..2] == [b'B', b'M'] {
            return Format::Bmp;
        }

        Format::Unknown
    }

    /// Registered codec name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Pnm => "PNM",
            Format::Pfm => "PFM",
            Format::Viff => "VIFF",
            Format::Bmp => "BMP",
            Format::Unknown => "",
        }
    }

    /// File extensions without dots.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Pnm => &["pnm", "pgm", "ppm"],
            Format::Pfm => &["pfm"],
            Format::Viff => &["xv", "viff"],
            Format::Bmp => &["bmp"],
            Format::Unknown => &[],
        }
    }
}
