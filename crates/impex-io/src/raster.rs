//! Whole-file raster sessions shared by the built-in backends.
//!
//! The built-in formats are small enough to decode in one go: a backend
//! parses its header and samples into a [`Raster`] and wraps it in a
//! [`RasterDecoder`]. On the write side a [`RasterEncoder`] collects
//! scanlines into a [`Raster`] and hands it to the backend's [`RasterSink`]
//! when the session is closed.

use crate::codec::{BandMut, BandRef, Decoder, Encoder, ScanlineBuffer};
use crate::{IoError, IoResult};
use impex_core::PixelType;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// How bands are arranged in raster storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[b0 b1 b2 b0 b1 b2 ...]` per row, band offset = band count.
    Interleaved,
    /// One full plane per band, band offset = 1.
    Planar,
}

/// A decoded image: geometry plus typed samples.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of bands.
    pub bands: usize,
    /// Band arrangement of `data`.
    pub layout: Layout,
    /// `width * height * bands` samples, rows top to bottom.
    pub data: ScanlineBuffer,
}

impl Raster {
    /// Zeroed raster.
    pub fn new(width: u32, height: u32, bands: usize, layout: Layout, pixel_type: PixelType) -> Self {
        let len = width as usize * height as usize * bands;
        Self {
            width,
            height,
            bands,
            layout,
            data: ScanlineBuffer::new(pixel_type, len),
        }
    }

    /// Index of the first sample of `band` in `row`.
    #[inline]
    pub fn band_start(&self, row: u32, band: usize) -> usize {
        let w = self.width as usize;
        match self.layout {
            Layout::Interleaved => row as usize * w * self.bands + band,
            Layout::Planar => band * w * self.height as usize + row as usize * w,
        }
    }

    /// Index of sample `(x, row, band)`.
    #[inline]
    pub fn index(&self, x: u32, row: u32, band: usize) -> usize {
        self.band_start(row, band) + x as usize * self.offset()
    }

    /// Distance between consecutive samples of one band.
    #[inline]
    pub fn offset(&self) -> usize {
        match self.layout {
            Layout::Interleaved => self.bands,
            Layout::Planar => 1,
        }
    }

    /// Stored representation.
    #[inline]
    pub fn pixel_type(&self) -> PixelType {
        self.data.pixel_type()
    }
}

/// Product of header-declared sizes (dimensions, band count, sample
/// width). Fails with [`IoError::InvalidFile`] when it overflows `usize`.
pub fn checked_size(format: &str, factors: &[usize]) -> IoResult<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| IoError::InvalidFile(format!("{format} image size {factors:?} overflows")))
}

/// Opens `path` for buffered reading, mapping failure to [`IoError::Unreadable`].
pub fn open_reader(path: &Path) -> IoResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IoError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Cursor over an ASCII header (PNM/PFM style): whitespace separated
/// tokens, `#` comments running to end of line.
#[derive(Debug)]
pub struct HeaderCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    /// Cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Next token, skipping whitespace and comments.
    pub fn token(&mut self) -> Option<&'a str> {
        loop {
            match *self.data.get(self.pos)? {
                b'#' => {
                    while self.data.get(self.pos).is_some_and(|&c| c != b'\n') {
                        self.pos += 1;
                    }
                }
                c if c.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|c| !c.is_ascii_whitespace() && *c != b'#')
        {
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos]).ok()
    }

    /// Next token parsed as `T`.
    pub fn parse<T: std::str::FromStr>(&mut self, what: &str) -> IoResult<T> {
        let token = self
            .token()
            .ok_or_else(|| IoError::InvalidFile(format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| IoError::InvalidFile(format!("bad {what}: {token:?}")))
    }

    /// Skips the single whitespace byte that ends a binary header and
    /// returns the remaining bytes.
    pub fn binary_payload(mut self) -> IoResult<&'a [u8]> {
        match self.data.get(self.pos) {
            Some(c) if c.is_ascii_whitespace() => {
                self.pos += 1;
                Ok(&self.data[self.pos..])
            }
            _ => Err(IoError::InvalidFile("header not terminated by whitespace".into())),
        }
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Read session over an in-memory raster.
#[derive(Debug)]
pub struct RasterDecoder {
    name: &'static str,
    raster: Raster,
    declared: Option<PixelType>,
    row: Option<u32>,
    closed: bool,
}

impl RasterDecoder {
    /// Session reporting the raster's own pixel type.
    pub fn new(name: &'static str, raster: Raster) -> Self {
        let declared = Some(raster.pixel_type());
        Self::with_declared(name, raster, declared)
    }

    /// Session reporting `declared` regardless of the storage type.
    ///
    /// `None` marks a file whose samples have no canonical representation.
    pub fn with_declared(name: &'static str, raster: Raster, declared: Option<PixelType>) -> Self {
        debug!(
            format = name,
            width = raster.width,
            height = raster.height,
            bands = raster.bands,
            pixel_type = ?declared,
            "decoder opened"
        );
        Self {
            name,
            raster,
            declared,
            row: None,
            closed: false,
        }
    }

    fn ensure_open(&self) -> IoResult<()> {
        if self.closed {
            Err(IoError::SessionClosed)
        } else {
            Ok(())
        }
    }
}

impl Decoder for RasterDecoder {
    fn format_name(&self) -> &str {
        self.name
    }

    fn width(&self) -> u32 {
        self.raster.width
    }

    fn height(&self) -> u32 {
        self.raster.height
    }

    fn num_bands(&self) -> usize {
        self.raster.bands
    }

    fn pixel_type(&self) -> Option<PixelType> {
        self.declared
    }

    fn offset(&self) -> usize {
        self.raster.offset()
    }

    fn next_scanline(&mut self) -> IoResult<()> {
        self.ensure_open()?;
        let next = self.row.map_or(0, |r| r + 1);
        if next >= self.raster.height {
            return Err(IoError::state(format!(
                "read past last scanline ({} rows)",
                self.raster.height
            )));
        }
        self.row = Some(next);
        Ok(())
    }

    fn current_scanline_of_band(&self, band: usize) -> IoResult<BandRef<'_>> {
        self.ensure_open()?;
        let row = self
            .row
            .ok_or_else(|| IoError::state("no current scanline, call next_scanline first"))?;
        if band >= self.raster.bands {
            return Err(IoError::state(format!(
                "band {band} out of range ({} bands)",
                self.raster.bands
            )));
        }
        Ok(BandRef::new(&self.raster.data, self.raster.band_start(row, band)))
    }

    fn close(&mut self) -> IoResult<()> {
        self.ensure_open()?;
        self.closed = true;
        trace!(format = self.name, "decoder closed");
        Ok(())
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Settings frozen by `finalize_settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSettings {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of bands.
    pub bands: usize,
    /// Stored representation.
    pub pixel_type: PixelType,
}

/// Format-specific half of a [`RasterEncoder`].
pub trait RasterSink {
    /// Codec name.
    fn name(&self) -> &'static str;

    /// Band arrangement the sink expects.
    fn layout(&self) -> Layout;

    /// Rejects settings the format cannot store.
    fn check(&self, settings: &RasterSettings) -> IoResult<()>;

    /// Applies a compression hint.
    fn set_compression(&mut self, _compression: &str) -> IoResult<()> {
        Ok(())
    }

    /// Serializes a complete raster.
    fn write(&self, out: &mut dyn Write, raster: &Raster) -> IoResult<()>;
}

/// Write session that buffers the image and serializes it on close.
pub struct RasterEncoder<K: RasterSink> {
    sink: K,
    path: PathBuf,
    file: Option<BufWriter<File>>,
    width: u32,
    height: u32,
    bands: usize,
    pixel_type: PixelType,
    raster: Option<Raster>,
    row: u32,
    closed: bool,
}

impl<K: RasterSink> RasterEncoder<K> {
    /// Creates `path` and starts a session. Pixel type defaults to `UINT8`.
    pub fn create(path: &Path, sink: K) -> IoResult<Self> {
        let file = File::create(path).map_err(|source| IoError::Unwritable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(format = sink.name(), path = %path.display(), "encoder opened");
        Ok(Self {
            sink,
            path: path.to_path_buf(),
            file: Some(BufWriter::new(file)),
            width: 0,
            height: 0,
            bands: 1,
            pixel_type: PixelType::Uint8,
            raster: None,
            row: 0,
            closed: false,
        })
    }

    fn ensure_configurable(&self, what: &str) -> IoResult<()> {
        if self.closed {
            return Err(IoError::SessionClosed);
        }
        if self.raster.is_some() {
            return Err(IoError::state(format!("{what} after finalize_settings")));
        }
        Ok(())
    }

    fn streaming(&mut self) -> IoResult<&mut Raster> {
        if self.closed {
            return Err(IoError::SessionClosed);
        }
        let row = self.row;
        let raster = self
            .raster
            .as_mut()
            .ok_or_else(|| IoError::state("scanline access before finalize_settings"))?;
        if row >= raster.height {
            return Err(IoError::state(format!(
                "all {} scanlines already written",
                raster.height
            )));
        }
        Ok(raster)
    }
}

impl<K: RasterSink> Encoder for RasterEncoder<K> {
    fn format_name(&self) -> &str {
        self.sink.name()
    }

    fn set_width(&mut self, width: u32) -> IoResult<()> {
        self.ensure_configurable("set_width")?;
        self.width = width;
        Ok(())
    }

    fn set_height(&mut self, height: u32) -> IoResult<()> {
        self.ensure_configurable("set_height")?;
        self.height = height;
        Ok(())
    }

    fn set_num_bands(&mut self, bands: usize) -> IoResult<()> {
        self.ensure_configurable("set_num_bands")?;
        self.bands = bands;
        Ok(())
    }

    fn set_pixel_type(&mut self, pixel_type: PixelType) -> IoResult<()> {
        self.ensure_configurable("set_pixel_type")?;
        self.pixel_type = pixel_type;
        Ok(())
    }

    fn set_compression(&mut self, compression: &str) -> IoResult<()> {
        self.ensure_configurable("set_compression")?;
        self.sink.set_compression(compression)
    }

    fn finalize_settings(&mut self) -> IoResult<()> {
        self.ensure_configurable("finalize_settings")?;
        let settings = RasterSettings {
            width: self.width,
            height: self.height,
            bands: self.bands,
            pixel_type: self.pixel_type,
        };
        if settings.width == 0 || settings.height == 0 || settings.bands == 0 {
            return Err(IoError::EncodeError(format!(
                "{}: empty image {}x{} with {} bands",
                self.sink.name(),
                settings.width,
                settings.height,
                settings.bands
            )));
        }
        self.sink.check(&settings)?;
        debug!(
            format = self.sink.name(),
            width = settings.width,
            height = settings.height,
            bands = settings.bands,
            pixel_type = %settings.pixel_type,
            "encoder settings finalized"
        );
        self.raster = Some(Raster::new(
            settings.width,
            settings.height,
            settings.bands,
            self.sink.layout(),
            settings.pixel_type,
        ));
        Ok(())
    }

    fn offset(&self) -> usize {
        match self.sink.layout() {
            Layout::Interleaved => self.bands,
            Layout::Planar => 1,
        }
    }

    fn current_scanline_of_band(&mut self, band: usize) -> IoResult<BandMut<'_>> {
        let row = self.row;
        let raster = self.streaming()?;
        if band >= raster.bands {
            return Err(IoError::state(format!(
                "band {band} out of range ({} bands)",
                raster.bands
            )));
        }
        let start = raster.band_start(row, band);
        Ok(BandMut::new(&mut raster.data, start))
    }

    fn next_scanline(&mut self) -> IoResult<()> {
        self.streaming()?;
        self.row += 1;
        Ok(())
    }

    fn close(&mut self) -> IoResult<()> {
        if self.closed {
            return Err(IoError::SessionClosed);
        }
        self.closed = true;
        let mut file = self.file.take();
        let raster = self.raster.take();
        match (raster, file.as_mut()) {
            (Some(raster), Some(out)) if self.row == raster.height => {
                self.sink.write(out, &raster)?;
                out.flush()?;
                debug!(format = self.sink.name(), path = %self.path.display(), "encoder closed");
                Ok(())
            }
            (Some(raster), _) => Err(IoError::state(format!(
                "{} closed after {} of {} scanlines",
                self.path.display(),
                self.row,
                raster.height
            ))),
            (None, _) => Err(IoError::state(format!(
                "{} closed before finalize_settings",
                self.path.display()
            ))),
        }
    }
}
