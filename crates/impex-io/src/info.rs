//! Import and export descriptors.
//!
//! [`ImageImportInfo`] probes a file once and records what it holds;
//! [`ImageExportInfo`] names a target file and optional codec settings.

use crate::registry::CodecRegistry;
use crate::IoResult;
use impex_core::PixelType;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Properties of an image file, read from its header.
///
/// # Example
///
/// ```no_run
/// use impex_io::ImageImportInfo;
///
/// let info = ImageImportInfo::new("scan.pgm")?;
/// println!("{} {}x{} {:?}", info.file_type(), info.width(), info.height(), info.pixel_type());
/// # Ok::<(), impex_io::IoError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ImageImportInfo {
    path: PathBuf,
    file_type: String,
    width: u32,
    height: u32,
    num_bands: usize,
    pixel_type: Option<PixelType>,
}

impl ImageImportInfo {
    /// Probes `path` with the global registry.
    pub fn new(path: impl AsRef<Path>) -> IoResult<Self> {
        Self::with_registry(CodecRegistry::global(), path, None)
    }

    /// Probes `path` as `file_type`, skipping detection.
    pub fn with_file_type(path: impl AsRef<Path>, file_type: &str) -> IoResult<Self> {
        Self::with_registry(CodecRegistry::global(), path, Some(file_type))
    }

    /// Probes `path` with `registry`.
    ///
    /// # Errors
    ///
    /// - [`IoError::Unreadable`](crate::IoError::Unreadable) if the file
    ///   cannot be opened
    /// - [`IoError::UnknownFormat`](crate::IoError::UnknownFormat) if no
    ///   codec claims it
    /// - any decode error of the codec
    pub fn with_registry(
        registry: &CodecRegistry,
        path: impl AsRef<Path>,
        file_type: Option<&str>,
    ) -> IoResult<Self> {
        let path = path.as_ref();
        let session = registry.open_decoder(path, file_type)?;
        let info = Self {
            path: path.to_path_buf(),
            file_type: session.format_name().to_string(),
            width: session.width(),
            height: session.height(),
            num_bands: session.num_bands(),
            pixel_type: session.pixel_type(),
        };
        session.close()?;
        debug!(
            path = %info.path.display(),
            format = %info.file_type,
            width = info.width,
            height = info.height,
            bands = info.num_bands,
            "probed image"
        );
        Ok(info)
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the codec that read the header.
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// Stored representation, `None` if not one of the canonical ones.
    pub fn pixel_type(&self) -> Option<PixelType> {
        self.pixel_type
    }

    /// One band.
    pub fn is_grayscale(&self) -> bool {
        self.num_bands == 1
    }

    /// Three bands.
    pub fn is_color(&self) -> bool {
        self.num_bands == 3
    }
}

/// Target of an export.
///
/// Without an explicit file type the codec is chosen from the extension.
#[derive(Debug, Clone)]
pub struct ImageExportInfo {
    path: PathBuf,
    file_type: Option<String>,
    compression: Option<String>,
}

impl ImageExportInfo {
    /// Export to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file_type: None,
            compression: None,
        }
    }

    /// Forces the codec, e.g. `"PNM"`.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Passes a codec-specific compression hint, e.g. `"ASCII"` for PNM.
    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forced codec name, if any.
    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    /// Compression hint, if any.
    pub fn compression(&self) -> Option<&str> {
        self.compression.as_deref()
    }
}
