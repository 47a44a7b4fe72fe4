//! Codec registry for format detection and session creation.
//!
//! The registry provides a centralized way to:
//! - Register codecs (decoder/encoder factories plus capabilities)
//! - Auto-detect formats by magic bytes or extension
//! - Query which pixel types a format can store, without opening a session
//! - Open scoped read and write sessions
//!
//! # Architecture
//!
//! The registry uses a singleton pattern via [`CodecRegistry::global()`].
//! Built-in codecs are registered automatically based on enabled features.
//! Custom codecs go into a registry built with [`CodecRegistry::with_builtins`]
//! or [`CodecRegistry::new`] and are used through the `*_with` engine entry
//! points.
//!
//! # Example
//!
//! ```
//! use impex_io::registry::CodecRegistry;
//! use impex_core::PixelType;
//!
//! let registry = CodecRegistry::global();
//!
//! #[cfg(feature = "pnm")]
//! {
//!     assert!(registry.supports_extension("PGM"));
//!     assert!(registry.is_pixel_type_supported("PNM", PixelType::Uint8));
//!     assert!(!registry.is_pixel_type_supported("PNM", PixelType::Float));
//!     assert_eq!(registry.detect_format(b"P5\n1 1\n255\n\0"), Some("PNM"));
//! }
//! ```

use crate::codec::{Decoder, Encoder};
use crate::session::{DecoderSession, EncoderSession};
use crate::{IoError, IoResult};
use impex_core::PixelType;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Opens a read session for a file.
pub type DecoderFactory = fn(&Path) -> IoResult<Box<dyn Decoder>>;

/// Creates a file and opens a write session for it.
pub type EncoderFactory = fn(&Path) -> IoResult<Box<dyn Encoder>>;

/// Codec entry in the registry.
#[derive(Clone)]
pub struct CodecInfo {
    /// Codec name (e.g. "PNM", "VIFF").
    pub name: &'static str,
    /// File extensions without dots.
    pub extensions: &'static [&'static str],
    /// Checks if header bytes belong to this format.
    pub can_read: fn(&[u8]) -> bool,
    /// Pixel types the encoder can store.
    pub pixel_types: &'static [PixelType],
    /// Read session factory (None if read is not supported).
    pub decoder: Option<DecoderFactory>,
    /// Write session factory (None if write is not supported).
    pub encoder: Option<EncoderFactory>,
}

impl std::fmt::Debug for CodecInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecInfo")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("pixel_types", &self.pixel_types)
            .field("read", &self.decoder.is_some())
            .field("write", &self.encoder.is_some())
            .finish()
    }
}

/// Central registry of codecs.
///
/// # Thread Safety
///
/// The global instance is built once and read-only afterwards, so it can be
/// shared by any thread.
pub struct CodecRegistry {
    formats: HashMap<&'static str, Arc<CodecInfo>>,
    by_extension: HashMap<&'static str, &'static str>,
}

impl CodecRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in codecs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_formats();
        registry
    }

    /// Returns the global registry instance with built-in codecs.
    pub fn global() -> &'static CodecRegistry {
        static INSTANCE: OnceLock<CodecRegistry> = OnceLock::new();
        INSTANCE.get_or_init(Self::with_builtins)
    }

    /// Registers built-in codecs based on enabled features.
    fn register_builtin_formats(&mut self) {
        #[cfg(feature = "pnm")]
        self.register(CodecInfo {
            name: crate::detect::Format::Pnm.name(),
            extensions: crate::detect::Format::Pnm.extensions(),
            can_read: crate::pnm::can_read,
            pixel_types: crate::pnm::PIXEL_TYPES,
            decoder: Some(crate::pnm::decoder),
            encoder: Some(crate::pnm::encoder),
        });

        #[cfg(feature = "pfm")]
        self.register(CodecInfo {
            name: crate::detect::Format::Pfm.name(),
            extensions: crate::detect::Format::Pfm.extensions(),
            can_read: crate::pfm::can_read,
            pixel_types: crate::pfm::PIXEL_TYPES,
            decoder: Some(crate::pfm::decoder),
            encoder: Some(crate::pfm::encoder),
        });

        #[cfg(feature = "viff")]
        self.register(CodecInfo {
            name: crate::detect::Format::Viff.name(),
            extensions: crate::detect::Format::Viff.extensions(),
            can_read: crate::viff::can_read,
            pixel_types: crate::viff::PIXEL_TYPES,
            decoder: Some(crate::viff::decoder),
            encoder: Some(crate::viff::encoder),
        });

        #[cfg(feature = "bmp")]
        self.register(CodecInfo {
            name: crate::detect::Format::Bmp.name(),
            extensions: crate::detect::Format::Bmp.extensions(),
            can_read: crate::bmp::can_read,
            pixel_types: crate::bmp::PIXEL_TYPES,
            decoder: Some(crate::bmp::decoder),
            encoder: Some(crate::bmp::encoder),
        });
    }

    /// Registers a codec, replacing any codec of the same name.
    pub fn register(&mut self, info: CodecInfo) {
        let name = info.name;
        for ext in info.extensions {
            self.by_extension.insert(ext, name);
        }
        self.formats.insert(name, Arc::new(info));
    }

    /// Returns an iterator over registered codec names.
    pub fn format_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.keys().copied()
    }

    /// Returns an iterator over all registered extensions.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_extension.keys().copied()
    }

    /// Returns codec info by name (exact, then upper-case).
    pub fn get(&self, name: &str) -> Option<&CodecInfo> {
        self.formats
            .get(name)
            .or_else(|| self.formats.get(name.to_ascii_uppercase().as_str()))
            .map(|arc| arc.as_ref())
    }

    /// Returns codec info by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<&CodecInfo> {
        let ext_lower = ext.to_lowercase();
        self.by_extension
            .get(ext_lower.as_str())
            .and_then(|name| self.formats.get(name))
            .map(|arc| arc.as_ref())
    }

    /// Checks if an extension is supported.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.by_extension.contains_key(ext.to_lowercase().as_str())
    }

    /// Detects format from file header bytes.
    ///
    /// Returns the codec name if detected, None otherwise.
    pub fn detect_format(&self, header: &[u8]) -> Option<&'static str> {
        self.formats
            .iter()
            .find(|(_, info)| (info.can_read)(header))
            .map(|(name, _)| *name)
    }

    /// Pixel types `format` can store; empty for unknown formats.
    pub fn supported_pixel_types(&self, format: &str) -> &[PixelType] {
        self.get(format).map(|info| info.pixel_types).unwrap_or(&[])
    }

    /// Whether `format` can store `pixel_type` natively.
    pub fn is_pixel_type_supported(&self, format: &str, pixel_type: PixelType) -> bool {
        self.supported_pixel_types(format).contains(&pixel_type)
    }

    /// Returns `true` if the file's content matches a registered codec.
    pub fn is_image(&self, path: &Path) -> bool {
        read_header(path)
            .map(|header| self.detect_format(&header).is_some())
            .unwrap_or(false)
    }

    /// Resolves the codec for reading `path`.
    ///
    /// An explicit `file_type` wins; otherwise magic bytes, then extension.
    pub fn resolve_for_read(&self, path: &Path, file_type: Option<&str>) -> IoResult<&CodecInfo> {
        if let Some(name) = file_type {
            return self
                .get(name)
                .ok_or_else(|| IoError::UnknownFormat(name.to_string()));
        }
        let header = read_header(path)?;
        if let Some(info) = self.detect_format(&header).and_then(|name| self.get(name)) {
            return Ok(info);
        }
        self.by_path_extension(path)
    }

    /// Resolves the codec for writing `path`.
    ///
    /// An explicit `file_type` wins; otherwise the extension decides.
    pub fn resolve_for_write(&self, path: &Path, file_type: Option<&str>) -> IoResult<&CodecInfo> {
        match file_type {
            Some(name) => self
                .get(name)
                .ok_or_else(|| IoError::UnknownFormat(name.to_string())),
            None => self.by_path_extension(path),
        }
    }

    fn by_path_extension(&self, path: &Path) -> IoResult<&CodecInfo> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext))
            .ok_or_else(|| IoError::UnknownFormat(path.display().to_string()))
    }

    /// Opens a read session.
    ///
    /// # Errors
    ///
    /// - [`IoError::Unreadable`] if the file cannot be opened
    /// - [`IoError::UnknownFormat`] if no codec matches or it cannot read
    pub fn open_decoder(&self, path: &Path, file_type: Option<&str>) -> IoResult<DecoderSession> {
        let info = self.resolve_for_read(path, file_type)?;
        let factory = info
            .decoder
            .ok_or_else(|| IoError::UnknownFormat(format!("{} (no decoder)", info.name)))?;
        debug!(format = info.name, path = %path.display(), "opening decoder");
        Ok(DecoderSession::new(factory(path)?))
    }

    /// Creates the file and opens a write session.
    ///
    /// # Errors
    ///
    /// - [`IoError::UnknownFormat`] if no codec matches or it cannot write
    /// - [`IoError::Unwritable`] if the file cannot be created
    pub fn open_encoder(&self, path: &Path, file_type: Option<&str>) -> IoResult<EncoderSession> {
        let info = self.resolve_for_write(path, file_type)?;
        let factory = info
            .encoder
            .ok_or_else(|| IoError::UnknownFormat(format!("{} (no encoder)", info.name)))?;
        debug!(format = info.name, path = %path.display(), "opening encoder");
        Ok(EncoderSession::new(factory(path)?))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn read_header(path: &Path) -> IoResult<Vec<u8>> {
    let unreadable = |source| IoError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut header = Vec::with_capacity(16);
    file.take(16).read_to_end(&mut header).map_err(unreadable)?;
    Ok(header)
}
