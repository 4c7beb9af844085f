/// Error type of this crate.
///
/// A symbol that is simply absent from a valid image is not an error: lookups
/// report it as `Ok(None)`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The image is too short to hold an ELF identification and header, or
    /// does not start with the ELF magic.
    #[error("malformed ELF header ({len} bytes)")]
    MalformedHeader {
        /// Length of the image.
        len: usize,
    },

    /// The image is shorter than the header of its ELF class.
    #[error("truncated ELF file: {needed} bytes needed, {len} available")]
    TruncatedFile {
        /// Minimum number of bytes required.
        needed: usize,

        /// Length of the image.
        len: usize,
    },

    /// `EI_CLASS` holds neither `ELFCLASS32` nor `ELFCLASS64`.
    #[error("unsupported ELF class: {0:#x}")]
    UnsupportedClass(u8),

    /// A section index is out of the section header table, or the section it
    /// designates lies outside the image.
    #[error("invalid section index: {index} (section count: {count})")]
    InvalidSectionIndex {
        /// Offending section index.
        index: usize,

        /// Number of entries in the section header table.
        count: usize,
    },

    /// A string table offset does not designate a NUL-terminated string.
    #[error("invalid string at offset {offset:#x} of {table}")]
    InvalidString {
        /// Name of the string table.
        table: &'static str,

        /// Offset within the string table.
        offset: u64,
    },

    /// A table has an entry size that cannot describe its records, or spans
    /// past the end of the image.
    #[error("invalid entry size for {table}: entsize={entsize:#x}, size={size:#x}")]
    InvalidEntrySize {
        /// Name of the table.
        table: &'static str,

        /// Declared entry size.
        entsize: u64,

        /// Declared table size.
        size: u64,
    },

    /// A symbol table was selected but its string table is missing.
    #[error("missing {0}")]
    MissingStringTable(&'static str),

    /// A string table section lies outside the image.
    #[error("{name} out of bounds: offset={offset:#x}, size={size:#x}")]
    SectionOutOfBounds {
        /// Name of the section.
        name: &'static str,

        /// File offset of the section.
        offset: u64,

        /// Size of the section.
        size: u64,
    },

    /// Record decoding error from the [goblin] or [scroll] crates.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Decoding error reported by [goblin] or [scroll], kept as text so that
/// [Error] stays comparable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DecodeError(String);

impl From<goblin::error::Error> for Error {
    fn from(e: goblin::error::Error) -> Self {
        Self::Decode(DecodeError(e.to_string()))
    }
}

impl From<scroll::Error> for Error {
    fn from(e: scroll::Error) -> Self {
        Self::Decode(DecodeError(e.to_string()))
    }
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
