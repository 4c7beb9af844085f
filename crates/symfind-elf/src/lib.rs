//! This crate resolves function symbols to their address within 32-bit and
//! 64-bit ELF images (executables, shared objects and relocatable files).
//!
//! It works over an image already loaded in memory and never performs I/O.
//!
//! # Example
//!
//! ```no_run
//! let image = std::fs::read("/bin/sh").unwrap();
//!
//! match symfind_elf::find_symbol_address(&image, "main").unwrap() {
//!     Some(addr) => println!("main is at {addr:#x}"),
//!     None => println!("main not found"),
//! }
//! ```

/// Reads a field present in both the 32-bit and 64-bit layouts of a tagged
/// record, widened to the accessor's return type.
macro_rules! class_field {
    ($record:expr, $field:ident) => {
        match $record {
            Self::Elf32(raw) => raw.$field.into(),
            Self::Elf64(raw) => raw.$field.into(),
        }
    };
}

mod error;
mod header;
mod resolver;
mod section;
mod strtab;
mod symbol;
mod table;

pub use self::error::{DecodeError, Error, Result};
pub use self::header::{FileHeader, header_size};
pub use self::resolver::{ResolvedSymbol, SymbolResolver, TablePreference, find_symbol_address};
pub use self::section::{SectionCatalog, SectionHeader, SymbolTableKind};
pub use self::strtab::StringTable;
pub use self::symbol::{Symbol, SymbolTable, resolve};
pub use self::table::{Record, Table};
