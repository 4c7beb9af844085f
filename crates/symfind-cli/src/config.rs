use symfind_elf::TablePreference;

/// Configuration of symbol lookups.
#[derive(Debug, Default, PartialEq, knus::Decode)]
pub struct LookupConfig {
    /// How the ELF file is brought into memory.
    #[knus(child, default, unwrap(argument))]
    pub loader: Loader,

    /// Symbol table to search.
    #[knus(child, default, unwrap(argument))]
    pub table: TableChoice,
}

/// How the ELF file is brought into memory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, knus::DecodeScalar)]
pub enum Loader {
    /// Read the whole file into a buffer.
    #[default]
    Read,

    /// Map the file read-only.
    Mmap,
}

/// Symbol table to search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum, knus::DecodeScalar)]
pub enum TableChoice {
    /// `.symtab`, or `.dynsym` if the file has no `.symtab`.
    #[default]
    Auto,

    /// `.symtab` only.
    Static,

    /// `.dynsym` only.
    Dynamic,
}

impl From<TableChoice> for TablePreference {
    fn from(choice: TableChoice) -> Self {
        match choice {
            TableChoice::Auto => Self::Auto,
            TableChoice::Static => Self::Static,
            TableChoice::Dynamic => Self::Dynamic,
        }
    }
}
