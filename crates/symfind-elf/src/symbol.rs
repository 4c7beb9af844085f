use goblin::container::{Container, Ctx};
use goblin::elf::sym::{STT_FUNC, st_bind, st_type};
use goblin::{elf32, elf64};
use scroll::Pread;

use crate::section::{SectionHeader, SymbolTableKind};
use crate::strtab::StringTable;
use crate::table::{Record, Table, to_usize};

/// Symbol table entry, tagged by class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Symbol {
    /// Symbol of a 32-bit image.
    Elf32(elf32::sym::Sym),

    /// Symbol of a 64-bit image.
    Elf64(elf64::sym::Sym),
}

impl Symbol {
    /// Offset of the symbol name in the associated string table.
    pub fn name(&self) -> u32 {
        class_field!(self, st_name)
    }

    /// Packed symbol type and binding.
    pub fn info(&self) -> u8 {
        class_field!(self, st_info)
    }

    /// Symbol visibility.
    pub fn other(&self) -> u8 {
        class_field!(self, st_other)
    }

    /// Index of the section the symbol is defined in.
    pub fn shndx(&self) -> u16 {
        class_field!(self, st_shndx)
    }

    /// Symbol value, usually its virtual address.
    pub fn value(&self) -> u64 {
        class_field!(self, st_value)
    }

    /// Size of the object the symbol refers to.
    pub fn size(&self) -> u64 {
        class_field!(self, st_size)
    }

    /// Symbol type (`STT_*`), the low nibble of `st_info`.
    pub fn kind(&self) -> u8 {
        st_type(self.info())
    }

    /// Symbol binding (`STB_*`), the high nibble of `st_info`.
    pub fn bind(&self) -> u8 {
        st_bind(self.info())
    }

    /// Whether the symbol denotes a function.
    pub fn is_function(&self) -> bool {
        self.kind() == STT_FUNC
    }
}

impl Record for Symbol {
    fn record_size(container: Container) -> usize {
        match container {
            Container::Little => elf32::sym::SIZEOF_SYM,
            Container::Big => elf64::sym::SIZEOF_SYM,
        }
    }

    fn parse(bytes: &[u8], offset: usize, ctx: Ctx) -> crate::Result<Self> {
        let sym = match ctx.container {
            Container::Little => Self::Elf32(bytes.pread_with(offset, ctx.le)?),
            Container::Big => Self::Elf64(bytes.pread_with(offset, ctx.le)?),
        };

        Ok(sym)
    }
}

/// Symbol table section along with its string table.
pub struct SymbolTable<'a> {
    kind: SymbolTableKind,
    entries: Table<'a, Symbol>,
    strings: StringTable<'a>,
}

impl<'a> SymbolTable<'a> {
    /// Validates the symbol table section `shdr` of `image`.
    ///
    /// The section must hold a whole number of entries, each large enough for
    /// a symbol of the image class, and lie within the image.
    pub fn new(
        image: &'a [u8],
        ctx: Ctx,
        shdr: &SectionHeader,
        strings: StringTable<'a>,
        kind: SymbolTableKind,
    ) -> crate::Result<Self> {
        let entsize = shdr.entsize();
        let size = shdr.size();

        let invalid = || crate::Error::InvalidEntrySize {
            table: kind.section_name(),
            entsize,
            size,
        };

        if entsize == 0 || size % entsize != 0 {
            return Err(invalid());
        }

        let count = size / entsize;

        let entries = shdr
            .file_range()
            .filter(|range| range.end <= image.len())
            .and_then(|range| {
                Table::new(
                    image,
                    range.start,
                    to_usize(entsize)?,
                    to_usize(count)?,
                    ctx,
                )
            })
            .ok_or_else(invalid)?;

        Ok(Self {
            kind,
            entries,
            strings,
        })
    }

    /// Kind of this table.
    pub fn kind(&self) -> SymbolTableKind {
        self.kind
    }

    /// Number of entries, including non-function symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the function symbols in table order, along with their
    /// names.
    pub fn functions(&self) -> impl Iterator<Item = crate::Result<(&'a [u8], Symbol)>> + '_ {
        let strings = self.strings;

        self.entries.iter().filter_map(move |entry| match entry {
            Ok(sym) if sym.is_function() => Some(strings.get(sym.name().into()).map(|n| (n, sym))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }

    /// Returns the first function symbol named `name`, in table order.
    pub fn find_function(&self, name: &[u8]) -> crate::Result<Option<Symbol>> {
        for entry in self.functions() {
            let (sym_name, sym) = entry?;

            if sym_name == name {
                return Ok(Some(sym));
            }
        }

        Ok(None)
    }
}

/// Scans the symbol table `table` for the first function symbol named
/// `name`, reading names from `strings`.
pub fn resolve(
    image: &[u8],
    ctx: Ctx,
    table: &SectionHeader,
    strings: StringTable<'_>,
    kind: SymbolTableKind,
    name: &str,
) -> crate::Result<Option<Symbol>> {
    SymbolTable::new(image, ctx, table, strings, kind)?.find_function(name.as_bytes())
}
