use std::ops::Range;

use goblin::container::{Container, Ctx};
use goblin::{elf32, elf64};
use scroll::Pread;

use crate::header::FileHeader;
use crate::strtab::StringTable;
use crate::table::{Record, Table, to_usize};

/// Section header, tagged by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHeader {
    /// Section header of a 32-bit image.
    Elf32(elf32::section_header::SectionHeader),

    /// Section header of a 64-bit image.
    Elf64(elf64::section_header::SectionHeader),
}

impl SectionHeader {
    /// Offset of the section name in the section name string table.
    pub fn name(&self) -> u32 {
        class_field!(self, sh_name)
    }

    /// Section type (`SHT_*`).
    pub fn section_type(&self) -> u32 {
        class_field!(self, sh_type)
    }

    /// Section flags (`SHF_*`).
    pub fn flags(&self) -> u64 {
        class_field!(self, sh_flags)
    }

    /// Virtual address of the section in memory.
    pub fn addr(&self) -> u64 {
        class_field!(self, sh_addr)
    }

    /// File offset of the section.
    pub fn offset(&self) -> u64 {
        class_field!(self, sh_offset)
    }

    /// Size of the section in the file.
    pub fn size(&self) -> u64 {
        class_field!(self, sh_size)
    }

    /// Index of a related section.
    pub fn link(&self) -> u32 {
        class_field!(self, sh_link)
    }

    /// Extra information, depending on the section type.
    pub fn info(&self) -> u32 {
        class_field!(self, sh_info)
    }

    /// Alignment constraint of the section.
    pub fn addralign(&self) -> u64 {
        class_field!(self, sh_addralign)
    }

    /// Size of each entry, for sections holding a table.
    pub fn entsize(&self) -> u64 {
        class_field!(self, sh_entsize)
    }

    /// Range of the section content within the file, if representable.
    pub fn file_range(&self) -> Option<Range<usize>> {
        let start = to_usize(self.offset())?;
        let end = start.checked_add(to_usize(self.size())?)?;
        Some(start..end)
    }
}

impl Record for SectionHeader {
    fn record_size(container: Container) -> usize {
        match container {
            Container::Little => elf32::section_header::SIZEOF_SHDR,
            Container::Big => elf64::section_header::SIZEOF_SHDR,
        }
    }

    fn parse(bytes: &[u8], offset: usize, ctx: Ctx) -> crate::Result<Self> {
        let shdr = match ctx.container {
            Container::Little => Self::Elf32(bytes.pread_with(offset, ctx.le)?),
            Container::Big => Self::Elf64(bytes.pread_with(offset, ctx.le)?),
        };

        Ok(shdr)
    }
}

/// Kind of symbol table used for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTableKind {
    /// `.symtab`, paired with `.strtab`.
    Static,

    /// `.dynsym`, paired with `.dynstr`.
    Dynamic,
}

impl SymbolTableKind {
    /// Name of the symbol table section.
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Static => ".symtab",
            Self::Dynamic => ".dynsym",
        }
    }

    /// Name of the string table section holding the symbol names.
    pub const fn strings_section_name(self) -> &'static str {
        match self {
            Self::Static => ".strtab",
            Self::Dynamic => ".dynstr",
        }
    }
}

/// Sections involved in symbol resolution, as found in the section header
/// table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionCatalog {
    /// Static symbol string table (`.strtab`).
    pub strtab: Option<SectionHeader>,

    /// Dynamic symbol string table (`.dynstr`).
    pub dynstr: Option<SectionHeader>,

    /// Static symbol table (`.symtab`).
    pub symtab: Option<SectionHeader>,

    /// Dynamic symbol table (`.dynsym`).
    pub dynsym: Option<SectionHeader>,
}

impl SectionCatalog {
    /// Walks the whole section header table of `image` and records the
    /// sections needed for symbol resolution.
    ///
    /// Sections are matched by exact name. When several sections share one of
    /// the recorded names, the first one in file order is kept.
    pub fn build(image: &[u8], header: &FileHeader) -> crate::Result<Self> {
        let shdrs = section_headers(image, header)?;
        let count = shdrs.len();

        let shstrndx = usize::from(header.shstrndx());
        let shstrtab = shdrs
            .get(shstrndx)
            .transpose()?
            .and_then(|shdr| shdr.file_range())
            .and_then(|range| image.get(range))
            .map(|bytes| StringTable::new(bytes, ".shstrtab"))
            .ok_or(crate::Error::InvalidSectionIndex {
                index: shstrndx,
                count,
            })?;

        let mut catalog = Self::default();

        for (index, shdr) in shdrs.iter().enumerate() {
            let shdr = shdr?;
            let name = shstrtab.get(shdr.name().into())?;

            let (slot, name) = match name {
                b".strtab" => (&mut catalog.strtab, ".strtab"),
                b".dynstr" => (&mut catalog.dynstr, ".dynstr"),
                b".symtab" => (&mut catalog.symtab, ".symtab"),
                b".dynsym" => (&mut catalog.dynsym, ".dynsym"),
                _ => continue,
            };

            if slot.is_some() {
                tracing::warn!(index, "ignoring duplicate section {name}");
                continue;
            }

            tracing::debug!(
                index,
                offset = format_args!("{:#x}", shdr.offset()),
                size = shdr.size(),
                "found section {name}"
            );

            *slot = Some(shdr);
        }

        Ok(catalog)
    }

    /// Returns the symbol table of the given kind, if present.
    pub fn symbol_table(&self, kind: SymbolTableKind) -> Option<&SectionHeader> {
        match kind {
            SymbolTableKind::Static => self.symtab.as_ref(),
            SymbolTableKind::Dynamic => self.dynsym.as_ref(),
        }
    }

    /// Returns the string table paired with the symbol table of the given
    /// kind.
    pub fn string_table<'a>(
        &self,
        image: &'a [u8],
        kind: SymbolTableKind,
    ) -> crate::Result<StringTable<'a>> {
        let name = kind.strings_section_name();

        let shdr = match kind {
            SymbolTableKind::Static => self.strtab.as_ref(),
            SymbolTableKind::Dynamic => self.dynstr.as_ref(),
        }
        .ok_or(crate::Error::MissingStringTable(name))?;

        StringTable::from_section(image, shdr, name)
    }
}

/// Returns the section header table of `image`.
fn section_headers<'a>(
    image: &'a [u8],
    header: &FileHeader,
) -> crate::Result<Table<'a, SectionHeader>> {
    let ctx = header.ctx();
    let count = usize::from(header.shnum());
    let shstrndx = usize::from(header.shstrndx());

    if shstrndx >= count {
        return Err(crate::Error::InvalidSectionIndex {
            index: shstrndx,
            count,
        });
    }

    let stride = usize::from(header.shentsize());
    let record_size = SectionHeader::record_size(ctx.container);

    if stride < record_size {
        return Err(crate::Error::InvalidEntrySize {
            table: "section header table",
            entsize: stride as u64,
            size: stride as u64 * count as u64,
        });
    }

    let offset = to_usize(header.shoff()).unwrap_or(usize::MAX);

    Table::new(image, offset, stride, count, ctx).ok_or_else(|| {
        // report the first slot running past the image
        let fitting = image
            .len()
            .checked_sub(offset)
            .and_then(|avail| avail.checked_sub(record_size))
            .map_or(0, |avail| avail / stride + 1);

        crate::Error::InvalidSectionIndex {
            index: fitting,
            count,
        }
    })
}
