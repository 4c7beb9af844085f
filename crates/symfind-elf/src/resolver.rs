use crate::header::FileHeader;
use crate::section::{SectionCatalog, SymbolTableKind};
use crate::symbol::{Symbol, SymbolTable};

/// Symbol table(s) to search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TablePreference {
    /// `.symtab`, or `.dynsym` when the image has no `.symtab`.
    #[default]
    Auto,

    /// `.symtab` only.
    Static,

    /// `.dynsym` only.
    Dynamic,
}

/// Function symbol resolved from an ELF image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSymbol {
    /// Name of the symbol.
    pub name: String,

    /// Table the symbol was found in.
    pub table: SymbolTableKind,

    /// Symbol table entry.
    pub symbol: Symbol,
}

impl ResolvedSymbol {
    /// Address (or section offset, for relocatable files) of the symbol.
    pub fn address(&self) -> u64 {
        self.symbol.value()
    }
}

/// Function symbol resolver over an ELF image.
///
/// Decodes the file header and section catalog once, then answers lookups
/// against the borrowed image. Nothing is cached between lookups.
pub struct SymbolResolver<'a> {
    image: &'a [u8],
    header: FileHeader,
    catalog: SectionCatalog,
}

impl<'a> SymbolResolver<'a> {
    /// Decodes the structure of `image`.
    pub fn new(image: &'a [u8]) -> crate::Result<Self> {
        let header = FileHeader::parse(image)?;
        let catalog = SectionCatalog::build(image, &header)?;

        Ok(Self {
            image,
            header,
            catalog,
        })
    }

    /// File header of the image.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Sections involved in symbol resolution.
    pub fn catalog(&self) -> &SectionCatalog {
        &self.catalog
    }

    /// Returns the symbol table that `preference` designates in this image.
    ///
    /// With [TablePreference::Auto], the static table is used if present,
    /// the dynamic one otherwise.
    pub fn table_kind(&self, preference: TablePreference) -> Option<SymbolTableKind> {
        let kind = match preference {
            TablePreference::Auto if self.catalog.symtab.is_some() => SymbolTableKind::Static,
            TablePreference::Auto => SymbolTableKind::Dynamic,
            TablePreference::Static => SymbolTableKind::Static,
            TablePreference::Dynamic => SymbolTableKind::Dynamic,
        };

        self.catalog.symbol_table(kind).is_some().then_some(kind)
    }

    /// Returns the symbol table of the given kind, if present.
    pub fn symbol_table(&self, kind: SymbolTableKind) -> crate::Result<Option<SymbolTable<'a>>> {
        let Some(shdr) = self.catalog.symbol_table(kind) else {
            return Ok(None);
        };

        let strings = self.catalog.string_table(self.image, kind)?;

        SymbolTable::new(self.image, self.header.ctx(), shdr, strings, kind).map(Some)
    }

    /// Returns the first function symbol named `name` in the table designated
    /// by `preference`.
    ///
    /// A symbol table that is present but lacks a match does not fall back to
    /// the other table.
    #[tracing::instrument(name = "Resolve", skip(self))]
    pub fn resolve(
        &self,
        name: &str,
        preference: TablePreference,
    ) -> crate::Result<Option<ResolvedSymbol>> {
        let Some(kind) = self.table_kind(preference) else {
            tracing::debug!("no symbol table");
            return Ok(None);
        };

        let Some(table) = self.symbol_table(kind)? else {
            return Ok(None);
        };

        let Some(symbol) = table.find_function(name.as_bytes())? else {
            tracing::debug!(table = kind.section_name(), "symbol not found");
            return Ok(None);
        };

        tracing::debug!(
            table = kind.section_name(),
            addr = format_args!("{:#x}", symbol.value()),
            "resolved symbol"
        );

        Ok(Some(ResolvedSymbol {
            name: name.to_owned(),
            table: kind,
            symbol,
        }))
    }
}

/// Returns the address of the function symbol `name` in the ELF `image`.
///
/// `.symtab` is searched first; images without one (e.g. stripped shared
/// objects) are searched through `.dynsym`. `Ok(None)` means the image is
/// valid but holds no such function symbol.
pub fn find_symbol_address(image: &[u8], name: &str) -> crate::Result<Option<u64>> {
    let resolved = SymbolResolver::new(image)?.resolve(name, TablePreference::Auto)?;

    Ok(resolved.map(|sym| sym.address()))
}
