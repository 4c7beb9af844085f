use goblin::elf::header::{et_to_str, machine_to_str};
use goblin::elf::sym::bind_to_str;
use kdl::{KdlDocument, KdlEntry, KdlNode};
use miette::IntoDiagnostic;
use symfind_elf::{SymbolResolver, SymbolTableKind, TablePreference};

/// Resolves each of `symbols` and dumps the result as KDL.
///
/// Also returns whether every symbol was found.
pub fn lookup_to_kdl(
    image: &[u8],
    symbols: &[String],
    preference: TablePreference,
) -> miette::Result<(KdlDocument, bool)> {
    let resolver = SymbolResolver::new(image).into_diagnostic()?;

    let mut kdl = KdlDocument::new();
    let mut all_found = true;

    for name in symbols {
        let mut node = KdlNode::new("symbol");
        node.entries_mut().push(KdlEntry::new(name.as_str()));

        match resolver.resolve(name, preference).into_diagnostic()? {
            Some(resolved) => {
                let sym = resolved.symbol;

                node.entries_mut().push(KdlEntry::new_prop(
                    "address",
                    format!("{:#x}", resolved.address()),
                ));
                node.entries_mut()
                    .push(KdlEntry::new_prop("size", i128::from(sym.size())));
                node.entries_mut()
                    .push(KdlEntry::new_prop("bind", bind_to_str(sym.bind())));
                node.entries_mut().push(KdlEntry::new_prop(
                    "table",
                    resolved.table.section_name(),
                ));
            }
            None => {
                all_found = false;
                node.entries_mut().push(KdlEntry::new_prop("found", false));
            }
        }

        kdl.nodes_mut().push(node);
    }

    Ok((kdl, all_found))
}

/// Dumps every function symbol of the table designated by `preference` as
/// KDL, in table order.
pub fn list_to_kdl(image: &[u8], preference: TablePreference) -> miette::Result<KdlDocument> {
    let resolver = SymbolResolver::new(image).into_diagnostic()?;

    let mut kdl = KdlDocument::new();

    let Some(kind) = resolver.table_kind(preference) else {
        return Ok(kdl);
    };

    let Some(table) = resolver.symbol_table(kind).into_diagnostic()? else {
        return Ok(kdl);
    };

    for entry in table.functions() {
        let (name, sym) = entry.into_diagnostic()?;

        let mut node = KdlNode::new("function");
        node.entries_mut()
            .push(KdlEntry::new(String::from_utf8_lossy(name).into_owned()));
        node.entries_mut()
            .push(KdlEntry::new_prop("address", format!("{:#x}", sym.value())));
        node.entries_mut()
            .push(KdlEntry::new_prop("size", i128::from(sym.size())));
        node.entries_mut()
            .push(KdlEntry::new_prop("bind", bind_to_str(sym.bind())));

        kdl.nodes_mut().push(node);
    }

    tracing::debug!(
        table = kind.section_name(),
        count = kdl.nodes().len(),
        "listed function symbols"
    );

    Ok(kdl)
}

/// Dumps the file header and the symbol tables of the image as KDL.
pub fn info_to_kdl(image: &[u8]) -> miette::Result<KdlDocument> {
    let resolver = SymbolResolver::new(image).into_diagnostic()?;
    let header = resolver.header();

    let mut kdl = KdlDocument::new();

    let mut node = KdlNode::new("header");
    let class = if header.container().is_big() {
        "ELF64"
    } else {
        "ELF32"
    };
    node.entries_mut().push(KdlEntry::new_prop("class", class));
    node.entries_mut()
        .push(KdlEntry::new_prop("type", et_to_str(header.file_type())));
    node.entries_mut()
        .push(KdlEntry::new_prop("machine", machine_to_str(header.machine())));
    node.entries_mut()
        .push(KdlEntry::new_prop("entry", format!("{:#x}", header.entry())));
    node.entries_mut()
        .push(KdlEntry::new_prop("sections", i128::from(header.shnum())));
    kdl.nodes_mut().push(node);

    for kind in [SymbolTableKind::Static, SymbolTableKind::Dynamic] {
        let mut node = KdlNode::new("table");
        node.entries_mut().push(KdlEntry::new(kind.section_name()));

        let count = resolver.symbol_table(kind).and_then(|table| {
            table
                .map(|table| -> symfind_elf::Result<_> {
                    let functions = table.functions().try_fold(0usize, |count, entry| {
                        entry.map(|_| count + 1)
                    })?;
                    Ok((table.len(), functions))
                })
                .transpose()
        });

        match count {
            Ok(Some((entries, functions))) => {
                node.entries_mut()
                    .push(KdlEntry::new_prop("entries", entries as i128));
                node.entries_mut()
                    .push(KdlEntry::new_prop("functions", functions as i128));
            }
            Ok(None) => {
                node.entries_mut().push(KdlEntry::new_prop("present", false));
            }
            Err(e) => {
                node.entries_mut()
                    .push(KdlEntry::new_prop("error", e.to_string()));
            }
        }

        kdl.nodes_mut().push(node);
    }

    if let Some(kind) = resolver.table_kind(TablePreference::Auto) {
        let mut node = KdlNode::new("lookup-table");
        node.entries_mut().push(KdlEntry::new(kind.section_name()));
        kdl.nodes_mut().push(node);
    }

    Ok(kdl)
}
