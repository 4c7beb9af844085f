use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;

use kdl::KdlDocument;
use miette::IntoDiagnostic;

use crate::{CliAction, LookupConfig, load_image};

/// Runs the given command, writing its KDL output to `output`.
///
/// Returns whether every looked-up symbol was found.
pub fn evaluate(
    action: CliAction,
    config: LookupConfig,
    mut output: impl Write,
) -> miette::Result<bool> {
    let (mut kdl, all_found) = match action {
        CliAction::Lookup {
            load_args,
            binary,
            symbols,
        } => {
            let image = load_image(&binary, load_args.loader(config.loader)).into_diagnostic()?;
            let preference = load_args.table(config.table).into();

            crate::lookup::lookup_to_kdl(&image, &symbols, preference)?
        }
        CliAction::List { load_args, binary } => {
            let image = load_image(&binary, load_args.loader(config.loader)).into_diagnostic()?;
            let preference = load_args.table(config.table).into();

            (crate::lookup::list_to_kdl(&image, preference)?, true)
        }
        CliAction::Info { load_args, binary } => {
            let image = load_image(&binary, load_args.loader(config.loader)).into_diagnostic()?;

            (crate::lookup::info_to_kdl(&image)?, true)
        }
    };

    write_kdl(&mut kdl, &mut output)?;

    Ok(all_found)
}

/// Parses the lookup configuration, given inline or as a path to a `.kdl`
/// file.
pub fn parse_config(config: Option<String>) -> miette::Result<LookupConfig> {
    let Some(config) = config else {
        return Ok(LookupConfig::default());
    };

    let path = Path::new(&config);

    let config = if let Some((filename, "kdl")) = path
        .file_name()
        .and_then(OsStr::to_str)
        .zip(path.extension().and_then(OsStr::to_str))
    {
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        knus::parse(filename, &content)?
    } else {
        knus::parse("<content>", &config)?
    };

    Ok(config)
}

fn write_kdl(kdl: &mut KdlDocument, output: &mut impl Write) -> miette::Result<()> {
    kdl.autoformat();

    output
        .write_all(kdl.to_string().as_bytes())
        .into_diagnostic()?;

    Ok(())
}
