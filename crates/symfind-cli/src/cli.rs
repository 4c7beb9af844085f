use std::path::PathBuf;

use crate::config::{Loader, TableChoice};

/// Resolves function symbols to their address within ELF files.
#[derive(clap::Parser)]
pub struct CliOpts {
    /// Lookup configuration (KDL format).
    ///
    /// If it ends with `.kdl`, it is treated as a path to a configuration
    /// file. Otherwise it is directly parsed as inline KDL-formatted
    /// configuration.
    #[clap(short, long, global = true, value_name = "CONTENT/PATH")]
    pub config: Option<String>,

    /// Path to the optional destination of the output.
    #[clap(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// The command to run.
    #[clap(subcommand)]
    pub action: CliAction,
}

/// The command to run.
#[derive(clap::Subcommand)]
pub enum CliAction {
    /// Resolve the address of function symbols.
    Lookup {
        /// Configuration for reading the ELF file.
        #[clap(flatten)]
        load_args: CliLoadArgs,

        /// Path to the ELF file.
        binary: PathBuf,

        /// Names of the function symbols to resolve.
        #[clap(required = true)]
        symbols: Vec<String>,
    },

    /// List the function symbols of a symbol table.
    List {
        /// Configuration for reading the ELF file.
        #[clap(flatten)]
        load_args: CliLoadArgs,

        /// Path to the ELF file.
        binary: PathBuf,
    },

    /// Dump header information and the available symbol tables.
    Info {
        /// Configuration for reading the ELF file.
        #[clap(flatten)]
        load_args: CliLoadArgs,

        /// Path to the ELF file.
        binary: PathBuf,
    },
}

/// Configuration for reading the ELF file.
///
/// Values given here take precedence over the configuration.
#[derive(clap::Parser)]
pub struct CliLoadArgs {
    /// Symbol table to search.
    #[clap(long, value_enum)]
    pub table: Option<TableChoice>,

    /// Memory-map the file instead of reading it.
    #[clap(long)]
    pub mmap: bool,
}

impl CliLoadArgs {
    /// Returns the loader to use, given the configured one.
    pub fn loader(&self, configured: Loader) -> Loader {
        if self.mmap { Loader::Mmap } else { configured }
    }

    /// Returns the symbol table to search, given the configured one.
    pub fn table(&self, configured: TableChoice) -> TableChoice {
        self.table.unwrap_or(configured)
    }
}

impl CliOpts {
    /// Parses the CLI from the command-line.
    ///
    /// # Warning
    ///
    /// Exits on error.
    pub fn parse_from_cmdline() -> Self {
        <Self as clap::Parser>::parse()
    }
}
