//! Crate implementing the CLI commands.

mod cli;
mod config;
mod loader;
mod lookup;
mod run;

pub use self::cli::{CliAction, CliLoadArgs, CliOpts};
pub use self::config::{Loader, LookupConfig, TableChoice};
pub use self::loader::{Image, LoadError, Mapping, load_image};
pub use self::lookup::{info_to_kdl, list_to_kdl, lookup_to_kdl};
pub use self::run::{evaluate, parse_config};
