pub mod dcx;
pub mod hash;
pub mod probe;
pub mod regulation;
pub mod save;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use souls_container::{Compression, DfltVariant};
use tracing::info;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle DCX compressed files
    Dcx {
        #[command(subcommand)]
        command: dcx::DcxCommands,
    },
    /// Handle encrypted regulation files
    Regulation {
        #[command(subcommand)]
        command: regulation::RegulationCommands,
    },
    /// Handle encrypted save file entries
    Save {
        #[command(subcommand)]
        command: save::SaveCommands,
    },
    /// Print the 32-bit and 64-bit hashes of an archive path
    Hash(hash::HashArgs),
    /// Describe the container around a file
    Probe(probe::ProbeArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Dcx { command } => command.handle(),
            Commands::Regulation { command } => command.handle(),
            Commands::Save { command } => command.handle(),
            Commands::Hash(hash) => hash.handle(),
            Commands::Probe(probe) => probe.handle(),
        }
    }
}

/// Compression to wrap output with
#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionArg {
    /// Leave the data uncompressed
    None,
    /// Dark Souls: Prepare to Die Edition
    #[value(name = "dflt-10000-24-9")]
    Dflt10000_24_9,
    /// Dark Souls Remastered
    #[value(name = "dflt-10000-44-9")]
    Dflt10000_44_9,
    /// Dark Souls II: Scholar of the First Sin
    #[value(name = "dflt-11000-44-8")]
    Dflt11000_44_8,
    /// Dark Souls III and Sekiro
    #[value(name = "dflt-11000-44-9")]
    Dflt11000_44_9,
    /// Elden Ring and Armored Core VI
    #[value(name = "dflt-11000-44-9-15")]
    Dflt11000_44_9_15,
}

impl From<CompressionArg> for Compression {
    fn from(value: CompressionArg) -> Self {
        match value {
            CompressionArg::None => Compression::None,
            CompressionArg::Dflt10000_24_9 => Compression::DcxDflt(DfltVariant::V10000_24_9),
            CompressionArg::Dflt10000_44_9 => Compression::DcxDflt(DfltVariant::V10000_44_9),
            CompressionArg::Dflt11000_44_8 => Compression::DcxDflt(DfltVariant::V11000_44_8),
            CompressionArg::Dflt11000_44_9 => Compression::DcxDflt(DfltVariant::V11000_44_9),
            CompressionArg::Dflt11000_44_9_15 => Compression::DcxDflt(DfltVariant::V11000_44_9_15),
        }
    }
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .context(format!("reading {}", path.display()))
}

pub(crate) fn write_output(path: &Path, data: &[u8], overwrite: bool) -> Result<()> {
    info!("writing {}", path.display());
    let mut out = if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))?
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))?
    };
    out.write_all(data).into_diagnostic()
}
