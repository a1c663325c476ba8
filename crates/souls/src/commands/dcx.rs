use clap::Args;
use miette::{miette, Result};
use souls_container::{dcx, Compression};
use std::path::PathBuf;
use tracing::info;

use super::{read_input, write_output, CompressionArg};

#[derive(clap::Subcommand)]
pub enum DcxCommands {
    /// Unwrap a DCX file
    Decompress(DecompressArgs),
    /// Wrap a file in a DCX
    Compress(CompressArgs),
}

impl DcxCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            DcxCommands::Decompress(decompress) => decompress.handle(),
            DcxCommands::Compress(compress) => compress.handle(),
        }
    }
}

#[derive(Args)]
pub struct DecompressArgs {
    /// An input DCX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file, defaults to the input without its `.dcx` extension
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DecompressArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        if !dcx::is(&data) {
            return Err(miette!("{} is not a DCX file", self.file.display()));
        }

        let (payload, compression) = dcx::decompress(&data)?;
        info!("detected {compression}");

        let output = match &self.output {
            Some(output) => output.clone(),
            None if self.file.extension().is_some_and(|ext| ext == "dcx") => {
                self.file.with_extension("")
            }
            None => return Err(miette!("no output given and the input has no .dcx extension")),
        };
        write_output(&output, &payload, self.overwrite)
    }
}

#[derive(Args)]
pub struct CompressArgs {
    /// An input file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file, defaults to the input with `.dcx` appended
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// The DCX variant to write
    #[arg(short, long, value_enum, default_value_t = CompressionArg::Dflt11000_44_9)]
    compression: CompressionArg,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl CompressArgs {
    pub fn handle(&self) -> Result<()> {
        let compression = Compression::from(self.compression);
        if compression == Compression::None {
            return Err(miette!("choose a DFLT variant to compress with"));
        }

        let data = read_input(&self.file)?;
        let wrapped = dcx::compress(&data, compression)?;
        info!("compressed {} bytes into {}", data.len(), wrapped.len());

        let output = self.output.clone().unwrap_or_else(|| {
            let mut name = self.file.clone().into_os_string();
            name.push(".dcx");
            PathBuf::from(name)
        });
        write_output(&output, &wrapped, self.overwrite)
    }
}
