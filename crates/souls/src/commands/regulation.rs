use clap::Args;
use miette::Result;
use souls_container::crypto::{self, DS3_REGULATION_KEY, ER_REGULATION_KEY};
use std::path::PathBuf;
use tracing::info;

use super::{read_input, write_output, CompressionArg};

/// Game a regulation file belongs to, selecting its key
#[derive(clap::ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Game {
    /// Dark Souls III
    Ds3,
    /// Elden Ring
    Er,
}

impl Game {
    fn key(self) -> &'static [u8] {
        match self {
            Game::Ds3 => &DS3_REGULATION_KEY,
            Game::Er => &ER_REGULATION_KEY,
        }
    }
}

#[derive(clap::Subcommand)]
pub enum RegulationCommands {
    /// Decrypt a regulation file and unwrap its DCX
    Decrypt(DecryptArgs),
    /// Wrap a parameter archive in a DCX and encrypt it
    Encrypt(EncryptArgs),
}

impl RegulationCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RegulationCommands::Decrypt(decrypt) => decrypt.handle(),
            RegulationCommands::Encrypt(encrypt) => encrypt.handle(),
        }
    }
}

#[derive(Args)]
pub struct DecryptArgs {
    /// An input regulation file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file for the parameter archive
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// The game the file belongs to
    #[arg(short, long, value_enum, default_value_t = Game::Er)]
    game: Game,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DecryptArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let (params, compression) = crypto::decrypt_regulation(&data, self.game.key())?;
        info!("decrypted {} bytes, {compression}", params.len());
        write_output(&self.output, &params, self.overwrite)
    }
}

#[derive(Args)]
pub struct EncryptArgs {
    /// An input parameter archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target regulation file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// The game the file belongs to
    #[arg(short, long, value_enum, default_value_t = Game::Er)]
    game: Game,

    /// The DCX variant to wrap the archive in
    #[arg(short, long, value_enum, default_value_t = CompressionArg::Dflt11000_44_9_15)]
    compression: CompressionArg,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl EncryptArgs {
    pub fn handle(&self) -> Result<()> {
        let params = read_input(&self.file)?;
        let data =
            crypto::encrypt_regulation(&params, self.compression.into(), self.game.key())?;
        write_output(&self.output, &data, self.overwrite)
    }
}
