use clap::Args;
use miette::Result;
use souls_container::crypto::{self, SaveContainer, DS3_SAVE_KEY};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{read_input, write_output};

#[derive(clap::Subcommand)]
pub enum SaveCommands {
    /// Decrypt a save file entry
    Decrypt(DecryptArgs),
    /// Encrypt a save file entry under a fresh IV
    Encrypt(EncryptArgs),
}

impl SaveCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            SaveCommands::Decrypt(decrypt) => decrypt.handle(),
            SaveCommands::Encrypt(encrypt) => encrypt.handle(),
        }
    }
}

#[derive(Args)]
pub struct DecryptArgs {
    /// An encrypted entry extracted from a save file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DecryptArgs {
    pub fn handle(&self) -> Result<()> {
        let container = SaveContainer::from_bytes(&read_input(&self.file)?)?;
        if container.checksum_matches() {
            info!("checksum matches");
        } else {
            warn!("checksum does not match, the entry may be corrupt");
        }

        let plain = container.decrypt(&DS3_SAVE_KEY)?;
        write_output(&self.output, &plain, self.overwrite)
    }
}

#[derive(Args)]
pub struct EncryptArgs {
    /// A decrypted entry, a whole number of 16 byte blocks long
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl EncryptArgs {
    pub fn handle(&self) -> Result<()> {
        let data = crypto::encrypt_save(&read_input(&self.file)?, &DS3_SAVE_KEY)?;
        write_output(&self.output, &data, self.overwrite)
    }
}
