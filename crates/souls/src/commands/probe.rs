use clap::Args;
use miette::Result;
use owo_colors::{OwoColorize, Stream};
use souls_container::dcx;
use std::path::PathBuf;

use super::read_input;

#[derive(Args)]
pub struct ProbeArgs {
    /// Files to describe
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl ProbeArgs {
    pub fn handle(&self) -> Result<()> {
        for file in &self.files {
            let data = read_input(file)?;
            let (payload, compression) = dcx::decompress(&data)?;

            let magic = payload
                .iter()
                .take(4)
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect::<String>();

            println!(
                "{}: {} ({} bytes), magic {}",
                file.display(),
                compression.if_supports_color(Stream::Stdout, |text| text.cyan()),
                payload.len(),
                magic.if_supports_color(Stream::Stdout, |text| text.yellow()),
            );
        }
        Ok(())
    }
}
