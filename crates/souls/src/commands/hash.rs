use clap::Args;
use miette::Result;
use owo_colors::{OwoColorize, Stream};
use souls_container::hash;

#[derive(Args)]
pub struct HashArgs {
    /// Archive paths to hash, in any case and with either slash
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<String>,
}

impl HashArgs {
    pub fn handle(&self) -> Result<()> {
        for path in &self.paths {
            println!(
                "{:#010x} {:#018x} {}",
                hash::path_hash32(path),
                hash::path_hash64(path),
                hash::normalize_path(path).if_supports_color(Stream::Stdout, |text| text.green()),
            );
        }
        Ok(())
    }
}
