/*!
Validate command - check that input is well-formed CBOR within the limits
*/

use super::io::Input;
use super::source::Mode;
use anyhow::Context;
use cbor_decoder::Config;
use clap::Parser;
use tracing::info;

/// Validate CBOR data
#[derive(Parser, Debug)]
#[command(
    about = "Check that CBOR data is well-formed and within the configured limits",
    long_about = "Decodes the input and exits with a non-zero status at the first error, \
                  reporting its byte offset."
)]
pub struct Command {
    #[command(flatten)]
    mode: Mode,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

impl Command {
    pub fn exec(self, config: &Config) -> anyhow::Result<()> {
        let name = self.input.name();
        let data = self
            .input
            .read_all()
            .with_context(|| format!("Failed to read {name}"))?;
        let decoded = self
            .mode
            .decode(&data, config)
            .with_context(|| format!("{name} is not valid CBOR"))?;

        info!("Validated {name}");
        println!(
            "{name}: {} items in {} bytes",
            decoded.items.len(),
            decoded.len
        );
        Ok(())
    }
}
