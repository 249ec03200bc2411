/*!
CBOR Tools - A CLI for inspecting and validating CBOR data

# Commands

- `inspect`: Display CBOR data in various formats (CDN, JSON, hex)
- `validate`: Check that CBOR data is well-formed, exiting non-zero if not

Decoder limits come from a configuration file (`--config` or
`CBOR_DECODER_CONFIG_FILE`), `CBOR_DECODER_*` environment variables such as
`CBOR_DECODER_MAX_NESTING_DEPTH`, and the command line flags, in increasing
order of priority.

# Examples

```bash
# Inspect a CBOR file in diagnostic notation
cbor inspect bundle.cbor

# Inspect a CBOR sequence as JSON (lossy)
cbor inspect --sequence --format json data.cbor

# Decode incrementally, 16 bytes at a time
cbor inspect --sequence --stream-chunk 16 data.cbor

# Check untrusted input against tight limits
cbor --max-depth 8 --max-string-length 4096 validate untrusted.cbor
```
*/

use clap::{Parser, Subcommand};

mod inspect;
mod io;
mod settings;
mod source;
mod validate;

/// A CLI tool for working with CBOR data
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for inspecting and validating CBOR data",
    long_about = "CBOR Tools decodes CBOR (Concise Binary Object Representation) data.\n\n\
                  Features:\n\
                  - Inspect CBOR data in human-readable formats\n\
                  - Validate untrusted input against configurable limits\n\
                  - Decode single items, CBOR sequences, or incrementally fed streams"
)]
struct Cli {
    #[command(flatten)]
    options: settings::Options,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and display CBOR data in various formats
    Inspect(inspect::Command),

    /// Check that CBOR data is well-formed
    Validate(validate::Command),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, config_source) = cli.options.load()?;
    settings::init_logger(&settings, &config_source)?;

    match cli.command {
        Commands::Inspect(args) => args.exec(&settings.decoder),
        Commands::Validate(args) => args.exec(&settings.decoder),
    }
}
