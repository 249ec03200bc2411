/*!
Inspect command - display CBOR data in various formats
*/

use super::io::{Input, Output};
use super::source::Mode;
use anyhow::Context;
use base64::prelude::*;
use cbor_decoder::{Config, Item};
use clap::Parser;
use serde_json::{Map, Number, Value};

/// Inspect and display CBOR data
#[derive(Parser, Debug)]
#[command(about = "Inspect and display CBOR information", long_about = None)]
pub struct Command {
    /// Output format
    #[arg(
        long,
        default_value = "diag",
        value_name = "FORMAT",
        help = "Output format: diag/diagnostic (CDN, human-readable), json (lossy), hex"
    )]
    format: OutputFormat,

    #[command(flatten)]
    mode: Mode,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// CBOR Diagnostic Notation (human-readable)
    #[value(alias = "diagnostic")]
    Diag,
    /// JSON format (lossy - loses CBOR tags, types, etc.)
    Json,
    /// Hexadecimal dump of the decoded bytes
    Hex,
}

impl Command {
    pub fn exec(self, config: &Config) -> anyhow::Result<()> {
        let data = self
            .input
            .read_all()
            .with_context(|| format!("Failed to read {}", self.input.name()))?;
        let decoded = self.mode.decode(&data, config)?;

        let output_text = match self.format {
            OutputFormat::Diag => decoded
                .items
                .iter()
                .map(Item::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => {
                let mut values = decoded.items.iter().map(to_json).collect::<Vec<_>>();
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    Value::Array(values)
                };
                serde_json::to_string_pretty(&value)?
            }
            OutputFormat::Hex => hex::encode(&data[..decoded.len]),
        };

        self.output
            .unwrap_or(Output::Stdout)
            .write_line(&output_text)
            .context("Failed to write output")
    }
}

/// Convert a CBOR item to JSON (lossy)
fn to_json(item: &Item) -> Value {
    match item {
        Item::Unsigned(n) => Value::from(*n),
        // Below i64::MIN there is no JSON number to fall back on
        Item::Negative(_) => item
            .as_i64()
            .map_or_else(|| Value::String(item.to_string()), Value::from),
        Item::Bytes(b) => Value::String(BASE64_URL_SAFE_NO_PAD.encode(b)),
        Item::Text(s) => Value::String(s.clone()),
        Item::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        Item::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (json_key(k), to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        Item::Tagged(_, inner) => to_json(inner),
        Item::Bool(b) => Value::Bool(*b),
        Item::Float(f) => Number::from_f64(f.to_f64()).map_or(Value::Null, Value::Number),
        Item::Null | Item::Undefined | Item::Simple(_) => Value::Null,
    }
}

/// In JSON, all keys must be strings
fn json_key(key: &Item) -> String {
    match key {
        Item::Text(s) => s.clone(),
        key => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(data: &[u8]) -> Item {
        cbor_decoder::decode(data).unwrap().0
    }

    #[test]
    fn json_conversion() {
        // {"a": 1, 2: h'0102', "c": [-1, 1.5, null, undefined, 0("t")]}
        let item = decode(&hex::decode("a36161010242010261638520f93e00f6f7c06174").unwrap());
        assert_eq!(
            to_json(&item),
            json!({
                "a": 1,
                "2": "AQI",
                "c": [-1, 1.5, null, null, "t"],
            })
        );
    }

    #[test]
    fn json_wide_negative() {
        let item = decode(&hex::decode("3bffffffffffffffff").unwrap());
        assert_eq!(to_json(&item), json!("-18446744073709551616"));
    }

    #[test]
    fn json_non_finite_float() {
        assert_eq!(to_json(&decode(&[0xf9, 0x7c, 0x00])), Value::Null);
    }
}
