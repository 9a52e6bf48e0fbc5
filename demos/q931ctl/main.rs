//! `q931ctl` -- decodes a single captured Q.931 message and prints its
//! header and information elements, in the spirit of the teacher crate's
//! own `examples/pcap-reader` but operating on one message at a time
//! rather than a capture file (spec.md §6.1: "CLI demo... decode a
//! captured Q.931 message from a hex string or pcap-less raw file").

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use q931::ie::IeType;
use q931::message::{Generic, Message};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hex-encoded message bytes, e.g. "08 02 00 05 05 ...", whitespace
    /// and ":" separators are ignored.
    #[arg(long, conflicts_with = "file")]
    hex: Option<String>,

    /// Path to a file containing the raw message bytes (no pcap framing).
    #[arg(long, conflicts_with = "hex")]
    file: Option<PathBuf>,
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if cleaned.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&cleaned[i..i + 2], 16).context("invalid hex digit"))
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let bytes = match (args.hex, args.file) {
        (Some(hex), None) => decode_hex(&hex)?,
        (None, Some(path)) => fs::read(&path).with_context(|| format!("reading {path:?}"))?,
        _ => bail!("pass exactly one of --hex or --file"),
    };

    let msg = Generic::unmarshal(&bytes).context("decoding Q.931 message")?;

    println!(
        "{} (pd=0x{:02x} crv={})",
        msg.msg_name(),
        msg.header().protocol_discriminator,
        msg.crv()
    );

    for soie in &msg.single_octet_ies {
        println!("  single-octet IE: 0x{:02x}", soie.id);
    }

    for ie in msg.ies() {
        print!("  {:?} ({} bytes):", ie.ie_type, ie.content.len());
        for b in &ie.content {
            print!(" {b:02x}");
        }
        println!();
        describe_ie(ie.ie_type, &ie.content);
    }

    Ok(())
}

/// Best-effort detail line for IE types this crate has a typed decoder
/// for. Anything else is left at the raw hex dump printed above.
fn describe_ie(ie_type: IeType, content: &[u8]) {
    match ie_type {
        IeType::Cause => {
            if let Ok(cause) = q931::ie::cause::Cause::unmarshal(content) {
                println!("    -> cause {:?}", cause.value);
            }
        }
        IeType::CalledPartyNumber => {
            if let Ok(n) = q931::ie::called_party_number::CalledPartyNumber::unmarshal(content) {
                println!("    -> called number {}", n.digits);
            }
        }
        IeType::CallingPartyNumber => {
            if let Ok(n) = q931::ie::calling_party_number::CallingPartyNumber::unmarshal(content) {
                println!("    -> calling number {}", n.digits);
            }
        }
        IeType::BearerCapability => {
            if let Ok(bc) = q931::ie::bearer_capability::BearerCapability::unmarshal(content) {
                println!("    -> {:?}", bc);
            }
        }
        _ => {}
    }
}
