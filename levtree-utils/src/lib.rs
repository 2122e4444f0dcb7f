pub mod dump;
pub mod sled_store;

use anyhow::Context;
use levtree::Location;

/// Parse a hex string, as used on the command line for keys and payloads
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(text.trim()).with_context(|| format!("invalid hex {:?}", text))
}

/// Parse a hex encoded node key. The empty string is the root.
pub fn parse_key(text: &str) -> anyhow::Result<Location> {
    let bytes = parse_hex(text)?;
    Location::from_key(&bytes)
        .with_context(|| format!("{:?} is not a sequence of whole ids", text))
}
