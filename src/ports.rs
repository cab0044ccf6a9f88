//! Parsing of the `--ports` mini-grammar.
//!
//! A spec is a comma separated list of `port[:targetPort[:protocol]]`
//! entries. Each `--ports` occurrence is parsed as a whole and appended to
//! the list built so far, so the flag can be repeated.

use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

use crate::models::PortMapping;

/// Protocol assigned when a target port is given without a protocol.
pub const DEFAULT_PROTOCOL: &str = "TCP";

#[derive(Debug, Error)]
#[error("invalid port '{field}' in ports spec '{input}': {source}")]
pub struct PortParseError {
    pub input: String,
    pub field: String,
    #[source]
    pub source: ParseIntError,
}

/// Ordered, accumulating list of port mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    ports: Vec<PortMapping>,
}

impl PortList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw` and appends its entries. Nothing is appended if any
    /// entry is malformed.
    pub fn extend_from_spec(&mut self, raw: &str) -> Result<(), PortParseError> {
        let parsed = parse_ports(raw)?;
        self.ports.extend(parsed);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<PortMapping> {
        self.ports
    }
}

impl FromStr for PortList {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = PortList::new();
        list.extend_from_spec(s)?;
        Ok(list)
    }
}

/// Parses a full spec (possibly several comma separated entries) in order.
pub fn parse_ports(raw: &str) -> Result<Vec<PortMapping>, PortParseError> {
    raw.split(',')
        .map(|entry| parse_entry(raw, entry))
        .collect()
}

fn parse_entry(input: &str, entry: &str) -> Result<PortMapping, PortParseError> {
    let mut fields = entry.splitn(3, ':');

    let port = parse_port(input, fields.next().unwrap_or_default())?;
    let mapping = match (fields.next(), fields.next()) {
        (None, _) => PortMapping {
            port,
            target_port: port,
            protocol: String::new(),
        },
        (Some(target), None) => PortMapping {
            port,
            target_port: parse_port(input, target)?,
            protocol: DEFAULT_PROTOCOL.to_string(),
        },
        // Anything after a third colon stays part of the protocol.
        (Some(target), Some(protocol)) => PortMapping {
            port,
            target_port: parse_port(input, target)?,
            protocol: protocol.to_string(),
        },
    };

    Ok(mapping)
}

fn parse_port(input: &str, field: &str) -> Result<u16, PortParseError> {
    // `u16::from_str` takes a leading `+`; a port is digits only.
    let digits = if field.starts_with('+') { "" } else { field };
    digits.parse::<u16>().map_err(|source| PortParseError {
        input: input.to_string(),
        field: field.to_string(),
        source,
    })
}
