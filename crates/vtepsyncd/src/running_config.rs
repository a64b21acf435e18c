//! Extraction of the configured flood list from the running configuration.
//!
//! `show running-config` in JSON format renders each configuration block as
//! `{"cmds": {"<line>": {...}, ...}}`. The VXLAN interface block is located
//! by its `interface <name>` key and its nested command lines are scanned for
//! `vxlan flood vtep` statements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VtepsyncError};
use crate::types::{VtepAddress, VtepSet};

/// Marker identifying flood-list configuration lines.
pub const FLOOD_LIST_MARKER: &str = "vxlan flood vtep";

const SOURCE_NAME: &str = "running-config";

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\b").expect("Invalid regex pattern")
});

/// How multiple `vxlan flood vtep` lines in one interface block combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloodLinePolicy {
    /// Addresses from every matching line are merged.
    #[default]
    Union,
    /// Only the last matching line counts.
    LastMatch,
}

/// Returns the flood-list addresses configured in an interface block.
///
/// A block without any flood-list line yields an empty set.
pub fn parse_configured_vteps<S: AsRef<str>>(lines: &[S], policy: FloodLinePolicy) -> VtepSet {
    let mut vteps = VtepSet::new();

    for line in lines.iter().map(AsRef::as_ref) {
        if !line.contains(FLOOD_LIST_MARKER) {
            continue;
        }

        if policy == FloodLinePolicy::LastMatch {
            vteps = VtepSet::new();
        }

        for caps in ADDRESS_RE.captures_iter(line) {
            let raw = &caps[1];
            match raw.parse::<VtepAddress>() {
                Ok(addr) => {
                    vteps.insert(addr);
                }
                Err(_) => {
                    tracing::warn!(line = %line, address = %raw, "Skipping invalid flood-list address");
                }
            }
        }
    }

    tracing::debug!(count = vteps.len(), vteps = %vteps, "Parsed configured VTEPs");
    vteps
}

/// Returns the command lines of `interface <name>` from a JSON
/// `show running-config` result.
///
/// The block's nested `cmds` may be an object keyed by line (the device's
/// native rendering) or an array of lines. A missing interface is an error:
/// without it the configured flood list is unknown.
pub fn interface_config_lines(running_config: &Value, interface: &str) -> Result<Vec<String>> {
    let sections = running_config
        .get("cmds")
        .and_then(Value::as_object)
        .ok_or_else(|| VtepsyncError::parse(SOURCE_NAME, "result has no 'cmds' mapping"))?;

    let key = format!("interface {}", interface);
    let block = sections.get(&key).ok_or_else(|| {
        VtepsyncError::parse(SOURCE_NAME, format!("'{}' not found in configuration", key))
    })?;

    match block.get("cmds") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(lines)) => Ok(lines.keys().cloned().collect()),
        Some(Value::Array(lines)) => lines
            .iter()
            .map(|line| {
                line.as_str().map(str::to_string).ok_or_else(|| {
                    VtepsyncError::parse(
                        SOURCE_NAME,
                        format!("non-string command line in '{}': {}", key, line),
                    )
                })
            })
            .collect(),
        Some(other) => Err(VtepsyncError::parse(
            SOURCE_NAME,
            format!("unexpected 'cmds' value for '{}': {}", key, other),
        )),
    }
}
