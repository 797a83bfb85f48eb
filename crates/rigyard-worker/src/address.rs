//! Worker address parsing.
//!
//! A spawn address is either `rig` or `rig/worker`. When the worker part is
//! omitted a name is generated downstream.

use rigyard_core::{Result, RigyardError};

/// Parsed spawn address: rig name plus optional worker name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub rig: String,
    pub worker: Option<String>,
}

/// Parse `rig/worker` or `rig`.
///
/// Splits at the first `/`; everything after it is the worker name, even if
/// it contains further separators. An empty rig segment is rejected.
pub fn parse_address(addr: &str) -> Result<Address> {
    match addr.split_once('/') {
        Some((rig, worker)) => {
            if rig.is_empty() {
                return Err(RigyardError::invalid_address(addr, "missing rig name"));
            }
            Ok(Address {
                rig: rig.to_string(),
                worker: Some(worker.to_string()),
            })
        }
        None => Ok(Address {
            rig: addr.to_string(),
            worker: None,
        }),
    }
}
