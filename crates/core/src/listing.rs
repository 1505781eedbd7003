// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status listing parser
//!
//! The console's list command prints one comma-separated record per resource:
//!
//! ```text
//! index,name,title,topWindowHandle,stateCode,pid
//! ```
//!
//! Only `name` (field 1) and `stateCode` (field 4) drive readiness decisions.

use crate::resource::ResourceObservedState;
use thiserror::Error;

const NAME_FIELD: usize = 1;
const STATE_FIELD: usize = 4;

/// Errors from parsing a status listing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("malformed listing: no parseable records in {lines} line(s)")]
    Malformed { lines: usize },
}

/// One record of the status listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    pub index: Option<u32>,
    pub name: String,
    pub title: Option<String>,
    pub top_window_handle: Option<String>,
    pub state_code: String,
    pub pid: Option<u32>,
}

impl ResourceRecord {
    /// Parse a single listing line; `None` if it lacks a name or state code
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() <= STATE_FIELD {
            return None;
        }

        let name = fields[NAME_FIELD];
        if name.is_empty() {
            return None;
        }

        let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Some(Self {
            index: fields[0].parse().ok(),
            name: name.to_string(),
            title: optional(fields[2]),
            top_window_handle: optional(fields[3]),
            state_code: fields[STATE_FIELD].to_string(),
            pid: fields.get(5).and_then(|p| p.parse().ok()),
        })
    }

    pub fn state(&self) -> ResourceObservedState {
        ResourceObservedState::from_code(&self.state_code)
    }
}

/// Parse the full listing output
///
/// Blank lines and lines with too few fields are skipped. Output that has
/// content but yields no records at all is reported as malformed, so a broken
/// probe is never mistaken for an empty (all-absent) listing.
pub fn parse_listing(output: &str) -> Result<Vec<ResourceRecord>, ListingError> {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let records: Vec<ResourceRecord> = lines
        .iter()
        .filter_map(|l| ResourceRecord::parse_line(l))
        .collect();

    if records.is_empty() && !lines.is_empty() {
        return Err(ListingError::Malformed { lines: lines.len() });
    }

    Ok(records)
}

/// Look up the observed state of `name`; `None` if it is absent from the listing
pub fn observed_state(records: &[ResourceRecord], name: &str) -> Option<ResourceObservedState> {
    records
        .iter()
        .find(|r| r.name == name)
        .map(ResourceRecord::state)
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
