//! Loading of gopackagesdriver analysis output.
//!
//! The driver's output file often carries non-JSON preamble (bazel progress
//! text) before the actual document, so the loader scans for the start of
//! the JSON object instead of parsing the file as-is.

use std::fs::read_to_string;

use anyhow::{Context as _, Result};
use camino::Utf8Path;

use crate::model::AnalysisDocument;

// The driver document always begins with this key.
const JSON_MARKER: &str = "{\"NotHandled\"";

pub fn load(path: &Utf8Path) -> Result<AnalysisDocument> {
    let content =
        read_to_string(path).with_context(|| format!("reading driver output \"{path}\""))?;

    let start = match content.find(JSON_MARKER) {
        Some(pos) => pos,
        None => content
            .find('{')
            .ok_or_else(|| anyhow!("no JSON object found in \"{path}\""))?,
    };

    serde_json::from_str(&content[start..])
        .with_context(|| format!("parsing driver output \"{path}\""))
}
