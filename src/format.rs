//! Wire-format selection: explicit naming, extension inference, sniffing.

use std::path::Path;

use crate::error::XrdError;

/// The two XRD wire formats. A closed set: codec lookup is a match on this
/// enum, and unknown format names are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xml,
    Json,
}

impl Format {
    /// Resolve a caller-supplied format name, e.g. from a content-type map.
    pub fn from_name(name: &str) -> Result<Self, XrdError> {
        match name {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(XrdError::UnknownFormat(other.to_string())),
        }
    }

    /// Infer the format from a file extension, if it is a known one.
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "xrd" => Some(Self::Xml),
            "json" | "jrd" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer the format from content: the first non-whitespace character
    /// decides. Anything that opens with neither `<` nor `{` fails detection.
    pub fn sniff(content: &str) -> Result<Self, XrdError> {
        match content.trim_start().chars().next() {
            Some('<') => Ok(Self::Xml),
            Some('{') => Ok(Self::Json),
            _ => Err(XrdError::DetectionFailed),
        }
    }
}
