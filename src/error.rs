use thiserror::Error;

/// Errors raised while loading, serializing, or querying XRD documents.
#[derive(Debug, Error)]
pub enum XrdError {
    #[error("Error loading XRD file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid XML: {0}")]
    XmlSyntax(String),

    #[error("Invalid JSON: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    #[error("Wrong document namespace")]
    WrongNamespace,

    #[error("XML root element is not \"XRD\"")]
    WrongRoot,

    #[error("Error loading JRD: string empty")]
    EmptyInput,

    #[error("JRD document is not an object")]
    NotAnObject,

    #[error("Detecting file type failed")]
    DetectionFailed,

    #[error("No codec for type \"{0}\"")]
    UnknownFormat(String),

    #[error("Changing properties is not supported")]
    ReadOnlyProperties,
}
