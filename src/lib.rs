//! Parse, query, and serialize Extensible Resource Descriptor documents.
//!
//! XRD documents (and their JSON rendering, JRD) are small discovery
//! documents used by WebFinger and Host-Meta: they describe a subject
//! resource through typed properties and prioritized links. Both wire
//! formats decode into one [`Document`] model and encode back from it,
//! so a document can be converted between formats losslessly at the
//! logical level.
//!
//! Fetching documents over the network is handled by the caller; this
//! crate only parses, validates, queries, and re-serializes. Signature
//! data in signed XRD input is skipped, not validated.
//!
//! ```
//! use xrd::Document;
//!
//! let doc = Document::load_str(
//!     r#"{"subject":"acct:bob@example.com",
//!         "links":[{"rel":"http://webfinger.example/rel/profile-page",
//!                   "href":"http://www.example.com/~bob/"}]}"#,
//!     None,
//! )?;
//! assert!(doc.describes("acct:bob@example.com"));
//! let link = doc.get("http://webfinger.example/rel/profile-page", None, true);
//! assert_eq!(link.and_then(|l| l.href.as_deref()), Some("http://www.example.com/~bob/"));
//! # Ok::<(), xrd::XrdError>(())
//! ```

mod document;
mod error;
mod format;
pub mod json;
mod link;
mod properties;
pub mod xml;

pub use document::Document;
pub use error::XrdError;
pub use format::Format;
pub use link::Link;
pub use properties::{Property, PropertySet};

/// The XRD 1.0 namespace; the required default namespace of XML input.
pub const NS_XRD: &str = "http://docs.oasis-open.org/ns/xri/xrd-1.0";
