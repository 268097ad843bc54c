//! XRD 1.0 XML decoding and encoding.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::document::{format_timestamp, parse_datetime, Document};
use crate::error::XrdError;
use crate::link::Link;
use crate::properties::{Property, PropertySet};
use crate::NS_XRD;

/// Leaf element currently being read; its text commits on the closing tag.
enum Leaf {
    Subject,
    Alias,
    Expires,
    Title { lang: String },
    Property { type_uri: Option<String> },
}

/// Decode an XRD 1.0 XML document.
///
/// The root element must be `XRD` with the XRD 1.0 namespace as its default
/// namespace. Unknown elements, `Signature` included, are skipped without
/// error and never carried into the model. An unparsable `Expires` value
/// normalizes to absent.
pub fn decode_str(input: &str) -> Result<Document, XrdError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut doc = Document::default();
    let mut saw_root = false;
    let mut saw_expires = false;
    // open elements seen by this loop; skipped subtrees are consumed whole
    let mut depth = 0usize;
    let mut current_link: Option<Link> = None;
    let mut leaf: Option<Leaf> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if !saw_root {
                    check_root(&e, &mut doc)?;
                    saw_root = true;
                    depth = 1;
                } else if leaf.is_some() {
                    // no element children inside leaf elements
                    skip_subtree(&mut reader, &e)?;
                } else if let Some(next) = classify(&e, current_link.is_some())? {
                    depth += 1;
                    match next {
                        Classified::Leaf(l) => {
                            text.clear();
                            leaf = Some(l);
                        }
                        Classified::Link(link) => current_link = Some(link),
                    }
                } else {
                    skip_subtree(&mut reader, &e)?;
                }
            }
            Ok(Event::Empty(e)) => {
                if !saw_root {
                    // an empty root is a legal, empty document
                    check_root(&e, &mut doc)?;
                    break;
                }
                if leaf.is_some() {
                    continue;
                }
                if let Some(next) = classify(&e, current_link.is_some())? {
                    match next {
                        Classified::Leaf(l) => {
                            commit(&mut doc, &mut current_link, &mut saw_expires, l, String::new())
                        }
                        Classified::Link(link) => doc.links.push(link),
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if leaf.is_some() {
                    let unescaped = t.unescape().map_err(|e| {
                        XrdError::XmlSyntax(format!(
                            "parse error at position {}: {e}",
                            reader.error_position()
                        ))
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(t)) => {
                if leaf.is_some() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if let Some(l) = leaf.take() {
                    commit(
                        &mut doc,
                        &mut current_link,
                        &mut saw_expires,
                        l,
                        std::mem::take(&mut text),
                    );
                } else if e.local_name().as_ref() == b"Link" {
                    if let Some(link) = current_link.take() {
                        doc.links.push(link);
                    }
                }
            }
            Ok(Event::Eof) => {
                if !saw_root {
                    return Err(XrdError::XmlSyntax("no root element".to_string()));
                }
                if depth > 0 {
                    return Err(XrdError::XmlSyntax(
                        "unexpected end of document inside an open element".to_string(),
                    ));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                return Err(XrdError::XmlSyntax(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )))
            }
        }
    }

    Ok(doc)
}

enum Classified {
    Leaf(Leaf),
    Link(Link),
}

fn classify(e: &BytesStart<'_>, in_link: bool) -> Result<Option<Classified>, XrdError> {
    let classified = if in_link {
        match e.local_name().as_ref() {
            b"Title" => Some(Classified::Leaf(Leaf::Title {
                lang: attr_value(e, b"xml:lang")?.unwrap_or_default(),
            })),
            b"Property" => Some(Classified::Leaf(Leaf::Property {
                type_uri: attr_value(e, b"type")?,
            })),
            _ => None,
        }
    } else {
        match e.local_name().as_ref() {
            b"Subject" => Some(Classified::Leaf(Leaf::Subject)),
            b"Alias" => Some(Classified::Leaf(Leaf::Alias)),
            b"Expires" => Some(Classified::Leaf(Leaf::Expires)),
            b"Property" => Some(Classified::Leaf(Leaf::Property {
                type_uri: attr_value(e, b"type")?,
            })),
            b"Link" => Some(Classified::Link(link_from_attrs(e)?)),
            _ => None,
        }
    };
    Ok(classified)
}

fn commit(
    doc: &mut Document,
    current_link: &mut Option<Link>,
    saw_expires: &mut bool,
    leaf: Leaf,
    text: String,
) {
    match leaf {
        Leaf::Subject => {
            // first Subject wins
            if doc.subject.is_none() {
                doc.subject = Some(text);
            }
        }
        Leaf::Alias => doc.aliases.push(text),
        Leaf::Expires => {
            if !*saw_expires {
                *saw_expires = true;
                doc.expires = parse_datetime(&text);
            }
        }
        Leaf::Title { lang } => {
            if let Some(link) = current_link.as_mut() {
                link.insert_title(lang, text);
            }
        }
        Leaf::Property { type_uri } => {
            let property = Property {
                type_uri,
                value: if text.is_empty() { None } else { Some(text) },
            };
            match current_link.as_mut() {
                Some(link) => link.properties.push(property),
                None => doc.properties.push(property),
            }
        }
    }
}

fn check_root(e: &BytesStart<'_>, doc: &mut Document) -> Result<(), XrdError> {
    let default_ns = attr_value(e, b"xmlns")?;
    if default_ns.as_deref() != Some(NS_XRD) {
        return Err(XrdError::WrongNamespace);
    }
    if e.local_name().as_ref() != b"XRD" {
        return Err(XrdError::WrongRoot);
    }
    doc.id = attr_value(e, b"xml:id")?;
    Ok(())
}

fn link_from_attrs(e: &BytesStart<'_>) -> Result<Link, XrdError> {
    Ok(Link {
        rel: attr_value(e, b"rel")?,
        media_type: attr_value(e, b"type")?,
        href: attr_value(e, b"href")?,
        template: attr_value(e, b"template")?,
        ..Link::default()
    })
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, XrdError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XrdError::XmlSyntax(e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| XrdError::XmlSyntax(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn skip_subtree(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<(), XrdError> {
    reader
        .read_to_end(e.name())
        .map_err(|err| XrdError::XmlSyntax(err.to_string()))?;
    Ok(())
}

/// Encode a document as XRD 1.0 XML.
///
/// Element order is fixed: `Subject`, `Alias`*, `Link`*, `Property`*,
/// `Expires`; link attributes always serialize as rel, type, href, template.
pub fn encode(doc: &Document) -> Result<String, XrdError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;

    let mut root = BytesStart::new("XRD");
    root.push_attribute(("xmlns", NS_XRD));
    if let Some(id) = &doc.id {
        root.push_attribute(("xml:id", id.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(write_err)?;

    if let Some(subject) = &doc.subject {
        write_text_element(&mut writer, "Subject", subject)?;
    }
    for alias in &doc.aliases {
        write_text_element(&mut writer, "Alias", alias)?;
    }
    for link in &doc.links {
        write_link(&mut writer, link)?;
    }
    write_properties(&mut writer, &doc.properties)?;
    if let Some(rendered) = doc.expires.and_then(format_timestamp) {
        write_text_element(&mut writer, "Expires", &rendered)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("XRD")))
        .map_err(write_err)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| XrdError::XmlSyntax(e.to_string()))
}

fn write_link<W: std::io::Write>(writer: &mut Writer<W>, link: &Link) -> Result<(), XrdError> {
    let mut start = BytesStart::new("Link");
    for (key, value) in [
        ("rel", &link.rel),
        ("type", &link.media_type),
        ("href", &link.href),
        ("template", &link.template),
    ] {
        if let Some(v) = value {
            start.push_attribute((key, v.as_str()));
        }
    }

    if link.titles.is_empty() && link.properties.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_err);
    }

    writer.write_event(Event::Start(start)).map_err(write_err)?;
    for (lang, title) in &link.titles {
        let mut start = BytesStart::new("Title");
        if !lang.is_empty() {
            start.push_attribute(("xml:lang", lang.as_str()));
        }
        writer.write_event(Event::Start(start)).map_err(write_err)?;
        writer
            .write_event(Event::Text(BytesText::new(title)))
            .map_err(write_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("Title")))
            .map_err(write_err)?;
    }
    write_properties(writer, &link.properties)?;
    writer
        .write_event(Event::End(BytesEnd::new("Link")))
        .map_err(write_err)
}

fn write_properties<W: std::io::Write>(
    writer: &mut Writer<W>,
    properties: &PropertySet,
) -> Result<(), XrdError> {
    for property in properties.iter() {
        let mut start = BytesStart::new("Property");
        if let Some(type_uri) = &property.type_uri {
            start.push_attribute(("type", type_uri.as_str()));
        }
        match &property.value {
            Some(value) => {
                writer.write_event(Event::Start(start)).map_err(write_err)?;
                writer
                    .write_event(Event::Text(BytesText::new(value)))
                    .map_err(write_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("Property")))
                    .map_err(write_err)?;
            }
            None => writer.write_event(Event::Empty(start)).map_err(write_err)?,
        }
    }
    Ok(())
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), XrdError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_err)
}

fn write_err<E: std::fmt::Display>(e: E) -> XrdError {
    XrdError::XmlSyntax(format!("write error: {e}"))
}
