//! JRD (JSON Resource Descriptor) decoding and encoding.

use serde_json::{Map, Value};

use crate::document::{format_timestamp, parse_datetime, Document};
use crate::error::XrdError;
use crate::link::Link;
use crate::properties::{Property, PropertySet};

/// Decode a JRD document.
///
/// Every top-level key is optional; unknown keys and values of the wrong JSON
/// type are ignored for forward compatibility. A `null` property value maps
/// to an absent value, like an empty `Property` element in XML.
pub fn decode_str(input: &str) -> Result<Document, XrdError> {
    if input.is_empty() {
        return Err(XrdError::EmptyInput);
    }
    let value: Value = serde_json::from_str(input)?;
    let obj = value.as_object().ok_or(XrdError::NotAnObject)?;

    let mut doc = Document::default();
    if let Some(subject) = obj.get("subject").and_then(Value::as_str) {
        doc.subject = Some(subject.to_string());
    }
    if let Some(aliases) = obj.get("aliases").and_then(Value::as_array) {
        doc.aliases = aliases
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();
    }
    decode_properties(obj.get("properties"), &mut doc.properties);
    if let Some(links) = obj.get("links").and_then(Value::as_array) {
        doc.links = links
            .iter()
            .filter_map(Value::as_object)
            .map(decode_link)
            .collect();
    }
    doc.expires = obj.get("expires").and_then(decode_expires);

    Ok(doc)
}

fn decode_link(obj: &Map<String, Value>) -> Link {
    let field = |key: &str| obj.get(key).and_then(Value::as_str).map(|s| s.to_string());
    let mut link = Link {
        rel: field("rel"),
        media_type: field("type"),
        href: field("href"),
        template: field("template"),
        ..Link::default()
    };
    if let Some(titles) = obj.get("titles").and_then(Value::as_object) {
        for (lang, title) in titles {
            if let Some(title) = title.as_str() {
                link.insert_title(lang.clone(), title.to_string());
            }
        }
    }
    decode_properties(obj.get("properties"), &mut link.properties);
    link
}

fn decode_properties(value: Option<&Value>, set: &mut PropertySet) {
    let Some(obj) = value.and_then(Value::as_object) else {
        return;
    };
    for (type_uri, value) in obj {
        let value = match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            _ => continue,
        };
        set.push(Property {
            type_uri: Some(type_uri.clone()),
            value,
        });
    }
}

fn decode_expires(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_datetime(s),
        _ => None,
    }
}

/// Encode a document as compact JRD.
///
/// Only non-default fields are emitted, in the order `subject, aliases,
/// properties, links, expires`. JRD has no counterpart to `xml:id`, so the
/// document id is dropped here.
pub fn encode(doc: &Document) -> Result<String, XrdError> {
    let mut root = Map::new();
    if let Some(subject) = &doc.subject {
        root.insert("subject".to_string(), Value::String(subject.clone()));
    }
    if !doc.aliases.is_empty() {
        root.insert(
            "aliases".to_string(),
            Value::Array(doc.aliases.iter().cloned().map(Value::String).collect()),
        );
    }
    if let Some(properties) = encode_properties(&doc.properties) {
        root.insert("properties".to_string(), properties);
    }
    if !doc.links.is_empty() {
        root.insert(
            "links".to_string(),
            Value::Array(doc.links.iter().map(encode_link).collect()),
        );
    }
    if let Some(rendered) = doc.expires.and_then(format_timestamp) {
        root.insert("expires".to_string(), Value::String(rendered));
    }
    Ok(serde_json::to_string(&Value::Object(root))?)
}

fn encode_link(link: &Link) -> Value {
    let mut obj = Map::new();
    for (key, value) in [
        ("rel", &link.rel),
        ("type", &link.media_type),
        ("href", &link.href),
        ("template", &link.template),
    ] {
        if let Some(v) = value {
            obj.insert(key.to_string(), Value::String(v.clone()));
        }
    }
    if !link.titles.is_empty() {
        let titles: Map<String, Value> = link
            .titles
            .iter()
            .map(|(lang, title)| (lang.clone(), Value::String(title.clone())))
            .collect();
        obj.insert("titles".to_string(), Value::Object(titles));
    }
    if let Some(properties) = encode_properties(&link.properties) {
        obj.insert("properties".to_string(), properties);
    }
    Value::Object(obj)
}

fn encode_properties(set: &PropertySet) -> Option<Value> {
    if set.is_empty() {
        return None;
    }
    let mut obj = Map::new();
    for property in set.iter() {
        let Some(type_uri) = &property.type_uri else {
            continue;
        };
        let value = match &property.value {
            Some(v) => Value::String(v.clone()),
            None => Value::Null,
        };
        obj.insert(type_uri.clone(), value);
    }
    Some(Value::Object(obj))
}
