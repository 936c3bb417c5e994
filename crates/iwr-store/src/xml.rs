//! Decoding of the warehouse's XML listings.
//!
//! Two documents are understood:
//!
//! ```xml
//! <!-- GET /{collection}/{id}/_attrs -->
//! <object>
//!   <object_attr name="template">7ad87a12</object_attr>
//!   <object_attr name="referenced_by_A1"/>
//! </object>
//!
//! <!-- GET /{collection} -->
//! <objects>
//!   <object><bucket>templates</bucket><key>7ad87a12</key></object>
//! </objects>
//! ```
//!
//! The same two shapes can be rendered, so the in-memory store can answer raw
//! fetches the way the warehouse does.
//!
//! Element nesting is not checked: any `object_attr` or `key` element counts,
//! wherever it appears.

use iwr_types::{AttributeSet, EntityId};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{StoreError, StoreResult};

const OBJECT_ATTR: &[u8] = b"object_attr";
const KEY: &[u8] = b"key";

/// One entry of an attribute listing.
///
/// `content` is `None` when the listing names the attribute without inlining
/// its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedAttribute {
    pub name: String,
    pub content: Option<String>,
}

/// Decode an `_attrs` listing.
pub fn parse_attribute_listing(xml: &str) -> StoreResult<Vec<ListedAttribute>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut listed = Vec::new();
    let mut current: Option<ListedAttribute> = None;
    loop {
        match reader.read_event().map_err(decode)? {
            Event::Start(e) if e.local_name().as_ref() == OBJECT_ATTR => {
                current = Some(ListedAttribute {
                    name: name_of(&e)?,
                    content: None,
                });
            }
            Event::Empty(e) if e.local_name().as_ref() == OBJECT_ATTR => {
                listed.push(ListedAttribute {
                    name: name_of(&e)?,
                    content: None,
                });
            }
            Event::Text(t) => {
                if let Some(attr) = current.as_mut() {
                    append(&mut attr.content, &t.unescape().map_err(decode)?);
                }
            }
            Event::CData(t) => {
                if let Some(attr) = current.as_mut() {
                    append(&mut attr.content, &String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) if e.local_name().as_ref() == OBJECT_ATTR => {
                if let Some(attr) = current.take() {
                    listed.push(attr);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(listed)
}

/// Decode a collection listing into its member keys, in document order.
pub fn parse_key_listing(xml: &str) -> StoreResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut keys = Vec::new();
    let mut current: Option<Option<String>> = None;
    loop {
        match reader.read_event().map_err(decode)? {
            Event::Start(e) if e.local_name().as_ref() == KEY => current = Some(None),
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    append(text, &t.unescape().map_err(decode)?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == KEY => {
                if let Some(Some(key)) = current.take() {
                    keys.push(key);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(keys)
}

/// Encode an `_attrs` listing with every value inlined.
pub fn render_attribute_listing(attributes: &AttributeSet) -> String {
    let entries: String = attributes
        .iter()
        .map(|(name, content)| {
            format!(
                "  <object_attr name=\"{}\">{}</object_attr>\n",
                escape(name),
                escape(content)
            )
        })
        .collect();
    format!("<object>\n{entries}</object>\n")
}

/// Encode a collection listing.
pub fn render_key_listing<'a>(bucket: &str, keys: impl IntoIterator<Item = &'a EntityId>) -> String {
    let entries: String = keys
        .into_iter()
        .map(|key| {
            format!(
                "  <object><bucket>{}</bucket><key>{}</key></object>\n",
                escape(bucket),
                escape(key.as_str())
            )
        })
        .collect();
    format!("<objects>\n{entries}</objects>\n")
}

fn name_of(e: &BytesStart<'_>) -> StoreResult<String> {
    let attr = e
        .try_get_attribute("name")
        .map_err(decode)?
        .ok_or_else(|| StoreError::Decode("object_attr without a name".into()))?;
    Ok(attr.unescape_value().map_err(decode)?.into_owned())
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}

fn decode(e: impl std::fmt::Display) -> StoreError {
    StoreError::Decode(e.to_string())
}
