//! Markup events over the `quick-xml` tokenizer.
//!
//! The tokenizer is treated as a black box that yields start tags, end tags
//! and text. Everything else (comments, processing instructions, doctype,
//! CDATA) is reported as [`MarkupEvent::Ignored`].

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::UntagError;

/// One tag-boundary or text event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupEvent<'a> {
    /// Emitted once, before anything else.
    DocumentStart,
    /// Opening tag.
    StartElement(&'a str),
    /// Closing tag.
    EndElement(&'a str),
    /// Literal text, with character references already resolved.
    Characters(&'a str),
    /// Comment, processing instruction, declaration, doctype or CDATA.
    Ignored,
    /// Emitted once after the last token, only when no error occurred.
    DocumentEnd,
}

/// Tokenize `input` and stream events to `on_event`.
///
/// Stops at the first error, whether it comes from the tokenizer or from
/// the callback.
pub fn read_markup_events<F>(input: &str, mut on_event: F) -> Result<(), UntagError>
where
    F: FnMut(MarkupEvent<'_>) -> Result<(), UntagError>,
{
    let mut reader = Reader::from_reader(input.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;
    let mut buf = Vec::with_capacity(64);
    let mut entity_buf = String::with_capacity(16);

    on_event(MarkupEvent::DocumentStart)?;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                check_attributes(&reader, &e, &tag)?;
                log::trace!("start element <{}>", tag);
                on_event(MarkupEvent::StartElement(&tag))?;
            }
            Ok(Event::Empty(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                check_attributes(&reader, &e, &tag)?;
                log::trace!("empty element <{}/>", tag);
                on_event(MarkupEvent::StartElement(&tag))?;
                on_event(MarkupEvent::EndElement(&tag))?;
            }
            Ok(Event::End(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                log::trace!("end element </{}>", tag);
                on_event(MarkupEvent::EndElement(&tag))?;
            }
            Ok(Event::Text(e)) => {
                let text = e.decode().map_err(|err| {
                    UntagError::encoding(format!("Decode error: {:?}", err))
                        .with_source("text node decode")
                        .with_token_offset(reader_token_offset(&reader))
                })?;
                log::trace!("characters {:?}", text);
                on_event(MarkupEvent::Characters(text.as_ref()))?;
            }
            Ok(Event::GeneralRef(e)) => {
                let entity_name = e.decode().map_err(|err| {
                    UntagError::encoding(format!("Decode error: {:?}", err))
                        .with_source("entity decode")
                        .with_token_offset(reader_token_offset(&reader))
                })?;
                entity_buf.clear();
                entity_buf.push('&');
                entity_buf.push_str(entity_name.as_ref());
                entity_buf.push(';');
                let resolved = quick_xml::escape::unescape(&entity_buf).map_err(|err| {
                    UntagError::parse("XML_ERROR", format!("Unescape error: {:?}", err))
                        .with_source("entity unescape")
                        .with_token_offset(reader_token_offset(&reader))
                })?;
                log::trace!("character reference {} -> {:?}", entity_buf, resolved);
                on_event(MarkupEvent::Characters(resolved.as_ref()))?;
            }
            Ok(Event::Eof) => break,
            Ok(other) => {
                log::trace!("ignored event {:?}", other);
                on_event(MarkupEvent::Ignored)?;
            }
            Err(err) => {
                return Err(UntagError::parse("XML_ERROR", format!("XML error: {:?}", err))
                    .with_source("xml tokenizer")
                    .with_token_offset(reader_token_offset(&reader)));
            }
        }
        buf.clear();
    }
    on_event(MarkupEvent::DocumentEnd)
}

fn reader_token_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String, UntagError> {
    let decoded = reader.decoder().decode(raw).map_err(|err| {
        UntagError::encoding(format!("Decode error: {:?}", err))
            .with_source("tag name decode")
            .with_token_offset(reader_token_offset(reader))
    })?;
    if !is_xml_name(&decoded) {
        return Err(
            UntagError::parse("INVALID_TAG_NAME", format!("Invalid tag name {:?}", decoded))
                .with_tag(decoded.as_ref())
                .with_token_offset(reader_token_offset(reader)),
        );
    }
    Ok(decoded.into_owned())
}

/// Tag attributes carry no style, but they must still be well-formed.
fn check_attributes(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    tag: &str,
) -> Result<(), UntagError> {
    for attr in e.attributes() {
        attr.map_err(|err| {
            UntagError::parse("XML_ERROR", format!("Attribute error: {:?}", err))
                .with_source("tag attributes")
                .with_tag(tag)
                .with_token_offset(reader_token_offset(reader))
        })?;
    }
    Ok(())
}

/// Simplified XML `Name` production.
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || matches!(first, '_' | ':'))
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}
