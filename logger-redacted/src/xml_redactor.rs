use quick_xml::events::{BytesStart, BytesText, Event as XmlEvent};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use serde_json::Value;

use crate::error::MaskError;
use crate::redactor::{MASK, SENSITIVE_KEYWORDS};
use crate::writer::{Event, EventProcessor};

/// Masks sensitive elements and attributes inside string fields that hold an
/// XML document.
///
/// A leaf is sensitive when its lowercase name ends with a keyword, i.e. when
/// its dotted leaf path (`envelope.card.pin.#text`) contains `<keyword>.#text`.
/// Fields that are not XML, or that contain nothing sensitive, keep their
/// original text.
#[derive(Debug, Clone, Copy)]
pub struct XmlFieldMasker {
    keywords: &'static [&'static str],
}

impl XmlFieldMasker {
    pub fn new() -> Self {
        Self {
            keywords: SENSITIVE_KEYWORDS,
        }
    }

    pub fn with_keywords(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// # Errors
    ///
    /// Fails when a masked document cannot be encoded back to XML.
    pub fn mask_event(&self, event: &mut Event) -> Result<(), MaskError> {
        for (key, value) in event.iter_mut() {
            let Value::String(text) = value else {
                continue;
            };

            let masked = mask_xml(text, self.keywords).map_err(|source| MaskError::Field {
                field: key.clone(),
                source: Box::new(source),
            })?;

            if let Some(masked) = masked {
                *text = masked;
            }
        }

        Ok(())
    }
}

impl Default for XmlFieldMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl EventProcessor for XmlFieldMasker {
    fn process(&self, event: &mut Event) -> Result<(), MaskError> {
        self.mask_event(event)
    }
}

struct OpenElement {
    sensitive: bool,
    masked_text: bool,
}

/// Returns the re-encoded document when something was masked, `None` when
/// `message` is not XML or contains no sensitive leaf.
///
/// # Errors
///
/// Fails when the masked document cannot be encoded.
pub fn mask_xml(message: &str, keywords: &[&str]) -> Result<Option<String>, MaskError> {
    let Some(events) = parse_document(message) else {
        return Ok(None);
    };

    let mut matched = false;
    let mut open: Vec<OpenElement> = Vec::new();
    let mut output: Vec<XmlEvent<'_>> = Vec::with_capacity(events.len());

    for event in events {
        match event {
            XmlEvent::Start(start) => {
                let Some((start, masked)) = mask_attributes(start, keywords) else {
                    return Ok(None);
                };
                matched |= masked;
                open.push(OpenElement {
                    sensitive: is_sensitive(start.name().as_ref(), keywords),
                    masked_text: false,
                });
                output.push(XmlEvent::Start(start));
            }
            XmlEvent::Empty(start) => {
                let Some((start, masked)) = mask_attributes(start, keywords) else {
                    return Ok(None);
                };
                matched |= masked;
                output.push(XmlEvent::Empty(start));
            }
            XmlEvent::End(end) => {
                open.pop();
                output.push(XmlEvent::End(end));
            }
            XmlEvent::Text(text) if is_blank(&text) => output.push(XmlEvent::Text(text)),
            XmlEvent::Text(_) | XmlEvent::CData(_)
                if open.last().is_some_and(|element| element.sensitive) =>
            {
                if let Some(element) = open.last_mut() {
                    // Split text nodes of one element collapse into a single mask.
                    if !element.masked_text {
                        element.masked_text = true;
                        matched = true;
                        output.push(XmlEvent::Text(BytesText::new(MASK)));
                    }
                }
            }
            other => output.push(other),
        }
    }

    if !matched {
        return Ok(None);
    }

    let mut writer = Writer::new(Vec::with_capacity(message.len()));
    for event in output {
        writer.write_event(event).map_err(MaskError::XmlEncode)?;
    }

    String::from_utf8(writer.into_inner())
        .map(Some)
        .map_err(|err| MaskError::XmlEncode(err.utf8_error().into()))
}

/// Read the whole document, or `None` when it is not well-formed XML with at
/// least one element.
fn parse_document(message: &str) -> Option<Vec<XmlEvent<'_>>> {
    if !message.trim_start().starts_with('<') {
        return None;
    }

    let mut reader = Reader::from_str(message);
    reader.check_end_names(true);

    let mut events = Vec::new();
    let mut depth: usize = 0;
    let mut has_element = false;
    loop {
        match reader.read_event() {
            Ok(XmlEvent::Eof) => break,
            Ok(event) => {
                match &event {
                    XmlEvent::Start(_) => {
                        depth += 1;
                        has_element = true;
                    }
                    XmlEvent::End(_) => depth = depth.checked_sub(1)?,
                    XmlEvent::Empty(_) => has_element = true,
                    _ => {}
                }
                events.push(event);
            }
            Err(_) => return None,
        }
    }

    (has_element && depth == 0).then_some(events)
}

/// Mask sensitive attribute values. The element is returned untouched when
/// none matches; `None` when its attributes are malformed.
///
/// A rebuilt element always quotes with `"`, so kept values are unescaped
/// and escaped again rather than copied.
fn mask_attributes<'a>(start: BytesStart<'a>, keywords: &[&str]) -> Option<(BytesStart<'a>, bool)> {
    let mut sensitive_found = false;
    for attribute in start.attributes() {
        let attribute = attribute.ok()?;
        if is_sensitive(attribute.key.as_ref(), keywords) {
            sensitive_found = true;
        }
    }

    if !sensitive_found {
        return Some((start, false));
    }

    let name = std::str::from_utf8(start.name().as_ref()).ok()?.to_string();
    let mut rebuilt = BytesStart::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.ok()?;
        let key = std::str::from_utf8(attribute.key.as_ref()).ok()?;
        if is_sensitive(key.as_bytes(), keywords) {
            rebuilt.push_attribute((key, MASK));
        } else {
            let value = attribute.unescape_value().ok()?;
            rebuilt.push_attribute((key, value.as_ref()));
        }
    }

    Some((rebuilt, true))
}

fn is_sensitive(name: &[u8], keywords: &[&str]) -> bool {
    let name = String::from_utf8_lossy(name).to_lowercase();
    keywords.iter().any(|keyword| name.ends_with(keyword))
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mask(message: &str) -> Option<String> {
        mask_xml(message, SENSITIVE_KEYWORDS).unwrap()
    }

    #[test]
    fn test_element_text_is_masked() {
        let masked = mask(r#"<?xml version="1.0"?><auth><user id="7">bob</user><Password>s3cret</Password></auth>"#);
        assert_eq!(
            masked.as_deref(),
            Some(r#"<?xml version="1.0"?><auth><user id="7">bob</user><Password>***</Password></auth>"#)
        );
    }

    #[test]
    fn test_name_suffix_matches() {
        let masked = mask("<card><newPin>1234</newPin><pinned>yes</pinned></card>");
        assert_eq!(masked.as_deref(), Some("<card><newPin>***</newPin><pinned>yes</pinned></card>"));
    }

    #[test]
    fn test_attributes_are_masked() {
        let masked = mask(r#"<login user="bob" password="s3cret"/>"#);
        assert_eq!(masked.as_deref(), Some(r#"<login user="bob" password="***"/>"#));
    }

    #[test]
    fn test_single_quoted_attributes_stay_well_formed() {
        let masked = mask(r#"<login note='say "hi"' tag='a&amp;b' password='s3cret'/>"#).unwrap();
        assert_eq!(
            masked,
            r#"<login note="say &quot;hi&quot;" tag="a&amp;b" password="***"/>"#
        );

        let mut reader = Reader::from_str(&masked);
        let XmlEvent::Empty(start) = reader.read_event().unwrap() else {
            panic!("expected an empty element: {masked}");
        };
        let note = start.try_get_attribute("note").unwrap().unwrap();
        assert_eq!(note.unescape_value().unwrap(), r#"say "hi""#);
        assert!(matches!(reader.read_event().unwrap(), XmlEvent::Eof));
    }

    #[test]
    fn test_cdata_and_split_text_become_one_mask() {
        let masked = mask("<r><secret>a<!-- note --><![CDATA[b]]></secret></r>");
        assert_eq!(masked.as_deref(), Some("<r><secret>***<!-- note --></secret></r>"));
    }

    #[test]
    fn test_children_of_sensitive_element_are_not_masked() {
        assert_eq!(mask("<password><hint>pet</hint></password>"), None);
    }

    #[test]
    fn test_no_match_keeps_original() {
        assert_eq!(mask("<a>\n  <b>1</b>\n</a>"), None);
    }

    #[test]
    fn test_not_xml() {
        assert_eq!(mask("plain text"), None);
        assert_eq!(mask("<open><password>x</password>"), None);
        assert_eq!(mask("<a></b>"), None);
        assert_eq!(mask("{\"password\":\"x\"}"), None);
    }

    #[test]
    fn test_event_fields_are_masked_in_place() {
        let mut event = json!({
            "body": "<req><cvv>123</cvv></req>",
            "msg": "sent",
            "status": 200
        });
        let Value::Object(map) = &mut event else { unreachable!() };

        XmlFieldMasker::new().mask_event(map).unwrap();

        assert_eq!(map["body"], json!("<req><cvv>***</cvv></req>"));
        assert_eq!(map["msg"], json!("sent"));
        assert_eq!(map["status"], json!(200));
    }
}
