//! Package identifier extraction

use quick_xml::events::Event;
use quick_xml::Reader;

use super::XmlError;

/// Return the root element's `id` attribute
///
/// The whole document is read so that malformed input is rejected even
/// when the root start tag itself is fine. Returns an empty string when the
/// root carries no `id`.
pub fn extract_id(manifest_xml: &str) -> Result<String, XmlError> {
    let mut reader = Reader::from_str(manifest_xml);
    reader.trim_text(true);

    let mut root_id: Option<String> = None;
    let mut seen_root = false;
    let mut depth: usize = 0;

    loop {
        let event = reader.read_event().map_err(|e| {
            XmlError::Parse(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(XmlError::Parse(
                            "more than one root element".to_string(),
                        ));
                    }
                    seen_root = true;
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
                        if attr.key.as_ref() == b"id" {
                            let value = attr
                                .unescape_value()
                                .map_err(|e| XmlError::Parse(e.to_string()))?;
                            root_id = Some(value.into_owned());
                        }
                    }
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    XmlError::Parse("closing tag without matching start".to_string())
                })?;
            }
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(XmlError::Parse("text outside the root element".to_string()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(XmlError::Parse("no root element".to_string()));
    }
    if depth != 0 {
        return Err(XmlError::Parse(format!("{} unclosed element(s)", depth)));
    }

    Ok(root_id.unwrap_or_default())
}
