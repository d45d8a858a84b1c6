use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader as XmlReader;

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escape text for use in SVG text content or attribute values, dropping
/// characters XML cannot carry.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Check that a markup fragment (zero or more sibling elements and text) is
/// well-formed once placed inside a `<g>` element.
pub fn check_fragment(markup: &str) -> Result<(), String> {
    if let Some(bad) = markup.chars().find(|&c| !is_valid_xml_char(c)) {
        return Err(format!("invalid XML character U+{:04X}", bad as u32));
    }

    let wrapped = format!("<g>{markup}</g>");
    let mut reader = XmlReader::from_str(&wrapped);
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(_)) => depth += 1,
            Ok(XmlEvent::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
            }
            Ok(XmlEvent::Decl(_)) | Ok(XmlEvent::DocType(_)) => {
                return Err("declarations are not allowed inside a glyph".to_string());
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    if depth != 0 {
        return Err("unclosed element".to_string());
    }
    Ok(())
}
