//! DOCX text extraction via the zip container and the document XML stream.
//!
//! No positional reconstruction is needed: the paragraph stream in
//! `word/document.xml` is already in semantic order.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::result::ZipError;

use crate::error::DecodeError;
use crate::normalize::normalize;

/// Decode a DOCX document into whitespace-normalized text.
pub fn decode_docx(data: &[u8]) -> Result<String, DecodeError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| DecodeError::DocxContainer(e.to_string()))?;

    let mut body = match archive.by_name("word/document.xml") {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(DecodeError::MissingBody),
        Err(e) => return Err(DecodeError::DocxContainer(e.to_string())),
    };

    let mut xml = String::new();
    body.read_to_string(&mut xml)
        .map_err(|e| DecodeError::DocxContainer(e.to_string()))?;

    let text = extract_paragraph_text(&xml)?;
    Ok(normalize(&text))
}

/// Pull the text content out of the paragraph stream.
fn extract_paragraph_text(xml: &str) -> Result<String, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"br" | b"cr" => out.push('\n'),
                b"tab" => out.push(' '),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let value = t
                    .unescape()
                    .map_err(|e| DecodeError::Xml(e.to_string()))?;
                out.push_str(&value);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(DecodeError::Xml(e.to_string())),
        }
    }

    Ok(out)
}

/// Build an in-memory DOCX from paragraphs. Test helper shared with the
/// pipeline tests.
#[cfg(test)]
pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut body = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for p in paragraphs {
        body.push_str("<w:p><w:r><w:t>");
        body.push_str(&p.replace('&', "&amp;").replace('<', "&lt;"));
        body.push_str("</w:t></w:r></w:p>");
    }
    body.push_str("</w:body></w:document>");

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
