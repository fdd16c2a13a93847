//! Paragraph-level docx (WordprocessingML) reading and writing (cargo feature `docx`).
//!
//! A docx file is itself a zip package, so the compression layer is bypassed:
//! `word/document.xml` is read and written directly. Only paragraph text survives a
//! round trip; styling, tables and images are out of scope.

use crate::error::Result;
use std::path::Path;

#[cfg(feature = "docx")]
const DOCUMENT_PART: &str = "word/document.xml";

#[cfg(feature = "docx")]
const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#,
);

#[cfg(feature = "docx")]
const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

/// Read the document text as lines, in document order.
///
/// Every paragraph is one line, and a line break inside a paragraph starts a new
/// one. Tabs come back as `\t`. Empty paragraphs are kept as empty strings except
/// at the end of the document.
pub fn read_docx(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let paragraphs = imp::read_paragraphs(path.as_ref())?;
    Ok(split_lines(&paragraphs))
}

/// Read paragraph texts, dropping empty paragraphs
pub fn read_docx_nonempty(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut paragraphs = read_docx(path)?;
    paragraphs.retain(|p| !p.is_empty());
    Ok(paragraphs)
}

/// Create a new document holding one paragraph per line.
///
/// An element containing `\n` is split, so `["a\nb"]` and `["a", "b"]` produce the
/// same document.
pub fn write_docx<I>(path: impl AsRef<Path>, lines: I) -> Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let paragraphs: Vec<String> = lines
        .into_iter()
        .flat_map(|line| {
            line.as_ref()
                .split('\n')
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect();
    imp::write_paragraphs(path.as_ref(), &paragraphs)
}

/// Break paragraph texts on embedded line breaks and drop trailing empty lines
fn split_lines(paragraphs: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = paragraphs
        .iter()
        .flat_map(|paragraph| paragraph.split('\n'))
        .map(str::to_owned)
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(feature = "docx")]
mod imp {
    use super::{CONTENT_TYPES, DOCUMENT_PART, PACKAGE_RELS};
    use crate::compression::validation::{validate_readable, validate_writable};
    use crate::error::{Result, RwioError};
    use quick_xml::escape::escape;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::fs::File;
    use std::io::{self, Read, Write};
    use std::path::Path;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipArchive, ZipWriter};

    pub(super) fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
        validate_readable(path)?;
        let file = File::open(path).map_err(|e| RwioError::open_failed(path, e))?;

        let mut package = ZipArchive::new(file)
            .map_err(|e| RwioError::malformed(path, format!("not a docx package: {e}")))?;
        let mut part = package.by_name(DOCUMENT_PART).map_err(|e| {
            RwioError::malformed(path, format!("missing {DOCUMENT_PART}: {e}"))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| {
            RwioError::file_error(format!("Failed to read {DOCUMENT_PART} from {}", path.display()), e)
        })?;

        parse_paragraphs(&xml).map_err(|message| RwioError::malformed(path, message))
    }

    /// Collect the text of every `w:p`, concatenating its `w:t` runs.
    ///
    /// Paragraphs nested inside another one (text boxes) are skipped; only the
    /// outermost paragraph's own runs contribute text.
    pub(super) fn parse_paragraphs(xml: &str) -> std::result::Result<Vec<String>, String> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut current: Option<String> = None;
        let mut depth = 0usize;
        let mut in_text = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("invalid XML at byte {}: {e}", reader.buffer_position()))?;

            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:p" => {
                        if depth == 0 {
                            current = Some(String::new());
                        }
                        depth += 1;
                    }
                    b"w:t" => in_text = true,
                    _ => {}
                },
                Event::Empty(e) if depth <= 1 => match e.name().as_ref() {
                    b"w:p" if depth == 0 => paragraphs.push(String::new()),
                    b"w:tab" => push_char(&mut current, '\t'),
                    b"w:br" | b"w:cr" => push_char(&mut current, '\n'),
                    _ => {}
                },
                Event::Text(t) if in_text && depth == 1 => {
                    let text = t.unescape().map_err(|e| format!("invalid text: {e}"))?;
                    if let Some(paragraph) = current.as_mut() {
                        paragraph.push_str(&text);
                    }
                }
                Event::CData(t) if in_text && depth == 1 => {
                    if let Some(paragraph) = current.as_mut() {
                        paragraph.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            if let Some(paragraph) = current.take() {
                                paragraphs.push(paragraph);
                            }
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(paragraphs)
    }

    fn push_char(current: &mut Option<String>, c: char) {
        if let Some(paragraph) = current.as_mut() {
            paragraph.push(c);
        }
    }

    pub(super) fn write_paragraphs(path: &Path, paragraphs: &[String]) -> Result<()> {
        validate_writable(path)?;
        let file = File::create(path).map_err(|e| RwioError::open_failed(path, e))?;
        let wrap = |e: io::Error| {
            RwioError::file_error(format!("Failed to write docx {}", path.display()), e)
        };

        let mut package = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            (DOCUMENT_PART, document_xml(paragraphs)),
        ] {
            package.start_file(name, options).map_err(|e| wrap(zip_io(e)))?;
            package.write_all(body.as_bytes()).map_err(wrap)?;
        }
        package.finish().map_err(|e| wrap(zip_io(e)))?;

        log::debug!("wrote {} paragraphs to {}", paragraphs.len(), path.display());
        Ok(())
    }

    /// Render paragraphs as a WordprocessingML body; `\t` becomes a tab element so
    /// it survives a read.
    pub(super) fn document_xml(paragraphs: &[String]) -> String {
        let mut xml = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>",
        ));

        for paragraph in paragraphs {
            xml.push_str("<w:p><w:r>");
            for (i, segment) in paragraph.split('\t').enumerate() {
                if i > 0 {
                    xml.push_str("<w:tab/>");
                }
                if !segment.is_empty() {
                    xml.push_str(r#"<w:t xml:space="preserve">"#);
                    xml.push_str(&escape(segment));
                    xml.push_str("</w:t>");
                }
            }
            xml.push_str("</w:r></w:p>");
        }

        xml.push_str("<w:sectPr/></w:body></w:document>");
        xml
    }

    fn zip_io(err: zip::result::ZipError) -> io::Error {
        match err {
            zip::result::ZipError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

#[cfg(not(feature = "docx"))]
mod imp {
    use crate::error::{Result, RwioError};
    use std::path::Path;

    pub(super) fn read_paragraphs(_path: &Path) -> Result<Vec<String>> {
        Err(RwioError::MissingDependency { feature: "docx" })
    }

    pub(super) fn write_paragraphs(_path: &Path, _paragraphs: &[String]) -> Result<()> {
        Err(RwioError::MissingDependency { feature: "docx" })
    }
}
