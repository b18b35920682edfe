//! Text extraction from uploaded documents (PDF, DOCX, TXT)

use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

/// Text of every page, in document order
///
/// The PDF parser can panic on hostile input; that is contained here and
/// reported as an extraction failure.
pub fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Extraction("PDF file is empty".to_string()));
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match result {
        Ok(Ok(text)) => {
            debug!(chars = text.len(), "PDF extracted");
            Ok(text)
        }
        Ok(Err(e)) => Err(ExtractError::Extraction(format!("could not parse PDF: {}", e))),
        Err(_) => Err(ExtractError::Extraction(
            "PDF parser failed on malformed input".to_string(),
        )),
    }
}

/// Paragraph text from `word/document.xml`, one paragraph per line
pub fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Extraction("DOCX file is empty".to_string()));
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractError::Extraction(format!("not a valid DOCX container: {}", e))
    })?;

    let xml = {
        let mut document_xml = archive.by_name("word/document.xml").map_err(|e| {
            ExtractError::Extraction(format!("missing word/document.xml: {}", e))
        })?;
        let mut content = String::new();
        document_xml.read_to_string(&mut content).map_err(|e| {
            ExtractError::Extraction(format!("unreadable word/document.xml: {}", e))
        })?;
        content
    };

    let text = document_xml_text(&xml)?;
    debug!(chars = text.len(), "DOCX extracted");
    Ok(text)
}

/// Cell and row text of a table being read
#[derive(Default)]
struct TableState {
    row: Vec<String>,
    cell: String,
}

/// Walk WordprocessingML and collect visible text
///
/// Paragraphs become lines, table rows become `cell | cell` lines, and
/// `w:tab` / `w:br` inside runs are kept. Text outside `w:t` (field codes,
/// deleted text, drawings) is ignored.
fn document_xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    // Run boundaries carry significant spaces ("Hello " + "world")
    reader.trim_text(false);

    let mut lines: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut tables: Vec<TableState> = Vec::new();
    let mut in_run = false;
    let mut in_text = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                b"w:tbl" => tables.push(TableState::default()),
                b"w:tr" => {
                    if let Some(table) = tables.last_mut() {
                        table.row.clear();
                    }
                }
                b"w:tc" => {
                    if let Some(table) = tables.last_mut() {
                        table.cell.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" if in_run => target(&mut tables, &mut paragraph).push('\t'),
                b"w:br" | b"w:cr" if in_run => target(&mut tables, &mut paragraph).push('\n'),
                b"w:p" if tables.is_empty() => lines.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| {
                    ExtractError::Extraction(format!("malformed document.xml: {}", e))
                })?;
                target(&mut tables, &mut paragraph).push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => match tables.last_mut() {
                    Some(table) => table.cell.push(' '),
                    None => lines.push(std::mem::take(&mut paragraph)),
                },
                b"w:tc" => {
                    if let Some(table) = tables.last_mut() {
                        let cell = table.cell.split_whitespace().collect::<Vec<_>>().join(" ");
                        table.row.push(cell);
                        table.cell.clear();
                    }
                }
                b"w:tr" => {
                    if let Some(table) = tables.last_mut() {
                        let row = std::mem::take(&mut table.row);
                        if row.iter().any(|c| !c.is_empty()) {
                            let rendered = row.join(" | ");
                            // A nested table lands inside the enclosing cell
                            let depth = tables.len();
                            if depth > 1 {
                                let outer = &mut tables[depth - 2].cell;
                                outer.push_str(&rendered);
                                outer.push(' ');
                            } else {
                                lines.push(rendered);
                            }
                        }
                    }
                }
                b"w:tbl" => {
                    tables.pop();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Extraction(format!(
                    "malformed document.xml at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !paragraph.is_empty() {
        lines.push(paragraph);
    }
    Ok(lines.join("\n"))
}

fn target<'a>(tables: &'a mut [TableState], paragraph: &'a mut String) -> &'a mut String {
    match tables.last_mut() {
        Some(table) => &mut table.cell,
        None => paragraph,
    }
}

/// Decode a text file
///
/// A byte-order mark picks UTF-8 or UTF-16; otherwise BOM-less UTF-16LE is
/// recognised by its NUL pattern, valid UTF-8 is used as is, and anything
/// else is read as Windows-1252 (a superset of Latin-1 that never fails).
pub fn txt_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Extraction("text file is empty".to_string()));
    }

    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        debug!(encoding = encoding.name(), had_errors, "Decoded text with BOM");
        return Ok(text.into_owned());
    }

    // NUL-interleaved ASCII is valid UTF-8 too, so check this first
    if looks_like_utf16le(bytes) {
        let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
        debug!("Decoded BOM-less UTF-16LE text");
        return Ok(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    debug!("Decoded text as windows-1252");
    Ok(text.into_owned())
}

fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }
    let high_zeros = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    high_zeros * 10 >= (bytes.len() / 2) * 9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    #[test]
    fn test_paragraphs_one_per_line() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>
               <w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_xml_text(&xml).unwrap(), "Hello world\nSecond & last");
    }

    #[test]
    fn test_tabs_and_breaks_inside_runs() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
               <w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_xml_text(&xml).unwrap(), "A\tB\nC");
    }

    #[test]
    fn test_table_rows_render_with_pipes() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>Before</w:t></w:r></w:p>
               <w:tbl>
                 <w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Score</w:t></w:r></w:p></w:tc></w:tr>
                 <w:tr><w:tc><w:p><w:r><w:t>Clarity</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>80</w:t></w:r></w:p></w:tc></w:tr>
               </w:tbl>
               <w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            document_xml_text(&xml).unwrap(),
            "Before\nName | Score\nClarity | 80\nAfter"
        );
    }

    #[test]
    fn test_field_codes_and_deleted_text_ignored() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:instrText> PAGE </w:instrText></w:r><w:r><w:delText>gone</w:delText></w:r><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_xml_text(&xml).unwrap(), "kept");
    }

    #[test]
    fn test_malformed_xml_is_extraction_error() {
        let err = document_xml_text("<w:document><w:body><w:p></w:body>").unwrap_err();
        assert!(matches!(err, ExtractError::Extraction(_)));
    }

    #[test]
    fn test_not_a_zip_is_extraction_error() {
        let err = docx_text(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractError::Extraction(_)));
    }

    /// Single-page PDF showing `text` in Helvetica, with a correct xref table
    fn single_page_pdf(text: &str) -> Vec<u8> {
        let stream = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_pdf_page_text_extracted() {
        let text = pdf_text(&single_page_pdf("Hello RankRight")).unwrap();
        assert!(text.contains("Hello RankRight"), "got {:?}", text);
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let err = pdf_text(b"%PDF-1.4\n garbage that is not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Extraction(_)));
        assert!(matches!(pdf_text(b""), Err(ExtractError::Extraction(_))));
    }

    #[test]
    fn test_txt_utf8_with_and_without_bom() {
        assert_eq!(txt_text("café".as_bytes()).unwrap(), "café");
        assert_eq!(txt_text(b"\xEF\xBB\xBFhello").unwrap(), "hello");
    }

    #[test]
    fn test_txt_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Zoë".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(txt_text(&bytes).unwrap(), "Zoë");

        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Zoë".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(txt_text(&bytes).unwrap(), "Zoë");
    }

    #[test]
    fn test_txt_utf16le_without_bom() {
        let mut bytes = Vec::new();
        for unit in "plain report".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(txt_text(&bytes).unwrap(), "plain report");
    }

    #[test]
    fn test_txt_windows_1252_fallback() {
        // 0x93/0x94 are curly quotes in windows-1252, invalid as UTF-8
        assert_eq!(txt_text(b"\x93caf\xe9\x94").unwrap(), "\u{201C}café\u{201D}");
    }

    #[test]
    fn test_txt_empty_is_extraction_error() {
        assert!(matches!(txt_text(b""), Err(ExtractError::Extraction(_))));
    }
}
