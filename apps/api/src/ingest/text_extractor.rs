//! Text extraction from uploaded resumes (PDF, DOCX, TXT).
//!
//! Unsupported extensions and empty uploads yield an empty string; only a
//! document that claims a supported format but cannot be decoded is an error.

use std::io::{Cursor, Read};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Failed to extract text from PDF '{file}': {message}")]
    Pdf { file: String, message: String },

    #[error("Failed to read DOCX '{file}': {source}")]
    Docx {
        file: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Case-insensitive extension check.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.trim().to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".txt") {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }
}

/// Blocking: call from `spawn_blocking` for large documents.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, IngestionError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    match DocumentKind::from_filename(filename) {
        Some(DocumentKind::Pdf) => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestionError::Pdf {
                file: filename.to_string(),
                message: e.to_string(),
            })
        }
        Some(DocumentKind::Docx) => extract_docx(bytes, filename),
        Some(DocumentKind::PlainText) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        None => Ok(String::new()),
    }
}

fn extract_docx(bytes: &[u8], filename: &str) -> Result<String, IngestionError> {
    let docx_error = |source| IngestionError::Docx {
        file: filename.to_string(),
        source,
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let mut document = archive.by_name("word/document.xml").map_err(docx_error)?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|source| IngestionError::Io {
            file: filename.to_string(),
            source,
        })?;

    Ok(document_xml_to_text(&xml))
}

/// Collects `<w:t>` runs, one line per `<w:p>` paragraph. Tabs and breaks
/// inside a run become whitespace; tab-stop definitions are ignored.
fn document_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text_run = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text_run {
            text.push_str(&unescape_xml(&rest[..open]));
        }
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');

        match name {
            "w:r" => in_run = !closing && !self_closing,
            "w:t" => in_text_run = !closing && !self_closing,
            "w:tab" if in_run => text.push('\t'),
            "w:br" | "w:cr" if in_run => text.push('\n'),
            "w:p" if closing => text.push('\n'),
            _ => {}
        }

        rest = &rest[open + close + 1..];
    }

    text
}

/// Decodes the five named entities and numeric references (`&#8217;`, `&#x2019;`).
/// Unknown or malformed references are kept verbatim.
fn unescape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
