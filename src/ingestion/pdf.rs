//! Page-by-page PDF text extraction.
//!
//! The payload is staged in a scratch file that lives exactly as long as the parse; the
//! `NamedTempFile` guard removes it on every return path, including parse errors.

use crate::ingestion::types::ExtractionError;
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// `TJ` adjustment, in thousandths of a text-space unit, beyond which a gap reads as a space.
const WORD_GAP: f32 = 100.0;

/// Extract the text of every page, one line per page in ascending page order.
///
/// Parsing is CPU-bound, so it runs on the blocking pool and the caller awaits it.
pub(crate) async fn extract_pdf_text(
    bytes: Vec<u8>,
    scratch_dir: Option<PathBuf>,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_blocking(&bytes, scratch_dir.as_deref()))
        .await
        .map_err(|error| ExtractionError::ParseFailure(format!("PDF worker failed: {error}")))?
}

fn extract_blocking(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<String, ExtractionError> {
    let scratch = stage_payload(bytes, scratch_dir)?;
    tracing::debug!(path = %scratch.path().display(), bytes = bytes.len(), "Staged PDF upload");

    let document = Document::load(scratch.path())
        .map_err(|error| ExtractionError::ParseFailure(format!("failed to open PDF: {error}")))?;

    let pages = document.get_pages();
    let mut lines = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        let line = page_text(&document, page_id).map_err(|error| {
            ExtractionError::ParseFailure(format!("failed to read page {page_number}: {error}"))
        })?;
        lines.push(line);
    }

    tracing::debug!(pages = lines.len(), "Extracted PDF text");
    Ok(lines.join("\n"))
}

fn stage_payload(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<NamedTempFile, ExtractionError> {
    let builder = {
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(".pdf");
        builder
    };
    let mut file = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|error| ExtractionError::ParseFailure(format!("failed to stage upload: {error}")))?;

    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|error| ExtractionError::ParseFailure(format!("failed to stage upload: {error}")))?;
    Ok(file)
}

/// Decode every text-showing operation of a page and join the runs with single spaces.
fn page_text(document: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings = document
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(document).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = document.get_and_decode_page_content(page_id)?;

    let mut runs = Vec::new();
    let mut encoding = None;
    for operation in &content.operations {
        let operands = match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
                continue;
            }
            "Tj" | "TJ" | "'" => operation.operands.as_slice(),
            // `aw ac string "` sets spacing first; only the string is text.
            "\"" => operation.operands.last().map(std::slice::from_ref).unwrap_or_default(),
            _ => continue,
        };
        let Some(encoding) = encoding else {
            continue;
        };

        let mut run = String::new();
        decode_run(encoding, operands, &mut run)?;
        let run = run.trim();
        if !run.is_empty() {
            runs.push(run.to_string());
        }
    }

    Ok(runs.join(" "))
}

/// Append the text of one run. Inside a `TJ` array a large negative offset is a word gap.
fn decode_run(encoding: &Encoding, operands: &[Object], run: &mut String) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => run.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => decode_run(encoding, items, run)?,
            Object::Integer(offset) if *offset < -WORD_GAP as i64 => run.push(' '),
            Object::Real(offset) if *offset < -WORD_GAP => run.push(' '),
            _ => {}
        }
    }
    Ok(())
}

/// Build an in-memory PDF for tests. Each page lists its text runs, shown with one `Tj` each
/// inside a single text object, one line below the other.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::content::Operation;

    let pages = pages
        .iter()
        .map(|runs| {
            let mut operations = Vec::new();
            for (index, run) in runs.iter().enumerate() {
                if index > 0 {
                    operations.push(Operation::new("Td", vec![0.into(), (-30).into()]));
                }
                operations.push(Operation::new("Tj", vec![Object::string_literal(*run)]));
            }
            operations
        })
        .collect();
    sample_pdf_with(pages)
}

/// Build an in-memory PDF whose pages each wrap the given text operations in `BT /F1 24 Tf
/// 72 720 Td ... ET`, with `F1` a WinAnsi Courier font.
#[cfg(test)]
pub(crate) fn sample_pdf_with(pages: Vec<Vec<lopdf::content::Operation>>) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text_operations in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        operations.extend(text_operations);
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize pdf");
    buffer
}
