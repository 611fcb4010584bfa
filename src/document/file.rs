use super::SourceKind;
use crate::core::error::LoadError;
use pdf_oxide::PdfDocument;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Parses uploaded bytes through a temp file named with the kind's extension.
///
/// The temp file is owned by this call and removed when it returns, whether
/// parsing succeeded, failed or timed out.
pub async fn load(kind: SourceKind, bytes: Vec<u8>) -> Result<String, LoadError> {
    load_in(&std::env::temp_dir(), kind, bytes).await
}

async fn load_in(dir: &Path, kind: SourceKind, bytes: Vec<u8>) -> Result<String, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty(kind.label()));
    }

    let temp_file = materialize(dir, kind, &bytes)?;
    let temp_path = temp_file.path().to_path_buf();
    tracing::debug!(path = %temp_path.display(), size = bytes.len(), "Wrote upload to temp file");

    let result = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || parse(kind, &temp_path)),
    )
    .await;

    drop(temp_file);

    result
        .map_err(|_| malformed(kind, "extraction timed out"))?
        .map_err(|e| malformed(kind, format!("extraction task failed: {}", e)))?
}

fn materialize(dir: &Path, kind: SourceKind, bytes: &[u8]) -> Result<NamedTempFile, LoadError> {
    let suffix = format!(".{}", kind.extension());
    let mut temp_file = tempfile::Builder::new()
        .prefix("gauss-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| LoadError::Unreachable(format!("failed to create temp file: {}", e)))?;
    temp_file
        .write_all(bytes)
        .and_then(|_| temp_file.flush())
        .map_err(|e| LoadError::Unreachable(format!("failed to write temp file: {}", e)))?;
    Ok(temp_file)
}

fn parse(kind: SourceKind, path: &Path) -> Result<String, LoadError> {
    match kind {
        SourceKind::Pdf => parse_pdf(path),
        SourceKind::Csv => parse_csv(path),
        SourceKind::Text => parse_text(path),
        SourceKind::Site | SourceKind::Video => {
            unreachable!("{} sources are fetched by URL, not parsed from a file", kind)
        }
    }
}

fn parse_pdf(path: &Path) -> Result<String, LoadError> {
    let mut doc = PdfDocument::open(path)
        .map_err(|e| malformed(SourceKind::Pdf, format!("failed to parse PDF: {}", e)))?;

    let page_count = doc
        .page_count()
        .map_err(|e| malformed(SourceKind::Pdf, format!("failed to read page count: {}", e)))?;

    let text = join_pages((0..page_count).map(|page_index| doc.extract_text(page_index)))?;
    tracing::debug!(page_count, chars = text.len(), "PDF text extraction complete");
    Ok(text)
}

/// Joins non-blank pages; any page that fails to extract fails the whole document.
fn join_pages<E: std::fmt::Display>(
    pages: impl IntoIterator<Item = Result<String, E>>,
) -> Result<String, LoadError> {
    let mut texts = Vec::new();
    for (page_index, page) in pages.into_iter().enumerate() {
        let text = page.map_err(|e| {
            malformed(SourceKind::Pdf, format!("page {}: {}", page_index + 1, e))
        })?;
        if !text.trim().is_empty() {
            texts.push(text.trim().to_string());
        }
    }
    Ok(texts.join("\n\n"))
}

/// Renders each row as `header: value` lines, rows separated by a blank line.
fn parse_csv(path: &Path) -> Result<String, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| malformed(SourceKind::Csv, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| malformed(SourceKind::Csv, e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(SourceKind::Csv, e.to_string()))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let header = headers.get(i).unwrap_or_default();
                format!("{}: {}", header, value.trim())
            })
            .collect::<Vec<_>>()
            .join("\n");
        rows.push(row);
    }

    Ok(rows.join("\n\n"))
}

fn parse_text(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::Unreachable(format!("failed to read temp file: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| malformed(SourceKind::Text, e.to_string()))
}

fn malformed(kind: SourceKind, reason: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        kind: kind.label(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_carries_kind_extension() {
        let dir = tempfile::tempdir().unwrap();
        let temp = materialize(dir.path(), SourceKind::Csv, b"a,b\n1,2\n").unwrap();
        assert_eq!(
            temp.path().extension().and_then(|e| e.to_str()),
            Some("csv")
        );
    }

    #[test]
    fn csv_rows_render_as_header_value_lines() {
        let dir = tempfile::tempdir().unwrap();
        let temp =
            materialize(dir.path(), SourceKind::Csv, b"name,price\nwidget, 3\ngadget,5\n").unwrap();
        let text = parse_csv(temp.path()).unwrap();
        assert_eq!(text, "name: widget\nprice: 3\n\nname: gadget\nprice: 5");
    }

    #[test]
    fn failing_page_fails_the_document() {
        let pages = vec![
            Ok("Page one".to_string()),
            Err("bad content stream"),
            Ok("Page three".to_string()),
        ];

        let result = join_pages(pages);

        assert!(matches!(
            result,
            Err(LoadError::Malformed { kind: "PDF", reason }) if reason == "page 2: bad content stream"
        ));
    }

    #[test]
    fn blank_pages_are_skipped() {
        let pages: Vec<Result<String, String>> =
            vec![Ok(" first ".to_string()), Ok("  ".to_string()), Ok("last".to_string())];
        assert_eq!(join_pages(pages).unwrap(), "first\n\nlast");
    }

    fn leftover_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn temp_file_is_removed_after_successful_parse() {
        let dir = tempfile::tempdir().unwrap();

        let text = load_in(dir.path(), SourceKind::Text, b"hello".to_vec())
            .await
            .unwrap();

        assert_eq!(text, "hello");
        assert_eq!(leftover_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn temp_file_is_removed_after_failed_parse() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_in(dir.path(), SourceKind::Pdf, b"not a pdf".to_vec()).await;

        assert!(result.is_err());
        assert_eq!(leftover_files(dir.path()), 0);
    }
}
