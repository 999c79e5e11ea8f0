// Document processor: loads the corpus directory into plain text documents

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path relative to the corpus directory, with `/` separators.
    pub source_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "txt" | "md" => Some(DocumentKind::Text),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

pub struct DocumentProcessor;

impl DocumentProcessor {
    /// Load every supported document under `dir`, in path order.
    ///
    /// Unsupported, unreadable and empty files are skipped; only a missing or
    /// unreadable directory is an error.
    pub async fn load_directory(dir: &Path) -> Result<Vec<Document>> {
        let paths = Self::collect_files(dir).await?;
        let mut documents = Vec::new();

        for path in paths {
            let Some(kind) = DocumentKind::from_path(&path) else {
                debug!(path = %path.display(), "Skipping unsupported file");
                continue;
            };

            let text = match Self::process_document(&path, kind).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to extract document text");
                    continue;
                }
            };

            if text.trim().is_empty() {
                warn!(path = %path.display(), "Document contains no text, skipping");
                continue;
            }

            documents.push(Document {
                source_id: source_id(dir, &path),
                text,
            });
        }

        info!(dir = %dir.display(), documents = documents.len(), "Loaded documents");
        Ok(documents)
    }

    async fn process_document(path: &Path, kind: DocumentKind) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;

        match kind {
            DocumentKind::Text => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            DocumentKind::Pdf => tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
                .await
                .context("PDF extraction task panicked")?,
        }
    }

    /// Recursive listing of regular files, sorted for a deterministic ingestion order.
    async fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current)
                .await
                .with_context(|| format!("failed to read directory {}", current.display()))?;

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes).context("invalid PDF")?;
    let mut pages = Vec::new();

    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => warn!(page = page_number, error = %e, "Failed to extract PDF page"),
        }
    }

    Ok(pages.join("\n\n"))
}

fn source_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages.len() as i64,
                "Kids" => kids,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_loads_text_documents_in_path_order() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "Madde 2: Depozito iade edilir.").unwrap();
        std::fs::write(temp_dir.path().join("a.md"), "# Madde 1\nKira süresi bir yıldır.").unwrap();
        std::fs::create_dir(temp_dir.path().join("alt")).unwrap();
        std::fs::write(temp_dir.path().join("alt").join("c.TXT"), "Madde 3").unwrap();

        let documents = DocumentProcessor::load_directory(temp_dir.path()).await.unwrap();
        let ids: Vec<&str> = documents.iter().map(|d| d.source_id.as_str()).collect();

        assert_eq!(ids, vec!["a.md", "alt/c.TXT", "b.txt"]);
        assert_eq!(documents[2].text, "Madde 2: Depozito iade edilir.");
    }

    #[tokio::test]
    async fn test_skips_unsupported_and_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.docx"), "binary").unwrap();
        std::fs::write(temp_dir.path().join("blank.txt"), "  \n\t ").unwrap();
        std::fs::write(temp_dir.path().join("kanun.txt"), "Madde 1").unwrap();

        let documents = DocumentProcessor::load_directory(temp_dir.path()).await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source_id, "kanun.txt");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bozuk.pdf"), b"not a pdf").unwrap();

        let documents = DocumentProcessor::load_directory(temp_dir.path()).await.unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_extracts_pdf_page_text() {
        let temp_dir = TempDir::new().unwrap();
        write_pdf(&temp_dir.path().join("kira.pdf"), &["Madde 1: Kira suresi bir yildir."]);

        let documents = DocumentProcessor::load_directory(temp_dir.path()).await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].source_id, "kira.pdf");
        assert_eq!(documents[0].text.trim(), "Madde 1: Kira suresi bir yildir.");
    }

    #[tokio::test]
    async fn test_pdf_pages_joined_by_blank_line() {
        let temp_dir = TempDir::new().unwrap();
        write_pdf(
            &temp_dir.path().join("kanun.pdf"),
            &["Madde 1: Kira suresi bir yildir.", "Madde 2: Depozito iade edilir."],
        );

        let documents = DocumentProcessor::load_directory(temp_dir.path()).await.unwrap();
        assert_eq!(documents.len(), 1);

        let text = &documents[0].text;
        assert!(text.contains("\n\n"));
        let pages: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|page| !page.is_empty())
            .collect();
        assert_eq!(
            pages,
            vec!["Madde 1: Kira suresi bir yildir.", "Madde 2: Depozito iade edilir."]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("yok");
        assert!(DocumentProcessor::load_directory(&missing).await.is_err());
    }
}
