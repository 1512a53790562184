use super::text::{single_line, truncate};
use owo_colors::OwoColorize;
use std::fmt;
use tryll_types::ChunkDetail;

const PREVIEW_CHARS: usize = 400;

/// Chunk cards: id, type and page title, then the text
pub struct ChunkListView<'a> {
    chunks: &'a [ChunkDetail],
    full_text: bool,
}

impl<'a> ChunkListView<'a> {
    pub fn new(chunks: &'a [ChunkDetail]) -> Self {
        Self {
            chunks,
            full_text: false,
        }
    }

    pub fn with_full_text(mut self) -> Self {
        self.full_text = true;
        self
    }
}

impl fmt::Display for ChunkListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chunks.is_empty() {
            return writeln!(f, "No chunks found");
        }

        writeln!(f, "RAG chunks ({}):", self.chunks.len())?;
        for chunk in self.chunks {
            writeln!(f)?;
            writeln!(f, "  {}", chunk.id.bold())?;
            writeln!(
                f,
                "    {} {}",
                "type:".dimmed(),
                chunk.metadata.kind.as_deref().unwrap_or("unknown")
            )?;
            writeln!(
                f,
                "    {} {}",
                "page:".dimmed(),
                chunk.metadata.page_title.as_deref().unwrap_or("unknown")
            )?;

            let text = single_line(chunk.text_or_placeholder());
            let text = if self.full_text {
                text
            } else {
                truncate(&text, PREVIEW_CHARS)
            };
            writeln!(f, "    {}", text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryll_types::ChunkMetadata;

    fn chunk(id: &str, text: Option<&str>, page: Option<&str>) -> ChunkDetail {
        ChunkDetail {
            id: id.to_string(),
            text: text.map(str::to_string),
            metadata: ChunkMetadata {
                kind: Some("wiki".to_string()),
                page_title: page.map(str::to_string),
                extra: Default::default(),
            },
        }
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let chunks = vec![chunk("c1", None, None)];
        let out = ChunkListView::new(&chunks).to_string();

        assert!(out.contains("RAG chunks (1)"));
        assert!(out.contains("c1"));
        assert!(out.contains("No text available"));
        assert!(out.contains("unknown"));
    }

    #[test]
    fn test_long_text_is_previewed() {
        let long = "word ".repeat(200);
        let chunks = vec![chunk("c1", Some(&long), Some("Sword"))];

        let preview = ChunkListView::new(&chunks).to_string();
        let full = ChunkListView::new(&chunks).with_full_text().to_string();

        assert!(preview.contains("..."));
        assert!(full.len() > preview.len());
        assert!(preview.contains("Sword"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(ChunkListView::new(&[]).to_string(), "No chunks found\n");
    }
}
