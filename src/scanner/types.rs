use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// A matched sentence and the page it was found on
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Sentence {
    pub page: usize,
    pub text: String,
}

impl Sentence {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A fixed run of lines; the unit of parallel work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<String>,
}

impl Page {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub pages: Vec<Page>,
}

impl Book {
    /// Split `text` into pages of `page_lines` lines each (the last may be short).
    pub fn from_text(text: &str, page_lines: usize) -> Self {
        let page_lines = page_lines.max(1);
        let lines: Vec<&str> = text.lines().collect();
        let pages = lines
            .chunks(page_lines)
            .enumerate()
            .map(|(number, chunk)| Page {
                number,
                lines: chunk.iter().map(|line| line.to_string()).collect(),
            })
            .collect();
        Book { pages }
    }

    pub fn from_file(path: &Path, page_lines: usize) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::from_text(&text, page_lines))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
