use anyhow::Result;

use super::patterns::SentenceMatcher;
use super::types::{Book, Page, Sentence};
use crate::parallel::{GroupConfig, TransformGroup, TransformSummary, Transformer};

/// One transform task per page, each yielding that page's matches
pub struct PageScan<'a> {
    pages: &'a [Page],
    matcher: &'a SentenceMatcher,
}

impl<'a> PageScan<'a> {
    pub fn new(pages: &'a [Page], matcher: &'a SentenceMatcher) -> Self {
        Self { pages, matcher }
    }
}

impl Transformer for PageScan<'_> {
    type Output = Vec<Sentence>;

    fn len(&self) -> usize {
        self.pages.len()
    }

    fn transform(&self, index: usize) -> Result<Vec<Sentence>> {
        Ok(self.matcher.find_sentences(&self.pages[index]))
    }
}

/// Matched sentences plus the engine's run summary
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub sentences: Vec<Sentence>,
    pub summary: TransformSummary,
}

/// Finds matching sentences across a book's pages in parallel
pub struct BookParser {
    group: TransformGroup,
    matcher: SentenceMatcher,
}

impl BookParser {
    pub fn new(config: GroupConfig, matcher: SentenceMatcher) -> Self {
        Self {
            group: TransformGroup::new(config),
            matcher,
        }
    }

    /// Every match on every page. How many there are is unknown up front, so
    /// this goes through the appending path and the order is arbitrary.
    pub fn parse_book(&self, book: &Book) -> Result<ParseResult> {
        let scan = PageScan::new(&book.pages, &self.matcher);
        let mut notepad: Vec<Sentence> = Vec::new();
        let summary = self.group.run_unordered_batches(&scan, &mut notepad)?;
        tracing::debug!("parsed {} pages, {} sentences", book.len(), notepad.len());
        Ok(ParseResult {
            sentences: notepad,
            summary,
        })
    }

    /// At most one sentence per page, written into a page-sized notepad in
    /// delivery order. Slot `i` is not necessarily page `i`; pages without a
    /// match leave their slot empty and are dropped from the result.
    pub fn parse_first_sentences(&self, book: &Book) -> Result<ParseResult> {
        let scan = PageScan::new(&book.pages, &self.matcher);
        let mut notepad = vec![Sentence::default(); book.len()];
        let summary = self.group.run_ordered_batches(&scan, &mut notepad)?;
        Ok(ParseResult {
            sentences: notepad.into_iter().filter(|s| !s.is_empty()).collect(),
            summary,
        })
    }

    /// First sentence of each page, in page order.
    pub fn parse_first_sentences_by_page(&self, book: &Book) -> Result<ParseResult> {
        let scan = PageScan::new(&book.pages, &self.matcher);
        let mut notepad: Vec<Vec<Sentence>> = vec![Vec::new(); book.len()];
        let summary = self.group.run_indexed(&scan, &mut notepad)?;
        Ok(ParseResult {
            sentences: notepad
                .into_iter()
                .filter_map(|page| page.into_iter().next())
                .collect(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Hello from page zero. Also the world.\n\
                        Nothing on this page.\n\
                        A brave new world!\n\
                        hello again?";

    fn parser() -> BookParser {
        BookParser::new(GroupConfig::with_max_in_flight(2), SentenceMatcher::default())
    }

    #[test]
    fn test_parse_book_finds_all_sentences() {
        let book = Book::from_text(TEXT, 1);
        let mut result = parser().parse_book(&book).unwrap();
        result.sentences.sort();

        let texts: Vec<&str> = result.sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Also the world.", "Hello from page zero.", "A brave new world!", "hello again?"]
        );
        assert_eq!(result.summary.tasks, 4);
    }

    #[test]
    fn test_parse_first_sentences_one_per_matching_page() {
        let book = Book::from_text(TEXT, 1);
        let mut result = parser().parse_first_sentences(&book).unwrap();
        result.sentences.sort();

        let pages: Vec<usize> = result.sentences.iter().map(|s| s.page).collect();
        assert_eq!(pages, vec![0, 2, 3]);
        assert_eq!(result.sentences[0].text, "Hello from page zero.");
        assert_eq!(result.summary.delivered, 4);
    }

    #[test]
    fn test_parse_first_sentences_by_page_is_page_ordered() {
        let book = Book::from_text(TEXT, 1);
        let result = parser().parse_first_sentences_by_page(&book).unwrap();

        let texts: Vec<&str> = result.sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello from page zero.", "A brave new world!", "hello again?"]);
    }

    #[test]
    fn test_empty_book() {
        let book = Book::default();
        assert!(parser().parse_book(&book).unwrap().sentences.is_empty());
        assert!(parser().parse_first_sentences(&book).unwrap().sentences.is_empty());
    }
}
