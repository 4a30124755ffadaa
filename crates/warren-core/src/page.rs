//! Parsed page content: menus and plain text documents.

use crate::selector::Selector;

/// End-of-menu sentinel line.
const MENU_TERMINATOR: &str = ".";

// -----------------------------------------------------------------------
// Menu
// -----------------------------------------------------------------------

/// An ordered list of selectors returned by a directory or search
/// resource. Never empty: a menu that would parse to nothing holds one
/// synthetic informational entry instead, so the cursor always has a
/// valid range.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub entries: Vec<Selector>,
}

impl Menu {
    /// Parse response lines into a menu.
    ///
    /// A lone `.` terminates parsing and is not itself an entry. Blank
    /// lines are skipped. Lines that fail to parse are skipped leniently
    /// rather than failing the whole menu.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Menu {
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            let line = line.as_ref();
            if line == MENU_TERMINATOR {
                break;
            }
            if line.is_empty() {
                continue;
            }
            match Selector::parse_menu_line(line) {
                Ok(sel) => entries.push(sel),
                Err(e) => log::debug!("skipping menu line: {e}"),
            }
        }
        if entries.is_empty() {
            entries.push(Selector::info(""));
        }
        Menu { entries }
    }

    pub fn from_entries(entries: Vec<Selector>) -> Menu {
        debug_assert!(!entries.is_empty());
        Menu { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------
// TextDocument
// -----------------------------------------------------------------------

/// A plain text document as an ordered sequence of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDocument {
    pub lines: Vec<String>,
}

impl TextDocument {
    /// Build a document from response lines, dropping the trailing
    /// protocol terminator (a lone `.`) if present.
    pub fn from_lines(mut lines: Vec<String>) -> TextDocument {
        if lines.last().is_some_and(|l| l == MENU_TERMINATOR) {
            lines.pop();
        }
        TextDocument { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// -----------------------------------------------------------------------
// Page
// -----------------------------------------------------------------------

/// Cached content for one selector: either a menu or a text document,
/// determined by the selector's item type at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Menu(Menu),
    Text(TextDocument),
}

impl Page {
    /// Number of cursor-addressable lines.
    pub fn len(&self) -> usize {
        match self {
            Page::Menu(menu) => menu.len(),
            Page::Text(doc) => doc.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_menu(&self) -> Option<&Menu> {
        match self {
            Page::Menu(menu) => Some(menu),
            Page::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextDocument> {
        match self {
            Page::Text(doc) => Some(doc),
            Page::Menu(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ItemType;

    #[test]
    fn parse_stops_at_terminator() {
        let lines = [
            "1First\t/a\thost\t70",
            ".",
            "1After\t/b\thost\t70",
        ];
        let menu = Menu::parse(&lines);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries[0].display, "First");
    }

    #[test]
    fn parse_skips_blank_and_malformed_lines() {
        let lines = [
            "",
            "garbage without tabs",
            "1Good\t/g\thost\t70",
            "0Bad port\t/p\thost\tXX",
            "",
        ];
        let menu = Menu::parse(&lines);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries[0].display, "Good");
    }

    #[test]
    fn empty_menu_gets_synthetic_info_entry() {
        let lines = ["", "", "."];
        let menu = Menu::parse(&lines);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries[0].item_type, ItemType::Info);
    }

    #[test]
    fn wholly_malformed_menu_gets_synthetic_entry() {
        let lines = ["not a menu line", "nor this"];
        let menu = Menu::parse(&lines);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries[0].item_type, ItemType::Info);
    }

    #[test]
    fn text_drops_trailing_terminator() {
        let doc = TextDocument::from_lines(vec!["a".into(), "b".into(), ".".into()]);
        assert_eq!(doc.lines, vec!["a", "b"]);
    }

    #[test]
    fn text_without_terminator_kept_as_is() {
        let doc = TextDocument::from_lines(vec!["a".into(), "b".into()]);
        assert_eq!(doc.lines, vec!["a", "b"]);
    }

    #[test]
    fn text_interior_dot_preserved() {
        let doc = TextDocument::from_lines(vec!["a".into(), ".".into(), "b".into()]);
        assert_eq!(doc.lines, vec!["a", ".", "b"]);
    }

    #[test]
    fn empty_text_document() {
        let doc = TextDocument::from_lines(Vec::new());
        assert!(doc.is_empty());
        assert_eq!(Page::Text(doc).len(), 0);
    }

    #[test]
    fn page_len_delegates() {
        let menu = Menu::parse(&["1A\t/a\th\t70", "1B\t/b\th\t70"]);
        assert_eq!(Page::Menu(menu).len(), 2);
    }
}
