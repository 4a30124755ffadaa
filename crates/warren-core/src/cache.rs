//! In-memory content cache keyed by canonical selector URI.
//!
//! Unbounded and session-local: entries live until explicitly
//! invalidated (reload) or the process exits. Menu/text exclusivity per
//! key follows from the item-type character being part of the URI.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use warren_types::{Result, WarrenError};

use crate::net::Fetch;
use crate::page::{Menu, Page};
use crate::selector::{ItemType, PageKind, Selector, START_URI};

/// Cache of previously fetched pages, served before any network call.
pub struct PageCache {
    pages: HashMap<String, Page>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    /// A new cache, pre-seeded with the local start page.
    pub fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(START_URI.to_string(), Page::Menu(start_menu()));
        Self { pages }
    }

    /// Look up the selector's page, fetching and storing it on a miss.
    ///
    /// Only menu (`1`/`7`) and text (`0`) types are cacheable; anything
    /// else has no page representation and fails with `Unsupported`
    /// (downloads are handled outside the cache).
    pub fn get(&mut self, selector: &Selector, fetcher: &dyn Fetch) -> Result<&Page> {
        let uri = selector.to_uri();
        match self.pages.entry(uri) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let page = match selector.item_type.kind() {
                    PageKind::Menu => Page::Menu(fetcher.fetch_menu(selector)?),
                    PageKind::Text => Page::Text(fetcher.fetch_text(selector)?),
                    PageKind::Download => {
                        return Err(WarrenError::Unsupported(selector.item_type.code()));
                    },
                };
                Ok(slot.insert(page))
            },
        }
    }

    /// Non-fetching lookup.
    pub fn peek(&self, uri: &str) -> Option<&Page> {
        self.pages.get(uri)
    }

    /// Drop a single key so the next `get` refetches it. A no-op when
    /// absent. The start page is static and never invalidated.
    pub fn invalidate(&mut self, uri: &str) {
        if uri == START_URI {
            return;
        }
        if self.pages.remove(uri).is_some() {
            log::debug!("invalidated {uri}");
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// The locally defined start page: key help plus a few well-known
/// gopher holes to get going.
fn start_menu() -> Menu {
    let mut entries = vec![
        Selector::info("warren -- a gopher client"),
        Selector::info(""),
        Selector::info("  j/k or arrows  move the cursor"),
        Selector::info("  l/enter        open the highlighted entry"),
        Selector::info("  h/backspace    go back"),
        Selector::info("  n/p            next/previous selectable entry"),
        Selector::info("  u/d, space     half a page up/down"),
        Selector::info("  g/G            top/bottom"),
        Selector::info("  o              open an address"),
        Selector::info("  r              reload"),
        Selector::info("  v              open with the default application"),
        Selector::info("  D              download the highlighted entry"),
        Selector::info("  q              quit"),
        Selector::info(""),
        Selector::info("Some places to start:"),
    ];
    entries.push(Selector::new(
        ItemType::Menu,
        "Floodgap",
        "",
        "gopher.floodgap.com",
        70,
    ));
    entries.push(Selector::new(
        ItemType::Search,
        "Veronica-2 search",
        "/v2/vs",
        "gopher.floodgap.com",
        70,
    ));
    entries.push(Selector::new(ItemType::Menu, "SDF", "", "sdf.org", 70));
    entries.push(Selector::new(
        ItemType::Menu,
        "Gopherpedia",
        "",
        "gopherpedia.com",
        70,
    ));
    Menu::from_entries(entries)
}
