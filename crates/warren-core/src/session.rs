//! Session controller: the navigation state machine.
//!
//! Owns the cache, the history stack, and the fetcher, and turns
//! [`Command`]s from the input layer into state transitions. The
//! renderer drives the loop: [`Session::resolve`] brings the current
//! page in (cache or network, repairing history on failure), then
//! [`Session::snapshot`] exposes `(mode, content, cursor, status)`.

use std::path::PathBuf;

use warren_types::Result;

use crate::cache::PageCache;
use crate::nav::History;
use crate::net::Fetch;
use crate::page::{Menu, Page};
use crate::selector::{ItemType, Selector};

/// Cursor semantics of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Cursor highlights a menu entry.
    Menu,
    /// Cursor is the top-of-viewport line of a text document.
    Text,
}

/// Navigation commands issued by the input layer. Downloads and
/// external opens are transient: they execute and return to whichever
/// mode was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select,
    Back,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    NextSelectable,
    PrevSelectable,
    Top,
    Bottom,
    Reload,
    Download,
    OpenExternal,
    OpenAddress,
}

/// Pull-based collaborators the controller invokes when a command needs
/// user text input or OS integration. Returning `None` from a prompt
/// cancels the command.
pub trait SessionUi {
    fn prompt_query(&mut self) -> Option<String>;
    fn prompt_address(&mut self) -> Option<String>;
    fn prompt_save_path(&mut self, suggested: &str) -> Option<String>;
    fn open_external(&mut self, target: &str) -> Result<()>;

    /// Transient progress note shown while a blocking operation runs.
    fn busy(&mut self, _status: &str) {}
}

/// One redraw's worth of state for the renderer.
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    /// Missing only when the very first page has not loaded yet.
    pub page: Option<&'a Page>,
    pub cursor: usize,
    /// Title of the current page (the selector's display text).
    pub title: &'a str,
    pub status: String,
    pub is_error: bool,
}

/// The session: cache, history, fetcher, and transient status, owned by
/// one controller constructed at startup.
pub struct Session {
    cache: PageCache,
    history: History,
    fetcher: Box<dyn Fetch>,
    /// Destination for "open externally" downloads.
    download_dir: PathBuf,
    /// Lines moved by PageUp/PageDown; the renderer sets this to half
    /// its viewport height.
    page_step: usize,
    /// Error to surface on the next snapshot, then cleared.
    pending_error: Option<String>,
    status: String,
}

impl Session {
    pub fn new(fetcher: Box<dyn Fetch>, download_dir: PathBuf) -> Self {
        Self {
            cache: PageCache::new(),
            history: History::new(),
            fetcher,
            download_dir,
            page_step: 10,
            pending_error: None,
            status: String::new(),
        }
    }

    /// Push the initial selector. Must be called once before any
    /// resolve or dispatch.
    pub fn start(&mut self, selector: Selector) {
        self.history.push(selector);
    }

    pub fn set_page_step(&mut self, lines: usize) {
        self.page_step = lines.max(1);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Bring the current page in from cache or network.
    ///
    /// On a failed fetch the broken page is abandoned (popped, floor of
    /// 1) and the error recorded, so the stack only ever points at pages
    /// that loaded successfully at some point. The previously successful
    /// page is cached and the retry loop lands on it.
    pub fn resolve(&mut self) {
        loop {
            let Some(current) = self.history.current() else {
                return;
            };
            let selector = current.selector.clone();
            let fetched = self
                .cache
                .get(&selector, self.fetcher.as_ref())
                .map(Page::len);
            match fetched {
                Ok(len) => {
                    self.history.move_cursor(0, len);
                    self.update_status();
                    return;
                },
                Err(e) => {
                    log::warn!("failed to load {}: {e}", selector.to_uri());
                    self.pending_error = Some(e.to_string());
                    if self.history.len() <= 1 {
                        return;
                    }
                    self.history.pop();
                },
            }
        }
    }

    /// State for the next redraw. A pending error is surfaced exactly
    /// once, replacing the normal status text.
    pub fn snapshot(&mut self) -> Snapshot<'_> {
        let (status, is_error) = match self.pending_error.take() {
            Some(e) => (e, true),
            None => (self.status.clone(), false),
        };
        let (mode, page, cursor, title) = match self.history.current() {
            Some(entry) => (
                if entry.selector.item_type.is_menu() {
                    Mode::Menu
                } else {
                    Mode::Text
                },
                self.cache.peek(&entry.selector.to_uri()),
                entry.cursor,
                entry.selector.display.as_str(),
            ),
            None => (Mode::Menu, None, 0, ""),
        };
        Snapshot {
            mode,
            page,
            cursor,
            title,
            status,
            is_error,
        }
    }

    /// Apply one navigation command.
    pub fn dispatch(&mut self, command: Command, ui: &mut dyn SessionUi) {
        match command {
            Command::Select => self.select(ui),
            Command::Back => self.history.pop(),
            Command::CursorUp => self.move_cursor(-1),
            Command::CursorDown => self.move_cursor(1),
            Command::PageUp => self.move_cursor(-(self.page_step as isize)),
            Command::PageDown => self.move_cursor(self.page_step as isize),
            Command::NextSelectable => self.skip_to_selectable(1),
            Command::PrevSelectable => self.skip_to_selectable(-1),
            Command::Top => {
                let len = self.current_len();
                self.history.set_cursor(0, len);
            },
            Command::Bottom => {
                let len = self.current_len();
                self.history.set_cursor(len.saturating_sub(1), len);
            },
            Command::Reload => self.reload(),
            Command::Download => self.download_highlighted(ui),
            Command::OpenExternal => self.open_highlighted(ui),
            Command::OpenAddress => self.open_address(ui),
        }
    }

    // -------------------------------------------------------------------
    // Command implementations
    // -------------------------------------------------------------------

    fn select(&mut self, ui: &mut dyn SessionUi) {
        // Only menu entries can be selected.
        let Some(entry) = self.highlighted() else {
            return;
        };
        match entry.item_type {
            ItemType::Info => {},
            ItemType::Search => {
                if let Some(query) = ui.prompt_query() {
                    ui.busy("Loading...");
                    let mut target = entry;
                    target.path.push('\t');
                    target.path.push_str(&query);
                    self.history.push(target);
                }
            },
            ItemType::Menu | ItemType::Text => {
                ui.busy("Loading...");
                self.history.push(entry);
            },
            _ => {
                if let Some(url) = entry.web_url() {
                    if let Err(e) = ui.open_external(url) {
                        self.pending_error = Some(e.to_string());
                    }
                } else {
                    self.save_as(&entry, ui);
                }
            },
        }
    }

    fn save_as(&mut self, entry: &Selector, ui: &mut dyn SessionUi) {
        let Some(dest) = ui.prompt_save_path(&entry.suggested_filename()) else {
            return;
        };
        ui.busy(&format!("Downloading {dest}..."));
        if let Err(e) = self.fetcher.download(dest.as_ref(), entry) {
            self.pending_error = Some(e.to_string());
        }
    }

    fn download_highlighted(&mut self, ui: &mut dyn SessionUi) {
        let Some(entry) = self.highlighted() else {
            return;
        };
        // Web links and non-resources have nothing to download.
        if matches!(entry.item_type, ItemType::Info | ItemType::Search)
            || entry.web_url().is_some()
        {
            return;
        }
        self.save_as(&entry, ui);
    }

    fn open_highlighted(&mut self, ui: &mut dyn SessionUi) {
        let Some(entry) = self.highlighted() else {
            return;
        };
        if matches!(
            entry.item_type,
            ItemType::Info | ItemType::Menu | ItemType::Search
        ) {
            return;
        }
        if let Some(url) = entry.web_url() {
            if let Err(e) = ui.open_external(url) {
                self.pending_error = Some(e.to_string());
            }
            return;
        }
        ui.busy("Loading...");
        let dest = self.download_dir.join(entry.suggested_filename());
        let opened = self
            .fetcher
            .download(&dest, &entry)
            .and_then(|()| ui.open_external(&dest.to_string_lossy()));
        if let Err(e) = opened {
            self.pending_error = Some(e.to_string());
        }
    }

    fn open_address(&mut self, ui: &mut dyn SessionUi) {
        let Some(addr) = ui.prompt_address() else {
            return;
        };
        match Selector::parse_uri(&addr) {
            Ok(selector) => {
                ui.busy("Loading...");
                self.history.push(selector);
            },
            Err(e) => self.pending_error = Some(e.to_string()),
        }
    }

    fn reload(&mut self) {
        let Some(current) = self.history.current() else {
            return;
        };
        // Only pages live in the cache; downloads are never cached.
        if current.selector.item_type.is_menu() || current.selector.item_type == ItemType::Text {
            self.cache.invalidate(&current.selector.to_uri());
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.current_len();
        self.history.move_cursor(delta, len);
    }

    /// Move to the nearest selectable entry in `direction`, or leave the
    /// cursor untouched when none exists that way.
    fn skip_to_selectable(&mut self, direction: isize) {
        let Some(current) = self.history.current() else {
            return;
        };
        let cursor = current.cursor;
        let uri = current.selector.to_uri();
        if !current.selector.item_type.is_menu() {
            return;
        }
        let target = self
            .cache
            .peek(&uri)
            .and_then(Page::as_menu)
            .and_then(|menu| find_selectable(&menu.entries, cursor, direction));
        if let Some(index) = target {
            if let Some(entry) = self.history.current_mut() {
                entry.cursor = index;
            }
        }
    }

    // -------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------

    fn current_len(&self) -> usize {
        self.history
            .current()
            .and_then(|entry| self.cache.peek(&entry.selector.to_uri()))
            .map_or(0, Page::len)
    }

    fn current_menu(&self) -> Option<&Menu> {
        let entry = self.history.current()?;
        if !entry.selector.item_type.is_menu() {
            return None;
        }
        self.cache.peek(&entry.selector.to_uri())?.as_menu()
    }

    /// The menu entry under the cursor, if the current page is a menu.
    fn highlighted(&self) -> Option<Selector> {
        let cursor = self.history.current()?.cursor;
        self.current_menu()?.entries.get(cursor).cloned()
    }

    /// Status text: the highlighted entry's address when it is
    /// selectable, otherwise the current page's, with the scheme
    /// stripped. Web links show their target URL.
    fn update_status(&mut self) {
        let Some(current) = self.history.current() else {
            return;
        };
        let mut status = current.selector.to_uri();
        if let Some(menu) = self.current_menu() {
            if let Some(entry) = menu.entries.get(current.cursor) {
                if entry.item_type.is_selectable() {
                    status = match (entry.item_type, entry.web_url()) {
                        (ItemType::Html, Some(url)) => url.to_string(),
                        _ => entry.to_uri(),
                    };
                }
            }
        }
        self.status = status
            .strip_prefix("gopher://")
            .map_or(status.clone(), str::to_string);
    }
}

/// Find the nearest selectable entry from `from` in `direction`
/// (+1 forward, -1 backward). Pure: the caller applies the result
/// atomically, so a failed search leaves the cursor untouched.
pub fn find_selectable(entries: &[Selector], from: usize, direction: isize) -> Option<usize> {
    let mut index = from as isize;
    loop {
        index += direction;
        if index < 0 || index >= entries.len() as isize {
            return None;
        }
        if entries[index as usize].item_type.is_selectable() {
            return Some(index as usize);
        }
    }
}
