//! Selector codec: the canonical identifier of a gopher resource.
//!
//! A selector is the tuple (item type, display text, server path, host,
//! port). It is constructed either from a tab-separated menu line or
//! from a user-entered address, and serializes to the canonical URI form
//! `gopher://host:port/<type-char><path>`.

use std::fmt;

use warren_types::{Result, WarrenError};

/// Synthetic URI of the locally defined start page. Never fetched from
/// the network and exempt from cache invalidation.
pub const START_URI: &str = "gopher://__start__:0/1";

/// Default gopher port.
pub const DEFAULT_PORT: u16 = 70;

/// Marker prefix for menu entries that point at web URLs rather than
/// gopher resources.
const URL_MARKER: &str = "URL:";

// -----------------------------------------------------------------------
// ItemType
// -----------------------------------------------------------------------

/// Single-character gopher item type code.
///
/// Unknown codes are legal on the wire and map to [`ItemType::Other`],
/// which is treated as a binary download for fetch purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// `0` -- plain text document.
    Text,
    /// `1` -- menu (directory).
    Menu,
    /// `7` -- search index; requires a query appended to the path.
    Search,
    /// `i` -- informational line, not selectable.
    Info,
    /// `s` -- sound file.
    Sound,
    /// `g` -- GIF image.
    Gif,
    /// `I` -- image file.
    Image,
    /// `9` -- binary file.
    Binary,
    /// `5` -- archive.
    Archive,
    /// `h` -- HTML document or web link.
    Html,
    /// Any unlisted code; handled like a binary file.
    Other(char),
}

/// How a selector's content is obtained and presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Parsed as tab-separated menu lines, cached.
    Menu,
    /// Kept as raw text lines, cached.
    Text,
    /// Raw byte stream saved to a file, never cached.
    Download,
}

impl ItemType {
    pub fn from_code(c: char) -> Self {
        match c {
            '0' => ItemType::Text,
            '1' => ItemType::Menu,
            '7' => ItemType::Search,
            'i' => ItemType::Info,
            's' => ItemType::Sound,
            'g' => ItemType::Gif,
            'I' => ItemType::Image,
            '9' => ItemType::Binary,
            '5' => ItemType::Archive,
            'h' => ItemType::Html,
            other => ItemType::Other(other),
        }
    }

    pub fn code(self) -> char {
        match self {
            ItemType::Text => '0',
            ItemType::Menu => '1',
            ItemType::Search => '7',
            ItemType::Info => 'i',
            ItemType::Sound => 's',
            ItemType::Gif => 'g',
            ItemType::Image => 'I',
            ItemType::Binary => '9',
            ItemType::Archive => '5',
            ItemType::Html => 'h',
            ItemType::Other(c) => c,
        }
    }

    /// Fixed-width display label. Unknown codes get the generic binary
    /// label; informational lines get blanks.
    pub fn label(self) -> &'static str {
        match self {
            ItemType::Text => "(TXT)",
            ItemType::Menu => "(DIR)",
            ItemType::Search => "(ISS)",
            ItemType::Sound => "(SND)",
            ItemType::Gif => "(GIF)",
            ItemType::Image => "(PIC)",
            ItemType::Archive => "(ARC)",
            ItemType::Html => "(HTM)",
            ItemType::Info => "     ",
            ItemType::Binary | ItemType::Other(_) => "(BIN)",
        }
    }

    /// Menu-like types (`1` and `7`) share cursor semantics and caching.
    pub fn is_menu(self) -> bool {
        matches!(self, ItemType::Menu | ItemType::Search)
    }

    /// Everything except informational lines can be selected.
    pub fn is_selectable(self) -> bool {
        !matches!(self, ItemType::Info)
    }

    pub fn kind(self) -> PageKind {
        match self {
            ItemType::Menu | ItemType::Search => PageKind::Menu,
            ItemType::Text => PageKind::Text,
            _ => PageKind::Download,
        }
    }
}

// -----------------------------------------------------------------------
// Selector
// -----------------------------------------------------------------------

/// A gopher selector: item type, display text, server-side path, host,
/// and port.
///
/// Immutable after construction, except that the session controller
/// appends a `\t<query>` suffix to the path of search-type selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub item_type: ItemType,
    pub display: String,
    pub path: String,
    pub host: String,
    pub port: u16,
}

impl Selector {
    pub fn new(
        item_type: ItemType,
        display: impl Into<String>,
        path: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            item_type,
            display: display.into(),
            path: path.into(),
            host: host.into(),
            port,
        }
    }

    /// An informational entry with the given display text. Used for the
    /// start page and for the synthetic placeholder in empty menus.
    pub fn info(display: impl Into<String>) -> Self {
        Self::new(ItemType::Info, display, "", "", 0)
    }

    /// Parse a user-entered address into a selector.
    ///
    /// The `gopher://` scheme is optional; any other explicit scheme is
    /// rejected. An omitted port defaults to 70. A path shorter than two
    /// characters after the host yields the root menu (type `1`, empty
    /// path).
    pub fn parse_uri(addr: &str) -> Result<Selector> {
        let addr = addr.trim();
        let rest = match addr.strip_prefix("gopher://") {
            Some(rest) => rest,
            None => {
                if let Some((scheme, _)) = addr.split_once("://") {
                    if !scheme.is_empty()
                        && scheme
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
                    {
                        return Err(WarrenError::Uri(format!("unsupported scheme '{scheme}'")));
                    }
                }
                addr
            },
        };

        let (authority, raw_path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(WarrenError::Uri(format!("missing host in '{addr}'")));
        }

        let mut parts = authority.split(':');
        let host = parts.next().unwrap_or_default().to_string();
        let port = match parts.next() {
            None => DEFAULT_PORT,
            Some(p) => {
                if parts.next().is_some() {
                    return Err(WarrenError::Uri(format!("bad host:port in '{addr}'")));
                }
                p.parse::<u16>()
                    .map_err(|_| WarrenError::Uri(format!("bad port '{p}'")))?
            },
        };

        let decoded = percent_decode(raw_path)
            .ok_or_else(|| WarrenError::Uri(format!("bad percent escape in '{addr}'")))?;

        // "/" alone (or nothing) is the conventional root menu.
        let mut chars = decoded.chars();
        let (item_type, path) = match (chars.next(), chars.next()) {
            (Some('/'), Some(type_char)) => {
                (ItemType::from_code(type_char), chars.as_str().to_string())
            },
            _ => (ItemType::Menu, String::new()),
        };

        Ok(Selector {
            item_type,
            display: String::new(),
            path,
            host,
            port,
        })
    }

    /// Canonical URI form. Display text is not part of the URI.
    pub fn to_uri(&self) -> String {
        format!(
            "gopher://{}:{}/{}{}",
            self.host,
            self.port,
            self.item_type.code(),
            percent_encode(&self.path),
        )
    }

    /// Parse one tab-separated menu line: display text prefixed with the
    /// type character, then path, host, port.
    pub fn parse_menu_line(line: &str) -> Result<Selector> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            return Err(WarrenError::MenuLine(format!(
                "expected 4 fields, got {}",
                fields.len(),
            )));
        }
        let mut chars = fields[0].chars();
        let type_char = chars
            .next()
            .ok_or_else(|| WarrenError::MenuLine("empty display field".into()))?;
        let port = fields[3]
            .parse::<u16>()
            .map_err(|_| WarrenError::MenuLine(format!("bad port '{}'", fields[3])))?;

        Ok(Selector {
            item_type: ItemType::from_code(type_char),
            display: chars.as_str().to_string(),
            path: fields[1].to_string(),
            host: fields[2].to_string(),
            port,
        })
    }

    /// The web URL of a literal-web-link entry (`URL:` path convention),
    /// if this is one.
    pub fn web_url(&self) -> Option<&str> {
        self.path.strip_prefix(URL_MARKER)
    }

    /// Display label, accounting for the web-link convention.
    pub fn display_label(&self) -> &'static str {
        if self.web_url().is_some() {
            "(WWW)"
        } else {
            self.item_type.label()
        }
    }

    /// Filename suggested for downloads: the basename of the path with
    /// backslashes normalized, or `unknown.bin`.
    pub fn suggested_filename(&self) -> String {
        let normalized = self.path.replace('\\', "/");
        let base = normalized.rsplit('/').next().unwrap_or("");
        if base.is_empty() {
            "unknown.bin".to_string()
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_label(), self.display)
    }
}

// -----------------------------------------------------------------------
// Percent encoding
// -----------------------------------------------------------------------

/// Bytes that may appear unescaped in the path portion of a URI.
fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-_.~/!$&'()*+,;=:@".contains(&b)
}

fn percent_encode(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        if is_path_byte(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{b:02X}"));
        }
    }
    out
}

/// Decode `%XX` escapes. Returns `None` on a malformed escape.
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(uri: &str) -> Selector {
        Selector::parse_uri(uri).unwrap()
    }

    #[test]
    fn parse_full_uri() {
        let s = sel("gopher://example.org:7070/0/docs/readme.txt");
        assert_eq!(s.item_type, ItemType::Text);
        assert_eq!(s.host, "example.org");
        assert_eq!(s.port, 7070);
        assert_eq!(s.path, "/docs/readme.txt");
        assert!(s.display.is_empty());
    }

    #[test]
    fn scheme_is_optional() {
        let with = sel("gopher://example.org/1/foo");
        let without = sel("example.org/1/foo");
        assert_eq!(with, without);
    }

    #[test]
    fn port_defaults_to_70() {
        assert_eq!(sel("example.org/1").port, 70);
    }

    #[test]
    fn short_path_is_root_menu() {
        for addr in ["example.org", "example.org/", "gopher://example.org"] {
            let s = sel(addr);
            assert_eq!(s.item_type, ItemType::Menu, "addr {addr}");
            assert_eq!(s.path, "", "addr {addr}");
        }
    }

    #[test]
    fn foreign_scheme_rejected() {
        assert!(Selector::parse_uri("http://example.org/").is_err());
        assert!(Selector::parse_uri("ftp://example.org/").is_err());
    }

    #[test]
    fn extra_colon_rejected() {
        assert!(Selector::parse_uri("gopher://a:b:c/1").is_err());
    }

    #[test]
    fn bad_port_rejected() {
        assert!(Selector::parse_uri("gopher://example.org:seventy/1").is_err());
        assert!(Selector::parse_uri("gopher://example.org:99999/1").is_err());
    }

    #[test]
    fn uri_round_trip() {
        let uris = [
            "gopher://example.org:70/1/sub/dir",
            "gopher://example.org:70/0/file.txt",
            "gopher://host:7070/9/bin%20file",
            "gopher://__start__:0/1",
        ];
        for uri in uris {
            assert_eq!(sel(uri).to_uri(), uri, "round trip of {uri}");
        }
    }

    #[test]
    fn search_query_tab_survives_round_trip() {
        let mut s = sel("gopher://example.org/7/search");
        s.path.push('\t');
        s.path.push_str("rust lang");
        let reparsed = sel(&s.to_uri());
        assert_eq!(reparsed.path, "/search\trust lang");
        assert_eq!(reparsed.item_type, ItemType::Search);
    }

    #[test]
    fn parse_menu_line_basic() {
        let s = Selector::parse_menu_line("1Some Dir\t/dir\texample.org\t70").unwrap();
        assert_eq!(s.item_type, ItemType::Menu);
        assert_eq!(s.display, "Some Dir");
        assert_eq!(s.path, "/dir");
        assert_eq!(s.host, "example.org");
        assert_eq!(s.port, 70);
    }

    #[test]
    fn parse_menu_line_extra_fields_ignored() {
        let s = Selector::parse_menu_line("0File\t/f\thost\t70\t+").unwrap();
        assert_eq!(s.item_type, ItemType::Text);
        assert_eq!(s.display, "File");
    }

    #[test]
    fn parse_menu_line_rejects_short_and_empty() {
        assert!(Selector::parse_menu_line("1only three\tfields\thost").is_err());
        assert!(Selector::parse_menu_line("\t/p\thost\t70").is_err());
        assert!(Selector::parse_menu_line("1Dir\t/p\thost\tnoport").is_err());
    }

    #[test]
    fn unknown_type_is_other_with_binary_label() {
        let s = Selector::parse_menu_line("zWeird\t/w\thost\t70").unwrap();
        assert_eq!(s.item_type, ItemType::Other('z'));
        assert_eq!(s.item_type.label(), "(BIN)");
        assert!(s.item_type.is_selectable());
        assert_eq!(s.item_type.kind(), PageKind::Download);
    }

    #[test]
    fn info_lines_not_selectable() {
        assert!(!ItemType::Info.is_selectable());
        assert_eq!(ItemType::Info.label(), "     ");
    }

    #[test]
    fn web_link_detection_and_label() {
        let s = Selector::new(ItemType::Html, "Example", "URL:http://example.com", "h", 70);
        assert_eq!(s.web_url(), Some("http://example.com"));
        assert_eq!(s.display_label(), "(WWW)");

        let plain = Selector::new(ItemType::Html, "Page", "/page.html", "h", 70);
        assert_eq!(plain.web_url(), None);
        assert_eq!(plain.display_label(), "(HTM)");
    }

    #[test]
    fn suggested_filename_from_path() {
        let s = Selector::new(ItemType::Binary, "", "/pub/files/tool.tar.gz", "h", 70);
        assert_eq!(s.suggested_filename(), "tool.tar.gz");

        let win = Selector::new(ItemType::Binary, "", "pub\\files\\a.zip", "h", 70);
        assert_eq!(win.suggested_filename(), "a.zip");

        let bare = Selector::new(ItemType::Binary, "", "/", "h", 70);
        assert_eq!(bare.suggested_filename(), "unknown.bin");
    }

    #[test]
    fn display_includes_label() {
        let s = Selector::new(ItemType::Text, "README", "/r", "h", 70);
        assert_eq!(s.to_string(), "(TXT) README");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_host() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9-]{0,10}(\\.[a-z]{2,4}){0,2}"
        }

        fn arb_type() -> impl Strategy<Value = ItemType> {
            prop_oneof![
                Just(ItemType::Text),
                Just(ItemType::Menu),
                Just(ItemType::Search),
                Just(ItemType::Binary),
                Just(ItemType::Html),
                Just(ItemType::Image),
                Just(ItemType::Other('z')),
                Just(ItemType::Other('+')),
            ]
        }

        fn arb_path() -> impl Strategy<Value = String> {
            // Printable ASCII plus tab; exercises the percent encoder.
            proptest::collection::vec(
                prop_oneof![proptest::char::range(' ', '~'), Just('\t')],
                0..24,
            )
            .prop_map(|cs| cs.into_iter().collect())
        }

        proptest! {
            #[test]
            fn round_trip_preserves_identity(
                host in arb_host(),
                port in 1u16..,
                item_type in arb_type(),
                path in arb_path(),
            ) {
                let original = Selector::new(item_type, "display", path, host, port);
                let reparsed = Selector::parse_uri(&original.to_uri()).unwrap();
                prop_assert_eq!(reparsed.host, original.host);
                prop_assert_eq!(reparsed.port, original.port);
                prop_assert_eq!(reparsed.item_type, original.item_type);
                prop_assert_eq!(reparsed.path, original.path);
                // Display text is not part of the URI.
                prop_assert_eq!(reparsed.display, "");
            }

            #[test]
            fn schemeless_parse_matches_prefixed(
                host in arb_host(),
                port in 1u16..,
            ) {
                let bare = format!("{host}:{port}/1/some/dir");
                let prefixed = format!("gopher://{bare}");
                prop_assert_eq!(
                    Selector::parse_uri(&bare).unwrap(),
                    Selector::parse_uri(&prefixed).unwrap(),
                );
            }
        }
    }
}
