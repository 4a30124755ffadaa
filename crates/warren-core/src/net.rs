//! Gopher protocol client over TCP.
//!
//! A request is the selector path followed by CRLF; the response is
//! either a line-delimited stream (menus, text) or a raw byte stream
//! (downloads). Gopher has no length prefix, so connection close is the
//! authoritative end-of-response signal, and waiting is bounded by an
//! idle-read deadline that resets after every successful read rather
//! than a single fixed deadline.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use warren_types::{Result, WarrenError};

use crate::page::{Menu, TextDocument};
use crate::selector::Selector;

/// TCP connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle-read deadline, applied to every individual read.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Download copy chunk size in bytes.
const DOWNLOAD_CHUNK: usize = 1024;

// -----------------------------------------------------------------------
// Fetch trait
// -----------------------------------------------------------------------

/// Seam between the cache/session layer and the network. The production
/// implementation is [`NetFetcher`]; tests substitute mocks.
pub trait Fetch {
    fn fetch_menu(&self, selector: &Selector) -> Result<Menu>;
    fn fetch_text(&self, selector: &Selector) -> Result<TextDocument>;
    fn download(&self, dest: &Path, selector: &Selector) -> Result<()>;
}

// -----------------------------------------------------------------------
// NetFetcher
// -----------------------------------------------------------------------

/// The TCP gopher client.
#[derive(Debug, Clone)]
pub struct NetFetcher {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for NetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NetFetcher {
    pub fn new() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }

    pub fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    /// Dial the selector's host and send the request line.
    fn request(&self, selector: &Selector) -> Result<TcpStream> {
        let addr = format!("{}:{}", selector.host, selector.port);
        log::debug!("fetching {}", selector.to_uri());

        let resolved = addr
            .to_socket_addrs()
            .map_err(|e| WarrenError::Network(format!("resolve {addr}: {e}")))?
            .next()
            .ok_or_else(|| WarrenError::Network(format!("no addresses for {addr}")))?;

        let mut stream = TcpStream::connect_timeout(&resolved, self.connect_timeout)
            .map_err(|e| WarrenError::Network(format!("connect {addr}: {e}")))?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|e| WarrenError::Network(format!("set read timeout: {e}")))?;

        stream
            .write_all(format!("{}\r\n", selector.path).as_bytes())
            .map_err(|e| WarrenError::Network(format!("send request: {e}")))?;

        Ok(stream)
    }

    /// Fetch a line-delimited response.
    ///
    /// Lines are delimited by `\n` with trailing `\r\n`/`\n` stripped.
    /// On connection close, a non-empty partial final line is included.
    /// Any I/O error other than clean stream end aborts the fetch.
    pub fn fetch_lines(&self, selector: &Selector) -> Result<Vec<String>> {
        let stream = self.request(selector)?;
        let mut reader = BufReader::new(stream);
        let mut out = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    // Non-UTF-8 text is common on old servers; replace
                    // rather than fail.
                    let mut line = String::from_utf8_lossy(&buf).into_owned();
                    while line.ends_with('\n') || line.ends_with('\r') {
                        line.pop();
                    }
                    out.push(line);
                },
                Err(e) => return Err(read_error(e)),
            }
        }
        Ok(out)
    }
}

impl Fetch for NetFetcher {
    fn fetch_menu(&self, selector: &Selector) -> Result<Menu> {
        Ok(Menu::parse(&self.fetch_lines(selector)?))
    }

    fn fetch_text(&self, selector: &Selector) -> Result<TextDocument> {
        Ok(TextDocument::from_lines(self.fetch_lines(selector)?))
    }

    /// Copy the raw response stream to a newly created file.
    ///
    /// The idle deadline bounds each chunk read. On any failure the
    /// partially written file is removed before the error is surfaced,
    /// so no partial file is ever left behind.
    fn download(&self, dest: &Path, selector: &Selector) -> Result<()> {
        let mut stream = self.request(selector)?;
        let mut file = File::create(dest)?;
        let mut chunk = [0u8; DOWNLOAD_CHUNK];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    if let Err(e) = file.write_all(&chunk[..n]) {
                        remove_partial(file, dest);
                        return Err(e.into());
                    }
                },
                Err(e) => {
                    remove_partial(file, dest);
                    return Err(read_error(e));
                },
            }
        }
    }
}

fn read_error(e: io::Error) -> WarrenError {
    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) {
        WarrenError::Network("read timed out".to_string())
    } else {
        WarrenError::Network(format!("read: {e}"))
    }
}

fn remove_partial(file: File, dest: &Path) {
    drop(file);
    if let Err(e) = fs::remove_file(dest) {
        log::warn!("could not remove partial download {}: {e}", dest.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ItemType;
    use std::net::TcpListener;
    use std::thread;

    /// Spawn a one-shot server that reads the request line and writes
    /// `response` before closing the connection.
    fn one_shot_server(response: &'static [u8]) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            stream.write_all(response).unwrap();
            request
        });
        (port, handle)
    }

    fn local_selector(item_type: ItemType, path: &str, port: u16) -> Selector {
        Selector::new(item_type, "", path, "127.0.0.1", port)
    }

    #[test]
    fn fetch_lines_sends_path_and_strips_line_endings() {
        let (port, handle) = one_shot_server(b"first\r\nsecond\nthird");
        let fetcher = NetFetcher::new();
        let sel = local_selector(ItemType::Text, "/some/path", port);

        let lines = fetcher.fetch_lines(&sel).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);

        let request = handle.join().unwrap();
        assert_eq!(request, "/some/path\r\n");
    }

    #[test]
    fn fetch_lines_drops_empty_partial_final_line() {
        let (port, handle) = one_shot_server(b"a\r\nb\r\n");
        let fetcher = NetFetcher::new();
        let lines = fetcher
            .fetch_lines(&local_selector(ItemType::Text, "", port))
            .unwrap();
        assert_eq!(lines, vec!["a", "b"]);
        handle.join().unwrap();
    }

    #[test]
    fn fetch_text_drops_terminator() {
        let (port, handle) = one_shot_server(b"a\r\nb\r\n.\r\n");
        let fetcher = NetFetcher::new();
        let doc = fetcher
            .fetch_text(&local_selector(ItemType::Text, "/t", port))
            .unwrap();
        assert_eq!(doc.lines, vec!["a", "b"]);
        handle.join().unwrap();
    }

    #[test]
    fn fetch_menu_parses_entries() {
        let (port, handle) =
            one_shot_server(b"iWelcome\t\tnull\t0\r\n1Dir\tpath1\texample.org\t70\r\n.\r\n");
        let fetcher = NetFetcher::new();
        let menu = fetcher
            .fetch_menu(&local_selector(ItemType::Menu, "", port))
            .unwrap();
        assert_eq!(menu.len(), 2);
        assert_eq!(menu.entries[1].item_type, ItemType::Menu);
        assert_eq!(menu.entries[1].path, "path1");
        handle.join().unwrap();
    }

    #[test]
    fn fetch_menu_of_blank_lines_yields_synthetic_entry() {
        let (port, handle) = one_shot_server(b"\r\n\r\n.\r\n");
        let fetcher = NetFetcher::new();
        let menu = fetcher
            .fetch_menu(&local_selector(ItemType::Menu, "", port))
            .unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries[0].item_type, ItemType::Info);
        handle.join().unwrap();
    }

    #[test]
    fn connect_failure_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = NetFetcher::new();
        let err = fetcher
            .fetch_lines(&local_selector(ItemType::Text, "", port))
            .unwrap_err();
        assert!(matches!(err, WarrenError::Network(_)), "got {err}");
    }

    #[test]
    fn read_timeout_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // Hold the connection open without writing anything.
            thread::sleep(Duration::from_millis(500));
            drop(stream);
        });

        let fetcher =
            NetFetcher::with_timeouts(Duration::from_secs(5), Duration::from_millis(50));
        let err = fetcher
            .fetch_lines(&local_selector(ItemType::Text, "", port))
            .unwrap_err();
        assert!(matches!(err, WarrenError::Network(_)), "got {err}");
        handle.join().unwrap();
    }

    #[test]
    fn download_writes_file_in_chunks() {
        let body: &'static [u8] = &[0x42u8; 3000];
        let (port, handle) = one_shot_server(body);
        let fetcher = NetFetcher::new();
        let dest = std::env::temp_dir().join(format!("warren-dl-{}", std::process::id()));

        fetcher
            .download(&dest, &local_selector(ItemType::Binary, "/blob", port))
            .unwrap();
        let written = fs::read(&dest).unwrap();
        assert_eq!(written.len(), 3000);
        assert!(written.iter().all(|&b| b == 0x42));

        fs::remove_file(&dest).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn interrupted_download_leaves_no_file() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request = String::new();
            reader.read_line(&mut request).unwrap();
            // Send part of the body, then stall past the idle deadline.
            stream.write_all(&[0u8; 512]).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(stream);
        });

        let fetcher =
            NetFetcher::with_timeouts(Duration::from_secs(5), Duration::from_millis(50));
        let dest = std::env::temp_dir().join(format!("warren-partial-{}", std::process::id()));
        let err = fetcher
            .download(&dest, &local_selector(ItemType::Binary, "/blob", port))
            .unwrap_err();
        assert!(matches!(err, WarrenError::Network(_)), "got {err}");
        assert!(!dest.exists(), "partial file must be removed");
        handle.join().unwrap();
    }
}
