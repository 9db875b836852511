use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FetchError;

/// Raw response from the retrieval endpoint.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-2xx responses become a `FetchError` carrying the status.
    pub fn into_body(self) -> Result<Vec<u8>, FetchError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                status: self.status,
                reason: self.reason,
            })
        }
    }
}

/// Where the export comes from. Implementations block until the payload
/// (or a failure) is available.
pub trait Source: Send + Sync {
    fn fetch(&self) -> Result<Fetched, FetchError>;

    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("comprador/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

impl Source for HttpSource {
    fn fetch(&self) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Fetched {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body: body.to_vec(),
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ---------------------------------------------------------------------------
// Local file
// ---------------------------------------------------------------------------

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for FileSource {
    fn fetch(&self) -> Result<Fetched, FetchError> {
        let body = std::fs::read(&self.path)
            .map_err(|e| FetchError::Transport(format!("{}: {e}", self.path.display())))?;
        Ok(Fetched::ok(body))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn source_from_location(location: &str, timeout: Duration) -> Result<Box<dyn Source>, FetchError> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/export.csv")
    }

    #[test]
    fn test_into_body_rejects_non_success() {
        let fetched = Fetched {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: b"oops".to_vec(),
        };
        let err = fetched.into_body().unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 500,
                reason: "Internal Server Error".to_string()
            }
        );
        assert_eq!(Fetched::ok("x").into_body().unwrap(), b"x".to_vec());
    }

    #[test]
    fn test_file_source_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "Nome Comprador\nAna\n").unwrap();
        let fetched = FileSource::new(&path).fetch().unwrap();
        assert!(fetched.is_success());
        assert_eq!(fetched.body, b"Nome Comprador\nAna\n".to_vec());
    }

    #[test]
    fn test_file_source_missing_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new(dir.path().join("nope.csv")).fetch().unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn test_source_from_location_picks_kind() {
        let http = source_from_location("https://example.com/x.csv", Duration::from_secs(5)).unwrap();
        assert_eq!(http.describe(), "https://example.com/x.csv");
        let file = source_from_location(" /tmp/x.csv ", Duration::from_secs(5)).unwrap();
        assert_eq!(file.describe(), "/tmp/x.csv");
    }

    #[test]
    fn test_http_source_returns_body_and_status() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 15\r\nConnection: close\r\n\r\nNome Comprador\n",
        );
        let fetched = HttpSource::new(&url, Duration::from_secs(5)).unwrap().fetch().unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body, b"Nome Comprador\n".to_vec());
    }

    #[test]
    fn test_http_source_reports_server_error_status() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let fetched = HttpSource::new(&url, Duration::from_secs(5)).unwrap().fetch().unwrap();
        assert_eq!(fetched.status, 500);
        assert!(matches!(fetched.into_body(), Err(FetchError::Status { status: 500, .. })));
    }
}
