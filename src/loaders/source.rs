use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

const CHUNK_SIZE: usize = 64 * 1024;
/// Upper bound for the up-front allocation taken from an advertised length
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Receives `(bytes loaded so far, total bytes if known)`
pub type ProgressFn<'a> = dyn FnMut(u64, Option<u64>) + 'a;

/// Fetches the raw bytes of an asset addressed by a relative path
pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str, progress: &mut ProgressFn<'_>) -> Result<Vec<u8>>;

    /// Human-readable location of `path`, used in log lines and errors
    fn describe(&self, path: &str) -> String;
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, path: &str, progress: &mut ProgressFn<'_>) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        let mut file = File::open(&full_path)
            .with_context(|| format!("Failed to open {}", full_path.display()))?;
        let total = file.metadata().ok().map(|m| m.len());

        read_with_progress(&mut file, total, progress)
            .with_context(|| format!("Failed to read {}", full_path.display()))
    }

    fn describe(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }
}

/// Fetches assets with a plain HTTP GET relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl AssetSource for HttpSource {
    fn fetch(&self, path: &str, progress: &mut ProgressFn<'_>) -> Result<Vec<u8>> {
        let url = self.resolve(path);
        let response = ureq::get(&url)
            .call()
            .with_context(|| format!("GET {} failed", url))?;

        let total = response
            .header("Content-Length")
            .and_then(|len| len.parse::<u64>().ok());
        let mut reader = response.into_reader();

        read_with_progress(&mut reader, total, progress)
            .with_context(|| format!("Failed to read response body of {}", url))
    }

    fn describe(&self, path: &str) -> String {
        self.resolve(path)
    }
}

/// Picks an HTTP source for `http(s)://` locations and a file source otherwise
pub fn source_for_location(location: &str) -> Arc<dyn AssetSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpSource::new(location))
    } else {
        Arc::new(FileSource::new(location))
    }
}

/// Drains `reader` in fixed-size chunks, reporting progress after each one.
pub fn read_with_progress<R: Read + ?Sized>(
    reader: &mut R,
    total: Option<u64>,
    progress: &mut ProgressFn<'_>,
) -> std::io::Result<Vec<u8>> {
    let capacity = total.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
    let mut bytes = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..read]);
        progress(bytes.len() as u64, total);
    }

    Ok(bytes)
}
