use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use petname::petname;
use uuid::Uuid;

use super::{capture::CaptureRecord, error::DumpError};

const MAX_STEM_LEN: usize = 80;

/// Persists capture records and reports where they went.
pub trait RequestDumper: Send + Sync {
    fn dump(&self, record: &CaptureRecord) -> Result<String, DumpError>;
}

/// Persists downloaded files and reports where they went.
pub trait DownloadDumper: Send + Sync {
    fn dump(&self, bytes: &[u8], extension: &str) -> Result<String, DumpError>;
}

/// Writes each record as pretty JSON to `NNN-<method>-<resource>.json`.
///
/// Without a directory, records land in the system temp dir under a random
/// name.
#[derive(Debug, Clone, Default)]
pub struct FileRequestDumper {
    dir: Option<PathBuf>,
}

impl FileRequestDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn in_temp_dir() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl RequestDumper for FileRequestDumper {
    fn dump(&self, record: &CaptureRecord) -> Result<String, DumpError> {
        let json = record.to_json()?;
        let path = match &self.dir {
            Some(dir) => {
                let request = record.request();
                let stem =
                    sanitize_component(&format!("{}-{}", request.method, request.resource));
                write_indexed(dir, json.as_bytes(), |index| {
                    format!("{index:03}-{stem}.json")
                })?
            }
            None => {
                let file_name = format!("screenplay-rest-{}.json", Uuid::new_v4());
                let path = std::env::temp_dir().join(file_name);
                write_file(&path, json.as_bytes())?;
                path
            }
        };
        Ok(path.display().to_string())
    }
}

/// Writes each download to `NNN-<petname><extension>`.
#[derive(Debug, Clone)]
pub struct FileDownloadDumper {
    dir: PathBuf,
}

impl FileDownloadDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadDumper for FileDownloadDumper {
    fn dump(&self, bytes: &[u8], extension: &str) -> Result<String, DumpError> {
        let extension = normalize_extension(extension);
        let pet = petname(2, "-");
        let path = write_indexed(&self.dir, bytes, |index| {
            format!("{index:03}-{pet}{extension}")
        })?;
        Ok(path.display().to_string())
    }
}

/// `"pdf"`, `".PDF"` and `" .pdf "` all become `".pdf"`-style extensions made
/// of ASCII alphanumerics; anything left empty becomes `".bin"`.
pub fn normalize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .trim()
        .trim_start_matches('.')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if cleaned.is_empty() {
        ".bin".to_string()
    } else {
        format!(".{}", cleaned.to_ascii_lowercase())
    }
}

pub(crate) fn sanitize_component(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => ch,
            _ => '-',
        })
        .collect();

    let mut collapsed = String::with_capacity(sanitized.len());
    for ch in sanitized.chars() {
        if ch == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(ch);
    }

    let trimmed: String = collapsed
        .trim_matches('-')
        .chars()
        .take(MAX_STEM_LEN)
        .collect();
    if trimmed.is_empty() {
        "request".to_string()
    } else {
        trimmed
    }
}

/// Creates the next free `NNN-` prefixed file in `dir`. Indices continue
/// after the highest existing one; a name taken concurrently moves on to the
/// following index.
fn write_indexed(
    dir: &Path,
    bytes: &[u8],
    file_name: impl Fn(u32) -> String,
) -> Result<PathBuf, DumpError> {
    fs::create_dir_all(dir).map_err(|source| DumpError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut index = next_index(dir)?;
    loop {
        let path = dir.join(file_name(index));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(bytes).map_err(|source| DumpError::Write {
                    path: path.clone(),
                    source,
                })?;
                return Ok(path);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => index += 1,
            Err(source) => return Err(DumpError::Write { path, source }),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DumpError> {
    fs::write(path, bytes).map_err(|source| DumpError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn next_index(dir: &Path) -> Result<u32, DumpError> {
    let read_error = |source| DumpError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut max_index = 0;
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if let Some(value) = entry.file_name().to_str().and_then(leading_index) {
            max_index = max_index.max(value.saturating_add(1));
        }
    }
    Ok(max_index)
}

/// The number formed by the leading ASCII digits of `name`, which must be at
/// least three long and end at the `-` separator.
fn leading_index(name: &str) -> Option<u32> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits < 3 || name.as_bytes().get(digits) != Some(&b'-') {
        return None;
    }
    name[..digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::{
        capture::ExecutionWindow,
        client::{ClientOptions, RestClient},
        request::RestRequest,
    };
    use regex::Regex;
    use tempfile::tempdir;

    fn record(request: &RestRequest) -> CaptureRecord {
        let client = RestClient::new("http://localhost:3000", ClientOptions::default()).unwrap();
        CaptureRecord::new(&client, request, None, ExecutionWindow::started())
    }

    #[test]
    fn sanitize_component_replaces_invalid_characters() {
        assert_eq!(sanitize_component("GET-/users/{id}"), "GET-users-id");
        assert_eq!(sanitize_component("***"), "request");
        assert_eq!(sanitize_component("foo_bar"), "foo_bar");
        assert_eq!(sanitize_component(&"a".repeat(200)).len(), MAX_STEM_LEN);
    }

    #[test]
    fn normalize_extension_cleans_input() {
        assert_eq!(normalize_extension("pdf"), ".pdf");
        assert_eq!(normalize_extension(" .PNG "), ".png");
        assert_eq!(normalize_extension("../x"), ".x");
        assert_eq!(normalize_extension(""), ".bin");
    }

    #[test]
    fn next_index_detects_existing_files() -> anyhow::Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join("000-first.json"), b"one")?;
        fs::write(temp.path().join("010-second.json"), b"two")?;
        fs::write(temp.path().join("notes.txt"), b"skip")?;

        assert_eq!(next_index(temp.path())?, 11);
        Ok(())
    }

    #[test]
    fn next_index_reads_whole_digit_prefix() -> anyhow::Result<()> {
        let temp = tempdir()?;
        fs::write(temp.path().join("999-GET-a.json"), b"")?;
        fs::write(temp.path().join("1000-GET-b.json"), b"")?;
        fs::write(temp.path().join("+12-x.json"), b"")?;
        fs::write(temp.path().join("5000.json"), b"")?;

        assert_eq!(next_index(temp.path())?, 1001);
        Ok(())
    }

    #[test]
    fn leading_index_requires_digits_and_separator() {
        assert_eq!(leading_index("007-GET-x.json"), Some(7));
        assert_eq!(leading_index("1234-pet-name.pdf"), Some(1234));
        assert_eq!(leading_index("+12-x"), None);
        assert_eq!(leading_index("12-x"), None);
        assert_eq!(leading_index("123abc"), None);
    }

    #[test]
    fn request_dumper_numbers_files_by_request() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let dumps = temp.path().join("dumps");
        let dumper = FileRequestDumper::new(&dumps);
        let request = RestRequest::get("/users/{id}").url_segment("id", "3");

        let first = PathBuf::from(dumper.dump(&record(&request))?);
        let second = PathBuf::from(dumper.dump(&record(&request))?);

        assert_eq!(first, dumps.join("000-GET-users-id.json"));
        assert_eq!(second, dumps.join("001-GET-users-id.json"));

        let written: serde_json::Value = serde_json::from_slice(&fs::read(&first)?)?;
        assert_eq!(written["request"]["url"], "http://localhost:3000/users/3");
        Ok(())
    }

    #[test]
    fn request_dumper_defaults_to_temp_dir() -> anyhow::Result<()> {
        let dumper = FileRequestDumper::in_temp_dir();
        let location = PathBuf::from(dumper.dump(&record(&RestRequest::get("/ping")))?);

        assert!(location.starts_with(std::env::temp_dir()));
        assert!(location.exists());
        fs::remove_file(location)?;
        Ok(())
    }

    #[test]
    fn download_dumper_writes_bytes_with_extension() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let dumper = FileDownloadDumper::new(temp.path());

        let first = PathBuf::from(dumper.dump(b"%PDF-1.7", "PDF")?);
        let second = PathBuf::from(dumper.dump(b"%PDF-1.7", ".pdf")?);

        let pattern = Regex::new(r"^\d{3}-[a-z]+-[a-z]+\.pdf$").unwrap();
        assert!(pattern.is_match(first.file_name().unwrap().to_str().unwrap()));
        assert!(pattern.is_match(second.file_name().unwrap().to_str().unwrap()));
        assert_eq!(&second.file_name().unwrap().to_str().unwrap()[0..3], "001");
        assert_eq!(fs::read(first)?, b"%PDF-1.7");
        Ok(())
    }

    #[test]
    fn dump_reports_unwritable_directory() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let blocker = temp.path().join("file");
        fs::write(&blocker, b"")?;

        let err = FileRequestDumper::new(blocker.join("dumps"))
            .dump(&record(&RestRequest::get("/")))
            .unwrap_err();
        assert!(matches!(err, DumpError::CreateDir { .. }));
        Ok(())
    }
}
