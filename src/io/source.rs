use std::fmt;
use std::path::PathBuf;

const SHEETS_HOST: &str = "docs.google.com/spreadsheets/d/";
const CSV_EXPORT_MARKER: &str = "export?format=csv";

/// Where the ledger sheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A URL serving CSV directly
    Url(String),
    /// A CSV file on disk
    File(PathBuf),
}

impl Source {
    /// Interpret user input as a source.
    ///
    /// `http(s)://` input is a URL. Spreadsheet sharing links are rewritten to
    /// their CSV export link; a spreadsheet link that cannot be rewritten is
    /// rejected. Any other URL is fetched as-is. Everything else is a path.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SourceError::Empty);
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            if input.contains(SHEETS_HOST) {
                return to_csv_export_url(input)
                    .map(Source::Url)
                    .ok_or_else(|| SourceError::UnsupportedSheetUrl(input.to_string()));
            }
            return Ok(Source::Url(input.to_string()));
        }

        Ok(Source::File(PathBuf::from(input)))
    }

    /// Identifier used as the cache key.
    pub fn id(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::File(path) => format!("file:{}", path.display()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Rewrite a spreadsheet link into its CSV export link.
///
/// Export links are returned unchanged. Sharing/editing links
/// (`.../spreadsheets/d/<id>/edit...`) become
/// `https://docs.google.com/spreadsheets/d/<id>/export?format=csv`, keeping
/// the sheet tab (`gid`) when the link names one. Anything else is `None`.
pub fn to_csv_export_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.contains(CSV_EXPORT_MARKER) {
        return Some(url.to_string());
    }

    let (_, rest) = url.split_once("/d/")?;
    let (sheet_id, tail) = rest.split_once('/')?;
    if sheet_id.is_empty() || !tail.starts_with("edit") {
        return None;
    }

    let mut export = format!(
        "https://docs.google.com/spreadsheets/d/{}/{}",
        sheet_id, CSV_EXPORT_MARKER
    );
    if let Some(gid) = sheet_gid(tail) {
        export.push_str("&gid=");
        export.push_str(gid);
    }
    Some(export)
}

fn sheet_gid(tail: &str) -> Option<&str> {
    let (_, after) = tail.split_once("gid=")?;
    let end = after
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after.len());
    let gid = &after[..end];
    (!gid.is_empty()).then_some(gid)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Empty,
    UnsupportedSheetUrl(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Empty => write!(f, "no source given"),
            SourceError::UnsupportedSheetUrl(url) => write!(
                f,
                "cannot derive a CSV export link from '{}'; share the sheet and paste its edit link",
                url
            ),
        }
    }
}

impl std::error::Error for SourceError {}
