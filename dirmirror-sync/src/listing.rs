//! Directory-listing scraper.
//!
//! Turns an autoindex-style HTML page into the set of file names it links to.
//! Sub-directories (text ending in `/`), the parent-directory link and
//! anchors without visible text are skipped.

use crate::error::{SyncError, SyncResult};
use crate::fetcher::HttpDirectory;
use crate::types::NameSet;
use scraper::{Html, Selector};
use tracing::debug;

/// Label IIS-style listings use for the link back to the parent directory.
pub const PARENT_DIRECTORY_LABEL: &str = "[To Parent Directory]";

/// Extracts file names from a listing page.
///
/// Malformed anchors are skipped rather than reported.
pub fn parse_listing(html: &str) -> SyncResult<NameSet> {
    let anchors =
        Selector::parse("a").map_err(|e| SyncError::Parse(format!("anchor selector: {e}")))?;
    let document = Html::parse_document(html);

    let names = document
        .select(&anchors)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|text| is_file_entry(text))
        .collect();

    Ok(names)
}

fn is_file_entry(text: &str) -> bool {
    !text.is_empty() && !text.ends_with('/') && text != PARENT_DIRECTORY_LABEL
}

impl HttpDirectory {
    /// Fetches the listing page at the base URL and returns the file names on it.
    ///
    /// The body is decoded with the charset the server declares (UTF-8 when
    /// none is given); undecodable bytes become U+FFFD instead of failing.
    pub async fn list_names(&self) -> SyncResult<NameSet> {
        let url = self.base_url().to_string();
        let html = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| SyncError::Fetch(format!("failed to read listing {url}: {e}")))?;

        let names = parse_listing(&html)?;
        debug!("listing {url} names {} files", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_markup_text_is_joined() {
        let names = parse_listing(r#"<a href="x.txt"><b>x</b>.txt</a>"#).unwrap();
        assert!(names.contains("x.txt"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let names = parse_listing("<a href=\"y\">\n  y.csv  \n</a>").unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["y.csv".to_string()]);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(parse_listing(r#"<a href="z">   </a>"#).unwrap().is_empty());
    }
}
