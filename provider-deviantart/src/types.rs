//! DeviantArt API response types
//!
//! Data structures for deserializing DeviantArt API v1 responses. Only the
//! fields the mirror relies on are modelled; everything else is ignored.

use bridge_traits::source::{Folder, Item, PageResult, SourceKind};
use serde::Deserialize;

/// Paged envelope shared by every listing endpoint
///
/// See: https://www.deviantart.com/developers/http/v1/20210526
#[derive(Debug, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default)]
    pub has_more: bool,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    /// Convert each result, dropping those `convert` rejects
    ///
    /// A page whose every entry was dropped is classified as if the remote
    /// had returned it empty.
    pub fn into_page<U>(self, convert: impl FnMut(T) -> Option<U>) -> PageResult<U> {
        let items: Vec<U> = self.results.into_iter().filter_map(convert).collect();
        PageResult::from_envelope(items, self.has_more)
    }
}

/// Gallery or collection folder resource
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFolder {
    pub folderid: String,
    pub name: String,
}

impl ApiFolder {
    pub fn into_folder(self, kind: SourceKind) -> Folder {
        Folder::new(self.folderid, self.name, kind)
    }
}

/// Deviation resource
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDeviation {
    /// Missing on deleted or placeholder entries
    #[serde(default)]
    pub deviationid: Option<String>,

    #[serde(default)]
    pub is_downloadable: bool,

    /// Largest preview rendition
    #[serde(default)]
    pub content: Option<ApiContent>,
}

impl ApiDeviation {
    pub fn into_item(self) -> Option<Item> {
        let id = self.deviationid?;
        let preview = self.content.and_then(|c| c.src);
        Some(Item::new(id, self.is_downloadable, preview))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiContent {
    #[serde(default)]
    pub src: Option<String>,
}

/// `/deviation/download/{deviationid}` response
#[derive(Debug, Deserialize)]
pub struct DownloadResponse {
    pub src: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    pub fn describe(&self) -> Option<String> {
        match (&self.error, &self.error_description) {
            (Some(code), Some(desc)) => Some(format!("{}: {}", code, desc)),
            (Some(code), None) => Some(code.clone()),
            (None, Some(desc)) => Some(desc.clone()),
            (None, None) => None,
        }
    }
}
