//! Remote Media Source Abstraction
//!
//! The data model shared by every media source (folders, items, pages) and the
//! [`MediaSource`] trait the sync engine drives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Which side of a user's profile a folder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Folders organising the user's own work
    Gallery,
    /// Folders of work the user has saved from others
    Collection,
}

impl SourceKind {
    /// Directory name used under the user's output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            SourceKind::Gallery => "Gallery",
            SourceKind::Collection => "Collection",
        }
    }

    /// Whether the source exposes an "everything" pseudo-folder
    pub fn supports_all_items(&self) -> bool {
        matches!(self, SourceKind::Gallery)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Gallery => write!(f, "gallery"),
            SourceKind::Collection => write!(f, "collection"),
        }
    }
}

/// Opaque, stable identifier of a remote folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(String);

/// Opaque, stable identifier of a remote item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(FolderId);
string_id!(ItemId);

/// A named grouping of items within one source kind
///
/// Identity is `id`; `name` is only a display and selection key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub source_kind: SourceKind,
}

impl Folder {
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_kind,
        }
    }
}

/// One downloadable piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Whether the full-resolution original may be fetched
    pub is_downloadable: bool,
    /// Lower-resolution rendition, used when the original is not downloadable
    pub preview_uri: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, is_downloadable: bool, preview_uri: Option<String>) -> Self {
        Self {
            id: id.into(),
            is_downloadable,
            preview_uri,
        }
    }

    /// Whether anything can be fetched for this item at all
    pub fn has_content(&self) -> bool {
        self.is_downloadable || self.preview_uri.is_some()
    }
}

/// Outcome of one paged listing request
///
/// A legitimately empty page that the remote says is followed by more
/// results is kept distinct from the end of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult<T> {
    /// A non-empty page; `has_more` relays the remote continuation flag
    Page { items: Vec<T>, has_more: bool },
    /// No results on this page, but the remote reports more to come
    EmptyButMore,
    /// No results and nothing further
    End,
}

impl<T> PageResult<T> {
    /// Classify a remote `{results, has_more}` envelope
    pub fn from_envelope(items: Vec<T>, has_more: bool) -> Self {
        match (items.is_empty(), has_more) {
            (false, _) => PageResult::Page { items, has_more },
            (true, true) => PageResult::EmptyButMore,
            (true, false) => PageResult::End,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, PageResult::End)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        match self {
            PageResult::Page { items, has_more } => PageResult::Page {
                items: items.into_iter().map(f).collect(),
                has_more,
            },
            PageResult::EmptyButMore => PageResult::EmptyButMore,
            PageResult::End => PageResult::End,
        }
    }
}

/// Typed client over a remote listing/download API
///
/// Implementations never reattempt failed calls and never interpret the end
/// of pagination beyond relaying what the remote reports. Pages are expected
/// newest first and stable across repeated requests for the same index.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch one page of folders of `kind` at zero-based `page_index`
    async fn list_folders(&self, kind: SourceKind, page_index: u32) -> Result<PageResult<Folder>>;

    /// Fetch one page of items in `folder`
    ///
    /// `folder = None` addresses the "all items" pseudo-folder, which only
    /// galleries have; for collections it yields [`PageResult::End`].
    async fn list_items(
        &self,
        kind: SourceKind,
        folder: Option<&Folder>,
        page_index: u32,
    ) -> Result<PageResult<Item>>;

    /// Download `item` into `dest_dir`, creating the directory if absent
    ///
    /// Returns the written path, or `None` when the item has no fetchable
    /// content and was skipped.
    async fn download_item(&self, item: &Item, dest_dir: &Path) -> Result<Option<PathBuf>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_result_classification() {
        assert_eq!(
            PageResult::from_envelope(vec![1, 2], true),
            PageResult::Page {
                items: vec![1, 2],
                has_more: true
            }
        );
        assert_eq!(
            PageResult::from_envelope(vec![1], false),
            PageResult::Page {
                items: vec![1],
                has_more: false
            }
        );
        assert_eq!(
            PageResult::<i32>::from_envelope(vec![], true),
            PageResult::EmptyButMore
        );
        assert!(PageResult::<i32>::from_envelope(vec![], false).is_end());
    }

    #[test]
    fn test_item_without_content() {
        assert!(!Item::new("a", false, None).has_content());
        assert!(Item::new("b", true, None).has_content());
        assert!(Item::new("c", false, Some("https://x/y.png".into())).has_content());
    }

    #[test]
    fn test_source_kind_names() {
        assert_eq!(SourceKind::Gallery.dir_name(), "Gallery");
        assert_eq!(SourceKind::Collection.dir_name(), "Collection");
        assert!(SourceKind::Gallery.supports_all_items());
        assert!(!SourceKind::Collection.supports_all_items());
    }
}
