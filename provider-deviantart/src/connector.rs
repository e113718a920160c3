//! DeviantArt API connector implementation
//!
//! Implements the `MediaSource` trait for the DeviantArt OAuth2 API v1.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::source::{Folder, Item, MediaSource, PageResult, SourceKind};
use bridge_traits::storage::FileSystemAccess;
use core_auth::TokenSource;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DeviantArtError;
use crate::mime::resolve_extension;
use crate::types::{ApiDeviation, ApiErrorBody, ApiFolder, DownloadResponse, PagedResponse};

/// DeviantArt API base URL
const DEVIANTART_API_BASE: &str = "https://www.deviantart.com/api/v1/oauth2";

/// Results per listing request
pub const PAGE_SIZE: u32 = 20;

/// DeviantArt API connector
///
/// Every call is a single attempt; reattempting is the caller's concern.
///
/// # Example
///
/// ```ignore
/// use provider_deviantart::DeviantArtConnector;
/// use bridge_traits::source::{MediaSource, SourceKind};
///
/// let connector = DeviantArtConnector::new(http_client, tokens, filesystem, "someartist");
/// let page = connector.list_folders(SourceKind::Gallery, 0).await?;
/// ```
pub struct DeviantArtConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Bearer token supplier
    tokens: Arc<dyn TokenSource>,

    /// Destination for downloaded content
    filesystem: Arc<dyn FileSystemAccess>,

    /// User whose content is listed
    username: String,

    base_url: String,
    request_timeout: Duration,
}

impl DeviantArtConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        tokens: Arc<dyn TokenSource>,
        filesystem: Arc<dyn FileSystemAccess>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            tokens,
            filesystem,
            username: username.into(),
            base_url: DEVIANTART_API_BASE.to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn listing_url(&self, path: &str, page_index: u32, extra: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{}?username={}&offset={}&limit={}&mature_content=true",
            self.base_url,
            path,
            urlencoding::encode(&self.username),
            page_index * PAGE_SIZE,
            PAGE_SIZE
        );
        for (key, value) in extra {
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }
        url
    }

    /// Issue an authenticated GET and turn non-2xx statuses into errors
    #[instrument(skip(self, url), fields(url = %url))]
    async fn get_authorized(
        &self,
        url: String,
    ) -> std::result::Result<HttpResponse, DeviantArtError> {
        let token = self.tokens.access_token().await?;

        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(token)
            .header("Accept", "application/json")
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;
        Self::check_status(response)
    }

    fn check_status(response: HttpResponse) -> std::result::Result<HttpResponse, DeviantArtError> {
        if response.is_success() {
            debug!(status = response.status, "API request succeeded");
            return Ok(response);
        }

        let status = response.status;
        let message = serde_json::from_slice::<ApiErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.describe())
            .unwrap_or_else(|| String::from_utf8_lossy(&response.body).to_string());

        warn!(status = status, error = %message, "API request failed");

        if status == 401 {
            Err(DeviantArtError::AuthenticationFailed(message))
        } else {
            Err(DeviantArtError::ApiError {
                status_code: status,
                message,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
    ) -> std::result::Result<T, DeviantArtError> {
        let response = self.get_authorized(url).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| DeviantArtError::ParseError(e.to_string()))
    }

    /// Resolve the URI to fetch for an item, `None` when nothing is fetchable
    async fn content_uri(
        &self,
        item: &Item,
    ) -> std::result::Result<Option<String>, DeviantArtError> {
        if item.is_downloadable {
            let url = format!(
                "{}/deviation/download/{}",
                self.base_url,
                urlencoding::encode(item.id.as_str())
            );
            let download: DownloadResponse = self.get_json(url).await?;
            return download
                .src
                .map(Some)
                .ok_or_else(|| DeviantArtError::MissingSource {
                    deviation_id: item.id.to_string(),
                });
        }

        Ok(item.preview_uri.clone())
    }
}

#[async_trait]
impl MediaSource for DeviantArtConnector {
    #[instrument(skip(self), fields(user = %self.username))]
    async fn list_folders(&self, kind: SourceKind, page_index: u32) -> Result<PageResult<Folder>> {
        let path = match kind {
            SourceKind::Gallery => "/gallery/folders",
            SourceKind::Collection => "/collections/folders",
        };
        let url = self.listing_url(path, page_index, &[]);

        let response: PagedResponse<ApiFolder> = self.get_json(url).await?;
        let page = response.into_page(|f| Some(f.into_folder(kind)));

        debug!(page = %page_summary(&page), "Listed folders");
        Ok(page)
    }

    #[instrument(
        skip(self, folder),
        fields(user = %self.username, folder = ?folder.map(|f| f.name.as_str()))
    )]
    async fn list_items(
        &self,
        kind: SourceKind,
        folder: Option<&Folder>,
        page_index: u32,
    ) -> Result<PageResult<Item>> {
        let url = match (kind, folder) {
            (SourceKind::Gallery, Some(folder)) => self.listing_url(
                &format!("/gallery/{}", urlencoding::encode(folder.id.as_str())),
                page_index,
                &[("mode", "newest")],
            ),
            (SourceKind::Gallery, None) => self.listing_url("/gallery/all", page_index, &[]),
            (SourceKind::Collection, Some(folder)) => self.listing_url(
                &format!("/collections/{}", urlencoding::encode(folder.id.as_str())),
                page_index,
                &[],
            ),
            (SourceKind::Collection, None) => return Ok(PageResult::End),
        };

        let response: PagedResponse<ApiDeviation> = self.get_json(url).await?;
        let page = response.into_page(ApiDeviation::into_item);

        debug!(page = %page_summary(&page), "Listed items");
        Ok(page)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn download_item(&self, item: &Item, dest_dir: &Path) -> Result<Option<PathBuf>> {
        let source = match self.content_uri(item).await? {
            Some(uri) => uri,
            None => {
                debug!("Item has no fetchable content, skipping");
                return Ok(None);
            }
        };

        let request =
            HttpRequest::new(HttpMethod::Get, source.clone()).timeout(self.request_timeout);
        let response = self.http_client.execute(request).await?;
        let response = Self::check_status(response)?;

        let extension = resolve_extension(response.content_type(), &source);
        let target = dest_dir.join(format!("{}{}", item.id, extension));

        self.filesystem.create_dir_all(dest_dir).await?;
        self.filesystem
            .write_file_atomic(&target, response.body)
            .await?;

        info!(path = %target.display(), "Downloaded item");
        Ok(Some(target))
    }
}

fn page_summary<T>(page: &PageResult<T>) -> String {
    match page {
        PageResult::Page { items, has_more } => {
            format!("{} results, has_more={}", items.len(), has_more)
        }
        PageResult::EmptyButMore => "empty, has_more=true".to_string(),
        PageResult::End => "end".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use core_auth::StaticToken;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    mock! {
        FileSystem {}

        #[async_trait]
        impl FileSystemAccess for FileSystem {
            async fn exists(&self, path: &Path) -> Result<bool>;
            async fn create_dir_all(&self, path: &Path) -> Result<()>;
            async fn read_file(&self, path: &Path) -> Result<Bytes>;
            async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;
            async fn rename(&self, from: &Path, to: &Path) -> Result<()>;
            async fn delete_file(&self, path: &Path) -> Result<()>;
        }
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    fn content_response(content_type: &str, body: &'static [u8]) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        HttpResponse {
            status: 200,
            headers,
            body: Bytes::from_static(body),
        }
    }

    fn connector(http: MockHttpClient, fs: MockFileSystem) -> DeviantArtConnector {
        DeviantArtConnector::new(
            Arc::new(http),
            Arc::new(StaticToken::new("tok")),
            Arc::new(fs),
            "some artist",
        )
    }

    #[tokio::test]
    async fn test_list_gallery_folders_second_page() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url.starts_with(
                    "https://www.deviantart.com/api/v1/oauth2/gallery/folders?username=some%20artist",
                ) && req.url.contains("offset=20")
                    && req.url.contains("limit=20")
                    && req.url.contains("mature_content=true")
                    && req.headers.get("Authorization").map(String::as_str) == Some("Bearer tok")
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"has_more": false, "results": [{"folderid": "F1", "name": "Sketches"}]}"#,
                ))
            });

        let page = connector(http, MockFileSystem::new())
            .list_folders(SourceKind::Gallery, 1)
            .await
            .unwrap();

        assert_eq!(
            page,
            PageResult::Page {
                items: vec![Folder::new("F1", "Sketches", SourceKind::Gallery)],
                has_more: false
            }
        );
    }

    #[tokio::test]
    async fn test_list_gallery_folder_items_newest_first() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url.contains("/gallery/F1?") && req.url.contains("mode=newest")
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"has_more": true, "next_offset": 20, "results": [{"deviationid": "D1", "is_downloadable": true}]}"#,
                ))
            });

        let folder = Folder::new("F1", "Sketches", SourceKind::Gallery);
        let page = connector(http, MockFileSystem::new())
            .list_items(SourceKind::Gallery, Some(&folder), 0)
            .await
            .unwrap();

        match page {
            PageResult::Page { items, has_more } => {
                assert!(has_more);
                assert_eq!(items[0].id.as_str(), "D1");
            }
            other => panic!("unexpected page: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gallery_all_and_collection_paths() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url.contains("/gallery/all?"))
            .times(1)
            .returning(|_| Ok(json_response(200, r#"{"has_more": true, "results": []}"#)));
        http.expect_execute()
            .withf(|req| req.url.contains("/collections/C9?") && !req.url.contains("mode="))
            .times(1)
            .returning(|_| Ok(json_response(200, r#"{"has_more": false, "results": []}"#)));

        let connector = connector(http, MockFileSystem::new());
        assert_eq!(
            connector.list_items(SourceKind::Gallery, None, 3).await.unwrap(),
            PageResult::EmptyButMore
        );

        let folder = Folder::new("C9", "Favourites", SourceKind::Collection);
        assert!(connector
            .list_items(SourceKind::Collection, Some(&folder), 0)
            .await
            .unwrap()
            .is_end());
    }

    #[tokio::test]
    async fn test_collection_without_folder_makes_no_request() {
        let http = MockHttpClient::new();
        let page = connector(http, MockFileSystem::new())
            .list_items(SourceKind::Collection, None, 0)
            .await
            .unwrap();
        assert!(page.is_end());
    }

    #[tokio::test]
    async fn test_unauthorized_and_api_errors() {
        let mut http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(json_response(
                    401,
                    r#"{"error": "invalid_token", "error_description": "Expired"}"#,
                ))
            });
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json_response(500, "upstream exploded")));

        let connector = connector(http, MockFileSystem::new());

        let err = connector.list_folders(SourceKind::Gallery, 0).await.unwrap_err();
        assert!(matches!(err, BridgeError::Unauthorized(ref m) if m.contains("invalid_token")));

        let err = connector.list_folders(SourceKind::Collection, 0).await.unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_malformed_listing_is_parse_error() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "<html>maintenance</html>")));

        let err = connector(http, MockFileSystem::new())
            .list_folders(SourceKind::Gallery, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref m) if m.contains("Parse error")));
    }

    #[tokio::test]
    async fn test_download_full_resolution_uses_content_type() {
        let mut http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();
        http.expect_execute()
            .withf(|req| req.url.ends_with("/deviation/download/D1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"src": "https://images.example.com/full/art.png?token=abc"}"#,
                ))
            });
        http.expect_execute()
            .withf(|req| {
                req.url == "https://images.example.com/full/art.png?token=abc"
                    && !req.headers.contains_key("Authorization")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(content_response("image/jpeg", b"jpegdata")));

        let mut fs = MockFileSystem::new();
        fs.expect_create_dir_all()
            .withf(|p| p == Path::new("/out/Gallery/Sketches"))
            .returning(|_| Ok(()));
        fs.expect_write_file()
            .withf(|p, data| {
                p == Path::new("/out/Gallery/Sketches/D1.jpg.part")
                    && *data == Bytes::from_static(b"jpegdata")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        fs.expect_rename()
            .withf(|from, to| {
                from == Path::new("/out/Gallery/Sketches/D1.jpg.part")
                    && to == Path::new("/out/Gallery/Sketches/D1.jpg")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let item = Item::new("D1", true, Some("https://images.example.com/preview.gif".into()));
        let written = connector(http, fs)
            .download_item(&item, Path::new("/out/Gallery/Sketches"))
            .await
            .unwrap();

        assert_eq!(written, Some(PathBuf::from("/out/Gallery/Sketches/D1.jpg")));
    }

    #[tokio::test]
    async fn test_download_preview_falls_back_to_uri_extension() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url == "https://images.example.com/pre/abc.png?token=xyz")
            .times(1)
            .returning(|_| Ok(content_response("application/octet-stream", b"png")));

        let mut fs = MockFileSystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().times(1).returning(|_, _| Ok(()));
        fs.expect_rename().times(1).returning(|_, _| Ok(()));

        let item = Item::new(
            "D2",
            false,
            Some("https://images.example.com/pre/abc.png?token=xyz".into()),
        );
        let written = connector(http, fs)
            .download_item(&item, Path::new("/out"))
            .await
            .unwrap();

        assert_eq!(written, Some(PathBuf::from("/out/D2.png")));
    }

    #[tokio::test]
    async fn test_download_without_content_is_skipped() {
        let http = MockHttpClient::new();
        let fs = MockFileSystem::new();

        let item = Item::new("D3", false, None);
        let written = connector(http, fs)
            .download_item(&item, Path::new("/out"))
            .await
            .unwrap();
        assert!(written.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(content_response("image/png", b"png")));

        let mut fs = MockFileSystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().times(1).returning(|_, _| {
            Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        });
        fs.expect_delete_file()
            .withf(|p| p == Path::new("/out/D4.png.part"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_rename().never();

        let item = Item::new("D4", false, Some("https://images.example.com/x.png".into()));
        let err = connector(http, fs)
            .download_item(&item, Path::new("/out"))
            .await
            .unwrap_err();
        assert!(err.is_io());
    }

    #[tokio::test]
    async fn test_download_endpoint_without_src() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, r#"{"filename": "x.png"}"#)));

        let item = Item::new("D5", true, None);
        let err = connector(http, MockFileSystem::new())
            .download_item(&item, Path::new("/out"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref m) if m.contains("D5")));
    }
}
