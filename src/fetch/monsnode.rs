//! Direct downloads from the external video host.
//!
//! A link on the host points at a page, not at the video. The page is
//! fetched, the uploader and title are read for the file name, and the video
//! anchor on the page is resolved against the page URL and streamed to disk.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::{Browser, FetchError, MediaFetcher, MediaInfo};
use crate::fs::naming::external_file_name;

/// Timeout for connecting and for loading a video page.
const PAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder for a missing uploader or title.
const UNKNOWN: &str = "Unknown";

/// Suffix of a download still in progress.
const PARTIAL_SUFFIX: &str = ".part";

/// Anchor to the video: the host's redirect endpoint or a direct `.mp4`.
static VIDEO_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?is)<a\s[^>]*href\s*=\s*["']([^"']*(?:redirect\.php\?v=|\.mp4)[^"']*)["']"#,
    )
});

/// Uploader name, shown in bold on the page.
static UPLOADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<b>\s*([^<]+?)\s*</b>"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<title>\s*([^<]*?)\s*</title>"));

fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// What a video page resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalVideo {
    pub uploader: String,
    pub title: String,
    pub url: Url,
}

impl ExternalVideo {
    /// File name the video is stored under.
    pub fn file_name(&self) -> String {
        external_file_name(&self.uploader, &self.title)
    }
}

/// Fetcher for links on the external host.
///
/// Browser cookies are not used; the host serves videos anonymously.
#[derive(Debug, Clone)]
pub struct MonsnodeFetcher {
    client: Client,
}

impl MonsnodeFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(PAGE_TIMEOUT)
            .user_agent(concat!("twtvt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Load a video page and resolve it.
    pub async fn resolve(&self, link: &str) -> std::result::Result<ExternalVideo, FetchError> {
        let page_url = Url::parse(link)
            .map_err(|e| FetchError::Transport(format!("invalid link '{}': {}", link, e)))?;

        let response = self
            .client
            .get(page_url.clone())
            .timeout(PAGE_TIMEOUT)
            .send()
            .await
            .map_err(transport)?;
        let html = check_status(response)?.text().await.map_err(transport)?;

        parse_page(&html, &page_url)
    }

    /// Stream the video to `dest`, going through a partial file.
    async fn download(&self, url: &Url, dest: &Path) -> std::result::Result<(), FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let response = check_status(response)?;

        let mut partial = dest.as_os_str().to_owned();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        let mut file = File::create(&partial).await.map_err(io_failure)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Transport(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await.map_err(io_failure)?;
        }
        file.flush().await.map_err(io_failure)?;
        drop(file);

        tokio::fs::rename(&partial, dest).await.map_err(io_failure)
    }
}

#[async_trait]
impl MediaFetcher for MonsnodeFetcher {
    async fn fetch(
        &self,
        uri: &str,
        output_dir: &Path,
        _cookies: Option<Browser>,
    ) -> std::result::Result<MediaInfo, FetchError> {
        let video = self.resolve(uri).await?;
        let dest = output_dir.join(video.file_name());
        tracing::debug!("Resolved {} to {}", uri, video.url);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(io_failure)?;
        self.download(&video.url, &dest).await?;

        Ok(MediaInfo {
            id: page_id(uri),
            title: video.title,
            upload_date: None,
            path: Some(dest),
        })
    }
}

/// Read uploader, title and video URL from a page.
pub fn parse_page(html: &str, page_url: &Url) -> std::result::Result<ExternalVideo, FetchError> {
    let href = first_capture(&VIDEO_HREF_RE, html)
        .ok_or_else(|| FetchError::Transport(format!("no video link on {}", page_url)))?;
    let url = page_url
        .join(&href.replace("&amp;", "&"))
        .map_err(|e| FetchError::Transport(format!("bad video link '{}': {}", href, e)))?;

    Ok(ExternalVideo {
        uploader: first_capture(&UPLOADER_RE, html).unwrap_or_else(|| UNKNOWN.to_string()),
        title: first_capture(&TITLE_RE, html).unwrap_or_else(|| UNKNOWN.to_string()),
        url,
    })
}

fn first_capture(regex: &Regex, html: &str) -> Option<String> {
    regex
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Last path segment of a page link, used as the media id.
fn page_id(link: &str) -> String {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(link)
        .to_string()
}

fn check_status(response: Response) -> std::result::Result<Response, FetchError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited(format!(
            "HTTP 429 from {}",
            response.url()
        )));
    }
    if !status.is_success() {
        return Err(FetchError::Transport(format!(
            "HTTP {} from {}",
            status,
            response.url()
        )));
    }
    Ok(response)
}

fn transport(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

fn io_failure(e: std::io::Error) -> FetchError {
    FetchError::Transport(format!("IO error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>
Evening clip / part 2
</title></head><body>
<div><div><a href="/">home</a><a href="redirect.php?v=98765&amp;s=1">watch</a></div>
<div>Evening clip</div><div><b> someone </b></div></div>
</body></html>"#;

    #[test]
    fn test_parse_page() {
        let page_url = Url::parse("https://monsnode.com/v98765").unwrap();
        let video = parse_page(PAGE, &page_url).unwrap();

        assert_eq!(video.uploader, "someone");
        assert_eq!(video.title, "Evening clip / part 2");
        assert_eq!(
            video.url.as_str(),
            "https://monsnode.com/redirect.php?v=98765&s=1"
        );
        assert_eq!(video.file_name(), "someone - Evening clip _ part 2.mp4");
    }

    #[test]
    fn test_parse_page_without_metadata_uses_placeholders() {
        let page_url = Url::parse("https://monsnode.com/v1").unwrap();
        let video = parse_page(r#"<a href="https://cdn.example/v.mp4">x</a>"#, &page_url).unwrap();

        assert_eq!(video.file_name(), "Unknown - Unknown.mp4");
        assert_eq!(video.url.as_str(), "https://cdn.example/v.mp4");
    }

    #[test]
    fn test_parse_page_without_video_link() {
        let page_url = Url::parse("https://monsnode.com/v1").unwrap();
        assert!(matches!(
            parse_page("<html><b>someone</b></html>", &page_url),
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_resolves_page_and_saves_video() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v98765"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/redirect.php"))
            .and(query_param("v", "98765"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("videos");
        let fetcher = MonsnodeFetcher::new().unwrap();
        let info = fetcher
            .fetch(&format!("{}/v98765", server.uri()), &output, None)
            .await
            .unwrap();

        let expected = output.join("someone - Evening clip _ part 2.mp4");
        assert_eq!(info.path.as_deref(), Some(expected.as_path()));
        assert_eq!(info.id, "v98765");
        assert_eq!(std::fs::read(&expected).unwrap(), b"video-bytes");
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_page_is_tagged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fetcher = MonsnodeFetcher::new().unwrap();
        let err = fetcher.resolve(&format!("{}/v1", server.uri())).await.unwrap_err();

        assert!(matches!(err, FetchError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_missing_video_is_retriable_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v98765"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/redirect.php"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = MonsnodeFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/v98765", server.uri()), dir.path(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(ref msg) if msg.contains("404")));
        assert!(err.is_retriable());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
