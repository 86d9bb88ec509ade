//! Browsers whose cookie stores can authenticate downloads.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported browsers for cookie extraction.
///
/// Limited to the names yt-dlp's `--cookies-from-browser` accepts. Opera GX
/// has no yt-dlp cookie reader of its own and is rejected rather than passed
/// through to fail on every download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Opera,
    Edge,
    Chromium,
    Brave,
    Vivaldi,
    Safari,
}

impl Browser {
    /// All supported browsers.
    pub const ALL: [Browser; 8] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Opera,
        Browser::Edge,
        Browser::Chromium,
        Browser::Brave,
        Browser::Vivaldi,
        Browser::Safari,
    ];

    /// Name as understood by the download tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Opera => "opera",
            Browser::Edge => "edge",
            Browser::Chromium => "chromium",
            Browser::Brave => "brave",
            Browser::Vivaldi => "vivaldi",
            Browser::Safari => "safari",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Browser::ALL
            .iter()
            .copied()
            .find(|browser| browser.as_str() == wanted)
            .ok_or_else(|| {
                let supported: Vec<&str> = Browser::ALL.iter().map(Browser::as_str).collect();
                Error::Validation(format!(
                    "unsupported browser '{}' (supported: {})",
                    s,
                    supported.join(", ")
                ))
            })
    }
}
