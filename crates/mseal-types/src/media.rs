use std::fmt;

use serde::{Deserialize, Serialize};

/// Content type tag carried alongside stored blobs.
///
/// The store never inspects blob bytes; the tag exists so a retrieved blob
/// can be served with the right content type, and so backends can derive a
/// file extension. `"video/mp4"` is the system-wide convention for
/// registrations, per the original bucket setup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    /// The default registration media type.
    pub const MP4: &'static str = "video/mp4";

    pub fn new(mime: impl Into<String>) -> Self {
        Self(mime.into())
    }

    /// `video/mp4` — the fixed registration convention.
    pub fn mp4() -> Self {
        Self(Self::MP4.to_owned())
    }

    /// The MIME string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension for this media type, used by filesystem backends.
    ///
    /// Falls back to `"bin"` for types without a conventional extension.
    pub fn extension(&self) -> &str {
        match self.0.as_str() {
            "video/mp4" => "mp4",
            "video/mpeg" => "mpeg",
            "video/quicktime" => "mov",
            _ => "bin",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::mp4()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MediaType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mp4() {
        assert_eq!(MediaType::default().as_str(), "video/mp4");
        assert_eq!(MediaType::default().extension(), "mp4");
    }

    #[test]
    fn known_extensions() {
        assert_eq!(MediaType::new("video/mpeg").extension(), "mpeg");
        assert_eq!(MediaType::new("video/quicktime").extension(), "mov");
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(MediaType::new("application/x-thing").extension(), "bin");
    }
}
