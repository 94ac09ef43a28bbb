pub const ACCEPTED_AUDIO_MIMES: [&str; 8] = [
    "audio/mpeg",
    "audio/wav",
    "audio/mp3",
    "audio/webm",
    "audio/ogg",
    "audio/mp4",
    "audio/x-m4a",
    "audio/m4a",
];

const OCTET_STREAM: &str = "application/octet-stream";

/// Resolved MIME type of an uploaded audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMime(String);

impl AudioMime {
    /// Accepts a file when its declared type is in the accepted set, its
    /// extension is `m4a`, or it carries no useful declared type but a known
    /// audio extension. Anything not declared as an accepted type takes the
    /// type implied by the extension.
    pub fn resolve(declared: Option<&str>, file_name: &str) -> Option<Self> {
        let declared = declared.map(str::trim).unwrap_or_default();
        if ACCEPTED_AUDIO_MIMES.contains(&declared) {
            return Some(Self(declared.to_string()));
        }

        let extension = file_extension(file_name)?;
        let generic = declared.is_empty() || declared == OCTET_STREAM;
        if extension != "m4a" && !generic {
            return None;
        }

        mime_for_extension(&extension).map(|m| Self(m.to_string()))
    }

    pub fn wav() -> Self {
        Self("audio/wav".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "m4a" => Some("audio/mp4"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "webm" => Some("audio/webm"),
        _ => None,
    }
}
