use std::{collections::BTreeMap, fmt, path::PathBuf};

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Privacy {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl Privacy {
    /// Value expected by the `privacyStatus` field of the playlist API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Privacy::Public => "PUBLIC",
            Privacy::Private => "PRIVATE",
            Privacy::Unlisted => "UNLISTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Privacy::Public),
            "private" => Some(Privacy::Private),
            "unlisted" => Some(Privacy::Unlisted),
            _ => None,
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Fully resolved settings of one run. Never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_file: PathBuf,
    pub title: String,
    pub description: String,
    pub privacy: Privacy,
    pub allow_duplicates: bool,
    pub auth_file: PathBuf,
    pub interactive: bool,
}

/// Captured browser request headers that authenticate the account session.
///
/// Stored on disk as a flat JSON object of header name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential {
    pub headers: BTreeMap<String, String>,
}

impl Credential {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Value of a single cookie from the `cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

/// A search result; rank 0 is the service's best match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTrack {
    pub track_id: String,
    pub source_query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
    DuplicateSkipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Found => "FOUND",
            Outcome::NotFound => "NOT_FOUND",
            Outcome::DuplicateSkipped => "DUPLICATE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub at: DateTime<Local>,
    pub query: String,
    pub outcome: Outcome,
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub detail: Option<String>,
}

#[derive(Tabled)]
pub struct SkippedTableRow {
    pub query: String,
    pub outcome: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub title: String,
    pub description: String,
    pub privacy_status: Privacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistResponse {
    pub playlist_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlaylistRequest {
    pub playlist_id: String,
    pub actions: Vec<PlaylistAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistAction {
    pub action: String,
    pub added_video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe_option: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditPlaylistResponse {
    pub status: Option<String>,
}
