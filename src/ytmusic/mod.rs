//! # YouTube Music Integration Module
//!
//! The catalog is consumed through two small capability traits so the run
//! loop never depends on the network directly:
//!
//! - [`MusicCatalog`] - session probe, search, playlist creation, track adds
//! - [`Connector`] - builds a catalog session from a [`Credential`]
//!
//! [`YtMusic`] implements them against the InnerTube endpoints used by the
//! YouTube Music web client:
//!
//! ```text
//! POST {api}/browse                 session probe (liked songs)
//! POST {api}/search                 text search
//! POST {api}/playlist/create        create an empty playlist
//! POST {api}/browse/edit_playlist   append videos in order
//! ```
//!
//! Requests replay the captured browser headers and carry a fresh
//! `SAPISIDHASH` authorization built from the SAPISID cookie.
//!
//! ## Error mapping
//!
//! - HTTP 401/403 and signed-out probes become auth errors
//!   ([`ApiError::is_auth`]) which end the run
//! - HTTP 409 becomes [`ApiError::Conflict`] so playlist edits can be retried
//! - everything else is a per-request failure

pub mod auth;
pub mod search;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, header::AUTHORIZATION, header::HeaderMap};
use serde_json::{Value, json};

use crate::{
    config,
    error::ApiError,
    types::{
        Candidate, CreatePlaylistRequest, CreatePlaylistResponse, Credential,
        EditPlaylistRequest, EditPlaylistResponse, PlaylistAction, Privacy,
    },
};

/// Remote capabilities a run needs from the music service.
#[async_trait(?Send)]
pub trait MusicCatalog {
    /// Lightweight authenticated request proving the session is usable.
    async fn validate_session(&self) -> Result<(), ApiError>;

    /// Ranked candidates for a free-text query; empty means not found.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError>;

    /// Creates an empty playlist and returns its id.
    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String, ApiError>;

    /// Appends `track_ids` to the playlist, keeping their order.
    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        allow_duplicates: bool,
    ) -> Result<(), ApiError>;
}

/// Opens a catalog session for a credential.
pub trait Connector {
    type Catalog: MusicCatalog;

    fn connect(&self, credential: &Credential) -> Result<Self::Catalog, ApiError>;
}

#[derive(Debug, Clone)]
pub struct YtMusicConnector {
    pub api_url: String,
    pub origin: String,
    pub client_version: String,
}

impl YtMusicConnector {
    pub fn from_env() -> Self {
        Self {
            api_url: config::api_url(),
            origin: config::origin(),
            client_version: config::client_version(),
        }
    }
}

impl Connector for YtMusicConnector {
    type Catalog = YtMusic;

    fn connect(&self, credential: &Credential) -> Result<YtMusic, ApiError> {
        YtMusic::new(
            credential,
            &self.api_url,
            &self.origin,
            &self.client_version,
        )
    }
}

/// Authenticated YouTube Music session.
pub struct YtMusic {
    client: Client,
    headers: HeaderMap,
    sapisid: String,
    api_url: String,
    origin: String,
    client_version: String,
}

impl YtMusic {
    pub fn new(
        credential: &Credential,
        api_url: &str,
        origin: &str,
        client_version: &str,
    ) -> Result<Self, ApiError> {
        let headers = auth::build_header_map(credential, origin)?;
        let sapisid = auth::sapisid(credential)
            .ok_or_else(|| ApiError::InvalidCredential("missing SAPISID cookie".to_string()))?
            .to_string();

        Ok(Self {
            client: Client::builder().build()?,
            headers,
            sapisid,
            api_url: api_url.trim_end_matches('/').to_string(),
            origin: origin.to_string(),
            client_version: client_version.to_string(),
        })
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": "WEB_REMIX",
                "clientVersion": self.client_version,
                "hl": "en",
            },
            "user": {},
        })
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, ApiError> {
        if let Value::Object(map) = &mut body {
            map.insert("context".to_string(), self.context());
        }

        let url = format!(
            "{api}/{endpoint}?alt=json&prettyPrint=false",
            api = self.api_url,
            endpoint = endpoint
        );
        let authorization = auth::sapisid_hash(&self.sapisid, &self.origin, Utc::now().timestamp());

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .header(AUTHORIZATION, authorization)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ApiError::Unauthorized(status.as_u16()));
            }
            StatusCode::CONFLICT => return Err(ApiError::Conflict),
            s if !s.is_success() => {
                let mut body = response.text().await.unwrap_or_default();
                body.truncate(200);
                return Err(ApiError::Status {
                    status: s.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait(?Send)]
impl MusicCatalog for YtMusic {
    async fn validate_session(&self) -> Result<(), ApiError> {
        let json = self
            .post("browse", json!({ "browseId": "FEmusic_liked_videos" }))
            .await?;

        if is_signed_out(&json) {
            return Err(ApiError::SignedOut);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        let json = self.post("search", json!({ "query": query })).await?;
        // stale cookies still get HTTP 200, with anonymous results
        if is_logged_out(&json) {
            return Err(ApiError::SignedOut);
        }
        Ok(search::parse_search_results(&json))
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String, ApiError> {
        let request = CreatePlaylistRequest {
            title: title.to_string(),
            description: description.to_string(),
            privacy_status: privacy,
        };
        let body =
            serde_json::to_value(&request).map_err(|e| ApiError::UnexpectedResponse(e.to_string()))?;

        let json = self.post("playlist/create", body).await?;
        let response: CreatePlaylistResponse = serde_json::from_value(json)
            .map_err(|e| ApiError::UnexpectedResponse(format!("playlist/create: {}", e)))?;

        Ok(response.playlist_id)
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        allow_duplicates: bool,
    ) -> Result<(), ApiError> {
        let request = EditPlaylistRequest {
            playlist_id: playlist_id.trim_start_matches("VL").to_string(),
            actions: track_ids
                .iter()
                .map(|id| PlaylistAction {
                    action: "ACTION_ADD_VIDEO".to_string(),
                    added_video_id: id.clone(),
                    // skipping the dedupe check is what lets repeats through
                    dedupe_option: allow_duplicates.then(|| "DEDUPE_OPTION_SKIP".to_string()),
                })
                .collect(),
        };
        let body =
            serde_json::to_value(&request).map_err(|e| ApiError::UnexpectedResponse(e.to_string()))?;

        let json = self.post("browse/edit_playlist", body).await?;
        let response: EditPlaylistResponse = serde_json::from_value(json)
            .map_err(|e| ApiError::UnexpectedResponse(format!("edit_playlist: {}", e)))?;

        match response.status.as_deref() {
            Some("STATUS_SUCCEEDED") => {}
            other => tracing::warn!(
                "unexpected edit_playlist status {:?} for {} track(s)",
                other,
                track_ids.len()
            ),
        }
        Ok(())
    }
}

/// True when the response context says the request was anonymous.
fn is_logged_out(response: &Value) -> bool {
    response["responseContext"]["serviceTrackingParams"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|service| service["params"].as_array())
        .flatten()
        .any(|param| param["key"] == "logged_in" && param["value"] == "0")
}

/// Session probe check; the liked-songs page has no contents when signed out.
fn is_signed_out(response: &Value) -> bool {
    is_logged_out(response) || response["contents"].is_null()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_probe_is_detected() {
        let response = json!({
            "responseContext": {
                "serviceTrackingParams": [
                    { "service": "GFEEDBACK", "params": [{ "key": "logged_in", "value": "0" }] }
                ]
            },
            "contents": {}
        });
        assert!(is_signed_out(&response));
    }

    #[test]
    fn signed_in_probe_passes() {
        let response = json!({
            "responseContext": {
                "serviceTrackingParams": [
                    { "service": "GFEEDBACK", "params": [{ "key": "logged_in", "value": "1" }] }
                ]
            },
            "contents": { "singleColumnBrowseResultsRenderer": {} }
        });
        assert!(!is_signed_out(&response));
    }

    #[test]
    fn anonymous_search_response_is_logged_out() {
        let response = json!({
            "responseContext": {
                "serviceTrackingParams": [
                    { "service": "CSI", "params": [{ "key": "c", "value": "WEB_REMIX" }] },
                    { "service": "GFEEDBACK", "params": [{ "key": "logged_in", "value": "0" }] }
                ]
            },
            "contents": { "tabbedSearchResultsRenderer": {} }
        });
        assert!(is_logged_out(&response));
    }

    #[test]
    fn empty_search_response_is_not_logged_out() {
        let response = json!({
            "responseContext": {
                "serviceTrackingParams": [
                    { "service": "GFEEDBACK", "params": [{ "key": "logged_in", "value": "1" }] }
                ]
            }
        });
        assert!(!is_logged_out(&response));
        assert!(is_signed_out(&response));
    }
}
