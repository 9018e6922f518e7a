use serde_json::Value;

use crate::types::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultKind {
    Song,
    Video,
    Other,
}

impl ResultKind {
    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "song" | "songs" => Some(ResultKind::Song),
            "video" | "videos" => Some(ResultKind::Video),
            "album" | "albums" | "artist" | "artists" | "playlist" | "playlists" | "episode"
            | "episodes" | "podcast" | "podcasts" | "profile" | "profiles" | "single"
            | "ep" => Some(ResultKind::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchItem {
    kind: ResultKind,
    video_id: Option<String>,
    title: String,
    artist: String,
}

/// Turns a raw search response into ranked candidates.
///
/// Songs are preferred: when the response holds any song results they are
/// returned in service order. Otherwise video results are used. Albums,
/// artists, playlists and anything without a video id are dropped.
pub fn parse_search_results(response: &Value) -> Vec<Candidate> {
    let items = collect_items(response);

    let songs: Vec<&SearchItem> = items
        .iter()
        .filter(|item| item.kind == ResultKind::Song && item.video_id.is_some())
        .collect();

    let picked = if songs.is_empty() {
        tracing::debug!("no song results, falling back to videos");
        items
            .iter()
            .filter(|item| item.kind == ResultKind::Video && item.video_id.is_some())
            .collect()
    } else {
        songs
    };

    picked
        .into_iter()
        .enumerate()
        .filter_map(|(rank, item)| {
            Some(Candidate {
                track_id: item.video_id.clone()?,
                title: item.title.clone(),
                artist: item.artist.clone(),
                rank,
            })
        })
        .collect()
}

fn sections(response: &Value) -> &[Value] {
    let tabbed = &response["contents"]["tabbedSearchResultsRenderer"]["tabs"][0]["tabRenderer"]
        ["content"]["sectionListRenderer"]["contents"];
    let plain = &response["contents"]["sectionListRenderer"]["contents"];

    tabbed
        .as_array()
        .or_else(|| plain.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn collect_items(response: &Value) -> Vec<SearchItem> {
    let mut items = Vec::new();

    for section in sections(response) {
        if let Some(card) = section.get("musicCardShelfRenderer") {
            if let Some(item) = parse_top_result(card) {
                items.push(item);
            }
        }

        if let Some(shelf) = section.get("musicShelfRenderer") {
            let shelf_kind = text(&shelf["title"]).and_then(|t| ResultKind::from_label(&t));
            let contents = shelf["contents"].as_array().map(Vec::as_slice).unwrap_or_default();
            items.extend(
                contents
                    .iter()
                    .filter_map(|entry| entry.get("musicResponsiveListItemRenderer"))
                    .filter_map(|renderer| parse_list_item(renderer, shelf_kind)),
            );
        }
    }

    items
}

fn parse_top_result(card: &Value) -> Option<SearchItem> {
    let title_run = &card["title"]["runs"][0];
    let runs = runs(&card["subtitle"]);
    let kind = runs
        .first()
        .and_then(|run| run["text"].as_str())
        .and_then(ResultKind::from_label)
        .unwrap_or(ResultKind::Other);

    Some(SearchItem {
        kind,
        video_id: title_run["navigationEndpoint"]["watchEndpoint"]["videoId"]
            .as_str()
            .map(str::to_string),
        title: title_run["text"].as_str()?.to_string(),
        artist: artist_from_runs(runs),
    })
}

fn parse_list_item(renderer: &Value, shelf_kind: Option<ResultKind>) -> Option<SearchItem> {
    let columns = renderer["flexColumns"].as_array()?;
    let title = text(&columns.first()?["musicResponsiveListItemFlexColumnRenderer"]["text"])?;
    let details = columns
        .get(1)
        .map(|column| runs(&column["musicResponsiveListItemFlexColumnRenderer"]["text"]))
        .unwrap_or_default();

    let kind = details
        .first()
        .and_then(|run| run["text"].as_str())
        .and_then(ResultKind::from_label)
        .or(shelf_kind)
        .unwrap_or(ResultKind::Other);

    let video_id = renderer["playlistItemData"]["videoId"]
        .as_str()
        .or_else(|| {
            renderer["overlay"]["musicItemThumbnailOverlayRenderer"]["content"]
                ["musicPlayButtonRenderer"]["playNavigationEndpoint"]["watchEndpoint"]["videoId"]
                .as_str()
        })
        .map(str::to_string);

    Some(SearchItem {
        kind,
        video_id,
        title,
        artist: artist_from_runs(details),
    })
}

fn runs(value: &Value) -> &[Value] {
    value["runs"].as_array().map(Vec::as_slice).unwrap_or_default()
}

fn text(value: &Value) -> Option<String> {
    let joined: String = runs(value)
        .iter()
        .filter_map(|run| run["text"].as_str())
        .collect();
    (!joined.is_empty()).then_some(joined)
}

/// Artist name from a subtitle run list.
///
/// Runs linking to an artist page win; otherwise the first run that is
/// neither a separator nor a result type label.
fn artist_from_runs(runs: &[Value]) -> String {
    let linked = runs.iter().find(|run| {
        run["navigationEndpoint"]["browseEndpoint"]["browseEndpointContextSupportedConfigs"]
            ["browseEndpointContextMusicConfig"]["pageType"]
            .as_str()
            == Some("MUSIC_PAGE_TYPE_ARTIST")
    });

    linked
        .or_else(|| {
            runs.iter().find(|run| {
                run["text"].as_str().is_some_and(|t| {
                    let t = t.trim();
                    !t.is_empty() && t != "•" && ResultKind::from_label(t).is_none()
                })
            })
        })
        .and_then(|run| run["text"].as_str())
        .unwrap_or_default()
        .to_string()
}
