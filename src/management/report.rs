use std::{
    fmt::Write as _,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};
use tabled::Table;

use crate::{
    types::{Candidate, Outcome, ReportEntry, SkippedTableRow},
    utils,
};

const RULE: &str = "==================================================";
const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Per-query outcomes of a run plus its totals.
///
/// Counters only move through the `record_*` methods, so
/// `found + not_found + duplicates_skipped == total_queries` always holds.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub total_queries: usize,
    pub found: usize,
    pub not_found: usize,
    pub duplicates_skipped: usize,
    pub playlist_id: Option<String>,
    pub playlist_title: Option<String>,
    /// Tracks that actually reached the playlist; `None` until publishing ran.
    pub added: Option<usize>,
    pub processing_time: Option<Duration>,
    pub entries: Vec<ReportEntry>,
    pub errors: Vec<(DateTime<Local>, String)>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            total_queries: 0,
            found: 0,
            not_found: 0,
            duplicates_skipped: 0,
            playlist_id: None,
            playlist_title: None,
            added: None,
            processing_time: None,
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record_found(&mut self, query: &str, candidate: &Candidate) {
        self.record(query, Outcome::Found, Some(candidate), None);
    }

    pub fn record_not_found(&mut self, query: &str, detail: Option<String>) {
        self.record(query, Outcome::NotFound, None, detail);
    }

    pub fn record_duplicate(&mut self, query: &str, candidate: &Candidate) {
        self.record(
            query,
            Outcome::DuplicateSkipped,
            Some(candidate),
            Some("already in playlist".to_string()),
        );
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push((Local::now(), message.into()));
    }

    fn record(
        &mut self,
        query: &str,
        outcome: Outcome,
        candidate: Option<&Candidate>,
        detail: Option<String>,
    ) {
        match outcome {
            Outcome::Found => self.found += 1,
            Outcome::NotFound => self.not_found += 1,
            Outcome::DuplicateSkipped => self.duplicates_skipped += 1,
        }
        self.total_queries += 1;

        self.entries.push(ReportEntry {
            at: Local::now(),
            query: query.to_string(),
            outcome,
            track_id: candidate.map(|c| c.track_id.clone()),
            title: candidate.map(|c| c.title.clone()),
            artist: candidate.map(|c| c.artist.clone()),
            detail,
        });
    }

    pub fn is_consistent(&self) -> bool {
        self.found + self.not_found + self.duplicates_skipped == self.total_queries
    }

    pub fn queries_with(&self, outcome: Outcome) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome == outcome)
            .map(|e| e.query.as_str())
            .collect()
    }

    pub fn log_file_path(&self, dir: &Path) -> PathBuf {
        dir.join(utils::log_file_name(self.started_at))
    }

    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", RULE);
        let _ = writeln!(out, "TxtToYoutubeMusic EXECUTION SUMMARY");
        let _ = writeln!(out, "{}", RULE);
        if let Some(title) = &self.playlist_title {
            let _ = writeln!(out, "Playlist created: {}", title);
        }
        if let Some(id) = &self.playlist_id {
            let _ = writeln!(out, "Playlist ID: {}", id);
        }
        let _ = writeln!(out, "Total songs processed: {}", self.total_queries);
        let _ = writeln!(out, "Songs found: {} songs", self.found);
        let added = self.added.unwrap_or(0);
        let _ = writeln!(out, "Successfully added: {} songs", added);
        if self.playlist_id.is_some() && added < self.found {
            let _ = writeln!(out, "Failed to add: {} songs", self.found - added);
        }
        let _ = writeln!(out, "Songs not found: {} songs", self.not_found);
        let _ = writeln!(out, "Duplicates skipped: {} songs", self.duplicates_skipped);
        if let Some(elapsed) = self.processing_time {
            let _ = writeln!(
                out,
                "Song processing time: {}",
                utils::format_elapsed(elapsed)
            );
        }

        let skipped: Vec<SkippedTableRow> = self
            .entries
            .iter()
            .filter(|e| e.outcome != Outcome::Found)
            .map(|e| SkippedTableRow {
                query: e.query.clone(),
                outcome: e.outcome.to_string(),
                detail: e.detail.clone().unwrap_or_default(),
            })
            .collect();
        if !skipped.is_empty() {
            let _ = writeln!(out, "\nDetails:\n{}", Table::new(skipped));
        }

        if let Some(id) = &self.playlist_id {
            let _ = writeln!(out, "\nTo access your playlist:");
            let _ = writeln!(out, "{}", utils::playlist_url(id));
        }
        let _ = write!(out, "{}", RULE);
        out
    }

    /// Plain-text log: one timestamped line per outcome and per error.
    pub fn render_log(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} INFO Starting TxtToYoutubeMusic",
            self.started_at.format(TIMESTAMP)
        );

        for entry in &self.entries {
            let _ = write!(
                out,
                "{} {} \"{}\"",
                entry.at.format(TIMESTAMP),
                entry.outcome,
                entry.query
            );
            if let Some(track_id) = &entry.track_id {
                let _ = write!(out, " -> {}", track_id);
                match (&entry.title, &entry.artist) {
                    (Some(title), Some(artist)) if !artist.is_empty() => {
                        let _ = write!(out, " ({} by {})", title, artist);
                    }
                    (Some(title), _) => {
                        let _ = write!(out, " ({})", title);
                    }
                    _ => {}
                }
            }
            if let Some(detail) = &entry.detail {
                let _ = write!(out, ": {}", detail);
            }
            out.push('\n');
        }

        for (at, message) in &self.errors {
            let _ = writeln!(out, "{} ERROR {}", at.format(TIMESTAMP), message);
        }

        let _ = writeln!(
            out,
            "{} INFO total={} found={} added={} not_found={} duplicates_skipped={} playlist={}",
            Local::now().format(TIMESTAMP),
            self.total_queries,
            self.found,
            self.added.unwrap_or(0),
            self.not_found,
            self.duplicates_skipped,
            self.playlist_id.as_deref().unwrap_or("-")
        );
        out
    }

    /// Writes the log into `dir`, creating it when needed.
    pub async fn write_log(&self, dir: &Path) -> io::Result<PathBuf> {
        async_fs::create_dir_all(dir).await?;
        let path = self.log_file_path(dir);
        async_fs::write(&path, self.render_log()).await?;
        Ok(path)
    }

    /// Writes skipped duplicate queries to `path`, one per line.
    ///
    /// Returns `false` without touching the file when nothing was skipped.
    pub async fn write_duplicates(&self, path: &Path) -> io::Result<bool> {
        let duplicates = self.queries_with(Outcome::DuplicateSkipped);
        if duplicates.is_empty() {
            return Ok(false);
        }

        let mut content = duplicates.join("\n");
        content.push('\n');
        async_fs::write(path, content).await?;
        Ok(true)
    }
}
