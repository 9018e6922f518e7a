use std::{
    collections::HashSet,
    future::{self, Future},
    io::{BufRead, Write},
    time::Instant,
};

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    cli::resolve::{Overrides, resolve},
    config::Settings,
    error::{PublishError, RunError},
    info,
    management::{CredentialStore, Publisher, RunReport, queries},
    prompt::Console,
    selection::{Selection, select},
    success,
    types::{Candidate, RunConfig, SelectedTrack},
    warning,
    ytmusic::{Connector, MusicCatalog},
};

/// Runs one text-file-to-playlist conversion from start to finish.
///
/// The report is always emitted (summary, log file, duplicates list), also
/// when the run stops on a fatal error; in that case the error text is part
/// of the log and the error is returned.
pub async fn run<C, R, W>(
    overrides: &Overrides,
    connector: &C,
    console: &mut Console<R, W>,
    settings: &Settings,
) -> Result<RunReport, RunError>
where
    C: Connector,
    R: BufRead,
    W: Write,
{
    run_until(overrides, connector, console, settings, future::pending()).await
}

/// Like [`run`], but stops with [`RunError::Cancelled`] once `shutdown`
/// completes.
///
/// `shutdown` is only watched after the prompts are done, while queries are
/// loaded, searched and published. The report is emitted either way.
pub async fn run_until<C, R, W, F>(
    overrides: &Overrides,
    connector: &C,
    console: &mut Console<R, W>,
    settings: &Settings,
    shutdown: F,
) -> Result<RunReport, RunError>
where
    C: Connector,
    R: BufRead,
    W: Write,
    F: Future<Output = ()>,
{
    let mut report = RunReport::new(Local::now());

    let result = execute(overrides, connector, console, settings, shutdown, &mut report).await;
    if let Err(e) = &result {
        report.record_error(e.to_string());
    }

    emit(&report, settings).await;
    result.map(|_| report)
}

async fn execute<C, R, W, F>(
    overrides: &Overrides,
    connector: &C,
    console: &mut Console<R, W>,
    settings: &Settings,
    shutdown: F,
    report: &mut RunReport,
) -> Result<(), RunError>
where
    C: Connector,
    R: BufRead,
    W: Write,
    F: Future<Output = ()>,
{
    let config = resolve(
        overrides,
        settings.default_privacy,
        report.started_at,
        console,
    )?;
    tracing::debug!("resolved configuration: {:?}", config);

    info!("Initializing YouTube Music API...");
    let store = CredentialStore::new(&config.auth_file);
    let (_, catalog) = store
        .acquire(connector, config.interactive, settings.open_browser, console)
        .await?;
    success!("YouTube Music API initialized successfully.");

    tokio::select! {
        biased;
        _ = shutdown => Err(RunError::Cancelled),
        result = process(&catalog, &config, settings, report) => result,
    }
}

async fn process<K: MusicCatalog>(
    catalog: &K,
    config: &RunConfig,
    settings: &Settings,
    report: &mut RunReport,
) -> Result<(), RunError> {
    let queries = queries::load(&config.input_file).await?;
    info!(
        "Found {} song queries in {}",
        queries.len(),
        config.input_file.display()
    );
    info!("Duplicate songs allowed: {}", config.allow_duplicates);

    let processing_started = Instant::now();
    let selected = search_all(
        catalog,
        &queries,
        config.allow_duplicates,
        settings.show_progress,
        report,
    )
    .await?;

    let published = publish(catalog, config, &selected, settings, report).await;
    report.processing_time = Some(processing_started.elapsed());
    published
}

/// Searches every query in file order and selects at most one track each.
///
/// Search failures only cost the query they belong to, except a rejected
/// session which ends the run.
async fn search_all<K: MusicCatalog>(
    catalog: &K,
    queries: &[String],
    allow_duplicates: bool,
    show_progress: bool,
    report: &mut RunReport,
) -> Result<Vec<SelectedTrack>, RunError> {
    let total = queries.len();
    let pb = if show_progress {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut seen: HashSet<String> = HashSet::new();
    let mut selected: Vec<SelectedTrack> = Vec::new();

    for (idx, query) in queries.iter().enumerate() {
        pb.set_message(format!("Song {}/{}", idx + 1, total));

        let candidates = match catalog.search(query).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_auth() => {
                pb.finish_and_clear();
                return Err(RunError::AuthExpired(e));
            }
            Err(e) => {
                tracing::debug!("search for {:?} failed: {}", query, e);
                pb.suspend(|| warning!("Not found: {} ({})", query, e));
                report.record_not_found(query, Some(e.to_string()));
                pb.inc(1);
                continue;
            }
        };

        match select(query, &candidates, &mut seen, allow_duplicates) {
            Selection::Selected { track, candidate } => {
                pb.suspend(|| success!("Found: {}", describe(&candidate)));
                report.record_found(query, &candidate);
                selected.push(track);
            }
            Selection::DuplicateSkipped(candidate) => {
                pb.suspend(|| warning!("Duplicate: {}", query));
                report.record_duplicate(query, &candidate);
            }
            Selection::NotFound => {
                pb.suspend(|| warning!("Not found: {}", query));
                report.record_not_found(query, None);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Unique songs tracked: {}", seen.len());
    Ok(selected)
}

async fn publish<K: MusicCatalog>(
    catalog: &K,
    config: &RunConfig,
    selected: &[SelectedTrack],
    settings: &Settings,
    report: &mut RunReport,
) -> Result<(), RunError> {
    info!("Creating playlist...");
    let track_ids: Vec<String> = selected.iter().map(|t| t.track_id.clone()).collect();

    let result = Publisher::new(catalog, settings.retry)
        .publish(
            &config.title,
            &config.description,
            config.privacy,
            &track_ids,
            config.allow_duplicates,
        )
        .await;

    match result {
        Ok(playlist_id) => {
            success!(
                "Playlist '{}' created successfully with ID: {}",
                config.title,
                playlist_id
            );
            report.playlist_title = Some(config.title.clone());
            report.playlist_id = Some(playlist_id);
            report.added = Some(track_ids.len());
            Ok(())
        }
        Err(e) => {
            if let PublishError::TracksAddFailed {
                playlist_id, added, ..
            } = &e
            {
                warning!(
                    "Only {} of {} songs were added to playlist {}",
                    added,
                    track_ids.len(),
                    playlist_id
                );
                report.playlist_title = Some(config.title.clone());
                report.playlist_id = Some(playlist_id.clone());
                report.added = Some(*added);
            }
            Err(e.into())
        }
    }
}

/// Prints the summary and writes the log and duplicates files.
///
/// Nothing here can fail the run; write errors become warnings.
async fn emit(report: &RunReport, settings: &Settings) {
    if report.total_queries > 0 || report.playlist_id.is_some() {
        println!("{}", report.render_summary());
    }

    match report.write_log(&settings.log_dir).await {
        Ok(path) => info!("Log written to {}", path.display()),
        Err(e) => warning!("Could not write log file: {}", e),
    }

    if let Some(path) = &settings.duplicates_file {
        match report.write_duplicates(path).await {
            Ok(true) => info!("Duplicate songs have been saved to '{}'", path.display()),
            Ok(false) => {}
            Err(e) => warning!("Could not save duplicates list: {}", e),
        }
    }
}

fn describe(candidate: &Candidate) -> String {
    if candidate.artist.is_empty() {
        candidate.title.clone()
    } else {
        format!("{} by {}", candidate.title, candidate.artist)
    }
}
