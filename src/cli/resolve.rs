use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use chrono::{DateTime, Local};

use crate::{
    error::ConfigError,
    prompt::Console,
    types::{Privacy, RunConfig},
    utils,
};

pub const DEFAULT_INPUT_FILE: &str = "songs.txt";
pub const DEFAULT_AUTH_FILE: &str = "headers_auth.json";

/// Values taken from the command line before any prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub file: PathBuf,
    pub title: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<Privacy>,
    pub duplicates: bool,
    pub auth: PathBuf,
    pub non_interactive: bool,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_INPUT_FILE),
            title: None,
            description: None,
            privacy: None,
            duplicates: false,
            auth: PathBuf::from(DEFAULT_AUTH_FILE),
            non_interactive: false,
        }
    }
}

/// Builds the run configuration.
///
/// Each field comes from its flag when given, otherwise from a prompt when
/// the run is interactive, otherwise from its default. `default_privacy` is
/// the configured policy used before falling back to private.
pub fn resolve<R: BufRead, W: Write>(
    overrides: &Overrides,
    default_privacy: Option<Privacy>,
    now: DateTime<Local>,
    console: &mut Console<R, W>,
) -> Result<RunConfig, ConfigError> {
    let interactive = !overrides.non_interactive;
    let default_title = utils::default_playlist_title(now);

    let title = match overrides.title.as_deref() {
        Some(title) if title.trim().is_empty() => {
            return Err(ConfigError::Unresolved {
                field: "title",
                reason: "the playlist title must not be empty".to_string(),
            });
        }
        Some(title) => title.trim().to_string(),
        None if interactive => {
            let answer = console.ask(&format!("Enter playlist title [{}]: ", default_title))?;
            if answer.is_empty() { default_title } else { answer }
        }
        None => default_title,
    };
    if interactive {
        console.say(format!("Using playlist title: {}", title))?;
    }

    let description = match overrides.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => description.to_string(),
        _ if interactive => {
            let answer = console.ask(&format!("Enter playlist description [{}]: ", title))?;
            if answer.is_empty() { title.clone() } else { answer }
        }
        _ => title.clone(),
    };
    if interactive {
        console.say(format!("Using playlist description: {}", description))?;
    }

    let fallback_privacy = default_privacy.unwrap_or_default();
    let privacy = match overrides.privacy {
        Some(privacy) => privacy,
        None if interactive => {
            let prompt = format!(
                "Enter playlist visibility (public/private/unlisted) [{}]: ",
                fallback_privacy.as_api_str().to_ascii_lowercase()
            );
            let answer = console.ask(&prompt)?;
            let privacy = match Privacy::parse(&answer) {
                Some(privacy) => privacy,
                None if answer.is_empty() => fallback_privacy,
                None => {
                    console.say(format!(
                        "Invalid visibility option: '{}'. Using '{}' as default.",
                        answer,
                        fallback_privacy.as_api_str().to_ascii_lowercase()
                    ))?;
                    fallback_privacy
                }
            };
            console.say(format!("Setting playlist visibility to: {}", privacy))?;
            privacy
        }
        None => fallback_privacy,
    };

    let allow_duplicates = if overrides.duplicates {
        true
    } else if interactive {
        console.confirm("Allow duplicate songs in playlist? (y/n) [n]: ", false)?
    } else {
        false
    };

    Ok(RunConfig {
        input_file: overrides.file.clone(),
        title,
        description,
        privacy,
        allow_duplicates,
        auth_file: overrides.auth.clone(),
        interactive,
    })
}
