use std::{
    io::{BufRead, ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{ApiError, CredentialError},
    prompt::Console,
    types::Credential,
    ytmusic::{Connector, MusicCatalog, auth},
};

/// Attempts the operator gets to paste usable headers.
pub const MAX_CAPTURE_ATTEMPTS: u32 = 3;

const SIGN_IN_URL: &str = "https://music.youtube.com";

/// Persisted browser headers for one account.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and checks the stored credential without contacting the service.
    pub async fn load(&self) -> Result<Credential, CredentialError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CredentialError::Missing {
                    path: self.path.clone(),
                    reason: "file does not exist".to_string(),
                });
            }
            Err(e) => return Err(self.invalid(e.to_string())),
        };

        let stored: Credential =
            serde_json::from_str(&content).map_err(|e| self.invalid(e.to_string()))?;
        let credential = Credential {
            headers: stored
                .headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        };

        auth::check_credential(&credential).map_err(|reason| self.invalid(reason))?;
        Ok(credential)
    }

    /// Writes the whole credential, replacing any previous file.
    pub async fn persist(&self, credential: &Credential) -> Result<(), CredentialError> {
        let persist_err = |source| CredentialError::Persist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await.map_err(persist_err)?;
        }

        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| persist_err(std::io::Error::other(e)))?;
        async_fs::write(&self.path, json).await.map_err(persist_err)
    }

    /// Returns a validated credential and the catalog session opened with it.
    ///
    /// A stored credential is probed against the service first. When it is
    /// missing, malformed or rejected, interactive runs fall back to the
    /// capture flow; non-interactive runs fail with
    /// [`CredentialError::Missing`].
    pub async fn acquire<C, R, W>(
        &self,
        connector: &C,
        interactive: bool,
        open_browser: bool,
        console: &mut Console<R, W>,
    ) -> Result<(Credential, C::Catalog), CredentialError>
    where
        C: Connector,
        R: BufRead,
        W: Write,
    {
        let failure = match self.load().await {
            Ok(credential) => match connect_and_probe(connector, &credential).await {
                Ok(catalog) => {
                    tracing::debug!("stored credential accepted");
                    return Ok((credential, catalog));
                }
                Err(e) => format!("the stored headers were rejected: {}", e),
            },
            Err(e) => e.to_string(),
        };

        if !interactive {
            return Err(CredentialError::Missing {
                path: self.path.clone(),
                reason: failure,
            });
        }

        console.say(&failure).map_err(aborted)?;
        if !console
            .confirm("Would you like to set up authentication now? (y/n) [y]: ", true)
            .map_err(aborted)?
        {
            return Err(CredentialError::CaptureAborted(
                "setup declined; create the authentication file manually".to_string(),
            ));
        }

        print_instructions(console, &self.path).map_err(aborted)?;
        if open_browser && webbrowser::open(SIGN_IN_URL).is_err() {
            tracing::debug!("could not open a browser at {}", SIGN_IN_URL);
        }

        CaptureFlow::new(self, connector, MAX_CAPTURE_ATTEMPTS)
            .run(console)
            .await
    }

    fn invalid(&self, reason: String) -> CredentialError {
        CredentialError::Invalid {
            path: self.path.clone(),
            reason,
        }
    }
}

/// The operator's terminal is gone, so the dialogue cannot continue.
fn aborted(e: std::io::Error) -> CredentialError {
    CredentialError::CaptureAborted(e.to_string())
}

async fn connect_and_probe<C: Connector>(
    connector: &C,
    credential: &Credential,
) -> Result<C::Catalog, ApiError> {
    let catalog = connector.connect(credential)?;
    catalog.validate_session().await?;
    Ok(catalog)
}

fn print_instructions<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    path: &Path,
) -> std::io::Result<()> {
    console.say("")?;
    console.say(format!("1. Open YouTube Music in your browser ({})", SIGN_IN_URL))?;
    console.say("2. Make sure you're logged in to your account")?;
    console.say("3. Open developer tools (F12 or Ctrl+Shift+I) and go to the Network tab")?;
    console.say("4. Find an authenticated POST request to 'browse' or 'next'")?;
    console.say("5. Copy its request headers and paste them below")?;
    console.say(format!(
        "The headers will be saved to '{}'.\n",
        path.display()
    ))
}

/// States of the interactive header capture.
pub enum CaptureState<K> {
    AwaitingInput { attempt: u32 },
    Validating { attempt: u32, credential: Credential },
    Persisted { credential: Credential, catalog: K },
    Aborted { reason: String },
}

impl<K> CaptureState<K> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureState::Persisted { .. } | CaptureState::Aborted { .. }
        )
    }
}

/// Bounded paste/parse/probe loop that ends persisted or aborted.
pub struct CaptureFlow<'a, C> {
    store: &'a CredentialStore,
    connector: &'a C,
    max_attempts: u32,
}

impl<'a, C: Connector> CaptureFlow<'a, C> {
    pub fn new(store: &'a CredentialStore, connector: &'a C, max_attempts: u32) -> Self {
        Self {
            store,
            connector,
            max_attempts,
        }
    }

    pub fn initial_state(&self) -> CaptureState<C::Catalog> {
        CaptureState::AwaitingInput { attempt: 1 }
    }

    pub async fn run<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<(Credential, C::Catalog), CredentialError> {
        let mut state = self.initial_state();
        loop {
            state = match state {
                CaptureState::Persisted {
                    credential,
                    catalog,
                } => return Ok((credential, catalog)),
                CaptureState::Aborted { reason } => {
                    return Err(CredentialError::CaptureAborted(reason));
                }
                other => self.advance(other, console).await?,
            };
        }
    }

    /// Performs one transition. Terminal states are returned unchanged.
    ///
    /// Writing the credential file or the dialogue output can fail; everything
    /// else moves the flow to another state.
    pub async fn advance<R: BufRead, W: Write>(
        &self,
        state: CaptureState<C::Catalog>,
        console: &mut Console<R, W>,
    ) -> Result<CaptureState<C::Catalog>, CredentialError> {
        let next = match state {
            CaptureState::AwaitingInput { attempt } if attempt > self.max_attempts => {
                CaptureState::Aborted {
                    reason: format!("no valid headers after {} attempts", self.max_attempts),
                }
            }
            CaptureState::AwaitingInput { attempt } => self.await_input(attempt, console),
            CaptureState::Validating {
                attempt,
                credential,
            } => match connect_and_probe(self.connector, &credential).await {
                Ok(catalog) => {
                    self.store.persist(&credential).await?;
                    console
                        .say(format!(
                            "Authentication file '{}' created successfully!",
                            self.store.path().display()
                        ))
                        .map_err(aborted)?;
                    CaptureState::Persisted {
                        credential,
                        catalog,
                    }
                }
                Err(e) => {
                    console
                        .say(format!("YouTube Music rejected these headers: {}", e))
                        .map_err(aborted)?;
                    CaptureState::AwaitingInput {
                        attempt: attempt + 1,
                    }
                }
            },
            terminal => terminal,
        };
        Ok(next)
    }

    fn await_input<R: BufRead, W: Write>(
        &self,
        attempt: u32,
        console: &mut Console<R, W>,
    ) -> CaptureState<C::Catalog> {
        let prompt = format!(
            "Attempt {}/{}: paste the request headers, then an empty line:",
            attempt, self.max_attempts
        );
        let raw = match console.say(prompt).and_then(|_| console.read_block()) {
            Ok(raw) => raw,
            Err(e) => {
                return CaptureState::Aborted {
                    reason: e.to_string(),
                };
            }
        };

        if raw.trim().is_empty() {
            return CaptureState::Aborted {
                reason: "no headers entered".to_string(),
            };
        }

        match auth::parse_raw_headers(&raw) {
            Ok(credential) => CaptureState::Validating {
                attempt,
                credential,
            },
            Err(reason) => {
                match console.say(format!("Could not use the pasted headers: {}", reason)) {
                    Ok(()) => CaptureState::AwaitingInput {
                        attempt: attempt + 1,
                    },
                    Err(e) => CaptureState::Aborted {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }
}
