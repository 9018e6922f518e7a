#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::{self, Cursor, Write},
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use async_trait::async_trait;
use txttoytmusic::{
    config::{RetryPolicy, Settings},
    error::ApiError,
    prompt::Console,
    types::{Candidate, Credential, Privacy},
    ytmusic::{Connector, MusicCatalog, auth},
};

pub const GOOD_SAPISID: &str = "good-sapisid";

/// Scripted answer for one search query.
#[derive(Debug, Clone)]
pub enum Scripted {
    Found(Vec<Candidate>),
    Transient,
    AuthExpired,
    SignedOut,
}

#[derive(Default)]
pub struct FakeState {
    pub results: RefCell<HashMap<String, Scripted>>,
    pub searches: RefCell<Vec<String>>,
    pub created: RefCell<Vec<(String, String, Privacy)>>,
    pub added: RefCell<Vec<String>>,
    pub add_calls: Cell<u32>,
    pub add_allow_duplicates: RefCell<Vec<bool>>,
    pub conflicts_left: Cell<u32>,
    pub fail_create: Cell<bool>,
    pub fail_add: Cell<bool>,
    /// Fails every add call from this 1-based call number on.
    pub fail_add_from: Cell<Option<u32>>,
    pub probes: Cell<u32>,
}

impl FakeState {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn script(&self, query: &str, answer: Scripted) {
        self.results.borrow_mut().insert(query.to_string(), answer);
    }

    pub fn found(&self, query: &str, ids: &[&str]) {
        self.script(query, Scripted::Found(candidates(ids)));
    }
}

pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .enumerate()
        .map(|(rank, id)| Candidate {
            track_id: id.to_string(),
            title: format!("Title {}", id),
            artist: format!("Artist {}", id),
            rank,
        })
        .collect()
}

pub struct FakeCatalog {
    state: Rc<FakeState>,
    accepted: bool,
}

#[async_trait(?Send)]
impl MusicCatalog for FakeCatalog {
    async fn validate_session(&self) -> Result<(), ApiError> {
        self.state.probes.set(self.state.probes.get() + 1);
        if self.accepted {
            Ok(())
        } else {
            Err(ApiError::Unauthorized(401))
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>, ApiError> {
        self.state.searches.borrow_mut().push(query.to_string());
        match self.state.results.borrow().get(query).cloned() {
            Some(Scripted::Found(candidates)) => Ok(candidates),
            Some(Scripted::Transient) => Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
            Some(Scripted::AuthExpired) => Err(ApiError::Unauthorized(401)),
            Some(Scripted::SignedOut) => Err(ApiError::SignedOut),
            None => Ok(Vec::new()),
        }
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String, ApiError> {
        if self.state.fail_create.get() {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.state
            .created
            .borrow_mut()
            .push((title.to_string(), description.to_string(), privacy));
        Ok("PLfake".to_string())
    }

    async fn add_tracks(
        &self,
        _playlist_id: &str,
        track_ids: &[String],
        allow_duplicates: bool,
    ) -> Result<(), ApiError> {
        self.state.add_calls.set(self.state.add_calls.get() + 1);
        self.state
            .add_allow_duplicates
            .borrow_mut()
            .push(allow_duplicates);

        if self.state.conflicts_left.get() > 0 {
            self.state
                .conflicts_left
                .set(self.state.conflicts_left.get() - 1);
            return Err(ApiError::Conflict);
        }
        let failing_call = self
            .state
            .fail_add_from
            .get()
            .is_some_and(|from| self.state.add_calls.get() >= from);
        if self.state.fail_add.get() || failing_call {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.state.added.borrow_mut().extend_from_slice(track_ids);
        Ok(())
    }
}

/// Accepts credentials whose SAPISID equals [`GOOD_SAPISID`].
pub struct FakeConnector {
    pub state: Rc<FakeState>,
}

impl FakeConnector {
    pub fn new(state: &Rc<FakeState>) -> Self {
        Self {
            state: Rc::clone(state),
        }
    }
}

impl Connector for FakeConnector {
    type Catalog = FakeCatalog;

    fn connect(&self, credential: &Credential) -> Result<FakeCatalog, ApiError> {
        auth::check_credential(credential).map_err(ApiError::InvalidCredential)?;
        Ok(FakeCatalog {
            state: Rc::clone(&self.state),
            accepted: auth::sapisid(credential) == Some(GOOD_SAPISID),
        })
    }
}

pub fn credential_json(sapisid: &str) -> String {
    format!(
        "{{\n  \"cookie\": \"PREF=f6=8; SAPISID={0}; __Secure-3PAPISID={0}\",\n  \"user-agent\": \"test-agent\"\n}}",
        sapisid
    )
}

pub fn raw_headers(sapisid: &str) -> String {
    format!(
        "accept: */*\ncookie: SAPISID={0}; __Secure-3PAPISID={0}\nx-goog-authuser: 0\n\n",
        sapisid
    )
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn test_settings(dir: &Path) -> Settings {
    Settings {
        log_dir: dir.join("logs"),
        duplicates_file: Some(dir.join("songs_duplicates.txt")),
        default_privacy: None,
        retry: RetryPolicy {
            max_retries: 2,
            base_delay: Duration::ZERO,
        },
        show_progress: false,
        open_browser: false,
    }
}

pub fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
    Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

/// Output that breaks as soon as a line containing `fail_on` is written.
pub struct FailingWriter {
    pub fail_on: &'static str,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if String::from_utf8_lossy(buf).contains(self.fail_on) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn failing_console(
    input: &str,
    fail_on: &'static str,
) -> Console<Cursor<Vec<u8>>, FailingWriter> {
    Console::new(
        Cursor::new(input.as_bytes().to_vec()),
        FailingWriter { fail_on },
    )
}
