use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::PathBuf,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Storage key the session lives under.
pub const SESSION_KEY: &str = "htn_user";

const DEMO_USERNAME: &str = "hacker";
const DEMO_PASSWORD: &str = "htn2026";

/// String key-value persistence in the spirit of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(io::Error::from),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        let contents = serde_json::to_string_pretty(entries).map_err(io::Error::from)?;
        fs::write(&self.path, contents)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub is_authenticated: bool,
}

/// The visitor's session, passed explicitly to whoever needs the
/// authentication flag.
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
    current: Option<Session>,
}

impl<S: KeyValueStore> SessionContext<S> {
    /// Rehydrates from `store`. Anything missing or unreadable means an
    /// anonymous visitor.
    pub fn restore(store: S) -> Self {
        let current = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!("Ignoring unreadable session: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Failed to read session storage: {err}");
                None
            }
        };

        Self { store, current }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|session| session.is_authenticated)
    }

    /// Checks the fixed demo pair. This is a gate for demo content, not a
    /// security boundary.
    pub fn login(&mut self, username: &str, password: &str) -> Result<&Session, SessionError> {
        if username != DEMO_USERNAME || password != DEMO_PASSWORD {
            return Err(SessionError::InvalidCredentials);
        }

        self.start(username)
    }

    pub fn demo_login(&mut self) -> Result<&Session, SessionError> {
        self.start(DEMO_USERNAME)
    }

    fn start(&mut self, username: &str) -> Result<&Session, SessionError> {
        let session = Session {
            username: username.to_string(),
            is_authenticated: true,
        };
        self.store
            .set(SESSION_KEY, serde_json::to_string(&session)?)?;
        info!("Logged in as {username}");

        Ok(&*self.current.insert(session))
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }
}
