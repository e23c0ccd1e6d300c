//! Session persisted as a readable JSON record on disk.
//!
//! Record layout: `{userId, nickname, role, token: {accessToken,
//! refreshToken}}`. The identity fields are written once, at save time,
//! from the access token's claims and are never re-derived afterwards.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;
use urlshort_core::models::token::TokenPair;
use urlshort_core::models::user::{Identity, Role};
use uuid::Uuid;

use super::{ClientSession, ClientSessionStore};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    user_id: String,
    nickname: String,
    role: Role,
    token: Option<TokenPair>,
}

impl StoredUser {
    fn into_session(self) -> Option<ClientSession> {
        let id = Uuid::parse_str(&self.user_id).ok()?;
        Some(ClientSession {
            identity: Identity {
                id,
                display_name: self.nickname,
                role: self.role,
            },
            tokens: self.token?,
        })
    }
}

impl From<&ClientSession> for StoredUser {
    fn from(session: &ClientSession) -> Self {
        Self {
            user_id: session.identity.id.to_string(),
            nickname: session.identity.display_name.clone(),
            role: session.identity.role,
            token: Some(session.tokens.clone()),
        }
    }
}

/// File-backed store. The record is cached in memory; writes go through a
/// temporary file and a rename so the file is never half-written.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    current: RwLock<Option<ClientSession>>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any existing record. An unreadable
    /// or corrupt record is treated as "no session".
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<StoredUser>(&bytes) {
                Ok(stored) => stored.into_session(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt session record");
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session record unreadable");
                None
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &ClientSession) -> ClientResult<()> {
        let json = serde_json::to_vec_pretty(&StoredUser::from(session))
            .map_err(|e| ClientError::Persist(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        write_owner_only(&tmp, &json).map_err(|e| ClientError::Persist(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| ClientError::Persist(e.to_string()))
    }
}

/// The record holds a plaintext refresh token: only the owner may read it.
fn write_owner_only(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; a leftover temp file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

impl ClientSessionStore for FileSessionStore {
    fn load(&self) -> Option<ClientSession> {
        self.current.read().clone()
    }

    fn save(&self, identity: Identity, tokens: TokenPair) -> ClientResult<()> {
        let session = ClientSession { identity, tokens };
        let mut current = self.current.write();
        let persisted = self.persist(&session);
        *current = Some(session);
        persisted
    }

    fn clear(&self) {
        let mut current = self.current.write();
        *current = None;
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "could not remove session record");
        }
    }
}
