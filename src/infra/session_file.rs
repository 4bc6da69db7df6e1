use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::domain::session::Session;
use crate::error::{AppError, AppResult};
use crate::services::SessionStore;

const SESSION_FILE_NAME: &str = "session.json";

/// Session persisted next to the config file by `helpdesk session login`.
pub struct FileSessionStore {
    file_path: PathBuf,
}

impl FileSessionStore {
    pub fn new(config_dir: &std::path::Path) -> Self {
        Self {
            file_path: config_dir.join(SESSION_FILE_NAME),
        }
    }

    fn read(&self) -> AppResult<Session> {
        match fs::read_to_string(&self.file_path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid session file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Session::anonymous()),
            Err(err) => Err(AppError::Io(err)),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn current(&self) -> Session {
        self.read().unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable session; continuing anonymously");
            Session::anonymous()
        })
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(session)
            .map_err(|err| AppError::Configuration(format!("failed to write session: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }

    fn logout(&self) -> AppResult<()> {
        match fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Io(err)),
        }
    }
}
