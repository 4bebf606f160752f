use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".expense_core";
const USERS_DIR: &str = "users";
const SESSION_FILE: &str = "session.json";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the application data directory.
pub const HOME_ENV: &str = "EXPENSE_CORE_HOME";

/// Returns the application-specific data directory, defaulting to `~/.expense_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one JSON document per user.
pub fn users_dir_in(base: &Path) -> PathBuf {
    base.join(USERS_DIR)
}

/// Path to the session cache (current user id only).
pub fn session_file_in(base: &Path) -> PathBuf {
    base.join(SESSION_FILE)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Maps a user id onto a file stem that is safe on every platform.
///
/// Case is preserved because identity-provider user ids are case-sensitive.
pub fn canonical_user_key(user_id: &str) -> String {
    let sanitized: String = user_id
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "user".into()
    } else {
        sanitized
    }
}

/// Returns `path` with `.tmp` appended to its extension, used for atomic writes.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
