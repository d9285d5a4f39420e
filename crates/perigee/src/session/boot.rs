//! Boot script resolution.
//!
//! An explicit path wins and is used verbatim (after `~` expansion); a
//! missing file only shows up later as a spawn failure. Without one, the
//! current directory and then each ancestor is searched for
//! [`BOOT_FILE_NAME`].

use std::path::{Path, PathBuf};

use crate::error::SessionError;

pub const BOOT_FILE_NAME: &str = "BootTidal.hs";

pub fn resolve_boot_file(explicit: Option<&str>, start: &Path) -> Result<PathBuf, SessionError> {
    if let Some(path) = explicit.map(str::trim).filter(|path| !path.is_empty()) {
        return Ok(expand_home(path));
    }
    find_upwards(start, BOOT_FILE_NAME).ok_or_else(|| SessionError::BootFileNotFound {
        file_name: BOOT_FILE_NAME.to_string(),
        start: start.to_path_buf(),
    })
}

/// First `dir/file_name` that exists, walking from `start` to the root.
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Expand a bare `~` or a leading `~/` to the home directory. Other
/// users' homes (`~alice/...`) are left as written.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(['/', '\\']) => rest.trim_start_matches(['/', '\\']),
        _ => return PathBuf::from(path),
    };
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };
    if rest.is_empty() {
        home
    } else {
        home.join(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::{expand_home, find_upwards, resolve_boot_file, BOOT_FILE_NAME};
    use crate::error::SessionError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::test_utils::{env_lock, EnvVarGuard};

    #[test]
    fn finds_boot_file_three_levels_up() {
        let root = TempDir::new().expect("temp root");
        let cwd = root.path().join("a").join("b").join("c");
        fs::create_dir_all(&cwd).expect("create dirs");
        fs::write(root.path().join(BOOT_FILE_NAME), ":set prompt \"\"").expect("write boot");

        let resolved = resolve_boot_file(None, &cwd).expect("boot file");
        assert_eq!(resolved, root.path().join(BOOT_FILE_NAME));
    }

    #[test]
    fn nearest_boot_file_wins() {
        let root = TempDir::new().expect("temp root");
        let inner = root.path().join("project");
        fs::create_dir_all(&inner).expect("create dirs");
        fs::write(root.path().join(BOOT_FILE_NAME), "outer").expect("write outer");
        fs::write(inner.join(BOOT_FILE_NAME), "inner").expect("write inner");

        assert_eq!(
            find_upwards(&inner, BOOT_FILE_NAME),
            Some(inner.join(BOOT_FILE_NAME))
        );
    }

    #[test]
    fn missing_boot_file_is_reported() {
        let root = TempDir::new().expect("temp root");
        let cwd = root.path().join("x").join("y");
        fs::create_dir_all(&cwd).expect("create dirs");

        let err = resolve_boot_file(None, &cwd).expect_err("should not resolve");
        assert!(matches!(err, SessionError::BootFileNotFound { .. }));
    }

    #[test]
    fn explicit_path_is_used_verbatim() {
        let cwd = TempDir::new().expect("temp cwd");
        let resolved =
            resolve_boot_file(Some("/nowhere/Boot.hs"), cwd.path()).expect("explicit path");
        assert_eq!(resolved, PathBuf::from("/nowhere/Boot.hs"));
    }

    #[test]
    fn explicit_path_expands_home() {
        let _guard = env_lock();
        let home = TempDir::new().expect("temp home");
        let _home = EnvVarGuard::set("HOME", home.path().display().to_string());

        let resolved = resolve_boot_file(Some("~/tidal/Boot.hs"), Path::new("/")).expect("path");
        assert_eq!(resolved, home.path().join("tidal").join("Boot.hs"));
        assert_eq!(expand_home("relative/Boot.hs"), PathBuf::from("relative/Boot.hs"));
    }

    #[test]
    fn other_users_homes_are_not_expanded() {
        let _guard = env_lock();
        let home = TempDir::new().expect("temp home");
        let _home = EnvVarGuard::set("HOME", home.path().display().to_string());

        assert_eq!(expand_home("~alice/Boot.hs"), PathBuf::from("~alice/Boot.hs"));
        assert_eq!(expand_home("~"), home.path().to_path_buf());
        assert_eq!(expand_home("~/Boot.hs"), home.path().join("Boot.hs"));
    }
}
