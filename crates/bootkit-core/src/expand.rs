//! `~` and environment-variable expansion for path-like config values
//!
//! Expansion is delegated to `shellexpand`: `$NAME` / `${NAME}` references
//! first, then a leading `~` or `~/`, then lexical cleaning. `~user` is left
//! untouched. A reference to an unset variable is an error rather than an
//! empty substitution, so a typo never silently turns into a relative path.

use crate::error::{BootstrapError, Result};
use crate::home::home_dir;
use std::path::{Component, Path, PathBuf};

/// Expand a path string against the process environment and home directory.
///
/// Empty input yields an empty path without touching the environment.
///
/// # Errors
///
/// - [`BootstrapError::UnsetVariable`] when a referenced variable is unset
/// - [`BootstrapError::HomeDirectoryUnavailable`] when the input needs a `~`
///   substitution and no home directory exists
pub fn expand_path(input: &str) -> Result<PathBuf> {
    expand_path_with(input, |name| std::env::var(name).ok(), home_dir)
}

/// Expand a path string with an explicit variable lookup and home provider.
///
/// `home` is only called when a `~` substitution is actually required.
pub fn expand_path_with<V, H>(input: &str, lookup: V, home: H) -> Result<PathBuf>
where
    V: Fn(&str) -> Option<String>,
    H: FnOnce() -> Result<PathBuf>,
{
    if input.is_empty() {
        return Ok(PathBuf::new());
    }

    let mut home_error = None;
    let expanded = shellexpand::full_with_context(
        input,
        || match home().and_then(utf8_home) {
            Ok(dir) => Some(dir),
            Err(e) => {
                home_error = Some(e);
                None
            }
        },
        |name: &str| lookup(name).map(Some).ok_or(()),
    )
    .map_err(|e| BootstrapError::UnsetVariable {
        value: input.to_string(),
        variable: e.var_name,
    })?;

    if let Some(e) = home_error {
        return Err(e);
    }
    Ok(clean_path(&PathBuf::from(expanded.into_owned())))
}

fn utf8_home(dir: PathBuf) -> Result<String> {
    dir.into_os_string()
        .into_string()
        .map_err(|_| BootstrapError::HomeDirectoryUnavailable)
}

/// Lexically clean a path: drop `.`, fold `..` into its parent where
/// possible, collapse repeated separators. Never touches the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }

    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against the current directory, then clean it.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    clean_path(&absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;

    fn vars(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/u".to_string()),
            "XDG_DATA_HOME" => Some("/data".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    fn home() -> Result<PathBuf> {
        Ok(PathBuf::from("/home/u"))
    }

    fn no_home() -> Result<PathBuf> {
        Err(BootstrapError::HomeDirectoryUnavailable)
    }

    #[test]
    fn test_tilde_slash_expands_to_home() {
        let path = expand_path_with("~/logs/app.log", vars, home).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/logs/app.log"));
    }

    #[test]
    fn test_bare_tilde_is_home() {
        assert_eq!(expand_path_with("~", vars, home).unwrap(), PathBuf::from("/home/u"));
    }

    #[test]
    fn test_dollar_var_expands() {
        let path = expand_path_with("$HOME/x", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/x"));
    }

    #[test]
    fn test_braced_var_expands() {
        let path = expand_path_with("${XDG_DATA_HOME}/bootkit", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("/data/bootkit"));
    }

    #[test]
    fn test_empty_input_is_empty_without_home_lookup() {
        assert_eq!(expand_path_with("", vars, no_home).unwrap(), PathBuf::new());
    }

    #[test]
    fn test_tilde_user_left_untouched() {
        let path = expand_path_with("~alice/notes", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("~alice/notes"));
    }

    #[test]
    fn test_tilde_without_home_fails() {
        let err = expand_path_with("~/x", vars, no_home).unwrap_err();
        assert!(matches!(err, BootstrapError::HomeDirectoryUnavailable));
    }

    #[test]
    fn test_env_expansion_happens_before_tilde() {
        let lookup = |name: &str| (name == "TILDE").then(|| "~".to_string());
        let path = expand_path_with("$TILDE/cache", lookup, home).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/cache"));
    }

    #[test]
    fn test_unset_var_is_an_error_naming_it() {
        let err = expand_path_with("$MISSING/data", vars, home).unwrap_err();
        match err {
            BootstrapError::UnsetVariable { value, variable } => {
                assert_eq!(value, "$MISSING/data");
                assert_eq!(variable, "MISSING");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_but_empty_var_expands_to_nothing() {
        let path = expand_path_with("/a/${EMPTY}b", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("/a/b"));
    }

    #[test]
    fn test_trailing_dollar_kept() {
        let path = expand_path_with("/cost$", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("/cost$"));
    }

    #[test]
    fn test_result_is_cleaned() {
        let path = expand_path_with("$HOME//a/./b/../c", vars, no_home).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/a/c"));
    }

    #[test]
    fn test_clean_path_edge_cases() {
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("")), PathBuf::new());
    }

    #[test]
    fn test_absolutize_relative_path() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("sub/./file")), clean_path(&cwd.join("sub/file")));
    }
}
