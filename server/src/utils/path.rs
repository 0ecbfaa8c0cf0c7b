//! Path helpers for config and data locations

use std::path::PathBuf;

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve a user-supplied path to an absolute one.
///
/// A leading `~` is replaced with the home directory and relative paths
/// are joined onto the working directory. Components such as `..` are
/// kept as written. Blank input resolves to the working directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.is_empty() {
        return current_dir();
    }

    let home_relative = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };
    let expanded = match (home_relative, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        current_dir().join(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(expand_path("/var/lib/hbc"), PathBuf::from("/var/lib/hbc"));
        assert_eq!(expand_path("  /tmp/hbc.db "), PathBuf::from("/tmp/hbc.db"));
    }

    #[test]
    fn test_relative_path_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("./hbc.db"), cwd.join("./hbc.db"));
        assert_eq!(expand_path("data/311"), cwd.join("data/311"));
        assert_eq!(expand_path(".."), cwd.join(".."));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("~"), home);
        assert_eq!(expand_path("~/.hbc/hbc.json"), home.join(".hbc/hbc.json"));
    }

    #[test]
    fn test_blank_is_cwd() {
        assert_eq!(expand_path("   "), std::env::current_dir().unwrap());
    }
}
