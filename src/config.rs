//! Saved command-line defaults.
//!
//! Flags live as whitespace-separated tokens in a global config file and an
//! optional `.gistpanerc` in the working directory. The same token parser
//! reads both files and the raw command line, so anything accepted on the
//! command line can be saved as a default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub ephemeral: bool,
    pub no_default_gist: bool,
    pub store: Option<PathBuf>,
    pub default_gist: Option<String>,
    pub api_base: Option<String>,
    pub min_pane_width: Option<u16>,
    pub print_command: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets. Switches are or-ed, valued options from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            ephemeral: self.ephemeral || other.ephemeral,
            no_default_gist: self.no_default_gist || other.no_default_gist,
            store: other.store.clone().or_else(|| self.store.clone()),
            default_gist: other
                .default_gist
                .clone()
                .or_else(|| self.default_gist.clone()),
            api_base: other.api_base.clone().or_else(|| self.api_base.clone()),
            min_pane_width: other.min_pane_width.or(self.min_pane_width),
            print_command: other
                .print_command
                .clone()
                .or_else(|| self.print_command.clone()),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(local_override_path, |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".gistpanerc")
}

/// Default location of the persisted document state.
pub fn default_store_path() -> PathBuf {
    data_dir().map_or_else(
        || PathBuf::from(".gistpane-state.json"),
        |dir| dir.join("state.json"),
    )
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join("gistpane"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("gistpane")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(|xdg| PathBuf::from(xdg).join("gistpane"))
            .or_else(|| {
                std::env::var_os("HOME")
                    .map(|home| PathBuf::from(home).join(".config").join("gistpane"))
            })
    }
}

fn data_dir() -> Option<PathBuf> {
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return Some(PathBuf::from(xdg).join("gistpane"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("gistpane"),
            );
        }
    }
    config_dir()
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# gistpane defaults (saved with --save)".to_string()];
    if flags.ephemeral {
        lines.push("--ephemeral".to_string());
    }
    if flags.no_default_gist {
        lines.push("--no-default-gist".to_string());
    }
    if let Some(store) = &flags.store {
        lines.push(format!("--store {}", store.display()));
    }
    if let Some(gist) = &flags.default_gist {
        lines.push(format!("--default-gist {gist}"));
    }
    if let Some(base) = &flags.api_base {
        lines.push(format!("--api-base {base}"));
    }
    if let Some(width) = flags.min_pane_width {
        lines.push(format!("--min-pane-width {width}"));
    }
    if let Some(command) = &flags.print_command {
        lines.push(format!("--print-command {command}"));
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", log.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of `tokens`, ignoring everything else.
///
/// Valued flags accept both `--flag value` and `--flag=value`. Unparseable
/// values are dropped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--ephemeral" => {
                flags.ephemeral = true;
                i += 1;
                continue;
            }
            "--no-default-gist" => {
                flags.no_default_gist = true;
                i += 1;
                continue;
            }
            _ => {}
        }

        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if !VALUED_FLAGS.contains(&name) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            apply_valued_flag(&mut flags, name, value);
        }
        i += 1;
    }
    flags
}

const VALUED_FLAGS: &[&str] = &[
    "--store",
    "--default-gist",
    "--api-base",
    "--min-pane-width",
    "--print-command",
    "--export-dir",
    "--log-file",
];

fn apply_valued_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--store" => flags.store = Some(PathBuf::from(value)),
        "--default-gist" => flags.default_gist = Some(value.to_string()),
        "--api-base" => flags.api_base = Some(value.to_string()),
        "--min-pane-width" => flags.min_pane_width = value.parse().ok(),
        "--print-command" => flags.print_command = Some(value.to_string()),
        "--export-dir" => flags.export_dir = Some(PathBuf::from(value)),
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "gistpane",
            "--ephemeral",
            "--no-default-gist",
            "--default-gist",
            "abc123",
            "--min-pane-width=30",
            "--export-dir",
            "/tmp/out",
            "--log-file=gistpane.log",
            "https://gist.github.com/octo/def456",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.ephemeral);
        assert!(flags.no_default_gist);
        assert_eq!(flags.default_gist.as_deref(), Some("abc123"));
        assert_eq!(flags.min_pane_width, Some(30));
        assert_eq!(flags.export_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(flags.log_file, Some(PathBuf::from("gistpane.log")));
        assert_eq!(flags.store, None);
    }

    #[test]
    fn test_parse_flag_tokens_drops_bad_width_and_dangling_flag() {
        let flags = parse_flag_tokens(&tokens(&["--min-pane-width", "wide", "--store"]));
        assert_eq!(flags.min_pane_width, None);
        assert_eq!(flags.store, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            ephemeral: true,
            default_gist: Some("from-file".to_string()),
            min_pane_width: Some(25),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            default_gist: Some("from-cli".to_string()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.ephemeral);
        assert_eq!(merged.default_gist.as_deref(), Some("from-cli"));
        assert_eq!(merged.min_pane_width, Some(25));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".gistpanerc");
        let flags = ConfigFlags {
            ephemeral: true,
            no_default_gist: true,
            store: Some(PathBuf::from("state.json")),
            default_gist: Some("abc123".to_string()),
            api_base: Some("http://localhost:8080".to_string()),
            min_pane_width: Some(24),
            print_command: Some("lpr".to_string()),
            export_dir: Some(PathBuf::from("exports")),
            log_file: Some(PathBuf::from("gistpane.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
