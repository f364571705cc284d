//! Command-line flags, the optional config file and their resolution.
//!
//! Precedence is flags, then `config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use sqlpad_core::persist::DEFAULT_SAVE_DELAY;
use sqlpad_core::session::DEFAULT_LINE_WIDTH;
use tracing::warn;

const APP_DIR: &str = "sqlpad";

/// sqlpad - SQL*Plus-style console over an embedded database
#[derive(Parser, Debug, Default)]
#[command(name = "sqlpad")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Force vi editing mode
    #[arg(long, conflicts_with = "emacs")]
    pub vi: bool,

    /// Force emacs editing mode
    #[arg(long)]
    pub emacs: bool,

    /// Output line width
    #[arg(long)]
    pub linesize: Option<usize>,

    /// Save the session to this HTTP endpoint instead of a local file
    #[arg(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Session id used with --remote; generated once and kept otherwise
    #[arg(long, requires = "remote")]
    pub session_id: Option<String>,

    /// Run without saving the session anywhere
    #[arg(long, conflicts_with = "remote")]
    pub no_save: bool,

    /// Quiet period before changes are saved
    #[arg(long, value_name = "MS")]
    pub save_delay_ms: Option<u64>,

    /// Load a database file into the session at startup
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Write the database to this file on exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Config file [default: <config dir>/sqlpad/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub edit_mode: Option<EditMode>,
    pub linesize: Option<usize>,
    pub save: Option<bool>,
    pub save_delay_ms: Option<u64>,
    pub remote: Option<String>,
    pub session_id: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl FileConfig {
    /// Load `path`. A missing file is an empty config unless it was named
    /// explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default())
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[serde(alias = "vim")]
    Vi,
    Emacs,
}

/// Where the session is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChoice {
    None,
    File(PathBuf),
    Remote {
        url: String,
        session_id: Option<String>,
        /// Where a generated session id is kept.
        identity_file: Option<PathBuf>,
    },
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub edit_mode: EditMode,
    pub line_width: usize,
    pub store: StoreChoice,
    pub save_delay: Duration,
    pub import: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub history_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from flags, the config file and the environment.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let file = match (&args.config, default_config_path()) {
            (Some(path), _) => FileConfig::load(path, true)?,
            (None, Some(path)) => FileConfig::load(&path, false)?,
            (None, None) => FileConfig::default(),
        };
        let data_dir = dirs::data_local_dir().map(|dir| dir.join(APP_DIR));
        Self::from_parts(args, file, data_dir, detect_edit_mode)
    }

    /// Merge flags over file settings over defaults. `detect` supplies the
    /// edit mode when neither names one.
    pub fn from_parts(
        args: &Args,
        file: FileConfig,
        data_dir: Option<PathBuf>,
        detect: impl FnOnce() -> EditMode,
    ) -> Result<Self, ConfigError> {
        let edit_mode = if args.vi {
            EditMode::Vi
        } else if args.emacs {
            EditMode::Emacs
        } else {
            file.edit_mode.unwrap_or_else(detect)
        };

        let line_width = args
            .linesize
            .or(file.linesize)
            .unwrap_or(DEFAULT_LINE_WIDTH);
        if line_width == 0 {
            return Err(ConfigError::Invalid(
                "linesize must be a positive integer".to_string(),
            ));
        }

        let save_delay = args
            .save_delay_ms
            .or(file.save_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SAVE_DELAY);

        let save = !args.no_save && file.save.unwrap_or(true);
        let remote = args.remote.clone().or(file.remote);
        let store = match (save, remote) {
            (false, _) => StoreChoice::None,
            (true, Some(url)) => StoreChoice::Remote {
                url,
                session_id: args.session_id.clone().or(file.session_id),
                identity_file: data_dir.as_ref().map(|dir| dir.join("session-id")),
            },
            (true, None) => match file
                .session_file
                .or_else(|| data_dir.as_ref().map(|dir| dir.join("session.db")))
            {
                Some(path) => StoreChoice::File(path),
                None => {
                    warn!("no data directory; the session will not be saved");
                    StoreChoice::None
                }
            },
        };

        Ok(Self {
            edit_mode,
            line_width,
            store,
            save_delay,
            import: args.import.clone(),
            export: args.export.clone(),
            history_path: data_dir.map(|dir| dir.join("history.txt")),
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Pick an edit mode from the environment: `SQLPAD_EDIT_MODE`, then the
/// user's editor, then readline's own setting.
pub fn detect_edit_mode() -> EditMode {
    if let Ok(mode) = std::env::var("SQLPAD_EDIT_MODE") {
        return if is_vi_name(&mode) {
            EditMode::Vi
        } else {
            EditMode::Emacs
        };
    }

    for var in ["EDITOR", "VISUAL"] {
        if std::env::var(var).is_ok_and(|editor| is_vi_editor(&editor)) {
            return EditMode::Vi;
        }
    }

    if check_inputrc_vi_mode() {
        return EditMode::Vi;
    }

    EditMode::Emacs
}

fn is_vi_name(mode: &str) -> bool {
    matches!(mode.trim().to_lowercase().as_str(), "vi" | "vim")
}

fn is_vi_editor(editor: &str) -> bool {
    let editor = editor.to_lowercase();
    let program = editor
        .split_whitespace()
        .next()
        .and_then(|cmd| cmd.rsplit('/').next())
        .unwrap_or("");
    program == "vi" || program.contains("vim")
}

fn check_inputrc_vi_mode() -> bool {
    let inputrc_paths = [
        std::env::var("INPUTRC").ok().map(PathBuf::from),
        dirs::home_dir().map(|p| p.join(".inputrc")),
        Some(PathBuf::from("/etc/inputrc")),
    ];

    inputrc_paths
        .into_iter()
        .flatten()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .any(|content| inputrc_selects_vi(&content))
}

/// True for `set editing-mode vi`.
fn inputrc_selects_vi(content: &str) -> bool {
    content.lines().any(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        matches!(words.as_slice(), ["set", "editing-mode", "vi", ..])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: Args, file: FileConfig) -> Settings {
        Settings::from_parts(&args, file, Some(PathBuf::from("/data/sqlpad")), || {
            EditMode::Emacs
        })
        .unwrap()
    }

    #[test]
    fn defaults_save_to_data_dir() {
        let settings = resolve(Args::default(), FileConfig::default());
        assert_eq!(settings.edit_mode, EditMode::Emacs);
        assert_eq!(settings.line_width, DEFAULT_LINE_WIDTH);
        assert_eq!(settings.save_delay, DEFAULT_SAVE_DELAY);
        assert_eq!(
            settings.store,
            StoreChoice::File(PathBuf::from("/data/sqlpad/session.db"))
        );
        assert_eq!(
            settings.history_path,
            Some(PathBuf::from("/data/sqlpad/history.txt"))
        );
    }

    #[test]
    fn flags_beat_config_file() {
        let args = Args {
            vi: true,
            linesize: Some(80),
            save_delay_ms: Some(250),
            ..Args::default()
        };
        let file = FileConfig {
            edit_mode: Some(EditMode::Emacs),
            linesize: Some(120),
            save_delay_ms: Some(5000),
            ..FileConfig::default()
        };
        let settings = resolve(args, file);
        assert_eq!(settings.edit_mode, EditMode::Vi);
        assert_eq!(settings.line_width, 80);
        assert_eq!(settings.save_delay, Duration::from_millis(250));
    }

    #[test]
    fn config_file_beats_detection() {
        let file = FileConfig {
            edit_mode: Some(EditMode::Vi),
            linesize: Some(120),
            ..FileConfig::default()
        };
        let settings = resolve(Args::default(), file);
        assert_eq!(settings.edit_mode, EditMode::Vi);
        assert_eq!(settings.line_width, 120);
    }

    #[test]
    fn remote_store_keeps_identity_in_data_dir() {
        let args = Args {
            remote: Some("https://example.com/api".to_string()),
            ..Args::default()
        };
        let settings = resolve(args, FileConfig::default());
        assert_eq!(
            settings.store,
            StoreChoice::Remote {
                url: "https://example.com/api".to_string(),
                session_id: None,
                identity_file: Some(PathBuf::from("/data/sqlpad/session-id")),
            }
        );
    }

    #[test]
    fn no_save_disables_any_store() {
        let args = Args {
            no_save: true,
            ..Args::default()
        };
        let file = FileConfig {
            remote: Some("https://example.com".to_string()),
            ..FileConfig::default()
        };
        assert_eq!(resolve(args, file).store, StoreChoice::None);

        let file = FileConfig {
            save: Some(false),
            ..FileConfig::default()
        };
        assert_eq!(resolve(Args::default(), file).store, StoreChoice::None);
    }

    #[test]
    fn session_file_from_config() {
        let file = FileConfig {
            session_file: Some(PathBuf::from("/tmp/mine.db")),
            ..FileConfig::default()
        };
        assert_eq!(
            resolve(Args::default(), file).store,
            StoreChoice::File(PathBuf::from("/tmp/mine.db"))
        );
    }

    #[test]
    fn no_data_dir_means_no_history_or_file_store() {
        let settings = Settings::from_parts(&Args::default(), FileConfig::default(), None, || {
            EditMode::Emacs
        })
        .unwrap();
        assert_eq!(settings.store, StoreChoice::None);
        assert!(settings.history_path.is_none());
    }

    #[test]
    fn zero_linesize_is_rejected() {
        let args = Args {
            linesize: Some(0),
            ..Args::default()
        };
        let result = Settings::from_parts(&args, FileConfig::default(), None, || EditMode::Emacs);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn parses_config_file() {
        let file = FileConfig::parse(
            r#"
            edit_mode = "vim"
            linesize = 132
            remote = "https://example.com"
            session_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(file.edit_mode, Some(EditMode::Vi));
        assert_eq!(file.linesize, Some(132));
        assert_eq!(file.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_config_keys_are_errors() {
        assert!(FileConfig::parse("colour = true").is_err());
        assert!(FileConfig::parse("linesize = \"wide\"").is_err());
    }

    #[test]
    fn missing_default_config_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(FileConfig::load(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn loads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "save = false\n").unwrap();
        assert_eq!(FileConfig::load(&path, true).unwrap().save, Some(false));

        std::fs::write(&path, "save = ").unwrap();
        assert!(matches!(
            FileConfig::load(&path, true),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn recognizes_vi_editors() {
        assert!(is_vi_editor("vi"));
        assert!(is_vi_editor("nvim"));
        assert!(is_vi_editor("/usr/bin/vim -u NONE"));
        assert!(!is_vi_editor("nano"));
        assert!(!is_vi_editor("code --wait"));
        assert!(is_vi_name(" VIM "));
        assert!(!is_vi_name("emacs"));
    }

    #[test]
    fn reads_inputrc_editing_mode() {
        assert!(inputrc_selects_vi("# keys\nset editing-mode vi\n"));
        assert!(!inputrc_selects_vi("set editing-mode emacs\n"));
        assert!(!inputrc_selects_vi("# set editing-mode vi\n"));
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "sqlpad",
            "--emacs",
            "--linesize",
            "80",
            "--remote",
            "https://example.com",
            "--session-id",
            "abc",
        ])
        .unwrap();
        assert!(args.emacs);
        assert_eq!(args.linesize, Some(80));
        assert_eq!(args.session_id.as_deref(), Some("abc"));

        assert!(Args::try_parse_from(["sqlpad", "--vi", "--emacs"]).is_err());
        assert!(Args::try_parse_from(["sqlpad", "--no-save", "--remote", "x"]).is_err());
    }
}
