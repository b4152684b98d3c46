use clap::Parser;
use std::{fs, path::PathBuf};

/// Storage related arguments shared by the server and the CLI
#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "TCMS_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/tcms.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "TCMS_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/tcms",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("tcms"))
        .unwrap_or_else(|| PathBuf::from("tcms"));

    if !fs::exists(&dir).unwrap_or(false) {
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("Cannot create data directory {}: {e}", dir.display());
        }
    }

    dir.to_string_lossy().to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/tcms.db", self.data_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_defaults_to_data_dir() {
        let config =
            BackendConfig::try_parse_from(["tcms", "--data-dir", "/tmp/tcms-test"]).unwrap();
        assert_eq!(config.database_url(), "sqlite:///tmp/tcms-test/tcms.db");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/tcms-test"));
    }

    #[test]
    fn test_explicit_database_url() {
        let config = BackendConfig::try_parse_from([
            "tcms",
            "--data-dir",
            "/tmp/tcms-test",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }
}
