use crate::config::Config;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Desktop demo of a chat-driven website builder with a sandboxed preview.
#[derive(Debug, Parser)]
#[command(name = "sitecraft", version, about)]
pub struct Cli {
    /// Config file (defaults to $SITECRAFT_HOME/config.toml)
    #[arg(long, env = "SITECRAFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address for the preview sandbox server
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Do not start the preview sandbox server
    #[arg(long, conflicts_with = "open")]
    pub no_preview: bool,

    /// Open the preview in the system browser on startup
    #[arg(long)]
    pub open: bool,

    /// Log filter, e.g. `debug` or `sitecraft=trace`
    #[arg(long)]
    pub log: Option<String>,
}

impl Cli {
    /// Folds command-line overrides into the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.preview.bind = bind;
        }
        if self.no_preview {
            config.preview.enabled = false;
        }
        if self.open {
            config.preview.open_browser = true;
        }
        if let Some(filter) = &self.log {
            config.log.filter = filter.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use crate::config::Config;
    use clap::Parser;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "sitecraft",
            "--bind",
            "127.0.0.1:9000",
            "--open",
            "--log",
            "debug",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.preview.bind.port(), 9000);
        assert!(config.preview.open_browser);
        assert!(config.preview.enabled);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn no_preview_disables_server() {
        let cli = Cli::parse_from(["sitecraft", "--no-preview"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(!config.preview.enabled);
    }

    #[test]
    fn no_preview_conflicts_with_open() {
        assert!(Cli::try_parse_from(["sitecraft", "--no-preview", "--open"]).is_err());
    }
}
