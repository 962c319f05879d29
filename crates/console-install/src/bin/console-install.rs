//! console-install: drive one device's console through an unattended install.
//!
//! Exit codes: 0 success, 1 usage error, 2 console unreachable, 3 login
//! failed, 4 install failed, 5 console helper unavailable, 6 internal error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use console_install::{
    AutomationConfig, ConfigLoader, Credentials, EnvConfig, InstallRequest, Outcome,
    ProcessConnector, Reporter, diag, run_with,
};

#[derive(Debug, Parser)]
#[command(
    name = "console-install",
    version,
    about = "Drive an unattended switch OS install over its serial console"
)]
struct Cli {
    /// Device whose console is driven
    device: String,

    /// Log in as this user and reboot instead of waiting for a power cycle
    #[arg(short, long, requires = "password")]
    username: Option<String>,

    /// Password for --username
    #[arg(short, long, requires = "username")]
    password: Option<String>,

    /// Wait until the installed system reports ready
    #[arg(long)]
    wait_ready: bool,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn request(&self) -> InstallRequest {
        let credentials = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user, pass)),
            _ => None,
        };
        InstallRequest {
            device: self.device.clone(),
            credentials,
            wait_ready: self.wait_ready,
        }
    }
}

fn load_config(path: Option<&Path>) -> console_install::Result<AutomationConfig> {
    let mut config = match path {
        Some(path) => ConfigLoader::new().load(path)?,
        None => AutomationConfig::default(),
    };
    EnvConfig::default().apply(&mut config)?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                Outcome::UsageError.into()
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    diag::init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return Reporter::new(&cli.device).report(&Err(err.into())).into(),
    };

    let connector = ProcessConnector::new(config.console.clone());
    run_with(&connector, &config, &cli.request()).await.into()
}
