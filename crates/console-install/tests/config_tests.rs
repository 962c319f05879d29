//! Configuration files feeding real runs.

use std::path::PathBuf;
use std::time::Duration;

use console_install::{AutomationConfig, ConfigFormat, ConfigLoader, EnvConfig, PatternSpec};

/// Write `content` to a fresh file in the temp directory.
fn write_temp(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("console-install-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const LAB_TOML: &str = r#"
[console]
command = "conserver"
args = ["-c", "{device}"]
echo_output = false

[timeouts]
grub = 240
menu_step = 1.5

[keys]
menu_down = "v"
select = "\n"

[patterns]
suspend_banner = { literal = "[Enter `^Ec?' for help]" }
ready = { regex = 'System (is )?ready' }
"#;

/// A TOML file overrides only the keys it names.
#[test]
fn toml_file_overrides_selected_keys() {
    let path = write_temp("lab.toml", LAB_TOML);
    let config = ConfigLoader::new().load(&path).unwrap();

    assert_eq!(config.console.command, "conserver");
    assert!(!config.console.echo_output);
    assert_eq!(config.timeouts.grub, Duration::from_secs(240));
    assert_eq!(config.timeouts.menu_step, Duration::from_millis(1500));
    assert_eq!(config.timeouts.connect, AutomationConfig::default().timeouts.connect);
    assert_eq!(config.keys.menu_down, "v");
    assert_eq!(config.keys.menu_top, "\x1b[H");
    assert_eq!(config.patterns.ready, PatternSpec::regex("System (is )?ready"));
}

/// Files without a known extension need an explicit format.
#[test]
fn extensionless_file_uses_default_format() {
    let json = serde_json::json!({ "console": { "command": "ipmitool" } }).to_string();
    let path = write_temp("console-config", &json);

    assert!(ConfigLoader::new().load(&path).is_err());
    let config = ConfigLoader::new()
        .with_format(ConfigFormat::Json)
        .load(&path)
        .unwrap();
    assert_eq!(config.console.command, "ipmitool");
}

/// A pattern that does not compile is rejected at load time.
#[test]
fn invalid_pattern_rejected_on_load() {
    let path = write_temp("bad-pattern.toml", "[patterns]\nmenu_target = { regex = '(ONIE' }\n");
    let err = ConfigLoader::new().load(&path).unwrap_err();
    assert!(err.to_string().contains("menu_target"), "{err}");
}

/// Environment overrides apply on top of a loaded file.
#[test]
fn env_overrides_file_values() {
    let path = write_temp("env.toml", LAB_TOML);
    let mut config = ConfigLoader::new().load(&path).unwrap();
    let env = EnvConfig::from_vars(
        "CONSOLE_INSTALL",
        [
            ("CONSOLE_INSTALL_GRUB_TIMEOUT", "100"),
            ("CONSOLE_INSTALL_COMMAND", "/opt/bin/hhfab"),
        ],
    );

    env.apply(&mut config).unwrap();

    assert_eq!(config.timeouts.grub, Duration::from_secs(100));
    assert_eq!(config.console.command, "/opt/bin/hhfab");
    assert_eq!(config.keys.menu_down, "v");
}

#[cfg(feature = "mock")]
mod runs {
    use super::*;
    use console_install::mock::{MenuItem, MockBuilder, MockConnector, MockEvent, MockMenu};
    use console_install::{InstallRequest, Outcome, run_with};

    /// Custom banners and keystrokes from a file drive the whole run.
    #[tokio::test(start_paused = true)]
    async fn file_config_drives_run() {
        let path = write_temp("run.toml", LAB_TOML);
        let config = ConfigLoader::new().load(&path).unwrap();
        let menu = MockMenu::new(
            &config.keys,
            vec![
                MenuItem::inert("SONiC-OS-4.4.0"),
                MenuItem::submenu(
                    "ONIE",
                    vec![MenuItem::emit(
                        "ONIE: Install OS",
                        vec![MockEvent::output_str("ONIE: OS Install Mode ...\r\n")],
                    )],
                ),
            ],
        );
        let transport = MockBuilder::new()
            .output("[Enter `^Ec?' for help]\r\n")
            .menu(menu)
            .build();
        let connector = MockConnector::new(transport.clone());

        let outcome = run_with(&connector, &config, &InstallRequest::new("leaf-01")).await;

        assert_eq!(outcome, Outcome::Success);
        assert!(transport.writes().iter().any(|w| w == "v"));
        assert!(transport.writes().iter().all(|w| w != "\x1b[B"));
    }

    /// A bad pattern table is a usage error, not a console failure.
    #[tokio::test]
    async fn bad_pattern_is_usage_error() {
        let mut config = AutomationConfig::default();
        config.patterns.install_entry = PatternSpec::literal("");
        let connector = MockConnector::new(MockBuilder::new().build());

        let outcome = run_with(&connector, &config, &InstallRequest::new("leaf-01")).await;

        assert_eq!(outcome, Outcome::UsageError);
        assert_eq!(connector.opens(), 0);
    }
}
