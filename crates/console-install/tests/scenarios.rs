//! End-to-end runs of the install automation against scripted consoles.
//!
//! These tests require the `mock` feature to be enabled.

#![cfg(feature = "mock")]

mod common;

use std::time::Duration;

use common::{ESCAPE_BANNER, INSTALL_MODE, SUSPEND_BANNER, installer_run, menu_without_onie, onie_menu};
use console_install::mock::{MockBuilder, MockConnector, MockEvent, MockTransport};
use console_install::{AutomationConfig, Credentials, InstallRequest, Outcome, run_with};
use tokio::time::Instant;

async fn run(transport: MockTransport, request: InstallRequest) -> (Outcome, MockConnector) {
    let connector = MockConnector::new(transport);
    let outcome = run_with(&connector, &AutomationConfig::default(), &request).await;
    (outcome, connector)
}

fn leaf01() -> InstallRequest {
    InstallRequest::new("leaf-01")
}

/// Power-reset run that follows the install until the system is ready.
#[tokio::test(start_paused = true)]
async fn leaf01_power_reset_full_install() {
    let keys = AutomationConfig::default().keys;
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .delay(Duration::from_secs(30))
        .menu(onie_menu(&keys, installer_run("leaf-01", true)))
        .build();

    let (outcome, connector) = run(transport.clone(), leaf01().wait_ready(true)).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(outcome.code(), 0);
    assert_eq!(connector.closes(), 1);

    // Third cursor position holds the installer entry.
    let writes = transport.writes();
    assert_eq!(&writes[..4], &["\x1b[H", "\x1b[B", "\x1b[B", "\r"]);
    assert!(!writes.iter().any(|w| w.contains("reboot")));
}

/// The last readiness step times out after its own full deadline.
#[tokio::test(start_paused = true)]
async fn leaf01_ready_message_never_arrives() {
    let keys = AutomationConfig::default().keys;
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .delay(Duration::from_secs(30))
        .menu(onie_menu(&keys, installer_run("leaf-01", false)))
        .build();

    let start = Instant::now();
    let (outcome, connector) = run(transport, leaf01().wait_ready(true)).await;

    assert_eq!(outcome, Outcome::InstallFailed);
    assert_eq!(outcome.code(), 4);
    assert_eq!(connector.closes(), 1);
    // 30 s to the menu, 200 s of installer output, then the full ready deadline.
    assert!(start.elapsed() >= Duration::from_secs(30 + 200 + 300));
}

/// Rejected credentials end the run before any reboot is sent.
#[tokio::test(start_paused = true)]
async fn login_incorrect_never_reboots() {
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .output("\r\nleaf-01 login: ")
        .on_write("admin\r", "Password: ")
        .on_write("wrong\r", "\r\nLogin incorrect\r\n\r\nleaf-01 login: ")
        .build();
    let request = leaf01().credentials(Credentials::new("admin", "wrong"));

    let (outcome, connector) = run(transport.clone(), request).await;

    assert_eq!(outcome, Outcome::LoginFailed);
    assert_eq!(outcome.code(), 3);
    assert_eq!(connector.closes(), 1);
    assert!(!transport.written().contains("reboot"));
}

/// Credentials log in, reboot, and continue into the boot menu.
#[tokio::test(start_paused = true)]
async fn reboot_via_login_reaches_install_mode() {
    let keys = AutomationConfig::default().keys;
    let menu = onie_menu(&keys, vec![MockEvent::output_str(INSTALL_MODE)]);
    let transport = MockBuilder::new()
        .output(ESCAPE_BANNER)
        .output("\r\nleaf-02 login: ")
        .on_write("admin\r", "Password: ")
        .on_write("hunter2\r", "\r\nLinux leaf-02 5.10.0-18-2-amd64\r\nLast login: Mon Oct 12 10:00:00 on ttyS0\r\nadmin@leaf-02:~$ ")
        .on_write_events(
            "sudo reboot\r",
            vec![vec![
                MockEvent::output_str("sudo reboot\r\n[  OK  ] Stopped target Network.\r\n"),
                MockEvent::delay(Duration::from_secs(45)),
                MockEvent::output_str(&menu.render()),
            ]],
        )
        .hidden_menu(menu)
        .build();
    let request = InstallRequest::new("leaf-02").credentials(Credentials::new("admin", "hunter2"));

    let (outcome, _) = run(transport.clone(), request).await;

    assert_eq!(outcome, Outcome::Success);
    let writes = transport.writes();
    assert_eq!(&writes[..3], &["admin\r", "hunter2\r", "sudo reboot\r"]);
}

/// Without credentials a login prompt is never answered.
#[tokio::test(start_paused = true)]
async fn power_reset_ignores_login_prompt() {
    let keys = AutomationConfig::default().keys;
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .output("\r\nleaf-01 login: ")
        .delay(Duration::from_secs(60))
        .menu(onie_menu(&keys, vec![MockEvent::output_str(INSTALL_MODE)]))
        .build();

    let (outcome, _) = run(transport.clone(), leaf01()).await;

    assert_eq!(outcome, Outcome::Success);
    assert!(transport.writes().iter().all(|w| !w.contains("admin")));
}

/// Without readiness polling the run ends at install mode.
#[tokio::test(start_paused = true)]
async fn without_wait_ready_success_follows_install_mode() {
    let keys = AutomationConfig::default().keys;
    // Nothing after install mode: waiting for readiness would time out.
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .menu(onie_menu(&keys, vec![MockEvent::output_str(INSTALL_MODE)]))
        .build();

    let start = Instant::now();
    let (outcome, connector) = run(transport, leaf01()).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(connector.closes(), 1);
    assert!(start.elapsed() < AutomationConfig::default().timeouts.discovery);
}

/// A rejected connection is final even if a banner follows.
#[tokio::test(start_paused = true)]
async fn connection_unsuccessful_wins_over_later_output() {
    let keys = AutomationConfig::default().keys;
    let transport = MockBuilder::new()
        .output("Connection unsuccessful\r\n")
        .output(SUSPEND_BANNER)
        .menu(onie_menu(&keys, vec![MockEvent::output_str(INSTALL_MODE)]))
        .build();

    let (outcome, _) = run(transport.clone(), leaf01()).await;

    assert_eq!(outcome, Outcome::ConsoleUnreachable);
    assert_eq!(outcome.code(), 2);
    assert!(transport.writes().is_empty());
}

/// A menu without the target entry fails at the boot menu deadline.
#[tokio::test(start_paused = true)]
async fn cursor_search_stays_within_grub_deadline() {
    let config = AutomationConfig::default();
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .menu(menu_without_onie(&config.keys))
        .build();

    let start = Instant::now();
    let (outcome, _) = run(transport.clone(), leaf01()).await;

    assert_eq!(outcome, Outcome::InstallFailed);
    assert!(start.elapsed() <= config.timeouts.grub + Duration::from_millis(10));
    assert!(transport.writes().len() >= 50);
}

/// The console is opened and closed exactly once whatever the outcome.
#[tokio::test(start_paused = true)]
async fn console_released_once_on_every_outcome() {
    let keys = AutomationConfig::default().keys;
    let cases: Vec<(MockTransport, InstallRequest, Outcome)> = vec![
        (
            MockBuilder::new()
                .output(SUSPEND_BANNER)
                .menu(onie_menu(&keys, installer_run("leaf-01", true)))
                .build(),
            leaf01().wait_ready(true),
            Outcome::Success,
        ),
        (
            MockBuilder::new().output("Connection unsuccessful\r\n").build(),
            leaf01(),
            Outcome::ConsoleUnreachable,
        ),
        (
            MockBuilder::new().eof().build(),
            leaf01(),
            Outcome::ConsoleUnreachable,
        ),
        (
            MockBuilder::new()
                .output(SUSPEND_BANNER)
                .output("leaf-01 login: ")
                .build(),
            leaf01().credentials(Credentials::new("admin", "admin")),
            Outcome::LoginFailed,
        ),
        (
            MockBuilder::new().output(SUSPEND_BANNER).build(),
            leaf01(),
            Outcome::InstallFailed,
        ),
        (
            MockBuilder::new()
                .output(SUSPEND_BANNER)
                .error("read: input/output error")
                .build(),
            leaf01(),
            Outcome::InternalError,
        ),
    ];

    for (transport, request, expected) in cases {
        let (outcome, connector) = run(transport, request).await;
        assert_eq!(outcome, expected);
        assert_eq!(connector.opens(), 1, "{expected}");
        assert_eq!(connector.closes(), 1, "{expected}");
    }
}

/// Readiness stops at the first step that times out.
#[tokio::test(start_paused = true)]
async fn readiness_step_after_failure_is_never_awaited() {
    let keys = AutomationConfig::default().keys;
    // Install success never shows; the later texts are there but must not be waited for.
    let install = vec![
        MockEvent::output_str(INSTALL_MODE),
        MockEvent::output_str("Info: Starting ONIE Service Discovery\r\n"),
        MockEvent::delay(Duration::from_secs(400)),
        MockEvent::output_str("leaf-01 login: \r\nSystem is ready\r\n"),
    ];
    let transport = MockBuilder::new()
        .output(SUSPEND_BANNER)
        .menu(onie_menu(&keys, install))
        .build();

    let start = Instant::now();
    let (outcome, _) = run(transport, leaf01().wait_ready(true)).await;

    assert_eq!(outcome, Outcome::InstallFailed);
    assert!(start.elapsed() < Duration::from_secs(400));
}
