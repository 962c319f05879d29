//! Phase functions of the install driver.
//!
//! Each function observes the console through one or more expectations and
//! returns a [`Transition`]. `Err` is reserved for transport failures; every
//! classified failure travels as [`Transition::Fail`].

use std::fmt;
use std::time::Duration;

use super::InstallDriver;
use crate::backend::ConsoleTransport;
use crate::config::CompiledPatterns;
use crate::error::{InstallError, Result};
use crate::expect::{Pattern, PatternSet};
use crate::session::Session;
use crate::types::{ExpectOutcome, Match};
use crate::util::Deadline;

/// Bytes of console output attached to internal errors.
pub(super) const DIAGNOSTIC_TAIL: usize = 2048;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Wait for the console helper's connection banner.
    Connect,
    /// Log in and reboot (reboot-via-login mode only).
    Login,
    /// Wait for the boot menu and walk it to the install entry.
    GrubSelect,
    /// Wait for the installer to confirm install mode.
    InstallConfirm,
    /// Follow the installation to a ready system.
    ReadinessPoll,
    /// Terminal.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Login => "login",
            Self::GrubSelect => "grub-select",
            Self::InstallConfirm => "install-confirm",
            Self::ReadinessPoll => "readiness-poll",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Result of running one phase.
#[derive(Debug)]
pub enum Transition {
    /// Continue with this phase.
    Next(Phase),
    /// The run ends with this failure.
    Fail(InstallError),
}

const CONNECTION_UNSUCCESSFUL: usize = 0;

const LOGIN_INCORRECT: usize = 0;
const LOGIN_PROMPT: usize = 1;
const PASSWORD_PROMPT: usize = 2;
const SHELL_PROMPT: usize = 3;

const INSTALL_ENTRY: usize = 0;
const INSTALL_MODE: usize = 0;

/// Labels of the readiness steps, in the order they are awaited.
pub const READINESS_STEPS: [&str; 4] = [
    "service discovery",
    "install success",
    "installed system login prompt",
    "ready message",
];

/// The expectations of every phase, in priority order.
#[derive(Debug, Clone)]
pub struct PhasePatterns {
    connect: PatternSet,
    login: PatternSet,
    grub_banner: PatternSet,
    menu_target: PatternSet,
    install_entry: PatternSet,
    install_confirm: PatternSet,
    readiness: [PatternSet; 4],
}

impl PhasePatterns {
    /// Arrange compiled patterns into per-phase expectations.
    #[must_use]
    pub fn new(p: &CompiledPatterns) -> Self {
        let set = |items: &[(&str, &Pattern)]| {
            let mut set = PatternSet::new();
            for (name, pattern) in items {
                set.add_named(*name, (*pattern).clone());
            }
            set
        };

        Self {
            // An explicit rejection outranks a banner printed in the same burst.
            connect: set(&[
                ("connection unsuccessful", &p.connection_unsuccessful),
                ("suspend banner", &p.suspend_banner),
                ("escape banner", &p.escape_banner),
            ]),
            login: set(&[
                ("login incorrect", &p.login_incorrect),
                ("login prompt", &p.login_prompt),
                ("password prompt", &p.password_prompt),
                ("shell prompt", &p.shell_prompt),
                ("rescue prompt", &p.rescue_prompt),
            ]),
            grub_banner: set(&[("boot menu", &p.grub_banner)]),
            menu_target: set(&[("target entry", &p.menu_target)]),
            install_entry: set(&[
                ("install entry", &p.install_entry),
                ("target entry", &p.menu_target),
            ]),
            install_confirm: set(&[
                ("install mode", &p.install_mode),
                ("boot menu", &p.grub_banner),
            ]),
            readiness: [
                set(&[(READINESS_STEPS[0], &p.service_discovery)]),
                set(&[(READINESS_STEPS[1], &p.install_success)]),
                set(&[(READINESS_STEPS[2], &p.installed_login)]),
                set(&[(READINESS_STEPS[3], &p.ready)]),
            ],
        }
    }
}

/// Boot menu bookkeeping that survives re-entry from install confirmation.
#[derive(Debug, Default)]
pub(super) struct GrubState {
    deadline: Option<Deadline>,
    menu_visible: bool,
}

enum Search {
    Found(Match),
    Expired,
    Eof,
}

async fn keystroke<T: ConsoleTransport>(session: &mut Session<T>, keys: &str) -> Result<()> {
    session.clear_buffer();
    session.send_str(keys).await
}

/// Move the cursor to the top, then step down until `entries` matches.
///
/// Every step waits at most one menu step and never past `deadline`, so the
/// search ends no later than the deadline however many redraws go by.
async fn search<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
    entries: &PatternSet,
    deadline: &Deadline,
) -> Result<Search> {
    let keys = &driver.config.keys;
    let step = driver.config.timeouts.menu_step;

    keystroke(session, &keys.menu_top).await?;
    let mut moves = 0usize;
    loop {
        match session.expect_any(entries, deadline.clamp(step)).await? {
            ExpectOutcome::Matched(m) => {
                tracing::debug!(device = %session.device(), entry = %m.name, moves, "menu entry highlighted");
                return Ok(Search::Found(m));
            }
            ExpectOutcome::Eof { .. } => return Ok(Search::Eof),
            ExpectOutcome::Timeout { .. } if deadline.is_expired() => return Ok(Search::Expired),
            ExpectOutcome::Timeout { .. } => {
                moves += 1;
                keystroke(session, &keys.menu_down).await?;
            }
        }
    }
}

fn menu_failure(search: &Search, what: &str, deadline: &Deadline) -> Transition {
    let step = match search {
        Search::Eof => format!("console closed while looking for the {what}"),
        _ => format!("{what} not found within {:?}", deadline.budget()),
    };
    Transition::Fail(InstallError::install_failed(step))
}

pub(super) async fn connect<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
) -> Result<Transition> {
    let timeout = driver.config.timeouts.connect;
    let outcome = session.expect_any(&driver.patterns.connect, timeout).await?;

    Ok(match outcome {
        ExpectOutcome::Matched(m) if m.pattern_index == CONNECTION_UNSUCCESSFUL => Transition::Fail(
            InstallError::unreachable(format!("console reported '{}'", m.matched.trim())),
        ),
        ExpectOutcome::Matched(m) => {
            tracing::info!(device = %session.device(), "console connected ({})", m.name);
            if driver.mode().needs_login() {
                Transition::Next(Phase::Login)
            } else {
                Transition::Next(Phase::GrubSelect)
            }
        }
        ExpectOutcome::Timeout { duration, .. } => Transition::Fail(InstallError::unreachable(
            format!("no connection banner within {duration:?}"),
        )),
        ExpectOutcome::Eof { .. } => Transition::Fail(InstallError::unreachable(
            "console helper closed the stream before connecting",
        )),
    })
}

pub(super) async fn login<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
) -> Result<Transition> {
    let Some(credentials) = driver.credentials.as_ref() else {
        return Ok(Transition::Next(Phase::GrubSelect));
    };
    let config = driver.config;
    let deadline = Deadline::from_now(config.timeouts.login);

    loop {
        let m = match session
            .expect_any(&driver.patterns.login, deadline.remaining())
            .await?
        {
            ExpectOutcome::Matched(m) => m,
            ExpectOutcome::Timeout { .. } => {
                return Ok(Transition::Fail(InstallError::login_failed(format!(
                    "login did not complete within {:?}",
                    deadline.budget()
                ))));
            }
            ExpectOutcome::Eof { .. } => {
                return Ok(Transition::Fail(InstallError::login_failed(
                    "console closed during login",
                )));
            }
        };

        match m.pattern_index {
            LOGIN_INCORRECT => {
                return Ok(Transition::Fail(InstallError::login_failed(
                    "credentials rejected",
                )));
            }
            LOGIN_PROMPT => {
                tracing::debug!(device = %session.device(), "sending username");
                session.send_line(&credentials.username).await?;
            }
            PASSWORD_PROMPT => {
                tracing::debug!(device = %session.device(), "sending password");
                session.send_line(&credentials.password).await?;
            }
            SHELL_PROMPT => {
                tracing::info!(device = %session.device(), "logged in, rebooting");
                session.send_line(&config.keys.reboot_command).await?;
                return Ok(Transition::Next(Phase::GrubSelect));
            }
            _ => {
                tracing::info!(device = %session.device(), "rescue prompt, rebooting");
                session.send_line(&config.keys.reboot_command).await?;
                tokio::time::sleep(config.timeouts.rescue_pause).await;
                return Ok(Transition::Next(Phase::GrubSelect));
            }
        }
    }
}

pub(super) async fn grub_select<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
    grub: &mut GrubState,
) -> Result<Transition> {
    let config = driver.config;
    let deadline = *grub
        .deadline
        .get_or_insert_with(|| Deadline::from_now(config.timeouts.grub));
    let patterns = &driver.patterns;

    if !grub.menu_visible {
        match session
            .expect_any(&patterns.grub_banner, deadline.remaining())
            .await?
        {
            ExpectOutcome::Matched(_) => {
                tracing::info!(device = %session.device(), "boot menu appeared");
            }
            ExpectOutcome::Timeout { .. } => {
                return Ok(Transition::Fail(InstallError::install_failed(format!(
                    "boot menu did not appear within {:?}",
                    deadline.budget()
                ))));
            }
            ExpectOutcome::Eof { .. } => {
                return Ok(Transition::Fail(InstallError::install_failed(
                    "console closed while waiting for the boot menu",
                )));
            }
        }
        grub.menu_visible = true;
    } else if deadline.is_expired() {
        return Ok(Transition::Fail(InstallError::install_failed(format!(
            "install mode not reached within {:?}",
            deadline.budget()
        ))));
    }

    match search(session, driver, &patterns.menu_target, &deadline).await? {
        Search::Found(_) => {}
        other => return Ok(menu_failure(&other, "target boot entry", &deadline)),
    }
    keystroke(session, &config.keys.select).await?;
    // Let the nested menu draw before navigating it.
    let redraw = session
        .expect_any(&patterns.grub_banner, deadline.clamp(config.timeouts.menu_step))
        .await?;
    if let ExpectOutcome::Eof { .. } = redraw {
        return Ok(Transition::Fail(InstallError::install_failed(
            "console closed while opening the boot entry",
        )));
    }

    loop {
        match search(session, driver, &patterns.install_entry, &deadline).await? {
            Search::Found(m) if m.pattern_index == INSTALL_ENTRY => break,
            Search::Found(_) => {
                tracing::info!(device = %session.device(), "still in the top menu, selecting the boot entry again");
                keystroke(session, &config.keys.select).await?;
            }
            other => return Ok(menu_failure(&other, "install entry", &deadline)),
        }
    }

    tracing::info!(device = %session.device(), "selecting install entry");
    keystroke(session, &config.keys.select).await?;
    grub.menu_visible = false;
    Ok(Transition::Next(Phase::InstallConfirm))
}

pub(super) async fn install_confirm<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
    grub: &mut GrubState,
) -> Result<Transition> {
    let config = driver.config;
    let grace = config.timeouts.install_mode_grace;
    let next = if driver.wait_ready {
        Phase::ReadinessPoll
    } else {
        Phase::Done
    };

    match session
        .expect_any(&driver.patterns.install_confirm, grace)
        .await?
    {
        ExpectOutcome::Matched(m) if m.pattern_index == INSTALL_MODE => {
            tracing::info!(device = %session.device(), "installer entered install mode");
            Ok(Transition::Next(next))
        }
        ExpectOutcome::Matched(_) => {
            tracing::info!(device = %session.device(), "boot menu came back, navigating again");
            grub.menu_visible = true;
            Ok(Transition::Next(Phase::GrubSelect))
        }
        ExpectOutcome::Timeout { .. } => {
            tracing::info!(
                device = %session.device(),
                "no install mode message within {grace:?}, confirming and continuing"
            );
            if !config.keys.confirm_install.is_empty() {
                session.send_str(&config.keys.confirm_install).await?;
            }
            Ok(Transition::Next(next))
        }
        ExpectOutcome::Eof { .. } => Ok(Transition::Fail(InstallError::install_failed(
            "console closed before install mode",
        ))),
    }
}

pub(super) async fn readiness_poll<T: ConsoleTransport>(
    session: &mut Session<T>,
    driver: &InstallDriver<'_>,
) -> Result<Transition> {
    let t = &driver.config.timeouts;
    let timeouts: [Duration; 4] = [t.discovery, t.install_success, t.installed_login, t.ready];
    let total = READINESS_STEPS.len();

    for (k, (patterns, timeout)) in driver.patterns.readiness.iter().zip(timeouts).enumerate() {
        let label = READINESS_STEPS[k];
        let step = k + 1;
        match session.expect_any(patterns, timeout).await? {
            ExpectOutcome::Matched(_) => {
                tracing::info!(device = %session.device(), "{label} observed ({step}/{total})");
            }
            ExpectOutcome::Timeout { .. } => {
                return Ok(Transition::Fail(InstallError::install_failed(format!(
                    "step {step}/{total}: {label} not observed within {timeout:?}"
                ))));
            }
            ExpectOutcome::Eof { .. } => {
                return Ok(Transition::Fail(InstallError::install_failed(format!(
                    "step {step}/{total}: console closed before {label}"
                ))));
            }
        }
    }

    Ok(Transition::Next(Phase::Done))
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::config::AutomationConfig;
    use crate::driver::{Credentials, InstallRequest};
    use crate::mock::{MenuItem, MockBuilder, MockEvent, MockMenu, MockTransport};

    fn session(transport: MockTransport, config: &AutomationConfig) -> Session<MockTransport> {
        Session::new("leaf-01", transport, &config.console)
    }

    /// Paused-clock timers fire on millisecond ticks.
    fn within_tick(elapsed: Duration, expected: Duration) -> bool {
        elapsed >= expected && elapsed < expected + Duration::from_millis(10)
    }

    fn failure(transition: Transition) -> InstallError {
        match transition {
            Transition::Fail(err) => err,
            Transition::Next(phase) => panic!("expected failure, got {phase}"),
        }
    }

    fn onie_menu(config: &AutomationConfig, install: Vec<MockEvent>) -> MockMenu {
        MockMenu::new(
            &config.keys,
            vec![
                MenuItem::inert("SONiC-OS-4.4.0"),
                MenuItem::inert("SONiC-OS-4.3.2"),
                MenuItem::submenu(
                    "ONIE",
                    vec![
                        MenuItem::inert("ONIE: Rescue"),
                        MenuItem::emit("ONIE: Install OS", install),
                    ],
                ),
            ],
        )
    }

    #[tokio::test]
    async fn unsuccessful_outranks_banner() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let transport = MockBuilder::new()
            .output("Escape character is '^]'.\r\nConnection unsuccessful\r\n")
            .build();
        let mut session = session(transport, &config);

        let err = failure(connect(&mut session, &driver).await.unwrap());
        assert!(matches!(err, InstallError::ConsoleUnreachable { .. }));
    }

    #[tokio::test]
    async fn banner_leads_to_mode_specific_phase() {
        let config = AutomationConfig::default();
        let banner = "Type the hot key to suspend the connection: <CTRL>Z\r\n";

        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let mut s = session(MockBuilder::new().output(banner).build(), &config);
        assert!(matches!(
            connect(&mut s, &driver).await.unwrap(),
            Transition::Next(Phase::GrubSelect)
        ));

        let request = InstallRequest::new("leaf-01").credentials(Credentials::new("admin", "pw"));
        let driver = InstallDriver::new(&config, &request).unwrap();
        let mut s = session(MockBuilder::new().output(banner).build(), &config);
        assert!(matches!(
            connect(&mut s, &driver).await.unwrap(),
            Transition::Next(Phase::Login)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_console_is_unreachable() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let mut s = session(MockBuilder::new().build(), &config);

        let err = failure(connect(&mut s, &driver).await.unwrap());
        assert!(err.to_string().contains("no connection banner"));
    }

    #[tokio::test]
    async fn rejected_credentials_never_reboot() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").credentials(Credentials::new("admin", "bad"));
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new()
            .output("leaf-01 login: ")
            .on_write("admin\r", "Password: ")
            .on_write("bad\r", "\r\nLogin incorrect\r\nleaf-01 login: ")
            .build();
        let mut s = session(transport.clone(), &config);

        let err = failure(login(&mut s, &driver).await.unwrap());
        assert!(matches!(err, InstallError::LoginFailed { .. }));
        assert_eq!(transport.writes(), vec!["admin\r", "bad\r"]);
    }

    /// The post-login banner mentions `login:` but is not a prompt.
    #[tokio::test]
    async fn last_login_banner_is_not_a_prompt() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").credentials(Credentials::new("admin", "pw"));
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new()
            .output("leaf-01 login: ")
            .on_write("admin\r", "Password: ")
            .on_write(
                "pw\r",
                "\r\nLast login: Mon Oct 12 10:00:00 on ttyS0\r\nadmin@leaf-01:~$ ",
            )
            .build();
        let mut s = session(transport.clone(), &config);

        assert!(matches!(
            login(&mut s, &driver).await.unwrap(),
            Transition::Next(Phase::GrubSelect)
        ));
        assert_eq!(transport.writes(), vec!["admin\r", "pw\r", "sudo reboot\r"]);
    }

    #[tokio::test]
    async fn shell_prompt_sends_reboot() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").credentials(Credentials::new("admin", "pw"));
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new().output("admin@leaf-01:~$ ").build();
        let mut s = session(transport.clone(), &config);

        assert!(matches!(
            login(&mut s, &driver).await.unwrap(),
            Transition::Next(Phase::GrubSelect)
        ));
        assert_eq!(transport.writes(), vec!["sudo reboot\r"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rescue_prompt_reboots_and_pauses() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").credentials(Credentials::new("admin", "pw"));
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new().output("grub rescue> ").build();
        let mut s = session(transport.clone(), &config);

        let start = tokio::time::Instant::now();
        assert!(matches!(
            login(&mut s, &driver).await.unwrap(),
            Transition::Next(Phase::GrubSelect)
        ));
        assert!(within_tick(start.elapsed(), config.timeouts.rescue_pause));
        assert_eq!(transport.writes(), vec!["sudo reboot\r"]);
    }

    #[tokio::test(start_paused = true)]
    async fn menu_walk_reaches_install_entry() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let menu = onie_menu(&config, vec![MockEvent::output_str("ONIE: OS Install Mode ...\r\n")]);
        let transport = MockBuilder::new().menu(menu).build();
        let mut s = session(transport.clone(), &config);
        let mut grub = GrubState::default();

        assert!(matches!(
            grub_select(&mut s, &driver, &mut grub).await.unwrap(),
            Transition::Next(Phase::InstallConfirm)
        ));
        assert_eq!(
            transport.writes(),
            vec!["\x1b[H", "\x1b[B", "\x1b[B", "\r", "\x1b[H", "\x1b[B", "\r"]
        );

        assert!(matches!(
            install_confirm(&mut s, &driver, &mut grub).await.unwrap(),
            Transition::Next(Phase::Done)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn console_closing_on_boot_entry_fails_fast() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let menu = MockMenu::new(
            &config.keys,
            vec![
                MenuItem::emit("ONIE", vec![MockEvent::eof()]),
                MenuItem::inert("SONiC-OS-4.4.0"),
            ],
        );
        let transport = MockBuilder::new().menu(menu).build();
        let mut s = session(transport.clone(), &config);

        let start = tokio::time::Instant::now();
        let err = failure(
            grub_select(&mut s, &driver, &mut GrubState::default())
                .await
                .unwrap(),
        );
        assert!(err.to_string().contains("console closed while opening the boot entry"));
        assert!(start.elapsed() < config.timeouts.menu_step);
        assert_eq!(transport.writes(), vec!["\x1b[H", "\r"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_search_is_bounded_by_grub_deadline() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let menu = MockMenu::new(
            &config.keys,
            vec![MenuItem::inert("SONiC-OS-4.4.0"), MenuItem::inert("SONiC-OS-4.3.2")],
        );
        let transport = MockBuilder::new().menu(menu).build();
        let mut s = session(transport.clone(), &config);

        let start = tokio::time::Instant::now();
        let err = failure(
            grub_select(&mut s, &driver, &mut GrubState::default())
                .await
                .unwrap(),
        );
        assert!(matches!(err, InstallError::InstallFailed { .. }));
        assert!(start.elapsed() <= config.timeouts.grub);
        assert!(transport.writes().len() > 10);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_menu_is_install_failure() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let mut s = session(MockBuilder::new().output("booting...\r\n").build(), &config);

        let start = tokio::time::Instant::now();
        let err = failure(
            grub_select(&mut s, &driver, &mut GrubState::default())
                .await
                .unwrap(),
        );
        assert!(err.to_string().contains("boot menu did not appear"));
        assert!(within_tick(start.elapsed(), config.timeouts.grub));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_install_mode_message_is_tolerated() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").wait_ready(true);
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new().output("Loading ONIE ...\r\n").build();
        let mut s = session(transport.clone(), &config);

        assert!(matches!(
            install_confirm(&mut s, &driver, &mut GrubState::default())
                .await
                .unwrap(),
            Transition::Next(Phase::ReadinessPoll)
        ));
        assert_eq!(transport.writes(), vec!["\r"]);
    }

    #[tokio::test]
    async fn menu_redraw_re_enters_navigation() {
        let config = AutomationConfig::default();
        let driver = InstallDriver::new(&config, &InstallRequest::new("leaf-01")).unwrap();
        let transport = MockBuilder::new()
            .output("\x1b[2J    GNU GRUB  version 2.06\r\n")
            .build();
        let mut s = session(transport, &config);
        let mut grub = GrubState::default();

        assert!(matches!(
            install_confirm(&mut s, &driver, &mut grub).await.unwrap(),
            Transition::Next(Phase::GrubSelect)
        ));
        assert!(grub.menu_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn readiness_stops_at_first_missing_step() {
        let config = AutomationConfig::default();
        let request = InstallRequest::new("leaf-01").wait_ready(true);
        let driver = InstallDriver::new(&config, &request).unwrap();
        let transport = MockBuilder::new()
            .output("Info: Starting ONIE Service Discovery\r\n")
            .build();
        let mut s = session(transport, &config);

        let start = tokio::time::Instant::now();
        let err = failure(readiness_poll(&mut s, &driver).await.unwrap());
        assert!(err.to_string().contains("step 2/4: install success"));
        assert!(within_tick(start.elapsed(), config.timeouts.install_success));
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::GrubSelect.to_string(), "grub-select");
        assert_eq!(Phase::ReadinessPoll.to_string(), "readiness-poll");
    }
}
