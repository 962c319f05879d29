//! Shared console scripts for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use console_install::config::Keystrokes;
use console_install::mock::{MenuItem, MockEvent, MockMenu};

pub const SUSPEND_BANNER: &str = "Type the hot key to suspend the connection: <CTRL>Z\r\n";
pub const ESCAPE_BANNER: &str = "Trying 10.0.0.2...\r\nEscape character is '^]'.\r\n";
pub const INSTALL_MODE: &str = "ONIE: OS Install Mode ...\r\nPlatform  : x86_64-accton_as7326_56x-r0\r\n";

/// A SONiC box boot menu with ONIE as the third entry.
pub fn onie_menu(keys: &Keystrokes, install: Vec<MockEvent>) -> MockMenu {
    MockMenu::new(
        keys,
        vec![
            MenuItem::inert("SONiC-OS-4.4.0"),
            MenuItem::inert("SONiC-OS-4.3.2"),
            MenuItem::submenu(
                "ONIE",
                vec![
                    MenuItem::inert("ONIE: Rescue"),
                    MenuItem::emit("ONIE: Install OS", install),
                    MenuItem::inert("ONIE: Update ONIE"),
                    MenuItem::inert("ONIE: Uninstall OS"),
                ],
            ),
        ],
    )
}

/// A boot menu without any installer entry.
pub fn menu_without_onie(keys: &Keystrokes) -> MockMenu {
    MockMenu::new(
        keys,
        vec![
            MenuItem::inert("SONiC-OS-4.4.0"),
            MenuItem::inert("SONiC-OS-4.3.2"),
        ],
    )
}

/// Installer output after the install entry is chosen.
///
/// Every step shows up well within its default deadline; the ready message
/// is left out when `ready` is false.
pub fn installer_run(device: &str, ready: bool) -> Vec<MockEvent> {
    let mut events = vec![
        MockEvent::output_str(INSTALL_MODE),
        MockEvent::delay(Duration::from_secs(20)),
        MockEvent::output_str("Info: Starting ONIE Service Discovery\r\n"),
        MockEvent::delay(Duration::from_secs(120)),
        MockEvent::output_str("ONIE: NOS install successful: http://10.0.0.1/onie-installer\r\n"),
        MockEvent::delay(Duration::from_secs(60)),
        MockEvent::output(format!("\r\nDebian GNU/Linux 11 {device} ttyS0\r\n\r\n{device} login: ")),
    ];
    if ready {
        events.push(MockEvent::delay(Duration::from_secs(90)));
        events.push(MockEvent::output_str("\r\nSystem is ready\r\n"));
    }
    events
}
