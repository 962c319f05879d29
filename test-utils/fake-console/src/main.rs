//! Scripted serial console of a switch booting into its installer.
//!
//! Usage: `fake-console <device> [scenario]`
//!
//! Scenarios:
//! - `install` (default): banner, boot menu, installer, ready system
//! - `no-ready`: like `install` but never prints the ready message
//! - `unsuccessful`: the console connection is rejected
//! - `silent`: prints nothing and waits for stdin to close
//!
//! The boot menu reacts to `ESC [ H` (top), `ESC [ B` (down) and `CR`
//! (select) on stdin.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

const TOP_MENU: &[&str] = &["SONiC-OS-4.4.0", "SONiC-OS-4.3.2", "ONIE"];
const ONIE_MENU: &[&str] = &[
    "ONIE: Rescue",
    "ONIE: Install OS",
    "ONIE: Update ONIE",
    "ONIE: Uninstall OS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Top,
    Down,
    Select,
}

struct Menu {
    nested: bool,
    cursor: usize,
}

impl Menu {
    fn entries(&self) -> &'static [&'static str] {
        if self.nested { ONIE_MENU } else { TOP_MENU }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "\x1b[2J\x1b[H    GNU GRUB  version 2.06\r\n\r\n")?;
        for (i, entry) in self.entries().iter().enumerate() {
            let mark = if i == self.cursor { '*' } else { ' ' };
            write!(out, "{mark}{entry}\r\n")?;
        }
        out.flush()
    }

    /// Apply a key; `true` once the install entry has been selected.
    fn press(&mut self, key: Key) -> bool {
        match key {
            Key::Top => self.cursor = 0,
            Key::Down => self.cursor = (self.cursor + 1).min(self.entries().len() - 1),
            Key::Select if !self.nested && self.entries()[self.cursor] == "ONIE" => {
                self.nested = true;
                self.cursor = 0;
            }
            Key::Select => return self.nested && self.entries()[self.cursor] == "ONIE: Install OS",
        }
        false
    }
}

fn parse_keys(pending: &mut Vec<u8>) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut i = 0;
    while i < pending.len() {
        match pending[i] {
            b'\r' | b'\n' => {
                keys.push(Key::Select);
                i += 1;
            }
            0x1b if pending.len() < i + 3 => break,
            0x1b if pending[i + 1] == b'[' && pending[i + 2] == b'H' => {
                keys.push(Key::Top);
                i += 3;
            }
            0x1b if pending[i + 1] == b'[' && pending[i + 2] == b'B' => {
                keys.push(Key::Down);
                i += 3;
            }
            _ => i += 1,
        }
    }
    pending.drain(..i);
    keys
}

fn say(out: &mut impl Write, text: &str, pause_ms: u64) -> io::Result<()> {
    thread::sleep(Duration::from_millis(pause_ms));
    out.write_all(text.as_bytes())?;
    out.flush()
}

fn boot_installer(out: &mut impl Write, device: &str, ready: bool) -> io::Result<()> {
    say(out, "ONIE: OS Install Mode ...\r\n", 50)?;
    say(out, "Info: Starting ONIE Service Discovery\r\n", 50)?;
    say(out, "ONIE: NOS install successful: http://10.0.0.1/onie-installer\r\n", 50)?;
    say(out, &format!("\r\n{device} login: "), 50)?;
    if ready {
        say(out, "\r\nSystem is ready\r\n", 50)?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let mut args = std::env::args().skip(1);
    let device = args.next().unwrap_or_else(|| "switch".to_string());
    let scenario = args.next().unwrap_or_else(|| "install".to_string());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut stdin = io::stdin();

    match scenario.as_str() {
        "unsuccessful" => {
            say(&mut out, "Trying 10.0.0.2...\r\n", 0)?;
            say(&mut out, "Connection unsuccessful\r\n", 20)?;
            return Ok(());
        }
        "silent" => {
            let mut sink = Vec::new();
            stdin.read_to_end(&mut sink)?;
            return Ok(());
        }
        _ => {}
    }

    say(&mut out, "Type the hot key to suspend the connection: <CTRL>Z\r\n", 0)?;
    let mut menu = Menu {
        nested: false,
        cursor: 0,
    };
    thread::sleep(Duration::from_millis(100));
    menu.render(&mut out)?;

    let mut pending = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        pending.extend_from_slice(&buf[..n]);
        for key in parse_keys(&mut pending) {
            if menu.press(key) {
                return boot_installer(&mut out, &device, scenario != "no-ready");
            }
            menu.render(&mut out)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_split_across_reads() {
        let mut pending = b"\x1b[".to_vec();
        assert!(parse_keys(&mut pending).is_empty());
        pending.extend_from_slice(b"B\r\x1b[H");
        assert_eq!(parse_keys(&mut pending), vec![Key::Down, Key::Select, Key::Top]);
        assert!(pending.is_empty());
    }

    #[test]
    fn install_entry_is_two_levels_down() {
        let mut menu = Menu {
            nested: false,
            cursor: 0,
        };
        assert!(!menu.press(Key::Down));
        assert!(!menu.press(Key::Down));
        assert!(!menu.press(Key::Select));
        assert!(menu.nested);
        assert!(!menu.press(Key::Down));
        assert!(menu.press(Key::Select));
    }
}
