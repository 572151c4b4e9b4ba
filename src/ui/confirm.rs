use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, IsTerminal, Write};

/// Restores cooked mode even if reading a key fails
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Map a key press to an answer; `None` keeps waiting
pub fn interpret_key(key: KeyEvent) -> Option<bool> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(false),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => Some(false),
        _ => None,
    }
}

/// Ask a single-key y/N question on the terminal.
///
/// Without an interactive stdin the answer is always no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }

    let mut stdout = io::stdout();
    write!(stdout, "{prompt} [y/N] ")?;
    stdout.flush()?;

    let answer = {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(answer) = interpret_key(key) {
                    break answer;
                }
            }
        }
    };

    writeln!(stdout, "{}", if answer { "y" } else { "n" })?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_yes_keys() {
        assert_eq!(interpret_key(press(KeyCode::Char('y'))), Some(true));
        assert_eq!(interpret_key(press(KeyCode::Char('Y'))), Some(true));
    }

    #[test]
    fn test_default_is_no() {
        assert_eq!(interpret_key(press(KeyCode::Enter)), Some(false));
        assert_eq!(interpret_key(press(KeyCode::Esc)), Some(false));
        assert_eq!(interpret_key(press(KeyCode::Char('n'))), Some(false));
    }

    #[test]
    fn test_ctrl_c_declines() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(interpret_key(key), Some(false));
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(interpret_key(press(KeyCode::Char('x'))), None);
        assert_eq!(interpret_key(press(KeyCode::Char('c'))), None);
        assert_eq!(interpret_key(press(KeyCode::Left)), None);

        let mut release = press(KeyCode::Char('y'));
        release.kind = KeyEventKind::Release;
        assert_eq!(interpret_key(release), None);
    }
}
