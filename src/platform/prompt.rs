//! Line-oriented prompts for the menus outside a match

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, Write};

use super::terminal::message_box;
use super::{MessageKind, Presenter};
use crate::sim::MatchState;

/// Result of parsing a menu answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Pick(usize),
    Quit,
    Invalid,
}

/// Parse `input` against a menu of `count` numbered entries (1-based)
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Pick(n - 1),
        _ => Choice::Invalid,
    }
}

/// Print a numbered menu and read a selection. `None` means quit or EOF.
pub fn choose(title: &str, options: &[&str]) -> io::Result<Option<usize>> {
    loop {
        println!();
        println!("{}", title);
        for (idx, option) in options.iter().enumerate() {
            println!("  {}. {}", idx + 1, option);
        }
        let Some(answer) = prompt_line("Enter number (q to quit): ")? else {
            return Ok(None);
        };
        match parse_choice(&answer, options.len()) {
            Choice::Pick(idx) => return Ok(Some(idx)),
            Choice::Quit => return Ok(None),
            Choice::Invalid => println!("Invalid selection."),
        }
    }
}

/// Read one line from stdin. `None` on EOF.
pub fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

/// Presenter for the line-mode menus. Messages block until Enter.
#[derive(Debug, Default)]
pub struct LineShell;

impl Presenter for LineShell {
    fn render(&mut self, state: &MatchState) -> io::Result<()> {
        println!("Score {} : {}", state.score_left, state.score_right);
        Ok(())
    }

    fn show_message(&mut self, kind: MessageKind, text: &str) -> io::Result<()> {
        println!();
        for line in message_box(kind, text) {
            println!("{}", line);
        }
        prompt_line("  Press ENTER to continue")?;
        Ok(())
    }

    fn request_redraw(&mut self) {}

    fn redraw_pending(&self) -> bool {
        false
    }
}

/// What a key does to a masked input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Continue,
    Submit,
    Cancel,
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> Edit {
    if key.kind != KeyEventKind::Press {
        return Edit::Continue;
    }
    match key.code {
        KeyCode::Enter => Edit::Submit,
        KeyCode::Esc => Edit::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Edit::Cancel,
        KeyCode::Backspace => {
            buffer.pop();
            Edit::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            Edit::Continue
        }
        _ => Edit::Continue,
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read a password without echoing it. `None` if the player pressed Esc.
pub fn prompt_password(label: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    print!("{}", label);
    stdout.flush()?;

    let mut buffer = String::new();
    let edit = {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let before = buffer.chars().count();
            let edit = apply_key(&mut buffer, key);
            if edit != Edit::Continue {
                break edit;
            }
            let after = buffer.chars().count();
            if after > before {
                write!(stdout, "*")?;
            } else if after < before {
                write!(stdout, "\x08 \x08")?;
            }
            stdout.flush()?;
        }
    };
    println!();

    Ok(match edit {
        Edit::Submit => Some(buffer),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 3), Choice::Pick(0));
        assert_eq!(parse_choice(" 3 \n", 3), Choice::Pick(2));
        assert_eq!(parse_choice("4", 3), Choice::Invalid);
        assert_eq!(parse_choice("0", 3), Choice::Invalid);
        assert_eq!(parse_choice("", 3), Choice::Invalid);
        assert_eq!(parse_choice("login", 3), Choice::Invalid);
        assert_eq!(parse_choice("Q", 3), Choice::Quit);
    }

    #[test]
    fn test_masked_editing() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        let mut buffer = String::new();
        for c in "pasw".chars() {
            assert_eq!(apply_key(&mut buffer, key(KeyCode::Char(c))), Edit::Continue);
        }
        apply_key(&mut buffer, key(KeyCode::Backspace));
        apply_key(&mut buffer, key(KeyCode::Char('s')));
        assert_eq!(buffer, "pass");
        assert_eq!(apply_key(&mut buffer, key(KeyCode::Enter)), Edit::Submit);
        assert_eq!(apply_key(&mut buffer, key(KeyCode::Esc)), Edit::Cancel);
        assert_eq!(
            apply_key(&mut buffer, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Edit::Cancel
        );
        assert_eq!(buffer, "pass");
    }

    #[test]
    fn test_release_events_ignored() {
        let mut buffer = String::new();
        let mut release = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        apply_key(&mut buffer, release);
        assert!(buffer.is_empty());
    }
}
