use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use tracing::debug;

/// What a key does on the terminal board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardCommand {
    /// Dismiss the redirect prompt
    Cancel,
    /// Open the prompt's link now
    Follow,
    /// Re-scan the page for sessions
    Refresh,
    Quit,
}

impl BoardCommand {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cancel" => Some(Self::Cancel),
            "follow" => Some(Self::Follow),
            "refresh" => Some(Self::Refresh),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Follow => "follow",
            Self::Refresh => "refresh",
            Self::Quit => "quit",
        }
    }
}

/// A key code plus modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse "q", "Esc", "Ctrl-c", "Shift-Enter"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "-" {
            return Some(Self::new(KeyCode::Char('-'), KeyModifiers::NONE));
        }

        let mut parts: Vec<&str> = s.split('-').collect();
        let key = parts.pop()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "c" => KeyModifiers::CONTROL,
                "alt" | "a" | "opt" | "option" => KeyModifiers::ALT,
                "shift" | "s" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        Some(Self::new(parse_key_code(key)?, modifiers))
    }

    pub fn display(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        parts.push(match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => "?".to_string(),
        });
        parts.join("-")
    }
}

fn parse_key_code(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backspace" | "bs" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        f if f.starts_with('f') => f[1..].parse().ok().map(KeyCode::F),
        _ => None,
    }
}

/// Parsed `[keys]` table
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, BoardCommand>,
}

impl Keymap {
    pub fn from_table(raw: &HashMap<String, String>) -> Self {
        let bindings = raw
            .iter()
            .filter_map(|(key, command)| {
                let parsed = KeyCombo::parse(key).zip(BoardCommand::parse(command));
                if parsed.is_none() {
                    debug!(key = %key, command = %command, "skipping key binding");
                }
                parsed
            })
            .collect();
        Self { bindings }
    }

    pub fn lookup(&self, key: &KeyEvent) -> Option<BoardCommand> {
        let exact = KeyCombo::new(key.code, key.modifiers);
        if let Some(cmd) = self.bindings.get(&exact) {
            return Some(*cmd);
        }
        // terminals report Shift on upper-case chars inconsistently
        let relaxed = KeyCombo::new(key.code, key.modifiers - KeyModifiers::SHIFT);
        self.bindings.get(&relaxed).copied()
    }

    /// Keys bound to `command`, for the status bar hints
    pub fn keys_for(&self, command: BoardCommand) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, c)| **c == command)
            .map(|(k, _)| k.display())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let combo = KeyCombo::parse("q").unwrap();
        assert_eq!(combo.code, KeyCode::Char('q'));
        assert_eq!(combo.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(KeyCombo::parse("Enter").unwrap().code, KeyCode::Enter);
        assert_eq!(KeyCombo::parse("esc").unwrap().code, KeyCode::Esc);
        assert_eq!(KeyCombo::parse("F5").unwrap().code, KeyCode::F(5));
        assert!(KeyCombo::parse("Hyper-x").is_none());
    }

    #[test]
    fn test_parse_with_modifiers() {
        let combo = KeyCombo::parse("Ctrl-c").unwrap();
        assert_eq!(combo.code, KeyCode::Char('c'));
        assert_eq!(combo.modifiers, KeyModifiers::CONTROL);
        assert_eq!(combo.display(), "Ctrl-c");
    }

    #[test]
    fn test_keymap_from_defaults() {
        let settings = crate::config::Settings::builtin();
        let keymap = Keymap::from_table(&settings.keys);

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(keymap.lookup(&esc), Some(BoardCommand::Cancel));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keymap.lookup(&ctrl_c), Some(BoardCommand::Quit));

        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(keymap.lookup(&plain_c), Some(BoardCommand::Cancel));

        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(keymap.lookup(&x), None);

        assert_eq!(keymap.keys_for(BoardCommand::Cancel), vec!["Esc", "c"]);
    }

    #[test]
    fn test_unknown_commands_are_skipped() {
        let mut raw = HashMap::new();
        raw.insert("x".to_string(), "explode".to_string());
        raw.insert("r".to_string(), "refresh".to_string());
        let keymap = Keymap::from_table(&raw);
        let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(keymap.lookup(&r), Some(BoardCommand::Refresh));
        assert!(keymap.keys_for(BoardCommand::Quit).is_empty());
    }
}
