use crate::app::Action;
use crate::config::BoardCommand;
use crossterm::event::KeyEvent;

use super::EventHandler;

/// Board command to action
pub(super) fn command_action(command: BoardCommand) -> Action {
    match command {
        BoardCommand::Cancel => Action::CancelPrompt,
        BoardCommand::Follow => Action::FollowLink,
        BoardCommand::Refresh => Action::Refresh,
        BoardCommand::Quit => Action::Quit,
    }
}

impl EventHandler {
    pub(super) fn handle_key_event(&self, key: KeyEvent) -> Action {
        self.keymap
            .lookup(&key)
            .map(command_action)
            .unwrap_or(Action::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Keymap, Settings};
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_default_keys_map_to_actions() {
        let keymap = Keymap::from_table(&Settings::builtin().keys);
        let action = |code, mods| {
            keymap
                .lookup(&KeyEvent::new(code, mods))
                .map(command_action)
        };

        assert_eq!(action(KeyCode::Esc, KeyModifiers::NONE), Some(Action::CancelPrompt));
        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::NONE), Some(Action::CancelPrompt));
        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Action::Quit));
        assert_eq!(action(KeyCode::Enter, KeyModifiers::NONE), Some(Action::FollowLink));
        assert_eq!(action(KeyCode::Char('r'), KeyModifiers::NONE), Some(Action::Refresh));
        assert_eq!(action(KeyCode::Char('x'), KeyModifiers::NONE), None);
    }
}
