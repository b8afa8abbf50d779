mod handlers;

use crate::app::Action;
use crate::config::Keymap;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Internal event type for terminal events
enum TerminalEvent {
    Key(KeyEvent),
    FocusGained,
    FocusLost,
    Resize(u16, u16),
    Tick,
}

pub struct EventHandler {
    keymap: Keymap,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    terminal_rx: mpsc::UnboundedReceiver<TerminalEvent>,
}

impl EventHandler {
    pub fn new(keymap: Keymap) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (terminal_tx, terminal_rx) = mpsc::unbounded_channel();

        // Spawn dedicated thread for terminal events
        std::thread::spawn(move || {
            let poll_timeout = Duration::from_millis(50);
            loop {
                let event = if event::poll(poll_timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                            TerminalEvent::Key(key)
                        }
                        Ok(Event::FocusGained) => TerminalEvent::FocusGained,
                        Ok(Event::FocusLost) => TerminalEvent::FocusLost,
                        Ok(Event::Resize(w, h)) => TerminalEvent::Resize(w, h),
                        _ => TerminalEvent::Tick,
                    }
                } else {
                    TerminalEvent::Tick
                };

                if terminal_tx.send(event).is_err() {
                    break; // Channel closed, exit thread
                }
            }
        });

        Self {
            keymap,
            action_tx,
            action_rx,
            terminal_rx,
        }
    }

    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    fn translate(&self, event: TerminalEvent) -> Action {
        match event {
            TerminalEvent::Key(key) => self.handle_key_event(key),
            TerminalEvent::FocusGained => Action::VisibilityChanged(true),
            TerminalEvent::FocusLost => Action::VisibilityChanged(false),
            TerminalEvent::Resize(w, h) => Action::Resize(w, h),
            TerminalEvent::Tick => Action::Tick,
        }
    }

    pub async fn next(&mut self) -> Result<Action> {
        // Keyboard input first, it should never wait behind timer actions
        if let Ok(event) = self.terminal_rx.try_recv() {
            return Ok(self.translate(event));
        }
        if let Ok(action) = self.action_rx.try_recv() {
            return Ok(action);
        }

        tokio::select! {
            biased;
            Some(event) = self.terminal_rx.recv() => Ok(self.translate(event)),
            Some(action) = self.action_rx.recv() => Ok(action),
            else => Ok(Action::Tick)
        }
    }
}
