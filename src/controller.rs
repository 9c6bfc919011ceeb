use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode};

use crate::domain::{Message, RVConfig, RVError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &RVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, RVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    return Ok(self.handle_key(key, model));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, model: &Model) -> Option<Message> {
        // While the filter prompt is open every key belongs to the line
        // editor, so the filter re-applies on each edit.
        if model.raw_keyevents() {
            return Some(Message::RawKey(key));
        }

        // The confirm modal captures the whole keyboard: y confirms,
        // anything else cancels.
        if model.confirm_pending() {
            let message = match key.code {
                KeyCode::Char('y') => Message::Confirm,
                _ => Message::Exit,
            };
            trace!("Mapped: {key:?} => {message:?}");
            return Some(message);
        }

        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('/') => Some(Message::EnterFilter),
            KeyCode::Char(' ') => Some(Message::ToggleMark),
            KeyCode::Char('x') => Some(Message::DeleteRow),
            KeyCode::Char('y') => Some(Message::Confirm),
            KeyCode::Char('n') => Some(Message::Exit),
            KeyCode::Char('c') => Some(Message::CopyRow),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
