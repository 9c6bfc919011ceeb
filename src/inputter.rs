use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single line editor for the filter prompt. Every keystroke produces a new
/// `InputResult` snapshot so the caller can react to each edit immediately.
#[derive(Default)]
pub struct Inputter {
    text: String,
    cursor: usize, // position in chars, not bytes
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub text: String,
    pub cursor: usize,
    pub finished: bool,
    pub canceled: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.finished = true,
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.text.clear();
                self.cursor = 0;
                self.finished = true;
                self.canceled = true;
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Left, KeyModifiers::NONE) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, KeyModifiers::NONE) => {
                if self.cursor < self.text.chars().count() {
                    self.cursor += 1;
                }
            }
            (code, _) => {
                if let Some(chr) = code.as_char() {
                    self.text.insert(self.byte_pos(), chr);
                    self.cursor += 1;
                }
            }
        }
        self.get()
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            text: self.text.clone(),
            cursor: self.cursor,
            finished: self.finished,
            canceled: self.canceled,
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.finished = false;
        self.canceled = false;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let pos = self.byte_pos();
            self.text.remove(pos);
        }
    }

    fn byte_pos(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(inp: &mut Inputter, code: KeyCode) -> InputResult {
        inp.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(inp: &mut Inputter, s: &str) -> InputResult {
        let mut last = inp.get();
        for c in s.chars() {
            last = press(inp, KeyCode::Char(c));
        }
        last
    }

    #[test]
    fn typing_builds_up_text() {
        let mut inp = Inputter::default();
        let res = type_str(&mut inp, "civic");
        assert_eq!(res.text, "civic");
        assert_eq!(res.cursor, 5);
        assert!(!res.finished);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut inp = Inputter::default();
        type_str(&mut inp, "abc");
        press(&mut inp, KeyCode::Left);
        let res = press(&mut inp, KeyCode::Backspace);
        assert_eq!(res.text, "ac");
        assert_eq!(res.cursor, 1);
    }

    #[test]
    fn backspace_on_empty_input_is_harmless() {
        let mut inp = Inputter::default();
        let res = press(&mut inp, KeyCode::Backspace);
        assert_eq!(res.text, "");
        assert_eq!(res.cursor, 0);
    }

    #[test]
    fn enter_finishes_and_keeps_text() {
        let mut inp = Inputter::default();
        type_str(&mut inp, "2020");
        let res = press(&mut inp, KeyCode::Enter);
        assert!(res.finished);
        assert!(!res.canceled);
        assert_eq!(res.text, "2020");
    }

    #[test]
    fn escape_cancels_and_clears_text() {
        let mut inp = Inputter::default();
        type_str(&mut inp, "toyota");
        let res = press(&mut inp, KeyCode::Esc);
        assert!(res.finished && res.canceled);
        assert_eq!(res.text, "");
    }

    #[test]
    fn insertion_respects_multibyte_chars() {
        let mut inp = Inputter::default();
        type_str(&mut inp, "über");
        press(&mut inp, KeyCode::Left);
        press(&mut inp, KeyCode::Left);
        press(&mut inp, KeyCode::Left);
        let res = press(&mut inp, KeyCode::Char('x'));
        assert_eq!(res.text, "üxber");
    }
}
