/// Widget for composing the outbound message line
use ratatui::{
    prelude::{Buffer, Rect},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Widget},
};

/// Edits the input line understands
#[derive(Debug)]
pub enum TextInputAction {
    /// Adds a character
    Char(char),
    /// Moves cursor to the right
    MoveRight,
    /// Moves cursor to the left
    MoveLeft,
    /// Deletes character before cursor
    Backspace,
    /// Deletes character under cursor
    Delete,
    /// Clears input area
    Clear,
}

/// Single-line input with a character-indexed cursor
#[derive(Debug, Default)]
pub struct TextInput {
    cursor: usize,
    input: String,
}

impl Widget for TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf)
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.input.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .padding(Padding::horizontal(1))
                    .title("Message"),
            )
            .render(area, buf)
    }
}

impl TextInput {
    /// Updates state based on `TextInputAction`
    pub fn action(&mut self, action: TextInputAction) {
        use TextInputAction::*;
        match action {
            Char(c) => self.insert(c),
            MoveRight => self.cursor = (self.cursor + 1).min(self.char_count()),
            MoveLeft => self.cursor = self.cursor.saturating_sub(1),
            Backspace => {
                if self.cursor > 0 {
                    self.remove(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            Delete => self.remove(self.cursor),
            Clear => {
                self.input.clear();
                self.cursor = 0;
            }
        }
    }

    /// Positions the terminal cursor inside this widget's border
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        (area.x + self.cursor as u16 + 2, area.y + 1)
    }

    /// Gets input collected so far
    pub fn get_input(&self) -> String {
        self.input.clone()
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    // The cursor indexes characters, not bytes
    fn byte_offset(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    fn remove(&mut self, char_idx: usize) {
        if char_idx < self.char_count() {
            let at = self.byte_offset(char_idx);
            self.input.remove(at);
        }
    }
}
