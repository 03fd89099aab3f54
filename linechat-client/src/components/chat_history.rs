/// Widget for displaying chat and notice lines
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, BorderType, Borders, List, ListDirection, Padding, Widget},
};

/// Display messages in a window that scrolls up as new lines arrive
#[derive(Debug)]
pub struct ChatHistory<'a> {
    history: Vec<Text<'a>>,
    list: List<'a>,
}

impl<'a> Default for ChatHistory<'a> {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            list: Self::list(),
        }
    }
}

impl Widget for ChatHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf)
    }
}

impl Widget for &ChatHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut items = self.history.clone();
        items.reverse();
        self.list.clone().items(items).render(area, buf);
    }
}

impl<'a> ChatHistory<'a> {
    /// Add a chat line; the text arrives pre-formatted by the server
    /// (`user N: text`), so it renders as-is
    pub fn push_chat(&mut self, text: impl Into<String>) {
        self.history.push(decorate_chat(text.into()));
    }

    /// Add a join/leave or connection notice, dimmed to stand apart
    /// from chat
    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.history.push(decorate_notice(text.into()));
    }

    fn list() -> List<'a> {
        List::default().direction(ListDirection::BottomToTop).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1)),
        )
    }
}

fn decorate_chat<'a>(text: String) -> Text<'a> {
    Text::from(Line::raw(text))
}

fn decorate_notice<'a>(text: String) -> Text<'a> {
    Text::from(Line::styled(text, Style::default().fg(Color::DarkGray)))
}
