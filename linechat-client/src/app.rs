/// Main linechat client app
use crate::{
    components::{
        chat_history::ChatHistory,
        text_input::{TextInput, TextInputAction},
    },
    tui::{Event, Tui},
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use futures::{SinkExt, TryStreamExt};
use linechat_protocol::{Message, MessageCodec};
use ratatui::prelude::{Constraint, Direction, Layout};
use tokio::{
    io::{ReadHalf, WriteHalf},
    net::{TcpStream, ToSocketAddrs},
};
use tokio_util::codec::{FramedRead, FramedWrite};

/// Actions taken in response to events
#[derive(Debug)]
pub(crate) enum Action {
    Input(TextInputAction),
    Send,
    Quit,
}

/// Control logic for the application - receives events, translates them
/// into actions, adjusts state, and then renders that state
pub(crate) struct App<'a> {
    history: ChatHistory<'a>,
    input: TextInput,
    quit: bool,
    connected: bool,
    reader: FramedRead<ReadHalf<TcpStream>, MessageCodec>,
    writer: FramedWrite<WriteHalf<TcpStream>, MessageCodec>,
}

impl<'a> App<'a> {
    /// Connects and waits for nothing: the server speaks first with our
    /// `joined` frame.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let (rx, tx) = tokio::io::split(TcpStream::connect(addr).await?);
        Ok(Self {
            history: ChatHistory::default(),
            input: TextInput::default(),
            quit: false,
            connected: true,
            reader: FramedRead::new(rx, MessageCodec::default()),
            writer: FramedWrite::new(tx, MessageCodec::default()),
        })
    }

    async fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Input(action) => self.do_input(action),
            Action::Send => self.do_send().await,
            Action::Quit => self.do_quit(),
        }
    }

    fn do_input(&mut self, action: TextInputAction) -> Result<Option<Action>> {
        self.input.action(action);
        Ok(None)
    }

    fn do_quit(&mut self) -> Result<Option<Action>> {
        self.quit = true;
        Ok(None)
    }

    /// Sends the composed text as a chat frame. No local echo: the
    /// server relays our own message back to us along with everyone
    /// else's copy.
    async fn do_send(&mut self) -> Result<Option<Action>> {
        if !self.connected {
            return Ok(None);
        }
        let text = self.input.get_input();
        if text.is_empty() {
            return Ok(None);
        }
        if self.writer.send(Message::msg(text)).await.is_err() {
            self.disconnect();
            return Ok(None);
        }
        Ok(Some(Action::Input(TextInputAction::Clear)))
    }

    fn render_message(&mut self, message: Message) {
        match message {
            Message::Joined { id } => self.history.push_notice(format!("you are joined as {id}")),
            Message::Info { msg } => self.history.push_notice(msg),
            Message::Msg { msg } => self.history.push_chat(msg),
        }
    }

    // No reconnection; the UI stays up so the backlog stays readable
    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.history.push_notice("connection closed");
        }
    }
}

fn map_event_to_action(_app: &App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => Some(Action::Quit),
            KeyCode::Enter => Some(Action::Send),
            KeyCode::Backspace => Some(Action::Input(TextInputAction::Backspace)),
            KeyCode::Delete => Some(Action::Input(TextInputAction::Delete)),
            KeyCode::Left => Some(Action::Input(TextInputAction::MoveLeft)),
            KeyCode::Right => Some(Action::Input(TextInputAction::MoveRight)),
            KeyCode::Char(c) => Some(Action::Input(TextInputAction::Char(c))),
            _ => None,
        },
        Event::Resize => None,
    }
}

pub async fn run(addr: String) -> Result<()> {
    let mut tui = Tui::new()?;
    tui.enter()?;

    let mut app = App::connect(addr).await?;

    loop {
        let mut action = None;

        tokio::select! {
            // render received messages to the UI
            maybe_frame = app.reader.try_next(), if app.connected => {
                match maybe_frame {
                    Ok(Some(message)) => app.render_message(message),
                    Ok(None) | Err(_) => app.disconnect(),
                }
            }

            // turn UI events into actions
            maybe_event = tui.next() => {
                match maybe_event {
                    Some(event) => action = map_event_to_action(&app, event),
                    None => break,
                }
            }
        }

        // application update
        while let Some(next_action) = action {
            action = app.update(next_action).await?;
        }

        // application render
        tui.draw(|f| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)]);
            let split = layout.split(f.size());

            let (x, y) = app.input.cursor_position(split[1]);
            f.set_cursor(x, y);

            f.render_widget(&app.history, split[0]);
            f.render_widget(&app.input, split[1]);
        })?;

        // application exit
        if app.quit {
            break;
        }
    }

    Ok(())
}
