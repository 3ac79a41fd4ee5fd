//! Terminal session.
//!
//! [`Tui`] puts the terminal into raw mode on the alternate screen and runs a
//! background feed that merges keyboard input, pastes, resizes and the
//! tick/render timers into one [`Event`] channel.

use std::io::{Stdout, stdout};
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// The feed task is aborted if it has not stopped after this long.
const ABORT_AFTER: Duration = Duration::from_millis(500);
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Quit,
    Error(String),
    Tick,
    Render,
    Key(KeyEvent),
    /// Bracketed paste, delivered in one piece.
    Paste(String),
    Resize(u16, u16),
}

impl Event {
    /// Translate a terminal event. Key releases, mouse and focus changes are dropped.
    fn from_terminal(event: TermEvent) -> Option<Self> {
        match event {
            TermEvent::Key(key) if key.kind != KeyEventKind::Press => None,
            TermEvent::Key(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(Self::Quit)
            }
            TermEvent::Key(key) => Some(Self::Key(key)),
            TermEvent::Paste(text) => Some(Self::Paste(text)),
            TermEvent::Resize(width, height) => Some(Self::Resize(width, height)),
            TermEvent::Mouse(_) | TermEvent::FocusGained | TermEvent::FocusLost => None,
        }
    }
}

struct Feed {
    task: JoinHandle<()>,
    cancel: CancellationToken,
}

pub struct Tui {
    terminal: Terminal<Backend>,
    feed: Option<Feed>,
    event_tx: UnboundedSender<Event>,
    event_rx: UnboundedReceiver<Event>,
    frame_period: Duration,
    tick_period: Duration,
}

impl Tui {
    /// `frame_rate` and `tick_rate` are in events per second.
    pub fn new(frame_rate: f64, tick_rate: f64) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(stdout()))?,
            feed: None,
            event_tx,
            event_rx,
            frame_period: Duration::from_secs_f64(1.0 / frame_rate),
            tick_period: Duration::from_secs_f64(1.0 / tick_rate),
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableBracketedPaste, cursor::Hide)?;
        self.start_feed()
    }

    /// Stop the feed and hand the terminal back to the shell.
    pub fn exit(&mut self) -> Result<()> {
        self.stop_feed()?;
        if terminal::is_raw_mode_enabled()? {
            self.flush()?;
            execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen, cursor::Show)?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Restore the terminal and stop the process (ctrl+z).
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn start_feed(&mut self) -> Result<()> {
        self.stop_feed()?;
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_feed(
            self.event_tx.clone(),
            cancel.clone(),
            self.tick_period,
            self.frame_period,
        ));
        self.feed = Some(Feed { task, cancel });
        Ok(())
    }

    fn stop_feed(&mut self) -> Result<()> {
        let Some(feed) = self.feed.take() else {
            return Ok(());
        };
        feed.cancel.cancel();

        let started = Instant::now();
        while !feed.task.is_finished() {
            let waited = started.elapsed();
            if waited >= GIVE_UP_AFTER {
                return Err(eyre!("terminal event feed did not stop"));
            }
            if waited >= ABORT_AFTER {
                feed.task.abort();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

async fn run_feed(
    tx: UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_period: Duration,
    frame_period: Duration,
) {
    #[cfg(unix)]
    forward_sigterm(tx.clone());

    let mut input = EventStream::new();
    let mut ticks = interval(tick_period);
    let mut frames = interval(frame_period);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next() => match next {
                Some(Ok(event)) => match Event::from_terminal(event) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(err)) => Event::Error(err.to_string()),
                None => break,
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("Terminal event feed stopped");
}

#[cfg(unix)]
fn forward_sigterm(tx: UnboundedSender<Event>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                let _ = tx.send(Event::Quit);
            }
            Err(err) => warn!("Failed to install SIGTERM handler: {err}"),
        }
    });
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            error!("Failed to restore terminal: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> TermEvent {
        TermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_only_key_presses_are_forwarded() {
        let press = key(KeyCode::Char('n'), KeyModifiers::NONE, KeyEventKind::Press);
        assert!(matches!(
            Event::from_terminal(press),
            Some(Event::Key(k)) if k.code == KeyCode::Char('n')
        ));

        let release = key(KeyCode::Char('n'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(Event::from_terminal(release), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let ctrl_c = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(Event::from_terminal(ctrl_c), Some(Event::Quit));
    }

    #[test]
    fn test_paste_and_resize_pass_through() {
        assert_eq!(
            Event::from_terminal(TermEvent::Paste("#FF0000".to_string())),
            Some(Event::Paste("#FF0000".to_string()))
        );
        assert_eq!(
            Event::from_terminal(TermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        );
    }

    #[test]
    fn test_mouse_and_focus_are_dropped() {
        let mouse = TermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(Event::from_terminal(mouse), None);
        assert_eq!(Event::from_terminal(TermEvent::FocusGained), None);
    }
}
