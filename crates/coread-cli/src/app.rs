use anyhow::Result;
use coread_engine::{
    LayoutTrigger, OutgoingMessage, ReaderApi, ReaderSession, SectionId, SendOutcome, ThreadId,
    ThreadSummary,
};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Browsing the thread list
    Threads,
    /// Reading an open thread
    Thread,
    /// Typing a reply to the open thread
    Compose,
}

/// Remote work started by a key press, run after the next frame is drawn
#[derive(Debug)]
pub enum PendingAction {
    OpenThread(ThreadId),
    Send(OutgoingMessage),
    MoreTurns(ThreadId),
}

impl PendingAction {
    pub fn label(&self) -> &'static str {
        match self {
            PendingAction::OpenThread(_) => "Loading thread...",
            PendingAction::Send(_) => "Sending...",
            PendingAction::MoreTurns(_) => "Waiting for more turns...",
        }
    }
}

pub struct App {
    pub session: ReaderSession,
    api: Box<dyn ReaderApi>,
    runtime: Runtime,
    pub focus: Focus,
    /// Index into the session's thread list
    pub cursor: usize,
    /// Index into the session's sections in reading order
    pub section_index: usize,
    pub compose: String,
    pub status: Option<String>,
    pub wrap_width: Option<u16>,
    pub pending: Option<PendingAction>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: ReaderSession, api: Box<dyn ReaderApi>, runtime: Runtime) -> Self {
        let mut app = Self {
            session,
            api,
            runtime,
            focus: Focus::Threads,
            cursor: 0,
            section_index: 0,
            compose: String::new(),
            status: None,
            wrap_width: None,
            pending: None,
            should_quit: false,
        };
        app.follow_cursor();
        app
    }

    pub fn current_section_id(&self) -> Option<SectionId> {
        self.session
            .sections()
            .get(self.section_index)
            .map(|s| s.section_id.clone())
    }

    pub fn cursor_thread(&self) -> Option<&ThreadSummary> {
        self.session.threads().get(self.cursor)
    }

    /// Keys are ignored while remote work is pending
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.pending.is_some() {
            return;
        }
        match self.focus {
            Focus::Threads => self.handle_threads_key(key.code),
            Focus::Thread => self.handle_thread_key(key.code),
            Focus::Compose => self.handle_compose_key(key.code),
        }
    }

    /// Terminal size changed; every section's markers must be re-measured
    pub fn resized(&mut self) {
        self.session.invalidate_markers(LayoutTrigger::Resized);
    }

    fn handle_threads_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Tab => self.move_section(1),
            KeyCode::BackTab => self.move_section(-1),
            KeyCode::Enter => self.open_thread(),
            _ => {}
        }
    }

    fn handle_thread_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                self.session.deselect();
                self.focus = Focus::Threads;
            }
            KeyCode::Char('i') => self.focus = Focus::Compose,
            KeyCode::Char('g') => self.continue_discussion(),
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.focus = Focus::Thread,
            KeyCode::Enter => self.send(),
            KeyCode::Backspace => {
                self.compose.pop();
            }
            KeyCode::Char(c) => self.compose.push(c),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.session.threads().len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(len as isize) as usize;
        self.follow_cursor();
    }

    fn move_section(&mut self, delta: isize) {
        let len = self.session.sections().len();
        if len == 0 {
            return;
        }
        self.section_index = (self.section_index as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Show the section the thread under the cursor is anchored to
    fn follow_cursor(&mut self) {
        let Some(section_id) = self.cursor_thread().map(|t| t.anchor.section_id.clone()) else {
            return;
        };
        if let Some(index) = self
            .session
            .sections()
            .iter()
            .position(|s| s.section_id == section_id)
        {
            self.section_index = index;
        }
    }

    fn open_thread(&mut self) {
        let Some(thread_id) = self.cursor_thread().map(|t| t.thread_id.clone()) else {
            return;
        };
        self.pending = Some(PendingAction::OpenThread(thread_id));
    }

    fn send(&mut self) {
        match self.session.begin_send(&self.compose) {
            Ok(outgoing) => {
                self.compose.clear();
                self.status = None;
                self.focus = Focus::Thread;
                self.pending = Some(PendingAction::Send(outgoing));
            }
            Err(e) => self.status = Some(format!("Not sent: {e}")),
        }
    }

    fn continue_discussion(&mut self) {
        if let Some(thread_id) = self.session.selected().cloned() {
            self.pending = Some(PendingAction::MoreTurns(thread_id));
        }
    }

    /// Await the pending remote work, if any
    pub fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };
        let api = self.api.as_ref();
        match action {
            PendingAction::OpenThread(thread_id) => {
                match self.runtime.block_on(self.session.select(&thread_id, api)) {
                    Ok(_) => {
                        self.focus = Focus::Thread;
                        self.status = None;
                    }
                    Err(e) => self.status = Some(format!("Could not open thread: {e}")),
                }
            }
            PendingAction::Send(outgoing) => {
                self.status = match self.runtime.block_on(self.session.finish_send(outgoing, api)) {
                    Ok(SendOutcome::Confirmed(_)) => None,
                    Ok(SendOutcome::Failed(e)) => {
                        Some(format!("Saved locally, not delivered: {e}"))
                    }
                    Err(e) => Some(format!("Not sent: {e}")),
                };
            }
            PendingAction::MoreTurns(thread_id) => {
                self.status = match self
                    .runtime
                    .block_on(self.session.continue_discussion(&thread_id, api))
                {
                    Ok(_) => None,
                    Err(e) => Some(format!("Could not continue discussion: {e}")),
                };
            }
        }
    }

    pub fn is_sending(&self, thread_id: &ThreadId) -> bool {
        self.session.is_sending(thread_id)
    }
}

/// Single-threaded runtime driving remote calls from the UI loop
pub fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
