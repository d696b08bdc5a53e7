//! Session state and the async generation driver.
//!
//! DESIGN
//! ======
//! All ambient editor state lives in one [`Session`]: the current
//! [`Editor`] (absent until the first successful generation), display name,
//! diagram theme, app mode, the in-flight generation flag, a generation
//! epoch, the last user-visible error and the status notice board.
//!
//! Generation is split into `begin_generation` / `complete_generation` so
//! the slow adapter call happens with no borrow of the session held.
//! [`SessionHandle`] wraps the session in `Arc<tokio::sync::RwLock<_>>` and
//! releases the lock across the `await`, which keeps interaction events
//! flowing while a diagram is being generated.
//!
//! STALENESS
//! =========
//! Each ticket carries the epoch it was issued under. `new_diagram` bumps
//! the epoch, so a response that resolves after the user started over is
//! discarded instead of overwriting the fresh session.
//!
//! The adapter call runs on a spawned task that owns its ticket and always
//! reaches `complete_generation`, so a caller that stops waiting cannot
//! leave the in-flight flag set. Hosts driving `begin_generation` by hand
//! call `abandon_generation` when they give up on a ticket.

use std::sync::Arc;
use std::time::Instant;

use canvas::engine::{Action, Editor};
use canvas::history::Transition;
use canvas::input::InputEvent;
use canvas::model::DiagramData;
use tokio::sync::{RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ErrorCode, UserError};
use crate::export::{self, ExportError, ExportFormat, Exported};
use crate::generate::{self, DiagramGenerator, GenerateError, validate_prompt};
use crate::notice::{NoticeBoard, NoticeLevel};
use crate::theme::{AppMode, Theme};

/// Display name used when the user gives none.
pub const DEFAULT_DIAGRAM_NAME: &str = "Untitled Diagram";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a diagram is already being generated")]
    AlreadyGenerating,

    #[error("no diagram to work on")]
    NoDiagram,

    #[error("generation was interrupted")]
    Interrupted,

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyGenerating => "E_GENERATION_IN_PROGRESS",
            Self::NoDiagram => "E_NO_DIAGRAM",
            Self::Interrupted => "E_GENERATION_INTERRUPTED",
            Self::Generate(e) => e.error_code(),
            Self::Export(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::AlreadyGenerating | Self::Interrupted => true,
            Self::NoDiagram => false,
            Self::Generate(e) => e.retryable(),
            Self::Export(e) => e.retryable(),
        }
    }
}

// =============================================================================
// GENERATION TICKETS
// =============================================================================

/// Permission to run one generation, issued by [`Session::begin_generation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
    prompt: String,
    name: String,
    theme: Theme,
}

impl GenerationTicket {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The trimmed prompt to hand to the generator.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Outcome of [`Session::complete_generation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The new diagram is displayed; its ledger holds only the fresh layout.
    Applied(Transition),
    /// The adapter failed; the previous diagram is untouched.
    Failed(UserError),
    /// The ticket predates the current epoch and was ignored.
    Stale,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug)]
pub struct Session {
    editor: Option<Editor>,
    name: String,
    theme: Theme,
    app_mode: AppMode,
    generating: bool,
    epoch: u64,
    last_prompt: Option<String>,
    last_error: Option<UserError>,
    notices: NoticeBoard,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: None,
            name: String::new(),
            theme: Theme::default(),
            app_mode: AppMode::default(),
            generating: false,
            epoch: 0,
            last_prompt: None,
            last_error: None,
            notices: NoticeBoard::new(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn app_mode(&self) -> AppMode {
        self.app_mode
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&UserError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    // --- Presentation settings ---

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_name(&mut self, name: &str) {
        name.trim().clone_into(&mut self.name);
    }

    pub fn toggle_app_mode(&mut self) -> AppMode {
        self.app_mode = self.app_mode.toggled();
        self.app_mode
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    // --- Generation ---

    /// Validate `prompt` and mark a generation as in flight.
    ///
    /// `name` and `theme` apply to the diagram once it arrives; `None` or a
    /// blank name keeps the current setting.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyGenerating`] while another generation is in
    /// flight (state untouched), or [`GenerateError::EmptyPrompt`] for a
    /// blank prompt (recorded as `last_error`).
    pub fn begin_generation(
        &mut self,
        prompt: &str,
        name: Option<&str>,
        theme: Option<Theme>,
    ) -> Result<GenerationTicket, SessionError> {
        if self.generating {
            warn!(epoch = self.epoch, "session: generation rejected, one already in flight");
            return Err(SessionError::AlreadyGenerating);
        }
        let prompt = match validate_prompt(prompt) {
            Ok(p) => p.to_owned(),
            Err(e) => {
                self.last_error = Some(UserError::from_error(&e));
                return Err(e.into());
            }
        };

        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(self.name.as_str());
        let name = if name.is_empty() { DEFAULT_DIAGRAM_NAME } else { name }.to_owned();

        self.generating = true;
        self.last_error = None;
        self.last_prompt = Some(prompt.clone());
        info!(epoch = self.epoch, prompt_len = prompt.len(), %name, "session: generation started");
        Ok(GenerationTicket { epoch: self.epoch, prompt, name, theme: theme.unwrap_or(self.theme) })
    }

    /// Apply the adapter's result for `ticket`.
    ///
    /// On success the editor is replaced by the new diagram with a one-entry
    /// ledger; the clipboard carries over. On failure only `last_error` and
    /// the in-flight flag change.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<DiagramData, GenerateError>,
    ) -> Completion {
        if ticket.epoch != self.epoch {
            info!(ticket_epoch = ticket.epoch, epoch = self.epoch, "session: stale generation discarded");
            return Completion::Stale;
        }
        self.generating = false;

        match result {
            Ok(data) => {
                info!(
                    epoch = self.epoch,
                    kind = %data.kind,
                    nodes = data.nodes.len(),
                    edges = data.edges.len(),
                    "session: generation applied"
                );
                let transition = match self.editor.as_mut() {
                    Some(editor) => editor.replace(data),
                    None => {
                        let editor = Editor::new(data);
                        let transition = Transition::replay(editor.snapshot_arc());
                        self.editor = Some(editor);
                        transition
                    }
                };
                self.name = ticket.name;
                self.theme = ticket.theme;
                self.last_error = None;
                Completion::Applied(transition)
            }
            Err(e) => {
                warn!(epoch = self.epoch, error = %e, code = e.error_code(), "session: generation failed");
                let user_error = UserError::from_error(&e);
                self.last_error = Some(user_error.clone());
                Completion::Failed(user_error)
            }
        }
    }

    /// Release the in-flight slot for a generation that will never complete.
    ///
    /// Ignored when `epoch` is stale or nothing is in flight. Returns true if
    /// the slot was released.
    pub fn abandon_generation(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || !self.generating {
            return false;
        }
        self.generating = false;
        self.last_error = Some(UserError::from_error(&SessionError::Interrupted));
        warn!(epoch, "session: generation abandoned");
        true
    }

    /// Drop the current diagram and invalidate any in-flight generation.
    pub fn new_diagram(&mut self) {
        self.epoch += 1;
        self.editor = None;
        self.generating = false;
        self.name.clear();
        self.last_error = None;
        self.notices.clear();
        info!(epoch = self.epoch, "session: new diagram");
    }

    // --- Interaction ---

    /// Route an interaction event through the editor and post any
    /// notifications it produces. Events are ignored until a diagram exists.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Vec<Action> {
        let Some(editor) = self.editor.as_mut() else {
            debug!("session: event ignored, no diagram");
            return Vec::new();
        };
        let actions = editor.handle(event);
        for action in &actions {
            match action {
                Action::Notify(message) => self.notices.post_at(message.clone(), NoticeLevel::Info, now),
                Action::Rejected(err) => {
                    debug!(error = %err, "session: edit rejected");
                    self.notices.post_at(err.to_string(), NoticeLevel::Error, now);
                }
                _ => {}
            }
        }
        actions
    }

    /// Export the displayed snapshot and post the outcome as a notice.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoDiagram`] before the first generation, or the
    /// wrapped [`ExportError`].
    pub fn export(&mut self, format: ExportFormat, now: Instant) -> Result<Exported, SessionError> {
        let editor = self.editor.as_ref().ok_or(SessionError::NoDiagram)?;
        match export::export(editor.snapshot(), self.theme, &self.name, format) {
            Ok(exported) => {
                self.notices.post_at(format!("{} exported successfully!", format.label()), NoticeLevel::Info, now);
                Ok(exported)
            }
            Err(e) => {
                warn!(format = format.label(), error = %e, "session: export failed");
                self.notices
                    .post_at(format!("{} export failed. Please try again.", format.label()), NoticeLevel::Error, now);
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// ASYNC HANDLE
// =============================================================================

/// Shared session plus the generator that feeds it.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<RwLock<Session>>,
    generator: Arc<dyn DiagramGenerator>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(generator: Arc<dyn DiagramGenerator>) -> Self {
        Self { session: Arc::new(RwLock::new(Session::new())), generator }
    }

    /// Build a handle with the generator selected by the environment.
    ///
    /// # Errors
    ///
    /// Propagates [`generate::from_env`] configuration errors.
    pub fn from_env() -> Result<Self, GenerateError> {
        Ok(Self::new(generate::from_env()?))
    }

    #[must_use]
    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().await
    }

    pub async fn handle(&self, event: InputEvent) -> Vec<Action> {
        self.session.write().await.handle(event, Instant::now())
    }

    pub async fn new_diagram(&self) {
        self.session.write().await.new_diagram();
    }

    pub async fn export(&self, format: ExportFormat) -> Result<Exported, SessionError> {
        self.session.write().await.export(format, Instant::now())
    }

    /// Generate a diagram from `prompt` and apply it.
    ///
    /// The generator runs on its own task and completes the session there,
    /// so dropping this future (an aborted task, a caller-side timeout) does
    /// not leave the session stuck in the generating state. The session lock
    /// is not held while the generator runs.
    ///
    /// # Errors
    ///
    /// Only the checks done before the generator runs are errors, plus
    /// [`SessionError::Interrupted`] if the generator task panicked; adapter
    /// failures come back as [`Completion::Failed`].
    pub async fn generate(
        &self,
        prompt: &str,
        name: Option<&str>,
        theme: Option<Theme>,
    ) -> Result<Completion, SessionError> {
        let ticket = self.session.write().await.begin_generation(prompt, name, theme)?;
        let epoch = ticket.epoch;
        debug!(generator = self.generator.name(), epoch, "session: calling generator");

        let session = Arc::clone(&self.session);
        let generator = Arc::clone(&self.generator);
        let flight = tokio::spawn(async move {
            let result = generator.generate(ticket.prompt()).await;
            session.write().await.complete_generation(ticket, result)
        });

        match flight.await {
            Ok(completion) => Ok(completion),
            Err(e) => {
                warn!(epoch, error = %e, "session: generator task failed");
                self.session.write().await.abandon_generation(epoch);
                Err(SessionError::Interrupted)
            }
        }
    }

    /// Run [`Self::generate`] on a background task.
    pub fn spawn_generate(
        &self,
        prompt: String,
        name: Option<String>,
        theme: Option<Theme>,
    ) -> JoinHandle<Result<Completion, SessionError>> {
        let handle = self.clone();
        tokio::spawn(async move { handle.generate(&prompt, name.as_deref(), theme).await })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
