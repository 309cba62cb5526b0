//! Prompter entrypoint: startup, the serialized event loop, and shutdown.

mod actions;

use actions::{Action, SPEED_STEP, translate};
use anyhow::Result;
use clap::Parser;
use core_config::EffectiveSettings;
use core_events::{
    CHANNEL_SEND_FAILURES, EVENT_CHANNEL_CAP, Event, InputEvent, TICKS_DISCARDED, TICKS_EMITTED,
    TickEvent, TickScheduler,
};
use core_geometry::GeometryTracker;
use core_input::{InputShutdown, spawn_input_task};
use core_render::{POINTS_PER_ROW, PresentLayout, RenderEngine, STATUS_ROWS};
use core_scroll::{JUMP_STEP, SPEED_MAX, SPEED_MIN, ScrollEngine};
use core_state::{Mode, PrompterState, denormalize_line_endings, normalize_line_endings};
use core_terminal::{CrosstermBackend, TerminalBackend};
use core_text::normalize_input;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// How long status notifications linger.
const EPHEMERAL_TTL: Duration = Duration::from_secs(3);

/// Seed text shown on first launch when no file is given.
const DEFAULT_PROMPT_TEXT: &str = "Generative AI is going to reinvent virtually every customer experience we know, and enable altogether new ones about which we\u{2019}ve only fantasized. The early AI workloads being deployed focus on productivity and cost avoidance (e.g. customer service, business process orchestration, workflow, translation, etc.). This is saving companies a lot of money. Increasingly, you\u{2019}ll see AI change the norms in coding, search, shopping, personal assistants, primary care, cancer and drug research, biology, robotics, space, financial services, neighborhood networks\u{2014}everything. Some of these areas are already seeing rapid progress; others are still in their infancy. But, if your customer experiences aren\u{2019}t planning to leverage these intelligent models, their ability to query giant corpuses of data and quickly find your needle in the haystack, their ability to keep getting smarter with more feedback and data, and their future agentic capabilities, you will not be competitive. How soon? It won\u{2019}t all happen in a year or two, but, it won\u{2019}t take ten either. It\u{2019}s moving faster than almost anything technology has ever seen.";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "prompter", version, about = "Terminal teleprompter")]
struct Args {
    /// Optional path to a UTF-8 text file to load at startup.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `prompter.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    state: PrompterState,
    settings: EffectiveSettings,
    terminal_guard: core_terminal::TerminalGuard<'a>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn run(&mut self) -> Result<RuntimeContext<'_>> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let args = Args::parse();
        let (state, settings) = load_session(&args)?;

        self.backend.set_title("Prompter")?;
        let guard = self.backend.enter_guard()?;

        Ok(RuntimeContext {
            state,
            settings,
            terminal_guard: guard,
        })
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("prompter.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }
        let file_appender = tracing_appender::rolling::never(log_dir, "prompter.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // A global subscriber is already installed; drop the guard so
                // the writer shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Load the prompt text and configuration into a fresh session state.
fn load_session(args: &Args) -> Result<(PrompterState, EffectiveSettings)> {
    let mut open_failed = false;
    let (text, file_name, norm) = if let Some(path) = args.path.as_ref() {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let size_bytes = content.len();
                let norm = normalize_line_endings(&content);
                info!(target: "io", file = %path.display(), size_bytes, "file_read_ok");
                if norm.mixed {
                    warn!(target: "io", file = %path.display(), "mixed_line_endings_detected");
                }
                (norm.normalized.clone(), Some(path.clone()), Some(norm))
            }
            Err(err) => {
                error!(target: "io", ?err, file = %path.display(), "file_open_error");
                open_failed = true;
                (String::new(), None, None)
            }
        }
    } else {
        (DEFAULT_PROMPT_TEXT.to_string(), None, None)
    };

    let mut state = PrompterState::new(text);
    state.file_name = file_name;
    if let Some(n) = norm {
        state.original_line_ending = n.original;
        state.had_trailing_newline = n.had_trailing_newline;
    }
    if open_failed {
        state.set_ephemeral("Open failed", EPHEMERAL_TTL);
    }

    let config = core_config::load_from(args.config.clone())?;
    let settings = config.apply_limits();
    state.style.font_size = settings.font_size;
    state.style.set_line_spacing(settings.line_spacing);
    state.style.background = settings.background.clone();
    state.style.foreground = settings.foreground.clone();

    info!(
        target: "runtime.startup",
        open_failed,
        config_override = args.config.is_some(),
        speed = settings.speed,
        font_size = settings.font_size,
        tick_interval_ms = settings.tick_interval_ms,
        "bootstrap_complete"
    );
    Ok((state, settings))
}

enum LoopControl {
    Continue { repaint: bool },
    Break(ShutdownReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    CtrlC,
    ActionQuit,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::ActionQuit => "action_quit",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

/// Decides whether a tick needs a repaint: only when the content block
/// moved by at least one terminal row, or some other change is pending.
#[derive(Debug, Default)]
struct FrameGate {
    dirty: bool,
    last_shift: Option<i64>,
}

impl FrameGate {
    fn mark(&mut self) {
        self.dirty = true;
    }

    fn tick_should_paint(&mut self, shift: i64) -> bool {
        self.dirty || self.last_shift != Some(shift)
    }

    fn note_painted(&mut self, shift: i64) {
        self.dirty = false;
        self.last_shift = Some(shift);
    }
}

struct PrompterRuntime<'a> {
    state: PrompterState,
    engine: ScrollEngine,
    tracker: GeometryTracker,
    render: RenderEngine,
    ticks: TickScheduler,
    gate: FrameGate,
    cols: u16,
    rows: u16,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    input_task: Option<tokio::task::JoinHandle<()>>,
    input_shutdown: Option<InputShutdown>,
    _terminal_guard: Option<core_terminal::TerminalGuard<'a>>,
}

impl<'a> PrompterRuntime<'a> {
    fn new(
        context: RuntimeContext<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        input_task: tokio::task::JoinHandle<()>,
        input_shutdown: InputShutdown,
    ) -> Self {
        let RuntimeContext {
            state,
            settings,
            terminal_guard,
        } = context;
        let mut engine = ScrollEngine::new(settings.speed);
        engine.seek_to_top();
        Self {
            state,
            engine,
            tracker: GeometryTracker::new(),
            render: RenderEngine::new(),
            ticks: TickScheduler::new(Duration::from_millis(settings.tick_interval_ms)),
            gate: FrameGate::default(),
            cols: 0,
            rows: 0,
            rx,
            tx: Some(tx),
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            _terminal_guard: Some(terminal_guard),
        }
    }

    async fn run(&mut self) -> Result<()> {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        self.cols = cols;
        self.rows = rows;
        self.repaint_logged();

        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        let mut reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = match event {
                Event::Input(input) => self.handle_input(input).await,
                Event::Tick(tick) => self.handle_tick(tick),
            };
            match control {
                LoopControl::Break(r) => {
                    reason = r;
                    break;
                }
                LoopControl::Continue { repaint } => {
                    if repaint {
                        self.repaint_logged();
                    }
                }
            }
        }

        self.rx.close();
        self.finalize_shutdown(reason).await;
        Ok(())
    }

    async fn handle_input(&mut self, input: InputEvent) -> LoopControl {
        match input {
            InputEvent::Key(key) => match translate(key, self.state.mode) {
                Some(action) => self.apply_action(action).await,
                None => LoopControl::Continue { repaint: false },
            },
            InputEvent::Resize(w, h) => {
                trace!(target: "runtime", w, h, "resize");
                self.cols = w;
                self.rows = h;
                self.gate.mark();
                LoopControl::Continue { repaint: true }
            }
            InputEvent::Paste(data) => {
                if self.state.mode == Mode::Edit {
                    let pasted = normalize_input(&normalize_line_endings(&data).normalized);
                    self.state.insert(&pasted);
                    self.gate.mark();
                    LoopControl::Continue { repaint: true }
                } else {
                    LoopControl::Continue { repaint: false }
                }
            }
            InputEvent::CtrlC => LoopControl::Break(ShutdownReason::CtrlC),
        }
    }

    fn handle_tick(&mut self, tick: TickEvent) -> LoopControl {
        if !self.ticks.accepts(&tick) {
            TICKS_DISCARDED.fetch_add(1, Ordering::Relaxed);
            return LoopControl::Continue { repaint: false };
        }
        self.engine.advance(tick.dt);
        self.engine.note_tick(Instant::now());
        if self.state.tick_ephemeral() {
            self.gate.mark();
        }
        let repaint = self.gate.tick_should_paint(self.current_shift());
        LoopControl::Continue { repaint }
    }

    async fn apply_action(&mut self, action: Action) -> LoopControl {
        match action {
            Action::Quit => return LoopControl::Break(ShutdownReason::ActionQuit),
            Action::EnterPresent => self.enter_present(),
            Action::LeaveToEdit => self.leave_to_edit().await,
            Action::TogglePlayback => {
                self.engine.toggle();
            }
            Action::JumpBack => self.engine.jump(JUMP_STEP),
            Action::JumpForward => self.engine.jump(-JUMP_STEP),
            Action::SeekTop => self.engine.seek_to_top(),
            Action::SpeedUp => self.nudge_speed(SPEED_STEP),
            Action::SpeedDown => self.nudge_speed(-SPEED_STEP),
            Action::FontGrow => self.state.style.grow_font(),
            Action::FontShrink => self.state.style.shrink_font(),
            Action::Insert(c) => {
                let mut buf = [0u8; 4];
                let s = normalize_input(c.encode_utf8(&mut buf));
                self.state.insert(&s);
            }
            Action::Newline => self.state.newline(),
            Action::Backspace => {
                self.state.backspace();
            }
            Action::CaretLeft => self.state.move_left(),
            Action::CaretRight => self.state.move_right(),
            Action::CaretUp => self.state.move_up(),
            Action::CaretDown => self.state.move_down(),
            Action::CaretLineStart => self.state.move_line_start(),
            Action::CaretLineEnd => self.state.move_line_end(),
            Action::Undo => {
                if self.state.undo_edit().is_err() {
                    self.state.set_ephemeral("Nothing to undo", EPHEMERAL_TTL);
                }
            }
            Action::Redo => {
                if self.state.redo_edit().is_err() {
                    self.state.set_ephemeral("Nothing to redo", EPHEMERAL_TTL);
                }
            }
            Action::Save => self.save_file(),
            Action::DismissStatus => {
                self.state.dismiss_ephemeral();
            }
        }
        self.gate.mark();
        LoopControl::Continue { repaint: true }
    }

    /// Switch to the presentation surface: a fresh reading session starts
    /// top-aligned and playing, with the tick stream running.
    fn enter_present(&mut self) {
        self.state.mode = Mode::Present;
        if let Some(tx) = &self.tx {
            self.ticks.start(tx.clone());
        }
        self.engine.seek_to_top();
        self.engine.play();
        info!(target: "runtime", "enter_present");
    }

    /// Back to editing: playback pauses and the tick stream is torn down
    /// (no advance can happen once this returns).
    async fn leave_to_edit(&mut self) {
        self.state.mode = Mode::Edit;
        self.engine.pause();
        self.ticks.stop().await;
        info!(target: "runtime", "leave_present");
    }

    fn nudge_speed(&mut self, delta: f64) {
        let next = (self.engine.speed() + delta).clamp(SPEED_MIN, SPEED_MAX);
        self.engine.set_speed(next);
    }

    /// Apply a fresh measurement pair. Content changes restart reading
    /// from the top; a bare viewport resize keeps the position, re-clamped
    /// into the new bounds.
    fn sync_presentation_geometry(&mut self, viewport_height: f64, content_height: f64) {
        let update = self.tracker.update(viewport_height, content_height);
        if !update.changed() {
            return;
        }
        self.engine.set_bounds(update.bounds);
        if update.content_changed {
            self.engine.seek_to_top();
        }
    }

    fn repaint_logged(&mut self) {
        if let Err(err) = self.repaint() {
            error!(target: "render.engine", ?err, "repaint_error");
        }
    }

    fn repaint(&mut self) -> Result<()> {
        let mut out = BufWriter::new(io::stdout());
        match self.state.mode {
            Mode::Edit => {
                self.render
                    .render_edit(&mut out, &self.state, &self.engine, self.cols, self.rows)?;
            }
            Mode::Present => {
                let text_rows = self.rows.saturating_sub(STATUS_ROWS);
                let layout = PresentLayout::compute(
                    self.state.text(),
                    &self.state.style,
                    self.cols,
                    text_rows,
                );
                self.sync_presentation_geometry(layout.viewport_height, layout.content_height);
                self.render.render_present(
                    &mut out,
                    &self.state,
                    &self.engine,
                    &layout,
                    self.cols,
                    self.rows,
                )?;
            }
        }
        self.gate.note_painted(self.current_shift());
        Ok(())
    }

    /// Rendered row shift of the content block, derived from style alone so
    /// ticks can be gated without re-wrapping the text.
    fn current_shift(&self) -> i64 {
        let line_height = self.state.style.line_height();
        let row_step = (line_height / POINTS_PER_ROW).round().max(1.0);
        (self.engine.offset() * row_step / line_height).round() as i64
    }

    fn save_file(&mut self) {
        let path = self
            .state
            .file_name
            .clone()
            .unwrap_or_else(|| PathBuf::from("prompt.txt"));
        let mut content =
            denormalize_line_endings(self.state.text(), self.state.original_line_ending);
        if self.state.had_trailing_newline && !content.ends_with(self.state.original_line_ending.as_str())
        {
            content.push_str(self.state.original_line_ending.as_str());
        }
        match std::fs::write(&path, &content) {
            Ok(()) => {
                info!(target: "io", file = %path.display(), size_bytes = content.len(), "file_write_ok");
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("prompt.txt")
                    .to_string();
                self.state.file_name = Some(path);
                self.state.dirty = false;
                self.state.set_ephemeral(format!("Saved {name}"), EPHEMERAL_TTL);
            }
            Err(err) => {
                error!(target: "io", ?err, file = %path.display(), "file_write_error");
                self.state.set_ephemeral("Save failed", EPHEMERAL_TTL);
            }
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown_begin");
        self.ticks.stop().await;
        if let Some(tx) = self.tx.take() {
            drop(tx);
        }
        if let Some(shutdown) = self.input_shutdown.take() {
            shutdown.signal();
        }
        if let Some(handle) = self.input_task.take() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(())) => trace!(target: "runtime.shutdown", "input_task_joined"),
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "input_task_join_failed"),
                Err(_) => warn!(target: "runtime.shutdown", "input_task_join_timeout"),
            }
        }
        info!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            ticks_emitted = TICKS_EMITTED.load(Ordering::Relaxed),
            ticks_discarded = TICKS_DISCARDED.load(Ordering::Relaxed),
            send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
            "shutdown_complete"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    let context = startup.run()?;

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = spawn_input_task(tx.clone());
    let mut runtime = PrompterRuntime::new(context, tx, rx, input_task, input_shutdown);
    runtime.run().await
}
