use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::io::kv_store::{FileStore, KeyValueStore};
use crate::io::lock::SessionLock;
use crate::io::persist;
use crate::model::task::SubtaskKey;
use crate::model::{AppConfig, UiConfig};
use crate::ops::bootstrap::bootstrap;
use crate::ops::state_store::{AppState, ToggleOutcome};

use super::confirm::{ConfirmDialog, DeleteConfirmation};
use super::drag::DragController;
use super::geometry::{CellMetrics, Point};
use super::list_view::{Hit, ListView};
use super::render;
use super::scheduler::RenderScheduler;
use super::swipe::{SwipeAction, SwipeController};
use super::theme::Theme;
use super::timer_loop::TimerLoop;

/// Rows moved per wheel notch
const SCROLL_ROWS: usize = 3;

/// Main application state
pub struct App {
    pub state: AppState,
    pub view: ListView,
    pub scheduler: RenderScheduler,
    pub timer: TimerLoop,
    pub swipe: SwipeController,
    pub drag: DragController,
    pub confirm: ConfirmDialog,
    /// Key binding overlay visible
    pub show_menu: bool,
    pub should_quit: bool,
    pub theme: Theme,
    ui: UiConfig,
    store: Box<dyn KeyValueStore>,
    /// Terminal area the list was last painted into
    list_area: Rect,
}

impl App {
    /// Build the app around a bootstrapped state and issue the first full
    /// render.
    pub fn new(
        state: AppState,
        store: Box<dyn KeyValueStore>,
        ui: &UiConfig,
        now: Instant,
    ) -> Self {
        let metrics = CellMetrics::new(ui.cell_width_px, ui.cell_height_px);
        let mut view = ListView::new(metrics);
        let mut scheduler = RenderScheduler::new();
        scheduler.render_full(&state, &mut view);
        let theme = Theme::from_config(ui, state.dark_mode);

        App {
            state,
            view,
            scheduler,
            timer: TimerLoop::new(Duration::from_millis(ui.frame_ms), now),
            swipe: SwipeController::new(),
            drag: DragController::new(),
            confirm: ConfirmDialog::new(),
            show_menu: false,
            should_quit: false,
            theme,
            ui: ui.clone(),
            store,
            list_area: Rect::default(),
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn list_area(&self) -> Rect {
        self.list_area
    }

    /// Size the list viewport to the terminal area it is painted into
    pub fn set_list_area(&mut self, area: Rect) {
        if area == self.list_area {
            return;
        }
        self.list_area = area;
        let m = self.view.metrics();
        self.view.set_viewport(
            f32::from(area.width) * m.cell_w,
            f32::from(area.height) * m.cell_h,
        );
    }

    fn gesture_active(&self) -> bool {
        self.drag.is_dragging() || self.swipe.is_pressed()
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    /// Run one frame if due: timer tick, then pending swipe visuals.
    /// Returns whether a frame ran.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if !self.timer.is_due(now) {
            return false;
        }
        self.timer.tick(
            now,
            &mut self.state,
            &mut self.scheduler,
            &mut self.view,
            self.store.as_mut(),
        );
        self.swipe.on_frame(&mut self.view, now);
        true
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::FocusLost => self.cancel_gestures(now),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if self.confirm.is_open() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.confirm.accept(
                        &mut self.state,
                        &mut self.scheduler,
                        &mut self.view,
                        self.store.as_mut(),
                    );
                }
                KeyCode::Char('n') | KeyCode::Esc => self.confirm.decline(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.cancel_gestures(now);
                self.should_quit = true;
            }
            KeyCode::Esc if self.gesture_active() => self.cancel_gestures(now),
            KeyCode::Esc => self.show_menu = false,
            KeyCode::Char('m') => self.show_menu = !self.show_menu,
            KeyCode::Char('d') => self.toggle_dark_mode(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.confirm.is_open() {
            return;
        }
        let at = self.view.metrics().cell_center(
            mouse.column,
            mouse.row,
            self.list_area.x,
            self.list_area.y,
        );
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.in_list_area(mouse.column, mouse.row) {
                    self.pointer_down(at);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    self.drag.pointer_move(at, &mut self.view);
                } else {
                    self.swipe.touch_move(at, &mut self.view);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer_up(now),
            MouseEventKind::ScrollDown => self.scroll(1.0),
            MouseEventKind::ScrollUp => self.scroll(-1.0),
            _ => {}
        }
    }

    fn in_list_area(&self, col: u16, row: u16) -> bool {
        let a = self.list_area;
        col >= a.x && col < a.x + a.width && row >= a.y && row < a.y + a.height
    }

    fn pointer_down(&mut self, at: Point) {
        if self.gesture_active() {
            return;
        }
        match self.view.hit_test(at) {
            Some(Hit::Header(task_id)) => {
                // The lifted copy must not carry a half-reverted row
                self.swipe.finish_revert(&mut self.view);
                self.drag.pointer_down(
                    task_id,
                    at,
                    &self.state,
                    &mut self.scheduler,
                    &mut self.view,
                );
            }
            Some(Hit::Row(key)) => {
                self.swipe.touch_start(key, at, &mut self.view);
            }
            None => {}
        }
    }

    fn pointer_up(&mut self, now: Instant) {
        if self.drag.is_dragging() {
            self.drag.pointer_up(
                &mut self.state,
                &mut self.scheduler,
                &mut self.view,
                self.store.as_mut(),
            );
            return;
        }
        match self.swipe.touch_end(&mut self.view, now) {
            Some(SwipeAction::DeleteRequested(key)) => {
                self.confirm.request_delete_confirmation(key);
            }
            Some(SwipeAction::ToggleTimer(key)) => self.toggle_timer(key, now),
            None => {}
        }
    }

    fn scroll(&mut self, notches: f32) {
        if self.gesture_active() {
            return;
        }
        let step = self.view.metrics().rows_px(SCROLL_ROWS);
        self.view.scroll_by(notches * step);
    }

    /// Pointer lost: a drag is put back, a swipe animates home
    pub fn cancel_gestures(&mut self, now: Instant) {
        self.drag.cancel(&self.state, &mut self.scheduler, &mut self.view);
        self.swipe.touch_cancel(&mut self.view, now);
    }

    // -----------------------------------------------------------------------
    // Commits
    // -----------------------------------------------------------------------

    fn toggle_timer(&mut self, key: SubtaskKey, now: Instant) {
        if self.state.toggle_timer(key, now) == ToggleOutcome::Missing {
            return;
        }
        persist::save_tasks(self.store.as_mut(), &self.state);
        self.scheduler.render_incremental(&self.state, &mut self.view);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.state.dark_mode = !self.state.dark_mode;
        persist::save_dark_mode(self.store.as_mut(), self.state.dark_mode);
        self.theme = Theme::from_config(&self.ui, self.state.dark_mode);
        info!("event=mode_toggle module=app dark={}", self.state.dark_mode);
    }
}

/// Run the TUI application
pub fn run(config: &AppConfig, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = SessionLock::acquire_default(data_dir)?;
    let mut store = FileStore::open(data_dir)?;
    let state = bootstrap(&mut store, config.ui.dark_mode_default);
    let mut app = App::new(state, Box::new(store), &config.ui, Instant::now());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!(
        "event=session_end module=app tasks={} frames={}",
        app.state.task_count(),
        app.timer.ticks()
    );
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.on_frame(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        let timeout = app.timer.time_until_next(Instant::now());
        if event::poll(timeout)? {
            app.handle_event(event::read()?, Instant::now());
            // Drain whatever else is queued before the next frame
            while event::poll(Duration::ZERO)? {
                app.handle_event(event::read()?, Instant::now());
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
