use anyhow::Result;
use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info};

use crate::app::LyricSession;
use crate::config::Config;
use crate::lyrics::SyncEvent;
use crate::player::{PlaybackClock, PlaybackStatus};
use crate::tui::events::{EventHandler, TuiEvent};
use crate::tui::theme::Theme;
use crate::tui::ui::{render_help, render_ui, UiState};
use crate::tui::widgets::SourceStatus;

/// 左右方向键每次跳转的秒数
const SEEK_STEP_SECS: f64 = 5.0;

/// TUI 应用主结构
pub struct TuiApp {
    config: Arc<Config>,
    session: LyricSession,
    sync_events: UnboundedReceiver<SyncEvent>,
    theme: Theme,
    ui_state: UiState,
    should_quit: bool,
    show_help: bool,
    needs_redraw: bool,
}

impl TuiApp {
    /// 创建新的 TUI 应用
    pub fn new(config: Arc<Config>, mut session: LyricSession) -> Self {
        let sync_events = session.subscribe();

        let mut app = Self {
            config,
            session,
            sync_events,
            theme: Theme::default(),
            ui_state: UiState::default(),
            should_quit: false,
            show_help: false,
            needs_redraw: true, // 初始需要绘制
        };
        app.update_lyrics_status();
        app
    }

    /// 运行 TUI 应用
    pub async fn run(&mut self) -> Result<()> {
        // 设置终端
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // 无论主循环是否出错都要恢复终端
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(100);
        let tick_rate = Duration::from_millis(self.config.display.tick_interval_ms.max(10));
        let mut event_handler = EventHandler::new(tick_rate);

        // 启动事件监听
        let event_task = tokio::spawn(async move {
            if let Err(err) = event_handler.run(tx).await {
                error!("事件处理器错误: {}", err);
            }
        });

        while !self.should_quit {
            // 只在需要时重绘界面
            if self.needs_redraw {
                terminal.draw(|f| {
                    render_ui(f, &self.config, &self.session, &self.ui_state, &self.theme);

                    // 如果显示帮助，覆盖显示帮助界面
                    if self.show_help {
                        render_help(f, &self.theme);
                    }
                })?;
                self.needs_redraw = false;
            }

            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("事件通道已关闭");
                        self.should_quit = true;
                    }
                },

                Some(outcome) = self.session.next_fetch() => {
                    self.session.apply(outcome);
                }
            }

            self.drain_sync_events();
        }

        event_task.abort();
        Ok(())
    }

    /// 处理事件
    fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key) => {
                if self.show_help {
                    // 帮助界面打开时任意键关闭帮助
                    self.show_help = false;
                    self.needs_redraw = true;
                } else if EventHandler::handle_key_event(key) {
                    self.should_quit = true;
                } else {
                    self.handle_key_input(key);
                    self.needs_redraw = true;
                }
            }
            TuiEvent::Tick => {
                self.session.tick();
                // 播放中进度条每次都会变化
                if self.session.clock().status() == PlaybackStatus::Playing {
                    self.needs_redraw = true;
                }
            }
        }
    }

    /// 处理按键输入
    fn handle_key_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char(' ') => {
                let status = self.session.toggle_pause();
                info!("播放状态: {}", status.label());
            }
            KeyCode::Left => self.session.seek_by(-SEEK_STEP_SECS),
            KeyCode::Right => self.session.seek_by(SEEK_STEP_SECS),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Enter => {
                if let Some(index) = self.ui_state.selected.take() {
                    debug!("跳转到第 {} 行", index);
                    self.session.seek_to_line(index);
                }
            }
            KeyCode::Char('r') => {
                if let Some(lyric_ref) = self.session.current_ref() {
                    info!("手动刷新歌词: {}", lyric_ref);
                }
                self.ui_state.selected = None;
                self.session.reload();
            }
            _ => {}
        }
    }

    /// 移动光标，第一次移动时从当前行开始
    fn move_cursor(&mut self, delta: isize) {
        let len = self.session.controller().lines().len();
        if len == 0 {
            return;
        }

        let base = self
            .ui_state
            .selected
            .or(self.session.controller().active_index());
        let next = match base {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None if delta > 0 => 0,
            None => return,
        };
        self.ui_state.selected = Some(next);
    }

    /// 处理控制器发出的变更通知
    fn drain_sync_events(&mut self) {
        while let Ok(event) = self.sync_events.try_recv() {
            match event {
                SyncEvent::ActiveLineChanged { index } => {
                    debug!("当前行变更: {:?}", index);
                }
                SyncEvent::StatusChanged(status) => {
                    debug!("歌词状态变更: {:?}", status);
                    // 换了歌词，光标位置不再有意义
                    self.ui_state.selected = None;
                    self.update_lyrics_status();
                }
            }
            self.needs_redraw = true;
        }
    }

    /// 更新歌词状态
    fn update_lyrics_status(&mut self) {
        let controller = self.session.controller();
        let info = &mut self.ui_state.status_info;

        info.source_status = SourceStatus::from(controller.status());
        info.line_count = controller.lines().len();
        info.lyrics_source = self.session.current_ref().map(|r| r.to_string());
    }
}
