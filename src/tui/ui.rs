use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::LyricSession;
use crate::config::Config;
use crate::lyrics::LyricStatus;
use crate::player::PlaybackClock;
use crate::tui::theme::Theme;
use crate::tui::widgets::{LyricsPanel, ProgressBar, StatusBar, StatusInfo};

/// UI 状态
#[derive(Debug, Default)]
pub struct UiState {
    /// 光标所在歌词行，None 表示跟随当前行
    pub selected: Option<usize>,
    pub status_info: StatusInfo,
}

/// 渲染主界面
pub fn render_ui(
    f: &mut Frame,
    config: &Config,
    session: &LyricSession,
    ui_state: &UiState,
    theme: &Theme,
) {
    let size = f.area();
    let controller = session.controller();

    // 创建主边框（标题在边框上）
    let main_title = match controller.metadata().get("ti") {
        Some(title) => format!("歌词同步器 - {}", title),
        None => "歌词同步器".to_string(),
    };

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(main_title)
        .title_style(theme.title_style());

    let inner_area = main_block.inner(size);
    f.render_widget(main_block, size);

    let inner_layout = create_inner_layout(inner_area);

    // 1. 歌曲信息
    render_info_bar(f, inner_layout[0], session, theme);

    // 2. 歌词面板
    LyricsPanel::new(
        controller.lines(),
        controller.active_index(),
        ui_state.selected,
        controller.status(),
        theme,
    )
    .context_lines(config.display.context_lines)
    .show_timestamp(config.display.show_timestamp)
    .render(f, inner_layout[1]);

    // 3. 进度条
    let clock = session.clock();
    let progress_area = bordered(f, inner_layout[2], theme);
    ProgressBar::new(clock.position(), clock.duration(), clock.status(), theme)
        .render(f, progress_area);

    // 4. 状态栏
    let status_area = bordered(f, inner_layout[3], theme);
    StatusBar::new(&ui_state.status_info, theme).render(f, status_area);
}

/// 创建内部布局（在主边框内）
fn create_inner_layout(area: Rect) -> Vec<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // 歌曲信息（两行）
            Constraint::Min(5),    // 歌词面板
            Constraint::Length(3), // 进度条
            Constraint::Length(3), // 状态栏
        ])
        .split(area);

    chunks.to_vec()
}

/// 绘制边框并返回内部区域
fn bordered(f: &mut Frame, area: Rect, theme: &Theme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style());
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// 渲染歌曲信息栏
fn render_info_bar(f: &mut Frame, area: Rect, session: &LyricSession, theme: &Theme) {
    let controller = session.controller();
    let metadata = controller.metadata();

    // 第一行：艺术家 - 歌曲 (专辑)
    let track_line = match (metadata.get("ar"), metadata.get("ti")) {
        (None, None) => Line::from(Span::styled(
            session
                .current_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "未选择歌曲".to_string()),
            theme.dimmed_style(),
        )),
        (artist, title) => {
            let mut spans = vec![
                Span::styled(
                    artist.map(String::as_str).unwrap_or("未知艺术家"),
                    theme.text_style(),
                ),
                Span::styled(" - ", theme.status_style()),
                Span::styled(
                    title.map(String::as_str).unwrap_or("未知歌曲"),
                    theme.accent_style(),
                ),
            ];
            if let Some(album) = metadata.get("al").filter(|a| !a.is_empty()) {
                spans.push(Span::styled(format!(" ({})", album), theme.status_style()));
            }
            Line::from(spans)
        }
    };

    // 第二行：歌词状态
    let status_text = match controller.status() {
        LyricStatus::NoTrack => "无歌词来源",
        LyricStatus::Loading => "加载中",
        LyricStatus::Loaded => "已加载",
        LyricStatus::Instrumental => "纯音乐",
        LyricStatus::Failed(_) => "加载失败",
    };
    let status_line = Line::from(vec![
        Span::styled("歌词: ", theme.status_style()),
        Span::styled(status_text, theme.accent_style()),
        Span::styled(" | 制作: ", theme.status_style()),
        Span::styled(
            metadata.get("by").map(String::as_str).unwrap_or("-"),
            theme.text_style(),
        ),
    ]);

    let paragraph = Paragraph::new(vec![track_line, status_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style()),
        );
    f.render_widget(paragraph, area);
}

/// 渲染帮助界面（覆盖显示）
pub fn render_help(f: &mut Frame, theme: &Theme) {
    let help_area = centered_rect(60, 70, f.area());

    let key_line = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<12}", keys), theme.accent_style()),
            Span::styled(desc, theme.text_style()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("歌词同步器 - 帮助", theme.title_style())),
        Line::from(""),
        Line::from(Span::styled("快捷键操作:", theme.accent_style())),
        key_line("Q / Esc", "退出程序"),
        key_line("Space", "播放 / 暂停"),
        key_line("← / →", "后退 / 前进 5 秒"),
        key_line("↑ / ↓", "移动光标"),
        key_line("Enter", "跳转到光标所在行"),
        key_line("R", "重新加载歌词"),
        key_line("H / ?", "显示/隐藏帮助"),
        Line::from(""),
        Line::from(Span::styled("按任意键关闭帮助", theme.dimmed_style())),
    ];

    let help_paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("帮助")
                .borders(Borders::ALL)
                .border_style(theme.accent_style()),
        );

    f.render_widget(Clear, help_area);
    f.render_widget(help_paragraph, help_area);
}

/// 创建居中矩形
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{FetchError, LyricRef, LyricSource};
    use crate::player::SimulatedClock;
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct FixedSource;

    #[async_trait]
    impl LyricSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _lyric_ref: &LyricRef) -> Result<String, FetchError> {
            Ok("[ti:晴天]\n[ar:周杰伦]\n[00:01.00]故事的小黄花\n[00:05.00]从出生那年就飘着".to_string())
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_loaded_track() {
        let clock = Arc::new(SimulatedClock::new(Some(240.0)));
        let mut session = LyricSession::new(Arc::new(FixedSource), clock);
        session.load(Some(LyricRef::Id("1".to_string())));
        let outcome = session.next_fetch().await.unwrap();
        session.apply(outcome);
        session.seek(2.0);

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let config = Config::default();
        let theme = Theme::default();
        let ui_state = UiState::default();
        terminal
            .draw(|f| render_ui(f, &config, &session, &ui_state, &theme))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("晴"));
        assert!(text.contains("♪"));
        assert!(text.contains("00:02"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 70, area);
        assert_eq!(popup.width, 60);
        assert!(popup.x >= 20 && popup.right() <= 80);
        assert!(popup.bottom() <= area.bottom());
    }
}
