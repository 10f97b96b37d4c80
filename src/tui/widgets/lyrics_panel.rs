use std::ops::Range;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::display::{self, format_time};
use crate::lyrics::{LyricLine, LyricStatus};
use crate::tui::theme::Theme;

/// 歌词面板组件
pub struct LyricsPanel<'a> {
    lines: &'a [LyricLine],
    active: Option<usize>,
    /// 光标所在行，None 表示跟随当前行
    selected: Option<usize>,
    status: &'a LyricStatus,
    context_lines: usize,
    show_timestamp: bool,
    theme: &'a Theme,
}

impl<'a> LyricsPanel<'a> {
    pub fn new(
        lines: &'a [LyricLine],
        active: Option<usize>,
        selected: Option<usize>,
        status: &'a LyricStatus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            lines,
            active,
            selected,
            status,
            context_lines: 4,
            show_timestamp: false,
            theme,
        }
    }

    pub fn context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    pub fn show_timestamp(mut self, show_timestamp: bool) -> Self {
        self.show_timestamp = show_timestamp;
        self
    }

    /// 渲染歌词面板
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let content = if self.lines.is_empty() {
            self.create_message_lines(height)
        } else {
            self.create_lyrics_lines(height)
        };

        let paragraph = Paragraph::new(content).alignment(Alignment::Center);
        f.render_widget(paragraph, inner);
    }

    /// 创建歌词显示行
    fn create_lyrics_lines(&self, available_height: usize) -> Vec<Line<'a>> {
        // 光标优先，其次是当前行，歌曲开始前停在第一行
        let focus = self.selected.or(self.active).unwrap_or(0);
        let range = visible_range(self.lines.len(), focus, self.context_lines, available_height);

        let mut result = Vec::with_capacity(available_height);

        // 如果歌词太少，垂直居中显示
        let padding_top = available_height.saturating_sub(range.len()) / 2;
        result.extend(std::iter::repeat(Line::from("")).take(padding_top));

        let lines = self.lines;
        for i in range {
            result.push(self.create_line(i, &lines[i]));
        }
        result
    }

    fn create_line(&self, index: usize, line: &'a LyricLine) -> Line<'a> {
        let mut spans = Vec::new();

        let (marker, style) = if Some(index) == self.active {
            ("♪ ", self.theme.current_line_style())
        } else if Some(index) == self.selected {
            ("> ", self.theme.selected_line_style())
        } else {
            ("", self.theme.dimmed_style())
        };

        if !marker.is_empty() {
            spans.push(Span::styled(marker, self.theme.accent_style()));
        }
        if self.show_timestamp {
            spans.push(Span::styled(
                format!("[{}] ", format_time(line.time)),
                self.theme.status_style(),
            ));
        }
        spans.push(Span::styled(line.text.as_str(), style));

        Line::from(spans)
    }

    /// 没有歌词行时显示状态提示（垂直居中）
    fn create_message_lines(&self, available_height: usize) -> Vec<Line<'a>> {
        let message = display::status_message(self.status).unwrap_or("暂无歌词");
        let style = match self.status {
            LyricStatus::Failed(_) => self.theme.error_style(),
            _ => self.theme.dimmed_style(),
        };

        let mut lines = vec![Line::from(""); available_height / 2];
        lines.push(Line::from(Span::styled(message, style)));

        if let LyricStatus::Failed(reason) = self.status {
            lines.push(Line::from(Span::styled(
                reason.as_str(),
                self.theme.dimmed_style(),
            )));
        }
        lines
    }
}

/// 计算需要显示的歌词范围，尽量让 `focus` 居中
///
/// 上下文行数会被面板高度限制；靠近开头或结尾时窗口向另一侧延伸。
pub fn visible_range(len: usize, focus: usize, context: usize, height: usize) -> Range<usize> {
    if len == 0 || height == 0 {
        return 0..0;
    }

    let focus = focus.min(len - 1);
    let window = (context * 2 + 1).min(height).min(len);

    let start = focus
        .saturating_sub(window / 2)
        .min(len - window);
    start..start + window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<LyricLine> {
        (0..n)
            .map(|i| LyricLine::new(i as f64 * 5.0, format!("line {}", i)))
            .collect()
    }

    fn texts(panel: &LyricsPanel, height: usize) -> Vec<String> {
        panel
            .create_lyrics_lines(height)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_visible_range_centers_focus() {
        assert_eq!(visible_range(20, 10, 2, 30), 8..13);
        // 开头和结尾处窗口不越界
        assert_eq!(visible_range(20, 0, 2, 30), 0..5);
        assert_eq!(visible_range(20, 19, 2, 30), 15..20);
        // 面板高度不足时缩小窗口
        assert_eq!(visible_range(20, 10, 4, 3), 9..12);
        // 歌词少于窗口
        assert_eq!(visible_range(3, 1, 4, 30), 0..3);
        assert_eq!(visible_range(0, 0, 4, 30), 0..0);
        assert_eq!(visible_range(5, 99, 1, 30), 2..5);
    }

    #[test]
    fn test_markers_for_active_and_selected() {
        let theme = Theme::default();
        let track = lines(3);
        let status = LyricStatus::Loaded;

        let panel = LyricsPanel::new(&track, Some(1), Some(2), &status, &theme).context_lines(1);
        assert_eq!(texts(&panel, 3), vec!["line 0", "♪ line 1", "> line 2"]);

        let panel = LyricsPanel::new(&track, None, None, &status, &theme)
            .context_lines(1)
            .show_timestamp(true);
        assert_eq!(texts(&panel, 2), vec!["[00:00] line 0", "[00:05] line 1"]);
    }

    #[test]
    fn test_padding_when_few_lines() {
        let theme = Theme::default();
        let track = lines(1);
        let status = LyricStatus::Loaded;
        let panel = LyricsPanel::new(&track, Some(0), None, &status, &theme);
        assert_eq!(texts(&panel, 5), vec!["", "", "♪ line 0"]);
    }

    #[test]
    fn test_message_for_status() {
        let theme = Theme::default();
        let status = LyricStatus::Failed("HTTP 状态码 503".to_string());
        let panel = LyricsPanel::new(&[], None, None, &status, &theme);
        let lines = panel.create_message_lines(4);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].spans[0].content, "歌词加载失败");
        assert_eq!(lines[3].spans[0].content, "HTTP 状态码 503");
    }
}
