use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::display;
use crate::player::PlaybackStatus;
use crate::tui::theme::Theme;

/// 进度条组件
pub struct ProgressBar<'a> {
    position: f64,
    duration: Option<f64>,
    status: PlaybackStatus,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(
        position: f64,
        duration: Option<f64>,
        status: PlaybackStatus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            position,
            duration,
            status,
            theme,
        }
    }

    /// 渲染进度条
    pub fn render(&self, f: &mut Frame, area: Rect) {
        // 两侧时间和状态大约占 28 列
        let bar_width = (area.width as usize).saturating_sub(28).clamp(10, 60);
        let paragraph = Paragraph::new(self.create_progress_line(bar_width))
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
    }

    /// 创建进度条行
    fn create_progress_line(&self, bar_width: usize) -> Line<'a> {
        let mut spans = vec![
            Span::styled(display::format_time(self.position), self.theme.text_style()),
            Span::styled(" ", self.theme.text_style()),
        ];

        spans.extend(self.create_progress_bar_chars(bar_width));

        spans.push(Span::styled(" ", self.theme.text_style()));
        spans.push(Span::styled(
            self.duration
                .map(display::format_time)
                .unwrap_or_else(|| "--:--".to_string()),
            self.theme.text_style(),
        ));

        // 播放状态
        spans.push(Span::styled(" [", self.theme.status_style()));
        spans.push(Span::styled(self.status_symbol(), self.theme.accent_style()));
        spans.push(Span::styled(" ", self.theme.text_style()));
        spans.push(Span::styled(self.status.label(), self.theme.text_style()));
        spans.push(Span::styled("]", self.theme.status_style()));

        Line::from(spans)
    }

    /// 创建进度条字符
    fn create_progress_bar_chars(&self, total_width: usize) -> Vec<Span<'a>> {
        let Some(progress) = progress_ratio(self.position, self.duration) else {
            // 时长未知时显示空进度条
            return vec![Span::styled("░".repeat(total_width), self.theme.dimmed_style())];
        };

        let filled_width = ((progress * total_width as f64) as usize).min(total_width);
        let remaining = total_width.saturating_sub(filled_width.max(1));

        let mut spans = Vec::new();
        if filled_width > 1 {
            spans.push(Span::styled(
                "█".repeat(filled_width - 1),
                self.theme.progress_style(),
            ));
        }
        // 播放头
        spans.push(Span::styled("▶", self.theme.current_line_style()));
        if remaining > 0 {
            spans.push(Span::styled("░".repeat(remaining), self.theme.dimmed_style()));
        }
        spans
    }

    fn status_symbol(&self) -> &'static str {
        match self.status {
            PlaybackStatus::Playing => "▶",
            PlaybackStatus::Paused => "⏸",
            PlaybackStatus::Stopped => "⏹",
        }
    }
}

/// 播放进度，范围 [0, 1]，时长未知时为 None
pub fn progress_ratio(position: f64, duration: Option<f64>) -> Option<f64> {
    let duration = duration.filter(|d| *d > 0.0)?;
    Some((position / duration).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_text(position: f64, duration: Option<f64>, width: usize) -> String {
        let theme = Theme::default();
        ProgressBar::new(position, duration, PlaybackStatus::Playing, &theme)
            .create_progress_bar_chars(width)
            .iter()
            .map(|s| s.content.to_string())
            .collect()
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_ratio(30.0, Some(120.0)), Some(0.25));
        assert_eq!(progress_ratio(500.0, Some(120.0)), Some(1.0));
        assert_eq!(progress_ratio(-1.0, Some(120.0)), Some(0.0));
        assert_eq!(progress_ratio(30.0, None), None);
        assert_eq!(progress_ratio(30.0, Some(0.0)), None);
    }

    #[test]
    fn test_bar_keeps_width() {
        for position in [0.0, 10.0, 60.0, 119.0, 120.0] {
            assert_eq!(bar_text(position, Some(120.0), 20).chars().count(), 20);
        }
        assert_eq!(bar_text(5.0, None, 20), "░".repeat(20));
        assert_eq!(bar_text(60.0, Some(120.0), 10), "████▶░░░░░");
    }
}
