use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::lyrics::LyricStatus;
use crate::tui::theme::Theme;

/// 状态栏信息
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub lyrics_source: Option<String>,
    pub source_status: SourceStatus,
    pub line_count: usize,
    pub shortcuts_enabled: bool,
}

/// 歌词源状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Success,
    Loading,
    Failed,
    None,
}

impl From<&LyricStatus> for SourceStatus {
    fn from(status: &LyricStatus) -> Self {
        match status {
            LyricStatus::Loaded => SourceStatus::Success,
            LyricStatus::Loading => SourceStatus::Loading,
            LyricStatus::Failed(_) => SourceStatus::Failed,
            LyricStatus::NoTrack | LyricStatus::Instrumental => SourceStatus::None,
        }
    }
}

/// 状态栏组件
pub struct StatusBar<'a> {
    status_info: &'a StatusInfo,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status_info: &'a StatusInfo, theme: &'a Theme) -> Self {
        Self { status_info, theme }
    }

    /// 渲染状态栏
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.create_status_line());
        f.render_widget(paragraph, area);
    }

    /// 创建状态栏内容
    fn create_status_line(&self) -> Line<'a> {
        let mut spans = Vec::new();

        self.add_lyrics_source_status(&mut spans);

        if self.status_info.source_status == SourceStatus::Success {
            spans.push(Span::styled(" │ ", self.theme.status_style()));
            spans.push(Span::styled(
                format!("{} 行", self.status_info.line_count),
                self.theme.text_style(),
            ));
        }

        // 快捷键提示
        if self.status_info.shortcuts_enabled {
            spans.push(Span::styled(" │ ", self.theme.status_style()));
            self.add_shortcuts(&mut spans);
        }

        Line::from(spans)
    }

    /// 添加歌词源状态
    fn add_lyrics_source_status(&self, spans: &mut Vec<Span<'a>>) {
        let info: &'a StatusInfo = self.status_info;
        match &info.lyrics_source {
            Some(source) => {
                spans.push(Span::styled(source.as_str(), self.theme.text_style()));
                spans.push(Span::styled(" ", self.theme.text_style()));

                let (symbol, style) = match info.source_status {
                    SourceStatus::Success => ("✓", self.theme.accent_style()),
                    SourceStatus::Loading => ("⟳", self.theme.status_style()),
                    SourceStatus::Failed => ("✗", self.theme.error_style()),
                    SourceStatus::None => ("○", self.theme.status_style()),
                };
                spans.push(Span::styled(symbol, style));
            }
            None => spans.push(Span::styled("无来源", self.theme.status_style())),
        }
    }

    /// 添加快捷键提示
    fn add_shortcuts(&self, spans: &mut Vec<Span<'a>>) {
        let shortcuts = [
            ("[h]", "帮助"),
            ("[space]", "暂停"),
            ("[r]", "刷新"),
            ("[q]", "退出"),
        ];

        for (i, (key, desc)) in shortcuts.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", self.theme.text_style()));
            }
            spans.push(Span::styled(*key, self.theme.accent_style()));
            spans.push(Span::styled(*desc, self.theme.text_style()));
        }
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            lyrics_source: None,
            source_status: SourceStatus::None,
            line_count: 0,
            shortcuts_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_status_from_lyric_status() {
        assert_eq!(SourceStatus::from(&LyricStatus::Loaded), SourceStatus::Success);
        assert_eq!(SourceStatus::from(&LyricStatus::Loading), SourceStatus::Loading);
        assert_eq!(
            SourceStatus::from(&LyricStatus::Failed("timeout".into())),
            SourceStatus::Failed
        );
        assert_eq!(SourceStatus::from(&LyricStatus::Instrumental), SourceStatus::None);
        assert_eq!(SourceStatus::from(&LyricStatus::NoTrack), SourceStatus::None);
    }

    #[test]
    fn test_line_count_only_when_loaded() {
        let theme = Theme::default();
        let mut info = StatusInfo {
            lyrics_source: Some("186016".to_string()),
            source_status: SourceStatus::Loading,
            line_count: 12,
            shortcuts_enabled: false,
        };

        let text = |info: &StatusInfo| -> String {
            StatusBar::new(info, &theme)
                .create_status_line()
                .spans
                .iter()
                .map(|s| s.content.to_string())
                .collect()
        };

        assert_eq!(text(&info), "186016 ⟳");
        info.source_status = SourceStatus::Success;
        assert_eq!(text(&info), "186016 ✓ │ 12 行");
    }
}
