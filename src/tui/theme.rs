use ratatui::style::{Color, Modifier, Style};

/// TUI 主题配置
#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Color,
    pub text: Color,
    pub accent: Color,
    pub current_line: Color,
    /// 光标所在歌词行
    pub selected_line: Color,
    pub progress_bar: Color,
    pub status_text: Color,
    pub dimmed_text: Color,
    pub error_text: Color,
}

impl Theme {
    /// 使用终端原生配色的主题
    pub fn terminal() -> Self {
        Self {
            border: Color::DarkGray,
            text: Color::Reset, // 使用终端的默认前景色
            accent: Color::Green,
            current_line: Color::Yellow,
            selected_line: Color::Cyan,
            progress_bar: Color::Blue,
            status_text: Color::Gray,
            dimmed_text: Color::DarkGray,
            error_text: Color::Red,
        }
    }

    /// 获取普通文字样式
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// 获取强调文字样式
    pub fn accent_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// 获取当前行样式
    pub fn current_line_style(&self) -> Style {
        Style::default()
            .fg(self.current_line)
            .add_modifier(Modifier::BOLD)
    }

    /// 获取光标行样式
    pub fn selected_line_style(&self) -> Style {
        Style::default()
            .fg(self.selected_line)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn progress_style(&self) -> Style {
        Style::default().fg(self.progress_bar)
    }

    pub fn status_style(&self) -> Style {
        Style::default().fg(self.status_text)
    }

    /// 获取标题样式
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// 获取弱化文字样式
    pub fn dimmed_style(&self) -> Style {
        Style::default().fg(self.dimmed_text)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error_text)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::terminal()
    }
}
