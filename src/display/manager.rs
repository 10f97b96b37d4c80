use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use tokio::time;
use tracing::debug;

use crate::app::LyricSession;
use crate::config::Config;
use crate::display::formatter;
use crate::lyrics::{LyricStatus, SyncController, SyncEvent};

/// 简单输出模式，每次当前行变化时输出一行，适用于状态栏等外部集成
pub struct SimpleDisplay<W: Write> {
    out: W,
    show_timestamp: bool,
    /// 上次输出的内容（用于避免重复输出）
    last_output: String,
}

impl<W: Write> SimpleDisplay<W> {
    pub fn new(out: W, show_timestamp: bool) -> Self {
        Self {
            out,
            show_timestamp,
            last_output: String::new(),
        }
    }

    /// 处理同步事件
    pub fn handle_event(&mut self, event: &SyncEvent, controller: &SyncController) -> io::Result<()> {
        let output = match event {
            SyncEvent::ActiveLineChanged { index: Some(index) } => {
                let Some(line) = controller.lines().get(*index) else {
                    return Ok(());
                };
                if self.show_timestamp {
                    format!("[{}] {}", formatter::format_time(line.time), line.text)
                } else {
                    line.text.clone()
                }
            }
            SyncEvent::ActiveLineChanged { index: None } => return Ok(()),
            SyncEvent::StatusChanged(status) => match status_message(status) {
                Some(message) => message.to_string(),
                None => return Ok(()),
            },
        };

        // 避免输出相同的内容
        if output != self.last_output {
            writeln!(self.out, "{}", output)?;
            self.out.flush()?;
            self.last_output = output;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// 歌词状态对应的提示文字
pub fn status_message(status: &LyricStatus) -> Option<&'static str> {
    match status {
        LyricStatus::NoTrack => Some("暂无歌词"),
        LyricStatus::Loading => Some("加载歌词中..."),
        LyricStatus::Instrumental => Some("纯音乐 / 暂无歌词"),
        LyricStatus::Failed(_) => Some("歌词加载失败"),
        LyricStatus::Loaded => None,
    }
}

/// 运行简单输出模式，播放结束或收到 Ctrl-C 时返回
pub async fn run_simple_display(config: &Config, session: &mut LyricSession) -> Result<()> {
    let mut events = session.subscribe();
    let mut display = SimpleDisplay::new(io::stdout(), config.display.show_timestamp);

    let mut refresh_interval =
        time::interval(Duration::from_millis(config.display.tick_interval_ms.max(10)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                session.tick();
                if session.clock().is_finished() && !session.controller().is_loading() {
                    debug!("播放结束，退出简单输出模式");
                    break;
                }
            }

            Some(outcome) = session.next_fetch() => {
                session.apply(outcome);
            }

            _ = &mut ctrl_c => {
                debug!("收到 Ctrl-C，退出简单输出模式");
                break;
            }
        }

        while let Ok(event) = events.try_recv() {
            display.handle_event(&event, session.controller())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse_lrc;
    use crate::player::SimulatedClock;
    use std::sync::Arc;

    fn render(show_timestamp: bool, times: &[f64]) -> String {
        let mut controller = SyncController::new(Arc::new(SimulatedClock::new(None)));
        let mut rx = controller.subscribe();
        let mut display = SimpleDisplay::new(Vec::new(), show_timestamp);

        controller.on_track_changed(parse_lrc("[00:12.50]Hello\n[01:15.00]World\n[01:20.00]World"));
        for t in times {
            controller.on_time_update(*t);
        }
        while let Ok(event) = rx.try_recv() {
            display.handle_event(&event, &controller).unwrap();
        }
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_prints_each_line_once() {
        let output = render(false, &[1.0, 13.0, 13.5, 76.0, 81.0]);
        // 文本相同的相邻行只输出一次
        assert_eq!(output, "Hello\nWorld\n");
    }

    #[test]
    fn test_timestamp_prefix() {
        let output = render(true, &[13.0, 76.0]);
        assert_eq!(output, "[00:12] Hello\n[01:15] World\n");
    }

    #[test]
    fn test_status_messages() {
        let mut controller = SyncController::new(Arc::new(SimulatedClock::new(None)));
        let mut rx = controller.subscribe();
        let mut display = SimpleDisplay::new(Vec::new(), false);

        let ticket = controller.begin_track();
        controller.apply_fetched(ticket, Ok("no tags here".to_string()));
        while let Ok(event) = rx.try_recv() {
            display.handle_event(&event, &controller).unwrap();
        }
        let output = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(output, "加载歌词中...\n纯音乐 / 暂无歌词\n");
    }
}
