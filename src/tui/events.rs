use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// TUI 事件类型
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// 键盘输入事件
    Key(KeyEvent),
    /// 定时刷新事件
    Tick,
}

/// 事件处理器
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// 创建新的事件处理器
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// 监听事件并发送到通道，接收端关闭时返回
    pub async fn run(&mut self, tx: mpsc::Sender<TuiEvent>) -> Result<()> {
        let mut tick_interval = tokio::time::interval(self.tick_rate);

        loop {
            tick_interval.tick().await;

            // 非阻塞读取这段时间内积累的所有按键
            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(key) = event::read()? {
                    // 部分终端会同时上报按下和松开
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if tx.send(TuiEvent::Key(key)).await.is_err() {
                        return Ok(());
                    }
                }
            }

            if tx.send(TuiEvent::Tick).await.is_err() {
                return Ok(());
            }
        }
    }

    /// 处理按键事件，返回是否应该退出
    pub fn handle_key_event(key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert!(EventHandler::handle_key_event(KeyEvent::from(KeyCode::Char('q'))));
        assert!(EventHandler::handle_key_event(KeyEvent::from(KeyCode::Esc)));
        assert!(EventHandler::handle_key_event(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!EventHandler::handle_key_event(KeyEvent::from(KeyCode::Char('c'))));
        assert!(!EventHandler::handle_key_event(KeyEvent::from(KeyCode::Char(' '))));
    }
}
