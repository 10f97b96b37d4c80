// 播放进度模块
// 导出播放时钟相关的结构体和接口

mod clock;

pub use clock::{PlaybackClock, SimulatedClock};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackStatus::Playing => "播放中",
            PlaybackStatus::Paused => "已暂停",
            PlaybackStatus::Stopped => "已停止",
        }
    }
}
