use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::debug;

use crate::player::PlaybackStatus;

/// 播放时间源
///
/// 提供当前播放位置（秒）并接受跳转请求。
pub trait PlaybackClock: Send + Sync {
    /// 当前播放位置（秒）
    fn position(&self) -> f64;

    /// 跳转到指定位置（秒）
    fn seek(&self, secs: f64);

    /// 当前播放状态
    fn status(&self) -> PlaybackStatus;

    /// 歌曲总时长（秒），未知时为 None
    fn duration(&self) -> Option<f64>;
}

#[derive(Debug)]
struct ClockState {
    status: PlaybackStatus,
    /// 最近一次锚定时的位置
    base: f64,
    /// 开始播放的时刻，仅在播放中有值
    since: Option<Instant>,
}

/// 根据流逝时间推算位置的模拟时钟，没有真实音频输出时使用
#[derive(Debug)]
pub struct SimulatedClock {
    state: Mutex<ClockState>,
    duration: Option<f64>,
}

impl SimulatedClock {
    /// 创建处于停止状态的时钟
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            state: Mutex::new(ClockState {
                status: PlaybackStatus::Stopped,
                base: 0.0,
                since: None,
            }),
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clamp(&self, secs: f64) -> f64 {
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        match self.duration {
            Some(duration) => secs.min(duration),
            None => secs,
        }
    }

    fn current(&self, state: &ClockState) -> f64 {
        let elapsed = state
            .since
            .map_or(0.0, |since| since.elapsed().as_secs_f64());
        self.clamp(state.base + elapsed)
    }

    /// 开始或继续播放
    pub fn play(&self) {
        let mut state = self.lock();
        if state.status != PlaybackStatus::Playing {
            state.status = PlaybackStatus::Playing;
            state.since = Some(Instant::now());
            debug!("时钟开始播放: {:.2}s", state.base);
        }
    }

    /// 暂停，保留当前位置
    pub fn pause(&self) {
        let mut state = self.lock();
        if state.status == PlaybackStatus::Playing {
            state.base = self.current(&state);
            state.since = None;
            state.status = PlaybackStatus::Paused;
            debug!("时钟暂停: {:.2}s", state.base);
        }
    }

    /// 切换播放/暂停，返回切换后的状态
    pub fn toggle(&self) -> PlaybackStatus {
        if self.status() == PlaybackStatus::Playing {
            self.pause();
        } else {
            self.play();
        }
        self.status()
    }

    /// 是否已经播放到结尾
    pub fn is_finished(&self) -> bool {
        self.duration.map_or(false, |d| self.position() >= d)
    }
}

impl PlaybackClock for SimulatedClock {
    fn position(&self) -> f64 {
        let state = self.lock();
        self.current(&state)
    }

    fn seek(&self, secs: f64) {
        let target = self.clamp(secs);
        let mut state = self.lock();
        state.base = target;
        if state.since.is_some() {
            state.since = Some(Instant::now());
        }
        debug!("时钟跳转: {:.2}s", target);
    }

    fn status(&self) -> PlaybackStatus {
        self.lock().status
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }
}
