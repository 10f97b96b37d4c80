use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::lyrics::{locate, parse_lrc, FetchError, LyricLine, LyricTrack};
use crate::player::PlaybackClock;

/// 歌词加载凭证
///
/// 每次切歌都会生成新的凭证，只有与当前凭证一致的获取结果才会被应用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// 当前歌曲的歌词显示状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricStatus {
    /// 没有歌曲或歌曲没有歌词来源
    NoTrack,
    /// 正在获取歌词
    Loading,
    /// 已加载歌词
    Loaded,
    /// 歌词为空，纯音乐
    Instrumental,
    /// 获取失败，内部状态等同于空歌词
    Failed(String),
}

/// 同步控制器发出的通知
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// 当前行变更，None 表示没有当前行
    ActiveLineChanged { index: Option<usize> },
    /// 歌词状态变更
    StatusChanged(LyricStatus),
}

/// 歌词同步控制器
///
/// 持有当前歌词和当前行，把播放时间转换为"当前行变更"通知。
/// 只在当前行真正变化时通知，重复的时间更新不会产生通知。
pub struct SyncController {
    clock: Arc<dyn PlaybackClock>,
    track: LyricTrack,
    status: LyricStatus,
    active: Option<usize>,
    last_time: Option<f64>,
    generation: u64,
    pending: Option<LoadTicket>,
    listeners: Vec<UnboundedSender<SyncEvent>>,
}

impl SyncController {
    /// 创建没有歌曲的控制器
    pub fn new(clock: Arc<dyn PlaybackClock>) -> Self {
        Self {
            clock,
            track: LyricTrack::default(),
            status: LyricStatus::NoTrack,
            active: None,
            last_time: None,
            generation: 0,
            pending: None,
            listeners: Vec::new(),
        }
    }

    /// 订阅通知，接收端被丢弃后自动移除
    pub fn subscribe(&mut self) -> UnboundedReceiver<SyncEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    /// 切换到已经解析好的歌词
    pub fn on_track_changed(&mut self, track: LyricTrack) {
        self.next_generation();
        let status = if track.is_empty() {
            LyricStatus::Instrumental
        } else {
            LyricStatus::Loaded
        };
        self.install(track, status);
    }

    /// 切换到需要获取歌词的歌曲，返回获取结果必须携带的凭证
    pub fn begin_track(&mut self) -> LoadTicket {
        let ticket = self.next_generation();
        self.pending = Some(ticket);
        self.install(LyricTrack::default(), LyricStatus::Loading);
        ticket
    }

    /// 歌曲没有歌词来源，清空歌词
    pub fn clear_track(&mut self) {
        self.next_generation();
        self.install(LyricTrack::default(), LyricStatus::NoTrack);
    }

    /// 应用获取到的歌词
    ///
    /// 凭证过期（期间已经切歌）时忽略结果并返回 false。
    pub fn apply_fetched(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, FetchError>,
    ) -> bool {
        if self.pending != Some(ticket) {
            debug!("忽略过期的歌词结果: {:?}", ticket);
            return false;
        }
        self.pending = None;

        match result {
            Ok(content) => {
                let track = parse_lrc(&content);
                let status = if track.is_empty() {
                    LyricStatus::Instrumental
                } else {
                    LyricStatus::Loaded
                };
                self.install(track, status);
            }
            Err(e) => {
                self.install(LyricTrack::default(), LyricStatus::Failed(e.to_string()));
            }
        }
        true
    }

    /// 处理播放时间更新
    pub fn on_time_update(&mut self, current_time: f64) {
        self.last_time = Some(current_time);
        self.evaluate(current_time);
    }

    /// 跳转到指定时间，并立即刷新当前行
    pub fn on_seek(&mut self, target_time: f64) {
        self.clock.seek(target_time);
        self.on_time_update(target_time);
    }

    /// 跳转到指定歌词行，下标越界时返回 false
    pub fn seek_to_line(&mut self, index: usize) -> bool {
        match self.track.lines.get(index) {
            Some(line) => {
                let time = line.time;
                self.on_seek(time);
                true
            }
            None => false,
        }
    }

    /// 当前行下标
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// 当前行
    pub fn active_line(&self) -> Option<&LyricLine> {
        self.active.and_then(|i| self.track.lines.get(i))
    }

    /// 全部歌词行
    pub fn lines(&self) -> &[LyricLine] {
        &self.track.lines
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.track.metadata
    }

    pub fn status(&self) -> &LyricStatus {
        &self.status
    }

    /// 是否仍在等待某次获取结果
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn next_generation(&mut self) -> LoadTicket {
        self.generation += 1;
        self.pending = None;
        LoadTicket(self.generation)
    }

    fn install(&mut self, track: LyricTrack, status: LyricStatus) {
        debug!("载入歌词: {} 行, 状态 {:?}", track.lines.len(), status);
        self.track = track;

        if self.active.take().is_some() {
            self.emit(SyncEvent::ActiveLineChanged { index: None });
        }

        if self.status != status {
            self.status = status.clone();
            self.emit(SyncEvent::StatusChanged(status));
        }

        if let Some(time) = self.last_time {
            self.evaluate(time);
        }
    }

    fn evaluate(&mut self, current_time: f64) {
        let index = locate(&self.track.lines, current_time);
        if index != self.active {
            debug!("当前行变更: {:?} -> {:?} ({:.2}s)", self.active, index, current_time);
            self.active = index;
            self.emit(SyncEvent::ActiveLineChanged { index });
        }
    }

    fn emit(&mut self, event: SyncEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
