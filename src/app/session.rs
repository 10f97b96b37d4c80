use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::lyrics::{FetchError, LoadTicket, LyricRef, LyricSource, SyncController, SyncEvent};
use crate::player::{PlaybackClock, PlaybackStatus, SimulatedClock};

/// 一次歌词获取的结果
#[derive(Debug)]
pub struct FetchOutcome {
    ticket: LoadTicket,
    lyric_ref: LyricRef,
    result: Result<String, FetchError>,
}

/// 播放会话
///
/// 在单个任务中持有同步控制器，负责发起、取消歌词请求并应用结果。
/// 切歌时未完成的请求会被中止，已经完成但过期的结果由控制器的凭证检查丢弃。
pub struct LyricSession {
    controller: SyncController,
    source: Arc<dyn LyricSource>,
    clock: Arc<SimulatedClock>,
    current_ref: Option<LyricRef>,
    in_flight: Option<JoinHandle<()>>,
    fetch_tx: UnboundedSender<FetchOutcome>,
    fetch_rx: UnboundedReceiver<FetchOutcome>,
}

impl LyricSession {
    pub fn new(source: Arc<dyn LyricSource>, clock: Arc<SimulatedClock>) -> Self {
        let controller = SyncController::new(clock.clone());
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Self {
            controller,
            source,
            clock,
            current_ref: None,
            in_flight: None,
            fetch_tx,
            fetch_rx,
        }
    }

    /// 订阅当前行和歌词状态变更
    pub fn subscribe(&mut self) -> UnboundedReceiver<SyncEvent> {
        self.controller.subscribe()
    }

    /// 切换歌曲，None 表示新歌曲没有歌词来源
    pub fn load(&mut self, lyric_ref: Option<LyricRef>) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("取消未完成的歌词请求");
            }
            handle.abort();
        }

        self.current_ref = lyric_ref.clone();

        let Some(lyric_ref) = lyric_ref else {
            info!("当前歌曲没有歌词来源");
            self.controller.clear_track();
            return;
        };

        let ticket = self.controller.begin_track();
        info!("开始获取歌词: {}", lyric_ref);

        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = source.fetch(&lyric_ref).await;
            // 会话已经结束时无需处理
            let _ = tx.send(FetchOutcome {
                ticket,
                lyric_ref,
                result,
            });
        }));
    }

    /// 重新获取当前歌曲的歌词
    pub fn reload(&mut self) {
        self.load(self.current_ref.clone());
    }

    /// 等待下一次歌词获取完成
    pub async fn next_fetch(&mut self) -> Option<FetchOutcome> {
        self.fetch_rx.recv().await
    }

    /// 应用获取结果，过期结果返回 false
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let FetchOutcome {
            ticket,
            lyric_ref,
            result,
        } = outcome;
        let failure = result.as_ref().err().map(|e| e.to_string());

        let applied = self.controller.apply_fetched(ticket, result);
        if !applied {
            return false;
        }

        self.in_flight = None;
        match failure {
            Some(reason) => warn!("获取歌词失败: {}: {}", lyric_ref, reason),
            None => info!(
                "成功获取歌词: {}, 共{}行",
                lyric_ref,
                self.controller.lines().len()
            ),
        }
        true
    }

    /// 用时钟的当前位置刷新当前行
    pub fn tick(&mut self) {
        let position = self.clock.position();
        self.controller.on_time_update(position);
    }

    /// 跳转到指定时间
    pub fn seek(&mut self, secs: f64) {
        let target = secs.max(0.0);
        self.controller.on_seek(target);
    }

    /// 相对当前位置跳转
    pub fn seek_by(&mut self, delta: f64) {
        let target = self.clock.position() + delta;
        self.seek(target);
    }

    /// 跳转到指定歌词行
    pub fn seek_to_line(&mut self, index: usize) -> bool {
        self.controller.seek_to_line(index)
    }

    pub fn play(&mut self) {
        self.clock.play();
        self.tick();
    }

    /// 切换播放/暂停
    pub fn toggle_pause(&mut self) -> PlaybackStatus {
        let status = self.clock.toggle();
        self.tick();
        status
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn current_ref(&self) -> Option<&LyricRef> {
        self.current_ref.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{LyricLine, LyricStatus};
    use async_trait::async_trait;
    use std::time::Duration;

    /// 按引用返回固定歌词，并模拟网络延迟
    struct DelayedSource;

    #[async_trait]
    impl LyricSource for DelayedSource {
        fn name(&self) -> &str {
            "delayed"
        }

        async fn fetch(&self, lyric_ref: &LyricRef) -> Result<String, FetchError> {
            let LyricRef::Id(id) = lyric_ref else {
                return Err(FetchError::NotFound);
            };
            match id.as_str() {
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok("[00:01.00]slow".to_string())
                }
                "fast" => Ok("[00:01.00]fast".to_string()),
                "song" => {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok("[00:12.50]Hello\n[00:15.00]World".to_string())
                }
                "broken" => Err(FetchError::Status(503)),
                _ => Err(FetchError::NotFound),
            }
        }
    }

    fn session() -> LyricSession {
        LyricSession::new(Arc::new(DelayedSource), Arc::new(SimulatedClock::new(Some(240.0))))
    }

    fn id(value: &str) -> Option<LyricRef> {
        Some(LyricRef::Id(value.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_switch_cancels_in_flight_fetch() {
        let mut session = session();
        session.load(id("slow"));
        session.load(id("song"));

        let outcome = session.next_fetch().await.unwrap();
        assert!(session.apply(outcome));
        assert_eq!(session.controller().lines()[0].text, "Hello");

        // 被中止的请求永远不会送达
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(session.fetch_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_stale_result_is_ignored() {
        let mut session = session();
        session.load(id("fast"));
        // 让请求在切歌前完成并送达
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.load(id("song"));

        let stale = session.next_fetch().await.unwrap();
        assert!(!session.apply(stale));
        assert!(session.controller().lines().is_empty());
        assert_eq!(session.controller().status(), &LyricStatus::Loading);

        let fresh = session.next_fetch().await.unwrap();
        assert!(session.apply(fresh));
        assert_eq!(session.controller().lines().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_and_missing_source() {
        let mut session = session();
        session.load(id("broken"));
        let outcome = session.next_fetch().await.unwrap();
        assert!(session.apply(outcome));
        assert!(matches!(
            session.controller().status(),
            LyricStatus::Failed(_)
        ));
        assert!(session.controller().lines().is_empty());

        session.load(None);
        assert_eq!(session.controller().status(), &LyricStatus::NoTrack);
        assert!(session.current_ref().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_and_seek_drive_active_line() {
        let mut session = session();
        let mut events = session.subscribe();
        session.load(id("song"));
        let outcome = session.next_fetch().await.unwrap();
        session.apply(outcome);

        session.play();
        tokio::time::advance(Duration::from_secs(13)).await;
        session.tick();
        session.tick();
        assert_eq!(session.controller().active_index(), Some(0));

        session.seek_to_line(1);
        assert_eq!(session.controller().active_index(), Some(1));
        assert!((session.clock().position() - 15.0).abs() < 1e-6);

        session.seek_by(-100.0);
        assert_eq!(session.controller().active_index(), None);
        assert_eq!(session.clock().position(), 0.0);

        let mut changes = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SyncEvent::ActiveLineChanged { index } = event {
                changes.push(index);
            }
        }
        assert_eq!(changes, vec![Some(0), Some(1), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_fetches_again() {
        let mut session = session();
        session.load(id("fast"));
        let first = session.next_fetch().await.unwrap();
        session.apply(first);

        session.reload();
        assert_eq!(session.controller().status(), &LyricStatus::Loading);
        let second = session.next_fetch().await.unwrap();
        assert!(session.apply(second));
        assert_eq!(
            session.controller().lines(),
            &[LyricLine::new(1.0, "fast")]
        );
    }
}
