use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::LyricSession;
use crate::config::Config;
use crate::display;
use crate::lyrics::providers::ProviderChain;
use crate::lyrics::{LyricRef, LyricSource};
use crate::player::SimulatedClock;
use crate::tui::TuiApp;

/// 播放参数
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// 歌词来源
    pub lyric_ref: Option<LyricRef>,
    /// 歌曲时长（秒），未知时一直播放
    pub duration: Option<f64>,
    /// 起始位置（秒）
    pub start: f64,
    /// 使用简单输出模式
    pub simple: bool,
}

pub struct App {
    config: Arc<Config>,
    source: Arc<dyn LyricSource>,
}

impl App {
    /// 创建新应用实例
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let source: Arc<dyn LyricSource> = Arc::new(ProviderChain::from_config(&config));
        Ok(Self { config, source })
    }

    /// 使用指定的歌词源创建应用实例
    pub fn with_source(config: Arc<Config>, source: Arc<dyn LyricSource>) -> Self {
        Self { config, source }
    }

    /// 创建播放会话并开始加载歌词
    pub fn start_session(&self, options: &PlayOptions) -> LyricSession {
        let clock = Arc::new(SimulatedClock::new(options.duration));
        let mut session = LyricSession::new(Arc::clone(&self.source), clock);

        session.load(options.lyric_ref.clone());
        if options.start > 0.0 {
            debug!("从 {:.2}s 开始播放", options.start);
            session.seek(options.start);
        }
        session.play();
        session
    }

    /// 运行应用
    pub async fn run(&mut self, options: PlayOptions) -> Result<()> {
        debug!("开始运行应用...");
        let mut session = self.start_session(&options);

        if options.simple || self.config.display.simple_output {
            info!("使用简单输出模式");
            display::run_simple_display(&self.config, &mut session).await?;
        } else {
            info!("使用 TUI 模式");
            let mut tui = TuiApp::new(Arc::clone(&self.config), session);
            tui.run().await?;
        }

        debug!("应用执行完毕");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::{FetchError, LyricStatus};
    use crate::player::PlaybackClock;
    use async_trait::async_trait;

    struct FixedSource;

    #[async_trait]
    impl LyricSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _lyric_ref: &LyricRef) -> Result<String, FetchError> {
            Ok("[ti:Demo]\n[00:01.00]one\n[00:05.00]two".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_session_seeks_and_plays() {
        let app = App::with_source(Arc::new(Config::default()), Arc::new(FixedSource));
        let mut session = app.start_session(&PlayOptions {
            lyric_ref: Some(LyricRef::Id("1".to_string())),
            duration: Some(30.0),
            start: 6.0,
            simple: true,
        });
        assert_eq!(session.controller().status(), &LyricStatus::Loading);
        assert!((session.clock().position() - 6.0).abs() < 1e-6);

        let outcome = session.next_fetch().await.unwrap();
        assert!(session.apply(outcome));
        assert_eq!(session.controller().active_index(), Some(1));
        assert_eq!(session.controller().metadata().get("ti").map(String::as_str), Some("Demo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_session_without_ref() {
        let app = App::with_source(Arc::new(Config::default()), Arc::new(FixedSource));
        let session = app.start_session(&PlayOptions::default());
        assert_eq!(session.controller().status(), &LyricStatus::NoTrack);
        assert_eq!(session.controller().active_index(), None);
    }
}
