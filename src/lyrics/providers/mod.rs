mod local;
mod meting;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::lyrics::{FetchError, LyricRef, LyricSource};

pub use local::LocalProvider;
pub use meting::{extract_lyric, MetingProvider};

/// 获取所有启用的歌词提供者
pub fn get_enabled_providers(config: &Config) -> Vec<Arc<dyn LyricSource>> {
    let mut providers: Vec<Arc<dyn LyricSource>> = Vec::new();

    debug!("加载启用的歌词提供者，配置的源: {:?}", config.lyrics_sources);

    // 根据配置文件中启用的提供者进行创建
    for source in &config.lyrics_sources {
        match source.as_str() {
            "meting" | "netease" => {
                info!("启用 Meting 歌词源: {}", config.api.base_url);
                providers.push(Arc::new(MetingProvider::new(&config.api)));
            }
            "local" => {
                info!("启用本地歌词源，歌词目录: {}", config.local.lyrics_path);
                providers.push(Arc::new(LocalProvider::new(&config.local)));
            }
            _ => {
                warn!("未知的歌词源: {}", source);
            }
        }
    }

    info!("成功加载 {} 个歌词提供者", providers.len());
    providers
}

/// 按优先级依次尝试多个歌词源
pub struct ProviderChain {
    providers: Vec<Arc<dyn LyricSource>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn LyricSource>>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(get_enabled_providers(config))
    }
}

#[async_trait]
impl LyricSource for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn fetch(&self, lyric_ref: &LyricRef) -> Result<String, FetchError> {
        let mut last_error = FetchError::NoProviders;

        for provider in &self.providers {
            debug!("尝试从 {} 获取歌词: {}", provider.name(), lyric_ref);
            match provider.fetch(lyric_ref).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_fallthrough() => {
                    debug!("{} 未找到歌词，尝试下一个提供者", provider.name());
                    // 已有真实错误时保留它
                    if matches!(last_error, FetchError::NoProviders) || last_error.is_fallthrough() {
                        last_error = e;
                    }
                }
                Err(e) => {
                    warn!("{} 获取歌词失败: {}", provider.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
