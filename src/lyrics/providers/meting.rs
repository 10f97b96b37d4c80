use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::lyrics::{FetchError, LyricRef, LyricSource};

// 接口迁移前的旧域名
const LEGACY_HOST: &str = "meting.elysium-stack.cn";

static NETEASE_IMAGE_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http://(p\d+\.music\.126\.net)").expect("图片域名正则无效"));

/// Meting 风格音乐代理的歌词提供者
pub struct MetingProvider {
    client: reqwest::Client,
    base_url: String,
    server: String,
    host: Option<String>,
    timeout: Duration,
}

impl MetingProvider {
    /// 创建新的 Meting 歌词提供者
    pub fn new(config: &ApiConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        let host = Url::parse(&config.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));

        let mut provider = Self {
            client,
            base_url: String::new(),
            server: config.server.clone(),
            host,
            timeout,
        };
        provider.base_url = provider.fix_domain(&config.base_url);
        provider
    }

    /// 构造歌词请求地址，本地文件引用返回 None
    pub fn lyric_url(&self, lyric_ref: &LyricRef) -> Result<Option<Url>, FetchError> {
        let url = match lyric_ref {
            LyricRef::Url(url) => Url::parse(&self.fix_domain(url)),
            LyricRef::Id(id) => Url::parse_with_params(
                &self.base_url,
                &[("server", self.server.as_str()), ("type", "lrc"), ("id", id.as_str())],
            ),
            LyricRef::File(_) => return Ok(None),
        };

        url.map(Some)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", lyric_ref, e)))
    }

    /// 替换旧接口域名，并强制网易云图片域名使用 https
    pub fn fix_domain(&self, value: &str) -> String {
        let value = match &self.host {
            Some(host) => value.replace(LEGACY_HOST, host),
            None => value.to_string(),
        };
        NETEASE_IMAGE_HOST
            .replace_all(&value, "https://$1")
            .into_owned()
    }
}

/// 从接口响应中取出歌词
///
/// 接口可能直接返回 LRC 文本，也可能返回带 `lyric` 或 `lrc` 字段的 JSON。
pub fn extract_lyric(body: &str) -> String {
    let field = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["lyric", "lrc"].iter().find_map(|key| {
            json.get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });

    field.unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl LyricSource for MetingProvider {
    fn name(&self) -> &str {
        "meting"
    }

    async fn fetch(&self, lyric_ref: &LyricRef) -> Result<String, FetchError> {
        let url = match self.lyric_url(lyric_ref)? {
            Some(url) => url,
            None => {
                return Err(FetchError::Unsupported {
                    provider: self.name().to_string(),
                })
            }
        };

        debug!("请求歌词: {}", url);

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            error!("歌词请求失败: HTTP {}", status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(extract_lyric(&self.fix_domain(&body)))
    }
}
