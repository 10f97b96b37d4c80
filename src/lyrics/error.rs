use thiserror::Error;

/// 获取歌词时的错误
///
/// 对显示而言任何错误都等同于"无歌词"，但调用方可以据此区分"加载失败"。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求歌词失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("歌词请求返回 HTTP {0}")]
    Status(u16),

    #[error("无效的歌词地址: {0}")]
    InvalidUrl(String),

    #[error("读取歌词文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("未找到歌词")]
    NotFound,

    #[error("{provider} 不支持该歌词引用")]
    Unsupported { provider: String },

    #[error("没有可用的歌词源")]
    NoProviders,
}

impl FetchError {
    /// 是否应当继续尝试下一个歌词源
    pub fn is_fallthrough(&self) -> bool {
        matches!(self, FetchError::NotFound | FetchError::Unsupported { .. })
    }
}
