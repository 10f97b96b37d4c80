mod error;
pub mod index;
pub mod parser;
pub mod providers;
pub mod sync;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

pub use error::FetchError;
pub use index::locate;
pub use parser::parse_lrc;
pub use sync::{LoadTicket, LyricStatus, SyncController, SyncEvent};

/// 表示单行歌词
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// 开始时间（秒）
    pub time: f64,
    /// 歌词文本，非空
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// 一首歌的完整歌词
///
/// 每次切歌时重新构建，构建后不再修改。`lines` 为空表示纯音乐或没有歌词。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricTrack {
    /// 按输入顺序排列的歌词行
    pub lines: Vec<LyricLine>,
    /// LRC 头部标签，例如 ti / ar / al / by
    pub metadata: BTreeMap<String, String>,
}

impl LyricTrack {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        Self {
            lines,
            metadata: BTreeMap::new(),
        }
    }

    /// 解析 LRC 文本
    pub fn parse(content: &str) -> Self {
        parse_lrc(content)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 歌曲标题（来自 `[ti:]`）
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("ti").map(String::as_str)
    }

    /// 艺术家（来自 `[ar:]`）
    pub fn artist(&self) -> Option<&str> {
        self.metadata.get("ar").map(String::as_str)
    }
}

/// 歌词引用：可以是曲库 ID、完整 URL 或本地 LRC 文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricRef {
    Id(String),
    Url(String),
    File(PathBuf),
}

impl LyricRef {
    /// 从命令行或播放列表里的字符串推断引用类型
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http") {
            return LyricRef::Url(value.to_string());
        }

        let path = PathBuf::from(value);
        let is_lrc = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("lrc"));
        if is_lrc && path.is_file() {
            return LyricRef::File(path);
        }

        LyricRef::Id(value.to_string())
    }
}

impl fmt::Display for LyricRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LyricRef::Id(id) => write!(f, "id:{}", id),
            LyricRef::Url(url) => f.write_str(url),
            LyricRef::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// 歌词来源接口
#[async_trait]
pub trait LyricSource: Send + Sync {
    /// 获取来源名称
    fn name(&self) -> &str;

    /// 获取原始 LRC 文本
    async fn fetch(&self, lyric_ref: &LyricRef) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lyric_ref_parse() {
        assert_eq!(
            LyricRef::parse("https://example.com/lrc?id=1"),
            LyricRef::Url("https://example.com/lrc?id=1".to_string())
        );
        assert_eq!(LyricRef::parse(" 186016 "), LyricRef::Id("186016".to_string()));
        // 不存在的 .lrc 路径按 ID 处理
        assert_eq!(
            LyricRef::parse("missing-file.lrc"),
            LyricRef::Id("missing-file.lrc".to_string())
        );
    }

    #[test]
    fn test_track_metadata_accessors() {
        let track = LyricTrack::parse("[ti:稻香]\n[ar:周杰伦]\n[00:01.00]对这个世界");
        assert_eq!(track.title(), Some("稻香"));
        assert_eq!(track.artist(), Some("周杰伦"));
        assert_eq!(track.len(), 1);
    }
}
