use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::LocalConfig;
use crate::lyrics::{FetchError, LyricRef, LyricSource};

/// 本地歌词文件提供者
pub struct LocalProvider {
    // 歌词目录的绝对路径
    lyrics_path: PathBuf,
}

impl LocalProvider {
    /// 创建新的本地歌词提供者
    pub fn new(config: &LocalConfig) -> Self {
        // 处理路径，将~替换为用户家目录
        let lyrics_path = if config.lyrics_path.starts_with("~/") {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(config.lyrics_path.trim_start_matches("~/"))
        } else {
            PathBuf::from(&config.lyrics_path)
        };

        Self { lyrics_path }
    }

    /// 根据歌词引用确定文件路径
    fn resolve(&self, lyric_ref: &LyricRef) -> Option<PathBuf> {
        match lyric_ref {
            LyricRef::File(path) => Some(path.clone()),
            // ID 中不允许出现路径分隔符，避免读到目录之外的文件
            LyricRef::Id(id) if !id.is_empty() && !id.contains(['/', '\\']) && id != ".." => {
                Some(self.lyrics_path.join(format!("{}.lrc", id)))
            }
            _ => None,
        }
    }

    async fn read_lrc(path: &Path) -> Result<String, FetchError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("本地歌词文件不存在: {:?}", path);
                Err(FetchError::NotFound)
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

#[async_trait]
impl LyricSource for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, lyric_ref: &LyricRef) -> Result<String, FetchError> {
        let path = self.resolve(lyric_ref).ok_or_else(|| FetchError::Unsupported {
            provider: self.name().to_string(),
        })?;

        let content = Self::read_lrc(&path).await?;
        info!("成功加载本地歌词: {:?}", path);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lyric-sync-local-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn provider(dir: &Path) -> LocalProvider {
        LocalProvider::new(&LocalConfig {
            lyrics_path: dir.to_string_lossy().to_string(),
        })
    }

    #[tokio::test]
    async fn test_fetch_by_id_and_file() {
        let dir = temp_dir("fetch");
        fs::write(dir.join("186016.lrc"), "[00:01.00]稻香").unwrap();
        let provider = provider(&dir);

        let content = provider
            .fetch(&LyricRef::Id("186016".to_string()))
            .await
            .unwrap();
        assert_eq!(content, "[00:01.00]稻香");

        let content = provider
            .fetch(&LyricRef::File(dir.join("186016.lrc")))
            .await
            .unwrap();
        assert_eq!(content, "[00:01.00]稻香");

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_and_unsupported_refs() {
        let dir = temp_dir("missing");
        let provider = provider(&dir);

        let err = provider
            .fetch(&LyricRef::Id("404".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound));

        let err = provider
            .fetch(&LyricRef::Url("https://example.com/a.lrc".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_fallthrough());

        let err = provider
            .fetch(&LyricRef::Id("../secret".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unsupported { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_home_expansion() {
        let provider = LocalProvider::new(&LocalConfig {
            lyrics_path: "~/lyrics".to_string(),
        });
        assert!(provider.lyrics_path.ends_with("lyrics"));
        assert!(!provider.lyrics_path.starts_with("~"));
    }
}
