use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 启用的歌词源列表，按优先级排列
    pub lyrics_sources: Vec<String>,

    /// Meting 接口设置
    pub api: ApiConfig,

    /// 本地歌词文件配置
    pub local: LocalConfig,

    /// 歌词显示设置
    pub display: DisplayConfig,
}

/// Meting 风格音乐代理接口配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// 接口地址
    pub base_url: String,

    /// 曲库名称
    pub server: String,

    /// 请求超时（秒）
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocalConfig {
    /// 本地歌词目录路径
    pub lyrics_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// 是否显示时间戳
    pub show_timestamp: bool,

    /// 当前行前后显示的行数
    pub context_lines: usize,

    /// 是否启用简单输出模式（适用于waybar等外部集成）
    pub simple_output: bool,

    /// 播放时间轮询间隔（毫秒）
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lyrics_sources: vec!["local".to_string(), "meting".to_string()],
            api: ApiConfig::default(),
            local: LocalConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://meting.tianhw.top/api".to_string(),
            server: "netease".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        let default_lyrics_path = Config::config_dir()
            .map(|p| p.join("lyrics"))
            .unwrap_or_else(|| PathBuf::from("lyrics"));

        Self {
            lyrics_path: default_lyrics_path.to_string_lossy().to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_timestamp: false,
            context_lines: 4,
            simple_output: false,
            tick_interval_ms: 100,
        }
    }
}

impl Config {
    /// 程序的配置目录
    pub fn config_dir() -> Option<PathBuf> {
        let pkg_name = env!("CARGO_PKG_NAME");
        dirs::config_dir().map(|p| p.join(pkg_name))
    }

    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        let pkg_name = env!("CARGO_PKG_NAME");
        Self::config_dir()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(format!("{}-config.toml", pkg_name)))
    }

    /// 加载配置，支持从指定路径或默认路径加载
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        debug!("尝试从 {:?} 加载配置文件", config_path);

        if !config_path.exists() {
            debug!("配置文件 {:?} 不存在，将创建默认配置", config_path);
            let default_config = Config::default();
            default_config.write_to(&config_path)?;
            info!("已创建默认配置文件: {:?}", config_path);
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件 {:?} 失败", config_path))?;
        Ok(Self::from_toml(&content, &config_path))
    }

    /// 解析配置内容，解析失败时退回默认配置
    fn from_toml(content: &str, origin: &Path) -> Self {
        match toml::from_str(content) {
            Ok(cfg) => {
                debug!("已成功加载配置文件");
                cfg
            }
            Err(e) => {
                warn!("解析配置文件 {:?} 失败: {}，将使用默认配置", origin, e);
                Config::default()
            }
        }
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            debug!("已确保目录 {:?} 存在", parent);
        }

        fs::write(path, toml).with_context(|| format!("写入配置文件 {:?} 失败", path))?;
        Ok(())
    }
}
