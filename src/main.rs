use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use lyric_sync::app::{App, PlayOptions};
use lyric_sync::config::Config;
use lyric_sync::display::format_timestamp;
use lyric_sync::lyrics::{parse_lrc, LyricRef};

/// 终端歌词同步器：获取 LRC 歌词并跟随播放进度高亮当前行
#[derive(Debug, Parser)]
#[command(name = "lyric-sync", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 提高日志级别（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 解析 LRC 文件并输出时间轴（`-` 表示标准输入）
    Parse { file: String },

    /// 加载歌词并按模拟时钟同步显示
    Play {
        /// 歌曲 ID、歌词 URL 或本地 .lrc 文件
        lyric_ref: String,

        /// 歌曲时长（秒）
        #[arg(short, long)]
        duration: Option<f64>,

        /// 起始位置（秒）
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,

        /// 使用简单输出模式
        #[arg(long)]
        simple: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // TUI 占用终端时日志写入文件
    let log_to_file = matches!(cli.command, Command::Play { simple: false, .. });
    init_tracing(cli.verbose, log_to_file)?;

    match cli.command {
        Command::Parse { file } => parse_command(&file),
        Command::Play {
            lyric_ref,
            duration,
            start,
            simple,
        } => {
            let config = Config::load(cli.config).context("加载配置失败")?;
            debug!("配置: {:?}", config);

            let options = PlayOptions {
                lyric_ref: Some(LyricRef::parse(&lyric_ref)),
                duration,
                start,
                simple,
            };

            let mut app = App::new(Arc::new(config))?;
            if let Err(e) = app.run(options).await {
                error!("应用运行失败: {:#}", e);
                return Err(e);
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8, log_to_file: bool) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_path = log_to_file.then(log_file_path).flatten();
    match log_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("打开日志文件 {:?} 失败", path))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(io::stderr)
                .try_init();
        }
    }
    Ok(())
}

fn log_file_path() -> Option<PathBuf> {
    Config::config_dir().map(|dir| dir.join("lyric-sync.log"))
}

/// 输出解析结果
fn parse_command(file: &str) -> Result<()> {
    let content = read_input(file)?;
    let track = parse_lrc(&content);

    for (key, value) in &track.metadata {
        println!("[{}:{}]", key, value);
    }
    for line in &track.lines {
        println!("[{}] {}", format_timestamp(line.time), line.text);
    }

    debug!("共解析 {} 行歌词", track.len());
    Ok(())
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("读取标准输入失败")?;
        return Ok(content);
    }

    let path = Path::new(file);
    fs::read_to_string(path).with_context(|| format!("读取文件 {:?} 失败", path))
}
