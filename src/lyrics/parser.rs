//! LRC 歌词解析
//!
//! 每行最多识别一个行首时间标签 `[mm:ss.xx]` 或 `[mm:ss.xxx]`，
//! 同一行后续的时间标签保留在文本中。没有时间标签的行直接丢弃，
//! 形如 `[ar:艺术家]` 的头部标签记录到元数据中。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::lyrics::{LyricLine, LyricTrack};

// 分钟至少一位，秒固定两位，小数两位或三位
static TIME_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+):(\d{2})\.(\d{2,3})\]").expect("时间标签正则无效"));

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([A-Za-z]+):(.*)\]$").expect("元数据正则无效"));

/// 解析 LRC 文本
///
/// 输出按输入顺序排列，不重新排序。空输入或没有任何时间标签时返回空歌词，
/// 表示纯音乐或暂无歌词，而不是错误。
pub fn parse_lrc(content: &str) -> LyricTrack {
    let mut track = LyricTrack::default();

    for raw in content.lines() {
        let line = raw.trim_start();
        if line.is_empty() {
            continue;
        }

        if TIME_TAG.is_match(line) {
            if let Some(lyric) = parse_timed_line(line) {
                track.lines.push(lyric);
            }
            continue;
        }

        if let Some((key, value)) = parse_metadata(line.trim_end()) {
            track.metadata.insert(key, value);
        }
    }

    debug!(
        "LRC解析完成: {} 行歌词, {} 个元数据标签",
        track.lines.len(),
        track.metadata.len()
    );

    track
}

/// 解析带时间标签的一行，文本为空时返回 None
fn parse_timed_line(line: &str) -> Option<LyricLine> {
    let caps = TIME_TAG.captures(line)?;

    let minutes = caps[1].parse::<u64>().ok()?;
    let seconds = caps[2].parse::<u64>().ok()?;
    let fraction = &caps[3];
    let scale = if fraction.len() == 3 { 1000.0 } else { 100.0 };
    let fraction_value = fraction.parse::<u32>().ok()? as f64 / scale;

    let time = minutes as f64 * 60.0 + seconds as f64 + fraction_value;

    let tag_end = caps.get(0)?.end();
    let text = line[tag_end..].trim();
    if text.is_empty() {
        return None;
    }

    Some(LyricLine::new(time, text))
}

/// 解析头部标签，例如 `[ti:稻香]`
fn parse_metadata(line: &str) -> Option<(String, String)> {
    let caps = META_TAG.captures(line)?;
    let key = caps[1].to_ascii_lowercase();
    let value = caps[2].trim().to_string();
    Some((key, value))
}
