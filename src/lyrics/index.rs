use crate::lyrics::LyricLine;

/// 查找当前时间对应的歌词行
///
/// 返回满足 `lines[i].time <= current_time` 的最大下标，没有时返回 None
/// （时间早于第一行或没有歌词）。`lines` 按时间升序，因此用二分查找，
/// 结果与从头线性扫描一致。
pub fn locate(lines: &[LyricLine], current_time: f64) -> Option<usize> {
    let upper = lines.partition_point(|line| line.time <= current_time);
    upper.checked_sub(1)
}
