/// 格式化为 `mm:ss`
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// 格式化为 LRC 时间标签内容 `mm:ss.xx`
pub fn format_timestamp(secs: f64) -> String {
    let centis = if secs.is_finite() {
        (secs.max(0.0) * 100.0).round() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}.{:02}",
        centis / 6000,
        (centis / 100) % 60,
        centis % 100
    )
}
