// 简单输出模式
// 导出显示相关的结构体和函数

mod formatter;
mod manager;

pub use formatter::*;
pub use manager::{run_simple_display, status_message, SimpleDisplay};
