// 应用核心库

// 模块导出
pub mod app;
pub mod config;
pub mod display;
pub mod lyrics;
pub mod player;
pub mod tui;
