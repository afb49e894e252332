//! 工具模块集合
//!
//! 包含CLI、文件扫描、流程编排、报告格式化等工具模块，
//! 支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod processor;
pub mod scanner;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, parse_args, show_completion_info, show_startup_info};
pub use formatter::{create_report_text, render_json_report, render_summary_table, write_report};
pub use processor::{process_batch_mode, process_single_mode};
pub use scanner::{scan_wav_files, show_scan_results};
