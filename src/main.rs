//! WavSplit - 主程序入口
//!
//! 纯流程控制器，负责协调各个工具模块完成声道提取任务。

use std::process;
use wavsplit_tool::error::{AudioError, ErrorCategory};
use wavsplit_tool::tools::{self, AppConfig};

/// 错误退出码定义
mod exit_codes {
    /// 通用/I-O错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式/输入错误
    pub const FORMAT_ERROR: i32 = 2;
    /// 声道选择错误
    pub const CHANNEL_ERROR: i32 = 3;
    /// 资源/并发错误
    pub const RESOURCE_ERROR: i32 = 4;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &AudioError) -> &'static str {
    match ErrorCategory::from_audio_error(error) {
        ErrorCategory::Io => {
            "检查文件路径是否正确，文件是否存在且可读 / Check if file path is correct, file exists and is readable"
        }
        ErrorCategory::Format => {
            "确保输入为未压缩的PCM WAV文件（16/24位整数或32位浮点） / Ensure input is uncompressed PCM WAV (16/24-bit integer or 32-bit float)"
        }
        ErrorCategory::Channel => {
            "声道编号从1开始且不能超过源文件声道数，使用 --channels all 提取全部 / Channel numbers are 1-based and must not exceed the source channel count; use --channels all to extract everything"
        }
        ErrorCategory::SampleFormat => {
            "仅支持16/24位整数PCM和32位浮点，请先转换位深 / Only 16/24-bit integer PCM and 32-bit float are supported; convert the bit depth first"
        }
        ErrorCategory::Cancelled => {
            "任务被取消，输出已按失败策略清理 / Job was cancelled; outputs were cleaned up per the failure policy"
        }
        ErrorCategory::Other => {
            "资源不可用，尝试 --serial 或降低 --parallel-files / Resource unavailable, try --serial or a lower --parallel-files"
        }
    }
}

/// 错误处理和建议
fn handle_error(error: AudioError) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error}");
    eprintln!("[INFO] 建议 / Suggestion: {}", get_error_suggestion(&error));
    if let Some(source) = std::error::Error::source(&error) {
        eprintln!("[INFO] 原因 / Cause: {source}");
    }

    // 根据错误类别映射退出码
    let exit_code = match ErrorCategory::from_audio_error(&error) {
        ErrorCategory::Format | ErrorCategory::SampleFormat => exit_codes::FORMAT_ERROR,
        ErrorCategory::Channel => exit_codes::CHANNEL_ERROR,
        ErrorCategory::Other => exit_codes::RESOURCE_ERROR,
        ErrorCategory::Io | ErrorCategory::Cancelled => exit_codes::GENERAL_ERROR,
    };

    process::exit(exit_code);
}

/// 应用程序主逻辑（便于测试和复用）
fn run() -> Result<(), AudioError> {
    // 1. 解析命令行参数
    let config: AppConfig = tools::parse_args();

    // 2. 显示启动信息
    tools::show_startup_info(&config);

    // 3. 根据模式选择处理方式
    let result = if config.is_batch_mode() {
        tools::process_batch_mode(&config)
    } else {
        tools::process_single_mode(&config)
    };

    // 4. 处理结果并返回
    match result {
        Ok(()) => {
            tools::show_completion_info(&config);
            Ok(())
        }
        Err(error) => Err(error),
    }
}

fn main() {
    if let Err(error) = run() {
        handle_error(error);
    }
}
