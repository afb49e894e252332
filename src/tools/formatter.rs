//! 报告格式化模块
//!
//! 负责批量结果的三种呈现形式：终端摘要表格、带时间戳的
//! 文本报告文件、机器可读的JSON报告。

use super::utils;
use crate::error::{AudioResult, ErrorCategory};
use crate::processing::{BatchReport, JobReport};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::path::Path;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 渲染批量摘要表格
///
/// 每个源文件一行：状态、声道数、帧数、输出文件数或错误类别。
pub fn render_summary_table(report: &BatchReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "文件 / File",
        "状态 / Status",
        "声道 / Channels",
        "帧数 / Frames",
        "输出 / Outputs",
    ]);

    for outcome in &report.outcomes {
        let filename = utils::extract_filename_lossy(&outcome.path);
        match &outcome.result {
            Ok(job) => {
                table.add_row(vec![
                    Cell::new(filename),
                    Cell::new("OK"),
                    Cell::new(job.channel_count),
                    Cell::new(job.frame_count),
                    Cell::new(job.outcomes.len()),
                ]);
            }
            Err(e) => {
                let category = ErrorCategory::from_audio_error(e);
                table.add_row(vec![
                    Cell::new(filename),
                    Cell::new(format!("FAIL [{}]", category.display_name())),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("0"),
                ]);
            }
        }
    }

    table
}

/// 生成文本报告内容
pub fn create_report_text(input_path: &Path, report: &BatchReport) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str("=====================================\n");
    out.push_str("   WavSplit 声道提取报告 / Channel Extraction Report\n");
    out.push_str("=====================================\n\n");
    out.push_str(&format!("生成时间 / Generated: {now}\n"));
    out.push_str(&format!("输入路径 / Input: {}\n", input_path.display()));
    out.push_str(&format!(
        "文件数 / Files: {}\n\n",
        report.outcomes.len()
    ));

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(job) => {
                out.push_str(&format!(
                    "[OK] {} ({}声道 / ch, {}Hz, {}帧 / frames)\n",
                    outcome.path.display(),
                    job.channel_count,
                    job.sample_rate,
                    job.frame_count
                ));
                for channel in &job.outcomes {
                    out.push_str(&format!(
                        "     声道 / channel {} -> {} ({}帧 / frames)\n",
                        channel.channel_index + 1,
                        channel.output_path.display(),
                        channel.frames_written
                    ));
                }
            }
            Err(e) => {
                out.push_str(&format!("[FAIL] {} - {e}\n", outcome.path.display()));
            }
        }
    }

    out.push('\n');
    out.push_str("=====================================\n");
    out.push_str("批量处理统计 / Batch statistics:\n");
    out.push_str(&format!(
        "   总文件数 / total: {}\n",
        report.outcomes.len()
    ));
    out.push_str(&format!("   成功 / succeeded: {}\n", report.processed));
    out.push_str(&format!("   失败 / failed: {}\n", report.failed));

    if !report.error_stats.is_empty() {
        out.push_str("   失败分类 / failure breakdown:\n");
        // HashMap迭代顺序不稳定，排序后输出
        let mut categories: Vec<_> = report.error_stats.iter().collect();
        categories.sort_by_key(|(c, _)| c.display_name());
        for (category, files) in categories {
            out.push_str(&format!(
                "      [{}] {}\n",
                category.display_name(),
                files.join(", ")
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!("生成工具 / Generated by: wavsplit v{VERSION}\n"));
    out
}

/// 写出文本报告文件
pub fn write_report(path: &Path, content: &str) -> AudioResult<()> {
    std::fs::write(path, content)?;
    Ok(())
}

// ==================== JSON报告 ====================

#[derive(Debug, Serialize)]
struct JsonChannelOutput {
    channel: usize,
    output_path: String,
    frames_written: u64,
}

#[derive(Debug, Serialize)]
struct JsonFileResult {
    path: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_count: Option<u64>,
    outputs: Vec<JsonChannelOutput>,
}

#[derive(Debug, Serialize)]
struct JsonBatchReport {
    generated_at: String,
    tool_version: &'static str,
    total: usize,
    processed: usize,
    failed: usize,
    files: Vec<JsonFileResult>,
}

fn json_file_result(path: &Path, result: &Result<JobReport, crate::error::AudioError>) -> JsonFileResult {
    match result {
        Ok(job) => JsonFileResult {
            path: path.display().to_string(),
            status: "ok",
            error: None,
            error_category: None,
            channels: Some(job.channel_count),
            sample_rate: Some(job.sample_rate),
            frame_count: Some(job.frame_count),
            outputs: job
                .outcomes
                .iter()
                .map(|c| JsonChannelOutput {
                    channel: c.channel_index + 1,
                    output_path: c.output_path.display().to_string(),
                    frames_written: c.frames_written,
                })
                .collect(),
        },
        Err(e) => JsonFileResult {
            path: path.display().to_string(),
            status: "failed",
            error: Some(e.to_string()),
            error_category: Some(
                ErrorCategory::from_audio_error(e)
                    .display_name()
                    .to_string(),
            ),
            channels: None,
            sample_rate: None,
            frame_count: None,
            outputs: Vec::new(),
        },
    }
}

/// 序列化批量报告为JSON
pub fn render_json_report(report: &BatchReport) -> AudioResult<String> {
    let json = JsonBatchReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        tool_version: VERSION,
        total: report.outcomes.len(),
        processed: report.processed,
        failed: report.failed,
        files: report
            .outcomes
            .iter()
            .map(|o| json_file_result(&o.path, &o.result))
            .collect(),
    };
    serde_json::to_string_pretty(&json)
        .map_err(|e| crate::error::AudioError::Resource(format!("JSON序列化失败: {e}")))
}
