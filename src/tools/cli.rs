//! 命令行接口模块
//!
//! 负责命令行参数解析、配置管理和程序信息展示。

use super::constants::defaults;
use crate::processing::{OutputEncoding, PipelineConfig, SelectionSpec};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 输入文件路径（单文件模式）或扫描目录（批量模式）
    pub input_path: PathBuf,

    /// 声道选择（1基的列表或all）
    pub channels: SelectionSpec,

    /// 输出目录（可选，默认输出到源文件所在目录）
    pub out_dir: Option<PathBuf>,

    /// 文本报告输出路径（可选）
    pub report_path: Option<PathBuf>,

    /// 以JSON输出批量报告
    pub json: bool,

    /// 多文件并行并发度；None表示明确的串行模式
    pub parallel_files: Option<usize>,

    /// 每次读取的最大帧数
    pub chunk_frames: usize,

    /// 失败时保留部分输出（修补头部后保留半成品）
    pub keep_partial: bool,

    /// 统一输出32位浮点（默认与源位深一致）
    pub float_output: bool,

    /// 是否显示详细信息
    pub verbose: bool,
}

impl AppConfig {
    /// 智能判断是否为批量模式（基于路径类型）
    #[inline]
    pub fn is_batch_mode(&self) -> bool {
        self.input_path.is_dir()
    }

    /// 派生核心管线配置
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chunk_frames: self.chunk_frames,
            delete_on_failure: !self.keep_partial,
            output_encoding: if self.float_output {
                OutputEncoding::Float32
            } else {
                OutputEncoding::MatchSource
            },
        }
    }
}

/// 解析命令行参数并创建配置
pub fn parse_args() -> AppConfig {
    let matches = Command::new("wavsplit")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("WavSplit Team")
        .arg(
            Arg::new("INPUT")
                .help("WAV文件或目录路径。目录则批量处理其中全部.wav文件 / WAV file or directory; a directory enables batch mode")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("channels")
                .long("channels")
                .short('c')
                .help("要提取的声道：逗号分隔的1基编号（如1,3）或all / Channels to extract: comma-separated 1-based numbers (e.g. 1,3) or 'all'")
                .value_name("LIST")
                .default_value("all")
                .value_parser(SelectionSpec::parse),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .help("输出目录（默认与源文件同目录） / Output directory (defaults to the source file's directory)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .help("输出文本报告到文件 / Write a text report to FILE")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("以JSON格式输出批量报告到标准输出 / Print the batch report as JSON to stdout")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("parallel-files")
                .long("parallel-files")
                .help("多文件并行并发度 / Parallelism degree for batch mode")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .conflicts_with("serial"),
        )
        .arg(
            Arg::new("serial")
                .long("serial")
                .help("禁用文件级并行，逐个处理 / Disable file-level parallelism")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("chunk-frames")
                .long("chunk-frames")
                .help("每次读取的最大帧数（默认4096） / Frames per streaming read (default 4096)")
                .value_name("N")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("keep-partial")
                .long("keep-partial")
                .help("失败时保留部分输出（头部修补为已写帧数） / Keep partial outputs on failure (header patched to frames written)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("float")
                .long("float")
                .help("统一输出32位浮点（默认与源位深一致） / Force 32-bit float output (default matches the source bit depth)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息 / Show detailed progress")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let parallel_files = if matches.get_flag("serial") {
        None
    } else {
        Some(
            matches
                .get_one::<usize>("parallel-files")
                .copied()
                .unwrap_or(defaults::PARALLEL_FILES_DEGREE),
        )
    };

    let chunk_frames = matches
        .get_one::<usize>("chunk-frames")
        .copied()
        .unwrap_or(defaults::CHUNK_FRAMES)
        .max(1);

    AppConfig {
        input_path: PathBuf::from(
            matches
                .get_one::<String>("INPUT")
                .map(String::as_str)
                .unwrap_or("."),
        ),
        channels: matches
            .get_one::<SelectionSpec>("channels")
            .cloned()
            .unwrap_or(SelectionSpec::All),
        out_dir: matches.get_one::<String>("out-dir").map(PathBuf::from),
        report_path: matches.get_one::<String>("report").map(PathBuf::from),
        json: matches.get_flag("json"),
        parallel_files,
        chunk_frames,
        keep_partial: matches.get_flag("keep-partial"),
        float_output: matches.get_flag("float"),
        verbose: matches.get_flag("verbose"),
    }
}

/// 显示程序启动信息
pub fn show_startup_info(config: &AppConfig) {
    if config.json {
        // JSON模式保持stdout纯净
        return;
    }
    println!("[START] WavSplit 声道提取工具 v{VERSION} 启动 / WavSplit channel extractor v{VERSION}");
    if config.verbose {
        println!("[INFO] {DESCRIPTION}");
        println!(
            "[INFO] 块大小 / Chunk size: {} 帧 / frames",
            config.chunk_frames
        );
    }
    println!();
}

/// 显示程序完成信息
pub fn show_completion_info(config: &AppConfig) {
    if config.verbose && !config.json {
        println!("[DONE] 所有任务处理完成 / All jobs finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_derivation() {
        let config = AppConfig {
            input_path: PathBuf::from("a.wav"),
            channels: SelectionSpec::All,
            out_dir: None,
            report_path: None,
            json: false,
            parallel_files: Some(4),
            chunk_frames: 512,
            keep_partial: true,
            float_output: true,
            verbose: false,
        };
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.chunk_frames, 512);
        assert!(!pipeline.delete_on_failure);
        assert_eq!(pipeline.output_encoding, OutputEncoding::Float32);
    }
}
