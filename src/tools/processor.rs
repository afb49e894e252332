//! 处理流程编排模块
//!
//! 把命令行配置桥接到核心管线：构建任务、选择串行/并行模式、
//! 在收集线程上消费进度事件，并分发报告输出。

use super::cli::AppConfig;
use super::{formatter, scanner, utils};
use crate::error::{AudioError, AudioResult};
use crate::processing::{
    BatchReport, BatchRunner, ExtractionJob, FileOutcome, ProgressEvent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;

/// 从配置和源文件列表构建提取任务
fn build_jobs(config: &AppConfig, sources: &[PathBuf]) -> Vec<ExtractionJob> {
    sources
        .iter()
        .map(|source| {
            ExtractionJob::new(
                source.clone(),
                config.channels.clone(),
                utils::default_output_namer(config.out_dir.clone()),
            )
        })
        .collect()
}

/// 单文件处理模式
pub fn process_single_mode(config: &AppConfig) -> AudioResult<()> {
    let jobs = build_jobs(config, std::slice::from_ref(&config.input_path));
    let job = &jobs[0];

    let cancel = AtomicBool::new(false);
    let result = job.run(&config.pipeline_config(), &cancel);

    match &result {
        Ok(report) => {
            if !config.json {
                println!(
                    "[OK] {} ({}声道 / ch, {}Hz, {}帧 / frames)",
                    utils::extract_filename_lossy(&report.source_path),
                    report.channel_count,
                    report.sample_rate,
                    report.frame_count
                );
                for channel in &report.outcomes {
                    println!(
                        "     声道 / channel {} -> {}",
                        channel.channel_index + 1,
                        channel.output_path.display()
                    );
                }
            }
        }
        Err(e) => {
            if !config.json {
                eprintln!(
                    "[FAIL] {} - {e}",
                    utils::extract_filename_lossy(&config.input_path)
                );
            }
        }
    }

    // 报告输出复用批量格式（单文件即批量之一）
    let batch = single_file_batch(config.input_path.clone(), result);
    emit_reports(config, &batch)?;

    match batch.outcomes.into_iter().next() {
        Some(FileOutcome {
            result: Err(e), ..
        }) => Err(e),
        _ => Ok(()),
    }
}

/// 批量处理模式
pub fn process_batch_mode(config: &AppConfig) -> AudioResult<()> {
    let wav_files = scanner::scan_wav_files(&config.input_path)?;
    scanner::show_scan_results(config, &wav_files);
    if wav_files.is_empty() {
        return Ok(());
    }

    let jobs = build_jobs(config, &wav_files);
    let runner = BatchRunner::new(
        config.pipeline_config(),
        Arc::new(AtomicBool::new(false)),
    );

    let report = match config.parallel_files {
        None => run_with_progress(config, &jobs, |progress| {
            Ok(runner.run_serial(&jobs, progress))
        })?,
        Some(degree) => {
            let actual_degree = utils::effective_parallel_degree(degree, Some(jobs.len()));
            if actual_degree == 1 {
                if config.verbose && !config.json {
                    println!("[INFO] 并发度为1，使用串行模式 / Parallelism=1, using serial mode");
                }
                run_with_progress(config, &jobs, |progress| {
                    Ok(runner.run_serial(&jobs, progress))
                })?
            } else {
                if config.verbose && !config.json {
                    println!(
                        "[INFO] 启用多文件并行处理：{actual_degree} 并发度 / Parallel batch with degree {actual_degree}"
                    );
                }
                // 线程池创建失败则降级串行
                let parallel = run_with_progress(config, &jobs, |progress| {
                    runner.run_parallel(&jobs, actual_degree, progress)
                });
                match parallel {
                    Ok(report) => report,
                    Err(e) => {
                        eprintln!(
                            "[WARNING] 并行处理失败 / Parallel processing failed: {e}，回退到串行模式 / fallback to serial"
                        );
                        run_with_progress(config, &jobs, |progress| {
                            Ok(runner.run_serial(&jobs, progress))
                        })?
                    }
                }
            }
        }
    };

    if !config.json {
        println!("{}", formatter::render_summary_table(&report));
        println!(
            "[SUMMARY] 成功 {} / 失败 {} / succeeded {} / failed {}",
            report.processed, report.failed, report.processed, report.failed
        );
    }
    emit_reports(config, &report)?;

    // 部分失败已在报告中呈现；全部失败则作为整体错误向上传播
    if report.processed == 0 && report.failed > 0 {
        let outcome = report.outcomes.into_iter().find(|o| o.result.is_err());
        if let Some(FileOutcome {
            result: Err(e), ..
        }) = outcome
        {
            return Err(e);
        }
    }
    Ok(())
}

/// 在收集线程上消费进度事件并运行批次
///
/// 进度打印集中在单一线程，避免并行工作线程的输出交错。
fn run_with_progress<F>(
    config: &AppConfig,
    jobs: &[ExtractionJob],
    run: F,
) -> Result<BatchReport, AudioError>
where
    F: FnOnce(Option<&crossbeam_channel::Sender<ProgressEvent>>) -> Result<BatchReport, AudioError>,
{
    if config.json {
        // JSON模式不打印进度，也就无需收集线程
        return run(None);
    }

    let total = jobs.len();
    let verbose = config.verbose;
    let (tx, rx) = crossbeam_channel::unbounded::<ProgressEvent>();

    let collector = thread::spawn(move || {
        let mut done = 0usize;
        for event in rx {
            match event {
                ProgressEvent::FileStarted { path, .. } => {
                    if verbose {
                        println!(
                            "[PROCESSING] 处理 / Processing: {}",
                            utils::extract_filename_lossy(&path)
                        );
                    }
                }
                ProgressEvent::FileFinished {
                    path,
                    frames,
                    outputs,
                    ..
                } => {
                    done += 1;
                    println!(
                        "[OK] [{done}/{total}] {} ({frames}帧 / frames, {outputs}个输出 / outputs)",
                        utils::extract_filename_lossy(&path)
                    );
                }
                ProgressEvent::FileFailed {
                    path,
                    category,
                    message,
                    ..
                } => {
                    done += 1;
                    println!(
                        "[FAIL] [{done}/{total}] {} - [{}] {message}",
                        utils::extract_filename_lossy(&path),
                        category.display_name()
                    );
                }
            }
        }
    });

    let result = run(Some(&tx));
    drop(tx);
    // 收集线程只在通道关闭后退出；join失败说明其panic，忽略
    let _ = collector.join();
    if !config.json {
        println!();
    }
    result
}

/// 分发报告输出：文本报告文件和/或JSON
fn emit_reports(config: &AppConfig, report: &BatchReport) -> AudioResult<()> {
    if let Some(report_path) = &config.report_path {
        let text = formatter::create_report_text(&config.input_path, report);
        formatter::write_report(report_path, &text)?;
        if !config.json {
            println!(
                "[REPORT] 报告已写入 / Report written: {}",
                report_path.display()
            );
        }
    }
    if config.json {
        println!("{}", formatter::render_json_report(report)?);
    }
    Ok(())
}

/// 把单文件结果包装为单元素批量报告
fn single_file_batch(
    path: PathBuf,
    result: AudioResult<crate::processing::JobReport>,
) -> BatchReport {
    let mut error_stats = std::collections::HashMap::new();
    let (processed, failed) = match &result {
        Ok(_) => (1, 0),
        Err(e) => {
            error_stats
                .entry(crate::error::ErrorCategory::from_audio_error(e))
                .or_insert_with(Vec::new)
                .push(utils::extract_filename_lossy(&path));
            (0, 1)
        }
    };
    BatchReport {
        outcomes: vec![FileOutcome { path, result }],
        processed,
        failed,
        error_stats,
    }
}
