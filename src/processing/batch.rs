//! 多文件批量运行器
//!
//! 文件级并行：每个任务独占自己的文件句柄，任务之间无共享
//! 可变状态，唯一的跨任务信号是取消标志。进度事件通过通道
//! 发送给调用方，报告按原始文件顺序排序。

use super::job::{ExtractionJob, JobReport, PipelineConfig};
use crate::error::{AudioError, ErrorCategory};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 批量处理的进度事件
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// 任务开始处理
    FileStarted { index: usize, path: PathBuf },
    /// 任务成功完成
    FileFinished {
        index: usize,
        path: PathBuf,
        frames: u64,
        outputs: usize,
    },
    /// 任务失败
    FileFailed {
        index: usize,
        path: PathBuf,
        category: ErrorCategory,
        message: String,
    },
}

/// 单个文件的最终结果（按原始顺序排列在报告中）
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<JobReport, AudioError>,
}

/// 批量运行报告
#[derive(Debug)]
pub struct BatchReport {
    /// 各文件结果，按输入顺序
    pub outcomes: Vec<FileOutcome>,
    /// 成功文件数
    pub processed: usize,
    /// 失败文件数
    pub failed: usize,
    /// 按错误类别归组的失败文件名
    pub error_stats: HashMap<ErrorCategory, Vec<String>>,
}

impl BatchReport {
    /// 是否所有文件都成功
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// 首个失败的错误（用于退出码推导）
    pub fn first_error(&self) -> Option<&AudioError> {
        self.outcomes
            .iter()
            .find_map(|o| o.result.as_ref().err())
    }
}

/// 有序结果容器（保证报告顺序与输入顺序一致）
struct OrderedResult {
    index: usize,
    path: PathBuf,
    result: Result<JobReport, AudioError>,
}

/// 批量运行器
pub struct BatchRunner {
    config: PipelineConfig,
    cancel: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(config: PipelineConfig, cancel: Arc<AtomicBool>) -> Self {
        Self { config, cancel }
    }

    /// 串行运行全部任务
    ///
    /// 一个文件失败不会中断批次，失败计入统计后继续下一个文件；
    /// 只有取消标志会提前终止（剩余任务各自以Cancelled失败）。
    pub fn run_serial(
        &self,
        jobs: &[ExtractionJob],
        progress: Option<&Sender<ProgressEvent>>,
    ) -> BatchReport {
        let results: Vec<OrderedResult> = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| self.run_one(index, job, progress))
            .collect();
        assemble_report(results)
    }

    /// 并行运行全部任务
    ///
    /// rayon线程池精确控制并发度；每个工作线程内部仍是
    /// 顺序的单遍流式处理。
    pub fn run_parallel(
        &self,
        jobs: &[ExtractionJob],
        parallel_degree: usize,
        progress: Option<&Sender<ProgressEvent>>,
    ) -> Result<BatchReport, AudioError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallel_degree)
            .thread_name(|i| format!("extract-worker-{i}"))
            .build()
            .map_err(|e| AudioError::Resource(format!("线程池创建失败: {e}")))?;

        let mut results: Vec<OrderedResult> = pool.install(|| {
            jobs.par_iter()
                .enumerate()
                .map(|(index, job)| self.run_one(index, job, progress))
                .collect()
        });

        // 按原始顺序排序结果（报告顺序与输入顺序一致）
        results.sort_by_key(|r| r.index);
        Ok(assemble_report(results))
    }

    fn run_one(
        &self,
        index: usize,
        job: &ExtractionJob,
        progress: Option<&Sender<ProgressEvent>>,
    ) -> OrderedResult {
        let path = job.source_path().to_path_buf();
        if let Some(tx) = progress {
            let _ = tx.send(ProgressEvent::FileStarted {
                index,
                path: path.clone(),
            });
        }

        let result = if self.cancel.load(Ordering::Relaxed) {
            Err(AudioError::Cancelled)
        } else {
            job.run(&self.config, &self.cancel)
        };

        if let Some(tx) = progress {
            let event = match &result {
                Ok(report) => ProgressEvent::FileFinished {
                    index,
                    path: path.clone(),
                    frames: report.frame_count,
                    outputs: report.outcomes.len(),
                },
                Err(e) => ProgressEvent::FileFailed {
                    index,
                    path: path.clone(),
                    category: ErrorCategory::from_audio_error(e),
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event);
        }

        OrderedResult {
            index,
            path,
            result,
        }
    }
}

/// 把有序结果折叠为批量报告
fn assemble_report(results: Vec<OrderedResult>) -> BatchReport {
    let mut processed = 0;
    let mut failed = 0;
    let mut error_stats: HashMap<ErrorCategory, Vec<String>> = HashMap::new();
    let mut outcomes = Vec::with_capacity(results.len());

    for r in results {
        match &r.result {
            Ok(_) => processed += 1,
            Err(e) => {
                failed += 1;
                let filename = r
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| r.path.display().to_string());
                error_stats
                    .entry(ErrorCategory::from_audio_error(e))
                    .or_default()
                    .push(filename);
            }
        }
        outcomes.push(FileOutcome {
            path: r.path,
            result: r.result,
        });
    }

    BatchReport {
        outcomes,
        processed,
        failed,
        error_stats,
    }
}
