//! 工具函数模块
//!
//! 提供文件路径处理、输出命名和并发度计算等通用工具函数。

use super::constants::parallel_limits;
use crate::processing::OutputNamer;
use std::path::{Path, PathBuf};

/// 文件路径处理工具函数
pub mod path {
    use std::path::Path;

    /// 提取文件名（返回String，用于日志显示）
    #[inline]
    pub fn extract_filename_lossy(path: &Path) -> String {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 提取文件stem（不含扩展名）
    #[inline]
    pub fn extract_file_stem(path: &Path) -> &str {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("audio")
    }

    /// 获取父目录，如果不存在则返回当前目录
    #[inline]
    pub fn get_parent_dir(path: &Path) -> &Path {
        path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// 计算实际生效的并发度
///
/// 统一的并发度计算：请求值先按系统限制钳制，再按任务数收缩
/// （并发度不应超过待处理文件数）。
pub fn effective_parallel_degree(requested: usize, task_count: Option<usize>) -> usize {
    let clamped = requested.clamp(
        parallel_limits::MIN_PARALLEL_DEGREE,
        parallel_limits::MAX_PARALLEL_DEGREE,
    );
    match task_count {
        Some(count) if count > 0 => clamped.min(count),
        _ => clamped,
    }
}

/// 构造默认输出命名器：`<stem>_channel_<k+1>.wav`
///
/// 声道编号用户可见，因此1基。`out_dir`为None时输出到源文件
/// 所在目录。
pub fn default_output_namer(out_dir: Option<PathBuf>) -> OutputNamer {
    Box::new(move |source: &Path, channel: usize| {
        let stem = path::extract_file_stem(source);
        let dir = out_dir
            .clone()
            .unwrap_or_else(|| path::get_parent_dir(source).to_path_buf());
        dir.join(format!("{stem}_channel_{}.wav", channel + 1))
    })
}

// 重新导出为平级函数，保持引用路径简短
pub use path::{extract_file_stem, extract_filename_lossy, get_parent_dir};
