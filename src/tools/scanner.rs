//! 文件扫描模块
//!
//! 负责递归扫描目录中的WAV文件。

use super::cli::AppConfig;
use super::utils;
use crate::error::{AudioError, AudioResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 递归扫描目录中的WAV文件
///
/// 按路径排序返回，保证批量处理顺序稳定。扩展名匹配不区分
/// 大小写；无法访问的子目录项跳过而不是中断扫描。
pub fn scan_wav_files(dir_path: &Path) -> AudioResult<Vec<PathBuf>> {
    if !dir_path.exists() {
        return Err(AudioError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("目录不存在 / directory does not exist: {}", dir_path.display()),
        )));
    }

    let mut wav_files: Vec<PathBuf> = WalkDir::new(dir_path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();

    wav_files.sort();
    Ok(wav_files)
}

/// 显示文件扫描结果
pub fn show_scan_results(config: &AppConfig, wav_files: &[PathBuf]) {
    if config.json {
        return;
    }
    if wav_files.is_empty() {
        println!(
            "[WARNING] 目录中没有找到WAV文件 / no WAV files found in: {}",
            config.input_path.display()
        );
        return;
    }

    println!(
        "[SCAN] 扫描目录 / Scanning: {}",
        config.input_path.display()
    );
    println!(
        "[SCAN] 找到 {} 个WAV文件 / found {} WAV file(s)",
        wav_files.len(),
        wav_files.len()
    );

    if config.verbose {
        for (i, file) in wav_files.iter().enumerate() {
            println!("   {}. {}", i + 1, utils::extract_filename_lossy(file));
        }
    }
    println!();
}
