//! WAV测试固件生成器
//!
//! 为提取管线测试生成各种WAV输入文件。固件写入每次运行唯一的
//! 临时目录，测试之间互不干扰，无需跨进程锁。

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 创建本次测试专属的工作目录
pub fn temp_workspace(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "wavsplit_it_{tag}_{}_{unique}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("无法创建测试工作目录");
    dir
}

/// 写入16位整数PCM固件；`sample(frame, channel)`生成样本值
pub fn write_wav_i16(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    sample: impl Fn(usize, usize) -> i16,
) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("无法创建i16固件");
    for frame in 0..frames {
        for channel in 0..channels as usize {
            writer.write_sample(sample(frame, channel)).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// 写入24位整数PCM固件（样本值须在24位值域内）
pub fn write_wav_i24(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    sample: impl Fn(usize, usize) -> i32,
) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 24,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("无法创建i24固件");
    for frame in 0..frames {
        for channel in 0..channels as usize {
            writer.write_sample(sample(frame, channel)).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// 写入32位浮点固件
pub fn write_wav_f32(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    sample: impl Fn(usize, usize) -> f32,
) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).expect("无法创建f32固件");
    for frame in 0..frames {
        for channel in 0..channels as usize {
            writer.write_sample(sample(frame, channel)).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// 手工构造任意格式标签的WAVE字节镜像（用于非PCM拒绝测试）
pub fn write_raw_wav(
    path: &Path,
    format_tag: u16,
    channels: u16,
    bits: u16,
    sample_rate: u32,
    data: &[u8],
) {
    let bytes_per_frame = channels as u32 * (bits as u32 / 8);
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((36 + data.len()) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&format_tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * bytes_per_frame).to_le_bytes());
    out.extend_from_slice(&(bytes_per_frame as u16).to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    fs::write(path, out).expect("无法写入原始WAVE固件");
}

/// 把已有WAV文件截断到指定字节数（模拟传输中断）
pub fn truncate_file(path: &Path, keep_bytes: u64) {
    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .expect("无法打开待截断文件");
    file.set_len(keep_bytes).expect("截断失败");
}

/// 读回单声道整数输出用于逐样本验证
pub fn read_mono_int(path: &Path) -> (WavSpec, Vec<i32>) {
    let mut reader = hound::WavReader::open(path).expect("无法打开输出文件");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1, "输出必须是单声道");
    let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

/// 读回单声道浮点输出
pub fn read_mono_f32(path: &Path) -> (WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).expect("无法打开输出文件");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1, "输出必须是单声道");
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}
