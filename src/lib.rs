//! WavSplit - 流式WAV声道提取工具
//!
//! 从多声道PCM WAV文件提取指定声道为独立的单声道WAV文件，
//! 大文件以有界内存流式处理。
//!
//! ## 核心特性
//! - 手写RIFF/WAVE头部编解码器（规范44字节头部，按声明长度跳过未知块）
//! - 块级流式读写：内存占用与块大小成正比，与文件大小无关
//! - 单遍提取：一次读取分发到全部选定声道
//! - 整数源位精确往返（i16×1/32768、i24×1/8388608与写入端量化互逆）
//! - 文件级并行批量处理和协作式取消

pub mod audio;
pub mod error;
pub mod processing;
pub mod tools;

// 重新导出核心类型
pub use audio::{AudioStreamDescriptor, FrameReader, FrameWriter, SampleEncoding};
pub use error::{AudioError, AudioResult, ErrorCategory, FormatError};
pub use processing::{
    BatchReport, BatchRunner, ChannelSelection, ChannelSelector, ExtractionJob, JobReport,
    PipelineConfig, SelectionSpec,
};
