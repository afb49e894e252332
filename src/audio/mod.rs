//! WAV音频I/O模块
//!
//! 提供RIFF/WAVE头部编解码和流式帧级读写。
//!
//! 管线内部统一使用f32规范表示；读取器负责解交错和样本转换，
//! 写入器负责重新量化和头部收尾。

pub mod format;
pub mod header;
pub mod reader;
pub mod writer;

// 重新导出核心类型
pub use format::{AudioStreamDescriptor, MAX_CHANNELS, SampleEncoding};
pub use header::{DataSpan, DecodedHeader};
pub use reader::FrameReader;
pub use writer::FrameWriter;
