//! 音频流格式描述模块
//!
//! 定义流描述符和受支持的样本编码集合。

use crate::error::{AudioError, AudioResult, FormatError};

/// 支持的最大声道数（架构约束）
///
/// 超出此值的文件通常意味着损坏的头部而非真实的多声道内容。
pub const MAX_CHANNELS: u16 = 32;

/// 样本编码（封闭集合）
///
/// 管线内部统一使用f32规范表示；此枚举描述源/目标文件中
/// 的存储格式，按变体显式转换，不做开放式动态派发。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    /// 16位有符号整数PCM
    Int16,
    /// 24位有符号整数PCM（3字节小端）
    Int24,
    /// 32位IEEE浮点
    Float32,
}

impl SampleEncoding {
    /// 每个样本占用的字节数
    #[inline]
    pub fn bytes_per_sample(&self) -> u16 {
        match self {
            SampleEncoding::Int16 => 2,
            SampleEncoding::Int24 => 3,
            SampleEncoding::Float32 => 4,
        }
    }

    /// 位深度
    #[inline]
    pub fn bits_per_sample(&self) -> u16 {
        self.bytes_per_sample() * 8
    }

    /// 是否为浮点格式
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, SampleEncoding::Float32)
    }

    /// WAVE头部的格式标签（1 = PCM, 3 = IEEE float）
    #[inline]
    pub fn format_tag(&self) -> u16 {
        if self.is_float() { 3 } else { 1 }
    }

    /// 从WAVE头部字段解析编码
    ///
    /// # 错误
    ///
    /// * `FormatError::UnsupportedEncoding` - 非PCM/非浮点的格式标签
    /// * `AudioError::UnsupportedSampleFormat` - 标签受支持但位深度不在封闭集合内
    pub fn from_wav_fields(format_tag: u16, bits_per_sample: u16) -> AudioResult<Self> {
        match format_tag {
            1 => match bits_per_sample {
                16 => Ok(SampleEncoding::Int16),
                24 => Ok(SampleEncoding::Int24),
                _ => Err(AudioError::UnsupportedSampleFormat {
                    bits_per_sample,
                    is_float: false,
                }),
            },
            3 => match bits_per_sample {
                32 => Ok(SampleEncoding::Float32),
                _ => Err(AudioError::UnsupportedSampleFormat {
                    bits_per_sample,
                    is_float: true,
                }),
            },
            tag => Err(AudioError::Format(FormatError::UnsupportedEncoding(tag))),
        }
    }
}

/// 音频流描述符
///
/// 从源文件头部解析后不可变；输出流通过[`mono`](Self::mono)派生。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStreamDescriptor {
    /// 采样率 (Hz)
    pub sample_rate: u32,

    /// 样本编码
    pub encoding: SampleEncoding,

    /// 声道数
    pub channels: u16,

    /// 总帧数（每帧包含channels个样本）
    pub frame_count: u64,
}

impl AudioStreamDescriptor {
    /// 创建新的流描述符
    pub fn new(
        sample_rate: u32,
        encoding: SampleEncoding,
        channels: u16,
        frame_count: u64,
    ) -> Self {
        Self {
            sample_rate,
            encoding,
            channels,
            frame_count,
        }
    }

    /// 每帧字节数（block align）
    #[inline]
    pub fn bytes_per_frame(&self) -> u16 {
        self.channels * self.encoding.bytes_per_sample()
    }

    /// 每秒字节数（byte rate）
    #[inline]
    pub fn bytes_per_second(&self) -> u32 {
        self.sample_rate * self.bytes_per_frame() as u32
    }

    /// data块的总字节数
    #[inline]
    pub fn data_byte_len(&self) -> u64 {
        self.frame_count * self.bytes_per_frame() as u64
    }

    /// 音频时长（秒）
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate > 0 {
            self.frame_count as f64 / self.sample_rate as f64
        } else {
            0.0
        }
    }

    /// 派生单声道输出流描述符（帧数待finalize时确定）
    pub fn mono(&self, encoding: SampleEncoding) -> Self {
        Self {
            sample_rate: self.sample_rate,
            encoding,
            channels: 1,
            frame_count: 0,
        }
    }

    /// 验证格式参数的有效性
    pub fn validate(&self) -> AudioResult<()> {
        if self.channels == 0 {
            return Err(AudioError::Format(FormatError::ZeroChannels));
        }
        if self.channels > MAX_CHANNELS {
            return Err(AudioError::Format(FormatError::TooManyChannels(
                self.channels,
            )));
        }
        Ok(())
    }
}
