//! 统一错误处理框架
//!
//! 定义声道提取管线的错误类型：容器格式错误、I/O错误、
//! 声道选择错误以及批处理统计用的错误分类。

use std::fmt;
use std::io;

/// RIFF/WAVE容器层面的格式错误
///
/// 解码头部时按具体失败原因细分，便于测试和错误提示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// 文件开头缺少"RIFF"标签
    BadRiffTag,

    /// RIFF表单类型不是"WAVE"
    BadWaveTag,

    /// 在data块之前未找到fmt块
    MissingFmtChunk,

    /// 未找到data块
    MissingDataChunk,

    /// 非PCM编码标签（压缩格式不在支持范围内）
    UnsupportedEncoding(u16),

    /// 声道数为0
    ZeroChannels,

    /// 声道数超过架构上限（通常意味着损坏的头部）
    TooManyChannels(u16),

    /// data块声明的长度超出文件实际剩余字节，
    /// 或剩余字节不是整帧的倍数
    TruncatedData {
        /// 头部声明的data字节数
        declared: u64,
        /// 实际可用的字节数
        available: u64,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadRiffTag => write!(f, "缺少RIFF标签 / missing RIFF tag"),
            FormatError::BadWaveTag => write!(f, "RIFF表单类型不是WAVE / RIFF form is not WAVE"),
            FormatError::MissingFmtChunk => write!(f, "未找到fmt块 / fmt chunk not found"),
            FormatError::MissingDataChunk => write!(f, "未找到data块 / data chunk not found"),
            FormatError::UnsupportedEncoding(tag) => {
                write!(f, "非PCM编码标签({tag}) / non-PCM encoding tag ({tag})")
            }
            FormatError::ZeroChannels => write!(f, "声道数为0 / channel count is zero"),
            FormatError::TooManyChannels(n) => {
                write!(f, "声道数({n})超出上限 / channel count {n} exceeds limit")
            }
            FormatError::TruncatedData {
                declared,
                available,
            } => write!(
                f,
                "data块被截断: 声明{declared}字节, 实际{available}字节 / truncated data chunk: declared {declared} bytes, {available} available"
            ),
        }
    }
}

/// 声道提取相关的统一错误类型
#[derive(Debug)]
pub enum AudioError {
    /// 底层存储的打开/读/写/定位失败
    Io(io::Error),

    /// 容器格式错误（见[`FormatError`]各变体）
    Format(FormatError),

    /// 请求的声道索引超出源文件声道数
    InvalidChannel {
        /// 请求的声道索引（0基）
        requested: usize,
        /// 源文件的实际声道数
        channel_count: u16,
    },

    /// 编解码器不支持的位深度/样本格式
    UnsupportedSampleFormat {
        /// 头部声明的位深度
        bits_per_sample: u16,
        /// 是否为浮点格式标签
        is_float: bool,
    },

    /// 任务在块间检查点被协作式取消
    Cancelled,

    /// 资源错误（线程池创建失败等）
    Resource(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Io(err) => write!(f, "文件I/O错误 / I/O error: {err}"),
            AudioError::Format(err) => write!(f, "音频格式错误 / format error: {err}"),
            AudioError::InvalidChannel {
                requested,
                channel_count,
            } => write!(
                f,
                "声道索引({requested})超出范围(0-{max}) / channel index {requested} out of range (0-{max})",
                max = channel_count.saturating_sub(1)
            ),
            AudioError::UnsupportedSampleFormat {
                bits_per_sample,
                is_float,
            } => write!(
                f,
                "不支持的样本格式: {bits_per_sample}位{kind_zh} / unsupported sample format: {bits_per_sample}-bit {kind_en}",
                kind_zh = if *is_float { "浮点" } else { "整数" },
                kind_en = if *is_float { "float" } else { "integer" }
            ),
            AudioError::Cancelled => write!(f, "任务已取消 / job cancelled"),
            AudioError::Resource(msg) => write!(f, "资源错误 / resource error: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(err: io::Error) -> Self {
        AudioError::Io(err)
    }
}

impl From<FormatError> for AudioError {
    fn from(err: FormatError) -> Self {
        AudioError::Format(err)
    }
}

/// 声道提取操作的标准Result类型
pub type AudioResult<T> = Result<T, AudioError>;

// ==================== 错误分类系统 ====================
// 用于批量处理中的错误统计和退出码映射

/// 错误类别枚举（用于批量处理统计）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 格式相关错误（容器损坏、非PCM等）
    Format,
    /// I/O相关错误（文件不存在、权限不足等）
    Io,
    /// 声道选择错误（索引越界、空选择等）
    Channel,
    /// 样本格式错误（不支持的位深度）
    SampleFormat,
    /// 协作式取消
    Cancelled,
    /// 其他未分类错误
    Other,
}

impl ErrorCategory {
    /// 从AudioError提取错误类别
    pub fn from_audio_error(e: &AudioError) -> Self {
        match e {
            AudioError::Format(_) => Self::Format,
            AudioError::Io(_) => Self::Io,
            AudioError::InvalidChannel { .. } => Self::Channel,
            AudioError::UnsupportedSampleFormat { .. } => Self::SampleFormat,
            AudioError::Cancelled => Self::Cancelled,
            AudioError::Resource(_) => Self::Other,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误 / format",
            Self::Io => "I/O错误 / io",
            Self::Channel => "声道选择错误 / channel",
            Self::SampleFormat => "样本格式错误 / sample-format",
            Self::Cancelled => "已取消 / cancelled",
            Self::Other => "其他错误 / other",
        }
    }
}
