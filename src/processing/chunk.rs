//! 流式处理的样本块类型
//!
//! 注意："块"指一段连续帧的处理单元，不是WAV容器意义上的chunk。
//! 管线内部统一使用平面(planar)f32表示：每个声道一段独立缓冲区。

/// 多声道平面样本块
///
/// `planes[c][i]`为声道c在块内第i帧的样本值；所有平面长度相同。
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 块首帧在整个流中的帧偏移
    pub frame_offset: u64,

    /// 每声道一个平面缓冲区
    planes: Vec<Vec<f32>>,
}

impl Chunk {
    /// 创建带预分配容量的空块
    pub fn with_capacity(channels: usize, max_frames: usize) -> Self {
        Self {
            frame_offset: 0,
            planes: (0..channels)
                .map(|_| Vec::with_capacity(max_frames))
                .collect(),
        }
    }

    /// 从现成的平面缓冲区构造（测试和选择器使用）
    pub fn from_planes(frame_offset: u64, planes: Vec<Vec<f32>>) -> Self {
        debug_assert!(
            planes.windows(2).all(|w| w[0].len() == w[1].len()),
            "所有声道平面长度必须一致"
        );
        Self {
            frame_offset,
            planes,
        }
    }

    /// 声道数
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// 块内帧数
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }

    /// 获取指定声道的平面缓冲区（调用方保证索引有效）
    #[inline]
    pub fn plane(&self, channel: usize) -> Option<&[f32]> {
        self.planes.get(channel).map(Vec::as_slice)
    }

    /// 清空所有平面并更新帧偏移，保留容量（读取循环中复用）
    pub fn reset(&mut self, frame_offset: u64) {
        self.frame_offset = frame_offset;
        for plane in &mut self.planes {
            plane.clear();
        }
    }

    /// 向指定声道平面追加一个样本（读取器的解交错路径使用）
    #[inline]
    pub(crate) fn push_sample(&mut self, channel: usize, sample: f32) {
        self.planes[channel].push(sample);
    }
}

/// 单声道样本块
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonoChunk {
    /// 块首帧在输出流中的帧偏移
    pub frame_offset: u64,

    /// 样本数据
    pub samples: Vec<f32>,
}

impl MonoChunk {
    /// 块内帧数
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.samples.len()
    }

    /// 清空样本并更新帧偏移，保留容量
    pub fn reset(&mut self, frame_offset: u64) {
        self.frame_offset = frame_offset;
        self.samples.clear();
    }
}
