//! 声道提取器
//!
//! 从多声道平面块中取出单个声道的样本序列。平面表示下这是
//! 一次整段拷贝，无逐样本跨步访问。

use super::chunk::{Chunk, MonoChunk};
use crate::error::{AudioError, AudioResult};

/// 声道提取器
///
/// 无状态，可在任意声道和任意块上复用同一个实例。
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSelector;

impl ChannelSelector {
    pub fn new() -> Self {
        Self
    }

    /// 提取指定声道为新的单声道块
    ///
    /// # 错误
    ///
    /// * `AudioError::InvalidChannel` - 声道索引超出块的声道范围
    pub fn extract(&self, chunk: &Chunk, channel: usize) -> AudioResult<MonoChunk> {
        let mut mono = MonoChunk::default();
        self.extract_into(chunk, channel, &mut mono)?;
        Ok(mono)
    }

    /// 提取指定声道到调用方提供的缓冲区（流式循环中复用分配）
    pub fn extract_into(
        &self,
        chunk: &Chunk,
        channel: usize,
        out: &mut MonoChunk,
    ) -> AudioResult<()> {
        let plane = chunk.plane(channel).ok_or(AudioError::InvalidChannel {
            requested: channel,
            channel_count: chunk.channel_count() as u16,
        })?;

        out.reset(chunk.frame_offset);
        out.samples.extend_from_slice(plane);
        Ok(())
    }
}
