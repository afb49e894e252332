//! 流式单声道写入器
//!
//! 包装任意可定位字节汇，先以占位长度写出头部，顺序追加样本块，
//! 最后seek回头部用真实字节数修补RIFF和data长度字段。
//!
//! 头部修补保证在每条正常退出路径上发生：显式`finalize()`返回帧数，
//! 未显式收尾时由`Drop`尽力修补；删除式中止走`abort()`跳过修补。

use super::format::{AudioStreamDescriptor, SampleEncoding};
use super::header;
use crate::error::{AudioError, AudioResult};
use crate::processing::MonoChunk;
use std::io::{Seek, SeekFrom, Write};

/// f32 → i16 量化缩放因子
const I16_SCALE: f32 = 32768.0;

/// f32 → i24 量化缩放因子 (2^23)
const I24_SCALE: f32 = 8_388_608.0;

/// 流式单声道WAV写入器
///
/// 每个选定声道独占一个写入器实例和输出句柄；不跨任务共享。
pub struct FrameWriter<W: Write + Seek> {
    sink: W,
    descriptor: AudioStreamDescriptor,

    /// 已写入的帧数
    frames_written: u64,

    /// 头部是否已处置（finalize/abort后为true，Drop据此跳过修补）
    finalized: bool,

    /// 量化字节的复用缓冲区
    byte_buf: Vec<u8>,
}

impl<W: Write + Seek> FrameWriter<W> {
    /// 打开写入器：写出带占位长度(0)的头部
    ///
    /// 此时总帧数未知，长度字段在[`finalize`](Self::finalize)时修补。
    pub fn open(mut sink: W, descriptor: AudioStreamDescriptor) -> AudioResult<Self> {
        debug_assert_eq!(descriptor.channels, 1, "FrameWriter仅写单声道流");
        sink.write_all(&header::encode(&descriptor, 0))?;
        Ok(Self {
            sink,
            descriptor,
            frames_written: 0,
            finalized: false,
            byte_buf: Vec::new(),
        })
    }

    /// 已写入的帧数
    #[inline]
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// 输出流描述符
    #[inline]
    pub fn descriptor(&self) -> &AudioStreamDescriptor {
        &self.descriptor
    }

    /// 追加一个单声道块
    ///
    /// 样本按目标编码重新量化后顺序写入；块必须按帧偏移递增的
    /// 顺序提交（流式语义依赖于此）。
    pub fn write_chunk(&mut self, chunk: &MonoChunk) -> AudioResult<()> {
        debug_assert_eq!(
            chunk.frame_offset, self.frames_written,
            "块必须按帧顺序提交"
        );

        self.byte_buf.clear();
        self.byte_buf
            .reserve(chunk.samples.len() * self.descriptor.encoding.bytes_per_sample() as usize);

        for &sample in &chunk.samples {
            encode_sample(self.descriptor.encoding, sample, &mut self.byte_buf);
        }
        self.sink.write_all(&self.byte_buf)?;
        self.frames_written += chunk.samples.len() as u64;
        Ok(())
    }

    /// 收尾：修补头部长度字段并冲刷汇，返回写入的总帧数
    pub fn finalize(mut self) -> AudioResult<u64> {
        self.patch_header()?;
        self.finalized = true;
        Ok(self.frames_written)
    }

    /// 中止：跳过头部修补，直接丢弃写入器
    ///
    /// 供删除式失败策略使用——输出文件即将被删除，无需修补。
    pub fn abort(mut self) {
        self.finalized = true;
    }

    /// seek回头部重写长度字段
    fn patch_header(&mut self) -> AudioResult<()> {
        let data_len = self.frames_written
            * self.descriptor.encoding.bytes_per_sample() as u64;
        let data_len = checked_data_len(data_len).ok_or_else(|| {
            AudioError::Resource(format!("输出超过WAV容量上限: {data_len}字节"))
        })?;

        let mut finalized = self.descriptor;
        finalized.frame_count = self.frames_written;

        self.sink.flush()?;
        self.sink.seek(SeekFrom::Start(0))?;
        self.sink.write_all(&header::encode(&finalized, data_len))?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write + Seek> Drop for FrameWriter<W> {
    fn drop(&mut self) {
        // 非正常退出路径的兜底：尽力修补，保证头部语法有效
        if !self.finalized {
            let _ = self.patch_header();
        }
    }
}

/// 校验数据字节数可放入RIFF长度字段
///
/// RIFF长度 = 数据长度 + 36字节头部开销，两者都必须在u32内。
#[inline]
fn checked_data_len(byte_len: u64) -> Option<u32> {
    u32::try_from(byte_len)
        .ok()
        .filter(|&len| len <= u32::MAX - header::RIFF_SIZE_OVERHEAD)
}

/// 按目标编码量化f32样本并追加小端字节
#[inline]
fn encode_sample(encoding: SampleEncoding, sample: f32, out: &mut Vec<u8>) {
    match encoding {
        SampleEncoding::Int16 => {
            let v = (sample * I16_SCALE).round().clamp(-32768.0, 32767.0) as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
        SampleEncoding::Int24 => {
            let v = (sample * I24_SCALE)
                .round()
                .clamp(-8_388_608.0, 8_388_607.0) as i32;
            out.extend_from_slice(&v.to_le_bytes()[0..3]);
        }
        SampleEncoding::Float32 => out.extend_from_slice(&sample.to_le_bytes()),
    }
}
