//! 流式帧读取器
//!
//! 包装任意可定位字节源，按固定大小的帧块读取交错PCM数据，
//! 解交错并转换为平面f32规范表示。内存占用与块大小成正比，
//! 与文件大小无关。
//!
//! EOF语义与解码器流式接口一致：数据耗尽后返回`Ok(None)`，
//! 且后续调用保持幂等。

use super::format::{AudioStreamDescriptor, SampleEncoding};
use super::header::{DataSpan, DecodedHeader};
use crate::error::{AudioError, AudioResult, FormatError};
use crate::processing::Chunk;
use std::io::{Read, Seek, SeekFrom};

/// i16 → f32 定点缩放因子
const I16_SCALE: f32 = 1.0 / 32768.0;

/// i24 → f32 定点缩放因子 (2^23)
const I24_SCALE: f32 = 1.0 / 8_388_608.0;

/// 流式帧读取器
///
/// 在单个提取任务期间独占输入句柄和读取游标；不跨任务共享。
pub struct FrameReader<R: Read + Seek> {
    source: R,
    descriptor: AudioStreamDescriptor,

    /// 下一块的帧偏移
    next_frame: u64,

    /// 剩余未读帧数
    frames_remaining: u64,

    /// 交错字节的复用缓冲区
    byte_buf: Vec<u8>,
}

impl<R: Read + Seek> FrameReader<R> {
    /// 从解码后的头部构造读取器并定位到data载荷起点
    pub fn new(mut source: R, header: &DecodedHeader) -> AudioResult<Self> {
        source.seek(SeekFrom::Start(header.data.offset))?;
        Ok(Self {
            source,
            descriptor: header.descriptor,
            next_frame: 0,
            frames_remaining: header.descriptor.frame_count,
            byte_buf: Vec::new(),
        })
    }

    /// 从已定位在data起点的源构造（data跨度需与描述符一致）
    pub fn from_positioned(source: R, descriptor: AudioStreamDescriptor, span: DataSpan) -> Self {
        debug_assert_eq!(
            span.byte_len,
            descriptor.data_byte_len(),
            "data跨度与描述符不一致"
        );
        Self {
            source,
            descriptor,
            next_frame: 0,
            frames_remaining: descriptor.frame_count,
            byte_buf: Vec::new(),
        }
    }

    /// 源流的描述符
    #[inline]
    pub fn descriptor(&self) -> &AudioStreamDescriptor {
        &self.descriptor
    }

    /// 已读进度 (0.0-1.0)；总帧数为0时返回1.0
    pub fn progress(&self) -> f32 {
        if self.descriptor.frame_count == 0 {
            1.0
        } else {
            (self.next_frame as f32 / self.descriptor.frame_count as f32).min(1.0)
        }
    }

    /// 读取下一块，最多`max_frames`帧
    ///
    /// # 返回值
    ///
    /// - `Ok(Some(chunk))` - 成功读取一块；仅最后一块的帧数可能少于`max_frames`
    /// - `Ok(None)` - 流已耗尽（幂等：后续调用仍返回`None`）
    /// - `Err(_)` - I/O失败或数据被截断
    pub fn read_chunk(&mut self, max_frames: usize) -> AudioResult<Option<Chunk>> {
        if self.frames_remaining == 0 {
            return Ok(None);
        }

        let frames = (max_frames as u64).min(self.frames_remaining) as usize;
        let stride = self.descriptor.bytes_per_frame() as usize;
        let byte_len = frames * stride;

        self.byte_buf.resize(byte_len, 0);
        self.source.read_exact(&mut self.byte_buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                // 头部声明的帧数读不满：文件在头部解码后被截断
                AudioError::Format(FormatError::TruncatedData {
                    declared: self.descriptor.data_byte_len(),
                    available: self.next_frame * stride as u64,
                })
            } else {
                AudioError::Io(e)
            }
        })?;

        let mut chunk = Chunk::with_capacity(self.descriptor.channels as usize, frames);
        chunk.reset(self.next_frame);
        self.deinterleave(frames, &mut chunk);

        self.next_frame += frames as u64;
        self.frames_remaining -= frames as u64;
        Ok(Some(chunk))
    }

    /// 将交错字节缓冲区解交错为平面f32
    fn deinterleave(&mut self, frames: usize, chunk: &mut Chunk) {
        let channels = self.descriptor.channels as usize;
        let sample_bytes = self.descriptor.encoding.bytes_per_sample() as usize;

        for frame in 0..frames {
            let frame_base = frame * channels * sample_bytes;
            for channel in 0..channels {
                let at = frame_base + channel * sample_bytes;
                let sample = decode_sample(self.descriptor.encoding, &self.byte_buf[at..]);
                chunk.push_sample(channel, sample);
            }
        }
    }

    /// 拆出底层字节源（测试用）
    pub fn into_inner(self) -> R {
        self.source
    }
}

/// 按编码从小端字节解码单个样本为f32
#[inline]
fn decode_sample(encoding: SampleEncoding, bytes: &[u8]) -> f32 {
    match encoding {
        SampleEncoding::Int16 => {
            let v = i16::from_le_bytes([bytes[0], bytes[1]]);
            v as f32 * I16_SCALE
        }
        SampleEncoding::Int24 => {
            // 3字节小端，符号扩展到i32后右移回24位值域
            let v = i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8;
            v as f32 * I24_SCALE
        }
        SampleEncoding::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::header;
    use std::io::Cursor;

    /// 构造内存中的WAV流并打开读取器
    fn reader_for(
        encoding: SampleEncoding,
        channels: u16,
        data: &[u8],
    ) -> FrameReader<Cursor<Vec<u8>>> {
        let desc = AudioStreamDescriptor::new(44100, encoding, channels, 0);
        let mut bytes = header::encode(&desc, data.len() as u32).to_vec();
        bytes.extend_from_slice(data);
        let mut cursor = Cursor::new(bytes);
        let decoded = header::decode(&mut cursor).unwrap();
        FrameReader::new(cursor, &decoded).unwrap()
    }

    #[test]
    fn test_read_i16_stereo_deinterleave() {
        // 3帧立体声：L=[100, 200, 300], R=[-100, -200, -300]
        let mut data = Vec::new();
        for i in 1..=3i16 {
            data.extend_from_slice(&(i * 100).to_le_bytes());
            data.extend_from_slice(&(-i * 100).to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Int16, 2, &data);

        let chunk = reader.read_chunk(16).unwrap().unwrap();
        assert_eq!(chunk.frame_count(), 3);
        assert_eq!(chunk.channel_count(), 2);
        assert_eq!(chunk.frame_offset, 0);

        let left = chunk.plane(0).unwrap();
        let right = chunk.plane(1).unwrap();
        assert!((left[0] - 100.0 * I16_SCALE).abs() < 1e-9);
        assert!((left[2] - 300.0 * I16_SCALE).abs() < 1e-9);
        assert!((right[1] + 200.0 * I16_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_read_f32_passthrough() {
        let samples = [0.25f32, -0.5, 1.0, -1.0];
        let mut data = Vec::new();
        for s in samples {
            data.extend_from_slice(&s.to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Float32, 1, &data);

        let chunk = reader.read_chunk(16).unwrap().unwrap();
        assert_eq!(chunk.plane(0).unwrap(), &samples[..]);
    }

    #[test]
    fn test_read_i24_sign_extension() {
        // 最小值-8388608和最大值8388607
        let data = [0x00, 0x00, 0x80, 0xFF, 0xFF, 0x7F];
        let mut reader = reader_for(SampleEncoding::Int24, 1, &data);

        let chunk = reader.read_chunk(16).unwrap().unwrap();
        let plane = chunk.plane(0).unwrap();
        assert!((plane[0] - (-1.0)).abs() < 1e-9);
        assert!((plane[1] - (8_388_607.0 / 8_388_608.0)).abs() < 1e-9);
    }

    #[test]
    fn test_chunked_reads_and_final_partial_chunk() {
        // 10帧单声道i16，块大小4：期望4+4+2
        let mut data = Vec::new();
        for i in 0..10i16 {
            data.extend_from_slice(&i.to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Int16, 1, &data);

        let sizes: Vec<usize> = std::iter::from_fn(|| {
            reader.read_chunk(4).unwrap().map(|c| c.frame_count())
        })
        .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_frame_offsets_strictly_increasing() {
        let mut data = Vec::new();
        for i in 0..9i16 {
            data.extend_from_slice(&i.to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Int16, 1, &data);

        let mut offsets = Vec::new();
        while let Some(chunk) = reader.read_chunk(4).unwrap() {
            offsets.push(chunk.frame_offset);
        }
        assert_eq!(offsets, vec![0, 4, 8]);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut data = Vec::new();
        for i in 0..4i16 {
            data.extend_from_slice(&i.to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Int16, 1, &data);

        assert!(reader.read_chunk(8).unwrap().is_some());
        // EOF后继续调用应持续返回None
        assert!(reader.read_chunk(8).unwrap().is_none());
        assert!(reader.read_chunk(8).unwrap().is_none());
        assert!(reader.read_chunk(8).unwrap().is_none());
    }

    #[test]
    fn test_zero_length_stream() {
        let mut reader = reader_for(SampleEncoding::Int16, 2, &[]);
        assert!(reader.read_chunk(16).unwrap().is_none());
        assert_eq!(reader.progress(), 1.0);
    }

    #[test]
    fn test_progress_tracking() {
        let mut data = Vec::new();
        for i in 0..8i16 {
            data.extend_from_slice(&i.to_le_bytes());
        }
        let mut reader = reader_for(SampleEncoding::Int16, 1, &data);

        assert_eq!(reader.progress(), 0.0);
        reader.read_chunk(4).unwrap();
        assert!((reader.progress() - 0.5).abs() < 1e-6);
        reader.read_chunk(4).unwrap();
        assert_eq!(reader.progress(), 1.0);
    }

    #[test]
    fn test_shrunk_file_yields_truncated_error() {
        // 头部声明8帧但载荷只有4帧：read_exact触发TruncatedData
        let desc = AudioStreamDescriptor::new(44100, SampleEncoding::Int16, 1, 0);
        let mut bytes = header::encode(&desc, 16).to_vec();
        bytes.extend_from_slice(&[0u8; 8]);

        let descriptor = AudioStreamDescriptor::new(44100, SampleEncoding::Int16, 1, 8);
        let span = DataSpan {
            offset: 44,
            byte_len: 16,
        };
        let mut cursor = Cursor::new(bytes);
        cursor.seek(SeekFrom::Start(44)).unwrap();
        let mut reader = FrameReader::from_positioned(cursor, descriptor, span);

        assert!(matches!(
            reader.read_chunk(8),
            Err(AudioError::Format(FormatError::TruncatedData { .. }))
        ));
    }
}
