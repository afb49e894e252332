//! RIFF/WAVE容器头部编解码器
//!
//! 纯字节布局的编码/解码，不持有I/O策略：解码从任意`Read + Seek`
//! 源提取流描述符和data载荷位置，编码生成规范的44字节头部。
//! 全程小端字节序。
//!
//! 解码按声明长度跳过未知块（LIST、fact、cue等元数据块可能
//! 出现在data之前），不假设固定偏移。

use super::format::{AudioStreamDescriptor, SampleEncoding};
use crate::error::{AudioError, AudioResult, FormatError};
use std::io::{Read, Seek, SeekFrom};

/// 规范头部长度（RIFF(12) + fmt(24) + data头(8)）
pub const CANONICAL_HEADER_LEN: usize = 44;

/// RIFF块总长字段相对data字节数的固定偏移量
///
/// RIFF size = 4("WAVE") + 24(fmt块) + 8(data块头) + data字节数
pub const RIFF_SIZE_OVERHEAD: u32 = 36;

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

/// data载荷在源字节流中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSpan {
    /// data载荷起始的绝对字节偏移
    pub offset: u64,
    /// data块声明的字节长度
    pub byte_len: u64,
}

/// 解码结果：流描述符 + data载荷位置
#[derive(Debug, Clone, Copy)]
pub struct DecodedHeader {
    pub descriptor: AudioStreamDescriptor,
    pub data: DataSpan,
}

/// 解码RIFF/WAVE头部
///
/// 读取RIFF外层结构，逐块扫描直到找到`fmt `和`data`块；
/// 其余块按声明长度（含奇数长度的补齐字节）跳过。
/// 返回时源的读取位置未定义，调用方应按`DataSpan::offset`重新定位。
///
/// # 错误
///
/// * `FormatError::BadRiffTag` / `BadWaveTag` - 外层容器标签错误
/// * `FormatError::MissingFmtChunk` / `MissingDataChunk` - 必需块缺失
/// * `FormatError::UnsupportedEncoding` - 非PCM/非浮点格式标签
/// * `FormatError::ZeroChannels` / `TooManyChannels` - 声道数非法
/// * `FormatError::TruncatedData` - data声明长度超出文件实际字节数，
///   或data长度不是整帧的倍数
/// * `AudioError::UnsupportedSampleFormat` - 位深度不受支持
pub fn decode<R: Read + Seek>(source: &mut R) -> AudioResult<DecodedHeader> {
    let total_len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;

    // RIFF外层：RIFF + 总长 + WAVE
    let mut riff = [0u8; 12];
    read_exact_or(source, &mut riff, FormatError::BadRiffTag)?;
    if riff[0..4] != RIFF_TAG {
        return Err(FormatError::BadRiffTag.into());
    }
    if riff[8..12] != WAVE_TAG {
        return Err(FormatError::BadWaveTag.into());
    }

    let mut fmt_fields: Option<(u16, u16, u32)> = None; // (tag, channels, sample_rate) + bits见下
    let mut fmt_bits: u16 = 0;
    let mut cursor = 12u64;

    loop {
        if cursor + 8 > total_len {
            // 块头都读不全：缺失的必需块决定错误种类
            return Err(if fmt_fields.is_none() {
                FormatError::MissingFmtChunk.into()
            } else {
                FormatError::MissingDataChunk.into()
            });
        }

        source.seek(SeekFrom::Start(cursor))?;
        let mut chunk_head = [0u8; 8];
        source.read_exact(&mut chunk_head)?;
        let chunk_tag: [u8; 4] = chunk_head[0..4].try_into().unwrap();
        let chunk_len = u32::from_le_bytes(chunk_head[4..8].try_into().unwrap()) as u64;
        let body_offset = cursor + 8;

        if chunk_tag == FMT_TAG {
            if chunk_len < 16 || body_offset + 16 > total_len {
                return Err(FormatError::MissingFmtChunk.into());
            }
            let mut fmt_body = [0u8; 16];
            source.read_exact(&mut fmt_body)?;
            let format_tag = u16::from_le_bytes(fmt_body[0..2].try_into().unwrap());
            let channels = u16::from_le_bytes(fmt_body[2..4].try_into().unwrap());
            let sample_rate = u32::from_le_bytes(fmt_body[4..8].try_into().unwrap());
            fmt_bits = u16::from_le_bytes(fmt_body[14..16].try_into().unwrap());
            fmt_fields = Some((format_tag, channels, sample_rate));
        } else if chunk_tag == DATA_TAG {
            let (format_tag, channels, sample_rate) =
                fmt_fields.ok_or(FormatError::MissingFmtChunk)?;

            if channels == 0 {
                return Err(FormatError::ZeroChannels.into());
            }
            let encoding = SampleEncoding::from_wav_fields(format_tag, fmt_bits)?;

            // 声明长度必须落在文件实际字节数之内
            let available = total_len.saturating_sub(body_offset);
            if chunk_len > available {
                return Err(FormatError::TruncatedData {
                    declared: chunk_len,
                    available,
                }
                .into());
            }

            // 不允许半帧：剩余字节必须是 channels × bytes_per_sample 的整数倍
            let frame_stride = channels as u64 * encoding.bytes_per_sample() as u64;
            if chunk_len % frame_stride != 0 {
                return Err(FormatError::TruncatedData {
                    declared: chunk_len,
                    available: chunk_len - chunk_len % frame_stride,
                }
                .into());
            }

            let descriptor = AudioStreamDescriptor::new(
                sample_rate,
                encoding,
                channels,
                chunk_len / frame_stride,
            );
            descriptor.validate()?;

            return Ok(DecodedHeader {
                descriptor,
                data: DataSpan {
                    offset: body_offset,
                    byte_len: chunk_len,
                },
            });
        }

        // RIFF块按16位字对齐：奇数长度的块带1字节补齐
        cursor = body_offset + chunk_len + (chunk_len & 1);
    }
}

/// 编码规范的44字节WAVE头部
///
/// 可对同一流调用两次：先以占位长度（通常为0）写出，
/// 全部帧写完后用真实长度重新编码并回写（见FrameWriter的
/// seek-and-patch收尾）。
pub fn encode(descriptor: &AudioStreamDescriptor, data_byte_len: u32) -> [u8; CANONICAL_HEADER_LEN] {
    let mut header = [0u8; CANONICAL_HEADER_LEN];

    header[0..4].copy_from_slice(&RIFF_TAG);
    header[4..8].copy_from_slice(&(data_byte_len + RIFF_SIZE_OVERHEAD).to_le_bytes());
    header[8..12].copy_from_slice(&WAVE_TAG);

    header[12..16].copy_from_slice(&FMT_TAG);
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt块体固定16字节
    header[20..22].copy_from_slice(&descriptor.encoding.format_tag().to_le_bytes());
    header[22..24].copy_from_slice(&descriptor.channels.to_le_bytes());
    header[24..28].copy_from_slice(&descriptor.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&descriptor.bytes_per_second().to_le_bytes());
    header[32..34].copy_from_slice(&descriptor.bytes_per_frame().to_le_bytes());
    header[34..36].copy_from_slice(&descriptor.encoding.bits_per_sample().to_le_bytes());

    header[36..40].copy_from_slice(&DATA_TAG);
    header[40..44].copy_from_slice(&data_byte_len.to_le_bytes());

    header
}

/// 读取失败时映射到指定的格式错误（文件过短等）
fn read_exact_or<R: Read>(source: &mut R, buf: &mut [u8], err: FormatError) -> AudioResult<()> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            AudioError::Format(err)
        } else {
            AudioError::Io(e)
        }
    })
}
