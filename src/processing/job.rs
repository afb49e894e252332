//! 单文件提取任务
//!
//! 一次任务 = 一个源文件 + 一个声道选择集。头部验证通过后
//! 才创建任何输出文件；随后单遍读取源数据，把每块分发到全部
//! 选定声道的写入器。取消检查发生在块与块之间。
//!
//! 失败策略由配置决定：默认删除所有部分输出（不留半成品），
//! `keep_partial`模式则修补已写帧数的头部后保留。

use super::chunk::MonoChunk;
use super::selection::SelectionSpec;
use super::selector::ChannelSelector;
use crate::audio::format::SampleEncoding;
use crate::audio::header;
use crate::audio::reader::FrameReader;
use crate::audio::writer::FrameWriter;
use crate::error::{AudioError, AudioResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// 默认块大小（帧）
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// 输出样本编码策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// 与源文件位深一致（整数源可位精确往返）
    #[default]
    MatchSource,
    /// 统一输出32位浮点
    Float32,
}

impl OutputEncoding {
    /// 按源编码解析实际输出编码
    pub fn resolve(&self, source: SampleEncoding) -> SampleEncoding {
        match self {
            OutputEncoding::MatchSource => source,
            OutputEncoding::Float32 => SampleEncoding::Float32,
        }
    }
}

/// 提取管线配置
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 每次读取的最大帧数
    pub chunk_frames: usize,

    /// 失败时删除部分输出（false则修补头部保留半成品）
    pub delete_on_failure: bool,

    /// 输出样本编码策略
    pub output_encoding: OutputEncoding,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            delete_on_failure: true,
            output_encoding: OutputEncoding::MatchSource,
        }
    }
}

/// 单个输出声道的结果
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    /// 0基声道索引
    pub channel_index: usize,
    /// 输出文件路径
    pub output_path: PathBuf,
    /// 写入的帧数
    pub frames_written: u64,
}

/// 单文件任务报告
#[derive(Debug, Clone)]
pub struct JobReport {
    /// 源文件路径
    pub source_path: PathBuf,
    /// 源文件声道数
    pub channel_count: u16,
    /// 源文件采样率
    pub sample_rate: u32,
    /// 源文件总帧数
    pub frame_count: u64,
    /// 各输出声道的结果（按声道索引升序）
    pub outcomes: Vec<ChannelOutcome>,
}

/// 输出文件命名器：源路径 + 0基声道索引 → 输出路径
pub type OutputNamer = Box<dyn Fn(&Path, usize) -> PathBuf + Send + Sync>;

/// 单文件提取任务
pub struct ExtractionJob {
    source_path: PathBuf,
    selection: SelectionSpec,
    namer: OutputNamer,
}

impl ExtractionJob {
    pub fn new(source_path: PathBuf, selection: SelectionSpec, namer: OutputNamer) -> Self {
        Self {
            source_path,
            selection,
            namer,
        }
    }

    /// 源文件路径
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// 运行任务直至完成、失败或取消
    ///
    /// 不变式：任何输出文件的创建都发生在头部验证和声道选择
    /// 验证之后——无效输入不会在磁盘上留下输出文件。
    pub fn run(&self, config: &PipelineConfig, cancel: &AtomicBool) -> AudioResult<JobReport> {
        // Created → HeaderValidated
        let source = File::open(&self.source_path)?;
        let mut source = BufReader::new(source);
        let decoded = header::decode(&mut source)?;
        let selection = self.selection.resolve(decoded.descriptor.channels)?;

        let out_encoding = config.output_encoding.resolve(decoded.descriptor.encoding);
        let mono_desc = decoded.descriptor.mono(out_encoding);

        // HeaderValidated → Streaming：此后才允许创建输出文件
        let mut reader = FrameReader::new(source, &decoded)?;
        let mut writers: Vec<(usize, PathBuf, FrameWriter<BufWriter<File>>)> =
            Vec::with_capacity(selection.len());
        for &channel in selection.indices() {
            let path = (self.namer)(&self.source_path, channel);
            let file = match File::create(&path) {
                Ok(f) => f,
                Err(e) => {
                    self.discard_outputs(&mut writers, config);
                    return Err(AudioError::Io(e));
                }
            };
            match FrameWriter::open(BufWriter::new(file), mono_desc) {
                Ok(w) => writers.push((channel, path, w)),
                Err(e) => {
                    self.discard_outputs(&mut writers, config);
                    return Err(e);
                }
            }
        }

        // Streaming：单遍读取，分发到全部写入器
        if let Err(e) = pump(&mut reader, &mut writers, config.chunk_frames, cancel) {
            self.discard_outputs(&mut writers, config);
            return Err(e);
        }

        // Finalizing → Completed
        let outcomes = finalize_outputs(writers, config.delete_on_failure)?;

        Ok(JobReport {
            source_path: self.source_path.clone(),
            channel_count: decoded.descriptor.channels,
            sample_rate: decoded.descriptor.sample_rate,
            frame_count: decoded.descriptor.frame_count,
            outcomes,
        })
    }

    /// 按失败策略处置未完成的输出
    fn discard_outputs(
        &self,
        writers: &mut Vec<(usize, PathBuf, FrameWriter<BufWriter<File>>)>,
        config: &PipelineConfig,
    ) {
        for (_, path, writer) in writers.drain(..) {
            if config.delete_on_failure {
                writer.abort();
                let _ = fs::remove_file(&path);
            } else {
                // 保留半成品：尽力修补已写帧数的头部
                let _ = writer.finalize();
            }
        }
    }
}

/// 逐个收尾写入器；任一失败即对全部输出应用失败策略
///
/// 删除策略下，已完成、失败和尚未收尾的输出文件一并删除，
/// 未收尾的写入器先`abort()`跳过头部修补；保留策略下其余
/// 写入器照常收尾，半成品头部保持有效。
fn finalize_outputs<W>(
    writers: Vec<(usize, PathBuf, FrameWriter<W>)>,
    delete_on_failure: bool,
) -> AudioResult<Vec<ChannelOutcome>>
where
    W: Write + Seek,
{
    let mut outcomes = Vec::with_capacity(writers.len());
    let mut pending = writers.into_iter();
    while let Some((channel, path, writer)) = pending.next() {
        match writer.finalize() {
            Ok(frames) => outcomes.push(ChannelOutcome {
                channel_index: channel,
                output_path: path,
                frames_written: frames,
            }),
            Err(e) => {
                if delete_on_failure {
                    let _ = fs::remove_file(&path);
                    for done in &outcomes {
                        let _ = fs::remove_file(&done.output_path);
                    }
                    for (_, rest_path, rest_writer) in pending {
                        rest_writer.abort();
                        let _ = fs::remove_file(&rest_path);
                    }
                } else {
                    for (_, _, rest_writer) in pending {
                        let _ = rest_writer.finalize();
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(outcomes)
}

/// 单遍分发循环：每块读一次源，写到全部选定声道
///
/// 对源字节的读取次数与写入器数量无关。读取器和写入器抽象在
/// `Read + Seek`/`Write + Seek`之上，测试可用计数游标验证
/// 单遍性质。
pub(crate) fn pump<R, W>(
    reader: &mut FrameReader<R>,
    writers: &mut [(usize, PathBuf, FrameWriter<W>)],
    chunk_frames: usize,
    cancel: &AtomicBool,
) -> AudioResult<()>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let selector = ChannelSelector::new();
    let mut mono = MonoChunk::default();

    while let Some(chunk) = reader.read_chunk(chunk_frames)? {
        if cancel.load(Ordering::Relaxed) {
            return Err(AudioError::Cancelled);
        }
        for (channel, _, writer) in writers.iter_mut() {
            selector.extract_into(&chunk, *channel, &mut mono)?;
            writer.write_chunk(&mono)?;
        }
    }

    if cancel.load(Ordering::Relaxed) {
        return Err(AudioError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::format::AudioStreamDescriptor;
    use std::io::{self, Cursor, SeekFrom};

    /// 统计read调用读取字节数的游标包装（验证单遍性质）
    struct CountingCursor {
        inner: Cursor<Vec<u8>>,
        bytes_read: u64,
    }

    impl Read for CountingCursor {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.bytes_read += n as u64;
            Ok(n)
        }
    }

    impl Seek for CountingCursor {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    /// seek即报错的汇：触发`finalize()`的头部修补失败
    struct BrokenSeekSink {
        inner: Cursor<Vec<u8>>,
        fail_seek: bool,
    }

    impl Write for BrokenSeekSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for BrokenSeekSink {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if self.fail_seek {
                return Err(io::Error::other("模拟seek失败"));
            }
            self.inner.seek(pos)
        }
    }

    fn finalize_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wavsplit_finalize_{tag}_{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// 第`fail_index`个写入器在收尾时失败，输出路径为真实磁盘文件
    fn broken_writers(
        dir: &Path,
        count: usize,
        fail_index: usize,
    ) -> Vec<(usize, PathBuf, FrameWriter<BrokenSeekSink>)> {
        let desc = AudioStreamDescriptor::new(8000, SampleEncoding::Int16, 1, 0);
        (0..count)
            .map(|i| {
                let path = dir.join(format!("out_{i}.wav"));
                fs::write(&path, b"partial").unwrap();
                let sink = BrokenSeekSink {
                    inner: Cursor::new(Vec::new()),
                    fail_seek: i == fail_index,
                };
                (i, path, FrameWriter::open(sink, desc).unwrap())
            })
            .collect()
    }

    fn build_interleaved_i16(channels: u16, frames: usize) -> Vec<u8> {
        let desc = AudioStreamDescriptor::new(8000, SampleEncoding::Int16, channels, 0);
        let mut data = Vec::new();
        for frame in 0..frames {
            for channel in 0..channels {
                let v = (frame as i16) * 10 + channel as i16;
                data.extend_from_slice(&v.to_le_bytes());
            }
        }
        let mut bytes = header::encode(&desc, data.len() as u32).to_vec();
        bytes.extend_from_slice(&data);
        bytes
    }

    fn writers_for(
        count: usize,
        encoding: SampleEncoding,
    ) -> Vec<(usize, PathBuf, FrameWriter<Cursor<Vec<u8>>>)> {
        let desc = AudioStreamDescriptor::new(8000, encoding, 1, 0);
        (0..count)
            .map(|i| {
                (
                    i,
                    PathBuf::from(format!("out_{i}.wav")),
                    FrameWriter::open(Cursor::new(Vec::new()), desc).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_pump_single_pass_over_source() {
        // 3声道 × 100帧，提取全部3个声道：源字节只读一遍
        let bytes = build_interleaved_i16(3, 100);
        let payload_len = (bytes.len() - header::CANONICAL_HEADER_LEN) as u64;

        let mut cursor = CountingCursor {
            inner: Cursor::new(bytes),
            bytes_read: 0,
        };
        let decoded = header::decode(&mut cursor).unwrap();
        let header_reads = cursor.bytes_read;

        let mut reader = FrameReader::new(cursor, &decoded).unwrap();
        let mut writers = writers_for(3, SampleEncoding::Int16);
        let cancel = AtomicBool::new(false);

        pump(&mut reader, &mut writers, 16, &cancel).unwrap();

        let total = reader.into_inner().bytes_read;
        assert_eq!(total - header_reads, payload_len);
        for (_, _, writer) in &writers {
            assert_eq!(writer.frames_written(), 100);
        }
    }

    #[test]
    fn test_pump_routes_correct_channels() {
        let bytes = build_interleaved_i16(2, 4);
        let mut cursor = Cursor::new(bytes);
        let decoded = header::decode(&mut cursor).unwrap();
        let mut reader = FrameReader::new(cursor, &decoded).unwrap();

        // 只提取声道1
        let desc = AudioStreamDescriptor::new(8000, SampleEncoding::Int16, 1, 0);
        let mut sink = Cursor::new(Vec::new());
        let mut writers = vec![(
            1usize,
            PathBuf::from("right.wav"),
            FrameWriter::open(&mut sink, desc).unwrap(),
        )];
        let cancel = AtomicBool::new(false);
        pump(&mut reader, &mut writers, 2, &cancel).unwrap();

        let (_, _, writer) = writers.pop().unwrap();
        assert_eq!(writer.finalize().unwrap(), 4);
        drop(writers);

        // 声道1的样本值为 frame*10 + 1
        let bytes = sink.into_inner();
        let payload = &bytes[header::CANONICAL_HEADER_LEN..];
        for frame in 0..4usize {
            let got = i16::from_le_bytes([payload[frame * 2], payload[frame * 2 + 1]]);
            assert_eq!(got, (frame as i16) * 10 + 1);
        }
    }

    #[test]
    fn test_pump_cancellation_between_chunks() {
        let bytes = build_interleaved_i16(1, 64);
        let mut cursor = Cursor::new(bytes);
        let decoded = header::decode(&mut cursor).unwrap();
        let mut reader = FrameReader::new(cursor, &decoded).unwrap();
        let mut writers = writers_for(1, SampleEncoding::Int16);

        let cancel = AtomicBool::new(true);
        assert!(matches!(
            pump(&mut reader, &mut writers, 8, &cancel),
            Err(AudioError::Cancelled)
        ));
        // 第一块读出后才检查取消，尚未写入任何帧
        assert_eq!(writers[0].2.frames_written(), 0);
    }

    #[test]
    fn test_pump_zero_frame_source() {
        let bytes = build_interleaved_i16(2, 0);
        let mut cursor = Cursor::new(bytes);
        let decoded = header::decode(&mut cursor).unwrap();
        let mut reader = FrameReader::new(cursor, &decoded).unwrap();
        let mut writers = writers_for(2, SampleEncoding::Int16);
        let cancel = AtomicBool::new(false);

        pump(&mut reader, &mut writers, 16, &cancel).unwrap();
        assert_eq!(writers[0].2.frames_written(), 0);
    }

    #[test]
    fn test_finalize_failure_deletes_all_outputs() {
        // 中间一个写入器收尾失败：删除策略必须清掉已完成、
        // 失败和尚未收尾的全部输出文件
        let dir = finalize_temp_dir("delete");
        let writers = broken_writers(&dir, 3, 1);

        let err = finalize_outputs(writers, true).unwrap_err();
        assert!(matches!(err, AudioError::Io(_)));
        for i in 0..3 {
            assert!(
                !dir.join(format!("out_{i}.wav")).exists(),
                "删除策略下不得残留输出文件 out_{i}.wav"
            );
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_finalize_failure_keep_partial_retains_outputs() {
        let dir = finalize_temp_dir("keep");
        let writers = broken_writers(&dir, 3, 1);

        assert!(finalize_outputs(writers, false).is_err());
        for i in 0..3 {
            assert!(dir.join(format!("out_{i}.wav")).exists());
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_output_encoding_resolution() {
        assert_eq!(
            OutputEncoding::MatchSource.resolve(SampleEncoding::Int24),
            SampleEncoding::Int24
        );
        assert_eq!(
            OutputEncoding::Float32.resolve(SampleEncoding::Int16),
            SampleEncoding::Float32
        );
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_frames, DEFAULT_CHUNK_FRAMES);
        assert!(config.delete_on_failure);
        assert_eq!(config.output_encoding, OutputEncoding::MatchSource);
    }
}
