//! 声道提取处理模块
//!
//! 实现块级处理管线：平面样本块、声道提取、单文件任务的
//! 状态机以及多文件批量运行器。

pub mod batch;
pub mod chunk;
pub mod job;
pub mod selection;
pub mod selector;

// 重新导出公共接口
pub use batch::{BatchReport, BatchRunner, FileOutcome, ProgressEvent};
pub use chunk::{Chunk, MonoChunk};
pub use job::{
    ChannelOutcome, DEFAULT_CHUNK_FRAMES, ExtractionJob, JobReport, OutputEncoding, OutputNamer,
    PipelineConfig,
};
pub use selection::{ChannelSelection, SelectionSpec};
pub use selector::ChannelSelector;
