//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 默认配置值
pub mod defaults {
    /// 默认块大小（帧）
    ///
    /// 每次从源文件读取的最大帧数；内存占用与此成正比，
    /// 与文件大小无关。4096帧在吞吐和占用之间平衡良好
    pub const CHUNK_FRAMES: usize = 4096;

    /// 默认多文件并行并发度
    ///
    /// 用于批量处理多个文件时的并行度，
    /// 4并发度在多数场景下提供良好的性能/资源平衡
    pub const PARALLEL_FILES_DEGREE: usize = 4;
}

/// 并发度限制常量
pub mod parallel_limits {
    /// 最小并发度
    ///
    /// 任何并行处理至少需要1个线程/工作单元
    pub const MIN_PARALLEL_DEGREE: usize = 1;

    /// 最大并发度
    ///
    /// 限制最大并发度为16，避免过度并发导致的：
    /// - 上下文切换开销
    /// - 文件句柄占用过高（每任务最多1+声道数个句柄）
    /// - 系统资源竞争
    pub const MAX_PARALLEL_DEGREE: usize = 16;
}
