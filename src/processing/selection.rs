//! 声道选择集合
//!
//! 命令行层使用1基声道编号（"1,3"），管线内部统一转换为
//! 0基索引。重复编号静默合并，选择集始终有序去重。

use crate::error::{AudioError, AudioResult};

/// 声道选择规格
///
/// `All`在打开源文件前不展开，提取任务验证头部后按实际
/// 声道数解析为具体索引集。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSpec {
    /// 提取全部声道
    All,
    /// 提取指定的0基声道索引集（有序、去重、非空）
    Indices(ChannelSelection),
}

impl SelectionSpec {
    /// 解析命令行的声道参数
    ///
    /// 接受`all`或逗号分隔的1基编号列表（如`1,3,4`）。
    pub fn parse(arg: &str) -> Result<Self, String> {
        let arg = arg.trim();
        if arg.eq_ignore_ascii_case("all") {
            return Ok(SelectionSpec::All);
        }
        ChannelSelection::parse_one_based(arg).map(SelectionSpec::Indices)
    }

    /// 按源文件的实际声道数解析为具体索引集
    ///
    /// # 错误
    ///
    /// * `AudioError::InvalidChannel` - 任一请求的索引超出范围
    pub fn resolve(&self, channel_count: u16) -> AudioResult<ChannelSelection> {
        match self {
            SelectionSpec::All => Ok(ChannelSelection {
                indices: (0..channel_count as usize).collect(),
            }),
            SelectionSpec::Indices(selection) => {
                selection.validate_against(channel_count)?;
                Ok(selection.clone())
            }
        }
    }
}

/// 具体的声道索引集（0基、有序、去重、非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    indices: Vec<usize>,
}

impl ChannelSelection {
    /// 从0基索引集合构造；排序并去重
    pub fn new(mut indices: Vec<usize>) -> Result<Self, String> {
        if indices.is_empty() {
            return Err("声道选择不能为空 / channel selection must not be empty".to_string());
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(Self { indices })
    }

    /// 解析逗号分隔的1基编号列表（如`1,3`）为0基索引集
    pub fn parse_one_based(arg: &str) -> Result<Self, String> {
        let mut indices = Vec::new();
        for part in arg.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(format!(
                    "声道列表包含空项: '{arg}' / empty entry in channel list: '{arg}'"
                ));
            }
            let number: usize = part.parse().map_err(|_| {
                format!("无效的声道编号: '{part}' / invalid channel number: '{part}'")
            })?;
            if number == 0 {
                return Err(
                    "声道编号从1开始 / channel numbers start at 1".to_string()
                );
            }
            indices.push(number - 1);
        }
        Self::new(indices)
    }

    /// 0基索引集（有序）
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 选择的声道数
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 校验所有索引均在声道范围内
    pub fn validate_against(&self, channel_count: u16) -> AudioResult<()> {
        for &idx in &self.indices {
            if idx >= channel_count as usize {
                return Err(AudioError::InvalidChannel {
                    requested: idx,
                    channel_count,
                });
            }
        }
        Ok(())
    }
}
