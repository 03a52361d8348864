//! Resolve Commands - 音频解析命令

/// 解析远程音频为本地归一化文件
#[derive(Debug, Clone)]
pub struct ResolveAudioCommand {
    pub source_url: String,
}
