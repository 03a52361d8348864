//! Media Lease - 下载目录中媒体文件的并发协调
//!
//! 解析与删除共用同一把按 stem 划分的锁；
//! 解析结果在交给会话之前持有租约，租约存在时文件不会被删除

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 媒体锁与文件租约
#[derive(Default)]
pub struct MediaLeases {
    /// stem -> 媒体锁
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// path -> 租约计数
    leases: DashMap<PathBuf, usize>,
}

impl MediaLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取 stem 对应的媒体锁
    pub async fn lock(&self, stem: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(stem.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// 释放媒体锁，没有其他等待者时移除
    pub fn unlock(&self, stem: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        self.locks
            .remove_if(stem, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// 为文件登记租约，应在持有媒体锁时调用
    pub fn acquire(self: &Arc<Self>, path: PathBuf) -> MediaLease {
        *self.leases.entry(path.clone()).or_insert(0) += 1;
        MediaLease {
            path,
            leases: Arc::clone(self),
        }
    }

    pub fn is_leased(&self, path: &Path) -> bool {
        self.leases.contains_key(path)
    }

    fn release(&self, path: &Path) {
        if let Some(mut count) = self.leases.get_mut(path) {
            *count -= 1;
        }
        self.leases.remove_if(path, |_, count| *count == 0);
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.len()
    }
}

/// 文件租约，drop 时归还
pub struct MediaLease {
    path: PathBuf,
    leases: Arc<MediaLeases>,
}

impl Clone for MediaLease {
    fn clone(&self) -> Self {
        self.leases.acquire(self.path.clone())
    }
}

impl std::fmt::Debug for MediaLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLease").field("path", &self.path).finish()
    }
}

impl Drop for MediaLease {
    fn drop(&mut self) {
        self.leases.release(&self.path);
    }
}
