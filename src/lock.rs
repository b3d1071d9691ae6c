//! 锁获取辅助函数。
//!
//! 组件内所有状态只在事件处理上下文中短暂持有锁，且从不跨 `.await` 持有；
//! 锁中毒时记录告警并继续使用恢复出的数据，不让一次 panic 拖垮整个组件。

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{what}锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{what}读锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{what}写锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}
