use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::value_objects::ReservationNumber;

/// 予約番号ごとの直列化ロック
///
/// 同じ番号に対する read-modify-write を直列化し、更新の喪失を防ぐ。
/// 異なる番号のメッセージは独立したワーカーで並行処理できる。
/// ガードを保持している間だけ同番号の後続メッセージが待たされる。
pub struct NumberLocks {
    entries: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NumberLocks {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 指定番号のロックを取得する
    ///
    /// 返されたガードがドロップされるまで、同じ番号の取得は待機する。
    pub async fn acquire(&self, number: &ReservationNumber) -> OwnedMutexGuard<()> {
        let cell = {
            let mut entries = self.entries.lock().await;
            // 保持者も待機者もいないエントリを間引く
            // （ガードと待機者は Arc を共有するため strong_count > 1 になる）
            entries.retain(|_, cell| Arc::strong_count(cell) > 1);
            entries
                .entry(number.as_str().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        cell.lock_owned().await
    }

    /// テスト用に追跡中のエントリ数を取得する
    pub async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for NumberLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_can_be_reacquired_after_release() {
        let locks = NumberLocks::new();
        let number = ReservationNumber::new("RSV-0001");

        let guard = locks.acquire(&number).await;
        drop(guard);

        // 解放後は待たずに取得できる
        let _guard = locks.acquire(&number).await;
    }

    #[tokio::test]
    async fn test_distinct_numbers_do_not_block_each_other() {
        let locks = NumberLocks::new();

        let _first = locks.acquire(&ReservationNumber::new("RSV-0001")).await;
        // 同一タスク内で別番号を取得してもデッドロックしない
        let _second = locks.acquire(&ReservationNumber::new("RSV-0002")).await;
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = NumberLocks::new();

        for i in 0..100 {
            let guard = locks
                .acquire(&ReservationNumber::new(format!("RSV-{i:04}")))
                .await;
            drop(guard);
        }

        // 番号の数に比例して増え続けず、解放済みのエントリは回収される
        let _guard = locks.acquire(&ReservationNumber::new("RSV-9999")).await;
        assert_eq!(locks.tracked().await, 1);
    }

    #[tokio::test]
    async fn test_held_entry_survives_pruning() {
        let locks = NumberLocks::new();

        let _held = locks.acquire(&ReservationNumber::new("RSV-0001")).await;
        let _other = locks.acquire(&ReservationNumber::new("RSV-0002")).await;

        // 保持中のエントリは間引かれない
        assert_eq!(locks.tracked().await, 2);
    }

    #[tokio::test]
    async fn test_same_number_is_serialized() {
        let locks = Arc::new(NumberLocks::new());
        let number = ReservationNumber::new("RSV-0001");

        let guard = locks.acquire(&number).await;

        let contender = {
            let locks = Arc::clone(&locks);
            let number = number.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&number).await;
            })
        };

        // 保持中は取得できない
        let blocked = tokio::time::timeout(Duration::from_millis(50), contender).await;
        assert!(blocked.is_err());

        drop(guard);
    }
}
