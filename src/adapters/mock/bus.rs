use crate::domain::events::{ReservationConfirmed, ReservationDueExpired};
use crate::ports::bus::{MessagePublisher as MessagePublisherTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// MessagePublisherのインメモリ実装
///
/// 発行されたイベントを順序どおりに記録する。テストは記録を取り出して
/// 検証する。記録は取り出すまで溜まるので、常駐プロセスには使わない
/// （ローカル起動のスタンドインは `LoggingBus`）。
pub struct InMemoryBus {
    confirmed: Mutex<Vec<ReservationConfirmed>>,
    due_expired: Mutex<Vec<ReservationDueExpired>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self {
            confirmed: Mutex::new(Vec::new()),
            due_expired: Mutex::new(Vec::new()),
        }
    }

    /// 記録済みの確定イベントをすべて取り出す（記録はクリアされる）
    pub fn take_confirmed(&self) -> Vec<ReservationConfirmed> {
        std::mem::take(&mut self.confirmed.lock().unwrap())
    }

    /// 記録済みの期限切れ通知をすべて取り出す（記録はクリアされる）
    pub fn take_due_expired(&self) -> Vec<ReservationDueExpired> {
        std::mem::take(&mut self.due_expired.lock().unwrap())
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisherTrait for InMemoryBus {
    async fn publish_confirmed(&self, event: ReservationConfirmed) -> Result<()> {
        tracing::debug!(number = %event.number, "reservation confirmed");
        self.confirmed.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_due_expired(&self, event: ReservationDueExpired) -> Result<()> {
        tracing::debug!(number = %event.number, "reservation due expired");
        self.due_expired.lock().unwrap().push(event);
        Ok(())
    }
}
