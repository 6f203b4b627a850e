use crate::domain::events::{ReservationConfirmed, ReservationDueExpired};
use crate::ports::bus::{MessagePublisher as MessagePublisherTrait, Result};
use async_trait::async_trait;

/// MessagePublisherのログ出力実装
///
/// 実トランスポートが無いローカル構成向けのスタンドイン。イベントを
/// 構造化ログとして出力するだけで、何も蓄積しない（常駐プロセスで
/// メモリが増え続けないように）。テストでの検証には記録を取り出せる
/// `InMemoryBus` を使う。
pub struct LoggingBus;

impl LoggingBus {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisherTrait for LoggingBus {
    async fn publish_confirmed(&self, event: ReservationConfirmed) -> Result<()> {
        tracing::info!(
            number = %event.number,
            reservation_id = %event.reservation_id.value(),
            loans = event.loans.len(),
            "reservation confirmed"
        );
        Ok(())
    }

    async fn publish_due_expired(&self, event: ReservationDueExpired) -> Result<()> {
        tracing::info!(
            number = %event.number,
            reservation_id = %event.reservation_id.value(),
            "reservation due expired"
        );
        Ok(())
    }
}
