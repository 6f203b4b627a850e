use thiserror::Error;

/// 予約アプリケーション層のエラー
///
/// 純粋な状態遷移ロジックは決して失敗しない。失敗はすべて
/// ライフサイクルエンジンのI/O境界で発生する。
#[derive(Debug, Error)]
pub enum ReservationServiceError {
    /// 不正な受信メッセージ（必須の識別子の欠落など）
    ///
    /// エンジン自身は再試行せず、トランスポートの再配信ポリシーに委ねる。
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// 予約が見つからない
    ///
    /// クエリAPIでのみ表面化する。Return / Expire の未知の番号は
    /// ここに到達せず、警告ログを残して破棄される。
    #[error("Reservation not found")]
    ReservationNotFound,

    /// リポジトリのエラー
    ///
    /// 部分的な状態はコミットされず、イベントも発行されない。
    #[error("Repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 在庫解決のエラー（照合失敗ではなく下位I/Oの障害）
    #[error("Inventory error")]
    InventoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// バス発行のエラー
    #[error("Bus error")]
    BusError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ReservationServiceError>;
