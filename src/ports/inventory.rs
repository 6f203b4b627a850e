use crate::domain::value_objects::{BookRef, CopyRef};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 在庫解決の結果
///
/// 書籍が見つからなければ両方 `None`（存在しない書籍のコピーは
/// 参照できない）。書籍があってもコピー番号が未指定・不一致なら
/// `copy` は `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryResolution {
    pub book: Option<BookRef>,
    pub copy: Option<CopyRef>,
}

impl InventoryResolution {
    /// 何も解決できなかった結果
    pub fn unresolved() -> Self {
        Self {
            book: None,
            copy: None,
        }
    }
}

/// 在庫解決ポート
///
/// 予約コンテキストとカタログコンテキストの境界を維持する。
/// 読み取り専用で、在庫状態を決して変更しない。並行呼び出し可。
#[async_trait]
pub trait InventoryResolver: Send + Sync {
    /// 自然キー（タイトル）とコピー番号で書籍・コピーを照合する
    ///
    /// 照合失敗はエラーではなく、参照が空の結果として返る。
    /// エラーは下位のI/O障害のみ。
    async fn resolve(
        &self,
        title: &str,
        copy_number: Option<&str>,
    ) -> Result<InventoryResolution>;
}
