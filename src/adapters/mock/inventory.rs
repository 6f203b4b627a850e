use crate::domain::value_objects::{BookId, BookRef, CopyId, CopyRef};
use crate::ports::inventory::{InventoryResolution, InventoryResolver as InventoryResolverTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// InventoryResolverのインメモリ実装
///
/// タイトルとコピー番号を登録することで状態を持ったテストをサポート。
pub struct InventoryResolver {
    books: Mutex<HashMap<String, BookId>>,
    copies: Mutex<HashMap<(String, String), CopyId>>,
}

impl InventoryResolver {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
            copies: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に書籍を登録する
    pub fn add_book(&self, title: &str) -> BookId {
        let book_id = BookId::new();
        self.books
            .lock()
            .unwrap()
            .insert(title.to_string(), book_id);
        book_id
    }

    /// テスト用に蔵書コピーを登録する
    ///
    /// 対応する書籍が未登録でも登録はできるが、解決時には
    /// 書籍が見つからない限りコピーも返らない。
    pub fn add_copy(&self, title: &str, copy_number: &str) -> CopyId {
        let copy_id = CopyId::new();
        self.copies
            .lock()
            .unwrap()
            .insert((title.to_string(), copy_number.to_string()), copy_id);
        copy_id
    }
}

impl Default for InventoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryResolverTrait for InventoryResolver {
    /// 登録済みの書籍・コピーをタイトルとコピー番号で照合する
    async fn resolve(
        &self,
        title: &str,
        copy_number: Option<&str>,
    ) -> Result<InventoryResolution> {
        let Some(book_id) = self.books.lock().unwrap().get(title).copied() else {
            // 存在しない書籍のコピーは参照できない
            return Ok(InventoryResolution::unresolved());
        };

        let copy = copy_number.and_then(|number| {
            self.copies
                .lock()
                .unwrap()
                .get(&(title.to_string(), number.to_string()))
                .copied()
                .map(|copy_id| CopyRef { copy_id })
        });

        Ok(InventoryResolution {
            book: Some(BookRef { book_id }),
            copy,
        })
    }
}
