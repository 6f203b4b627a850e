use serde::{Deserialize, Serialize};

/// ページ指定付きのクエリリクエスト
///
/// フィルタの照合とページングは永続化側の協力者に委譲される。
/// `page` は1始まり。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PagedRequest<F> {
    pub page: u32,
    pub size: u32,
    pub filter: Option<F>,
}

impl<F> PagedRequest<F> {
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    pub fn new(page: u32, size: u32, filter: Option<F>) -> Self {
        Self {
            page: page.max(1),
            size,
            filter,
        }
    }

    /// フィルタなしの先頭ページ
    pub fn first_page() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE, None)
    }

    pub fn with_filter(filter: F) -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE, Some(filter))
    }

    /// ページングのオフセット（行数）
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

/// ページ指定付きのクエリ応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, request_page: u32, request_size: u32) -> Self {
        Self {
            items,
            total,
            page: request_page,
            size: request_size,
        }
    }
}

/// 予約クエリのフィルタ
///
/// 述語は少なくとも予約番号の完全一致を含む。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationFilter {
    pub number: Option<String>,
}
