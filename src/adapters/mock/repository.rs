use crate::domain::reservation::{Reservation, has_due_loans};
use crate::domain::value_objects::ReservationNumber;
use crate::ports::pagination::{PagedRequest, PagedResponse, ReservationFilter};
use crate::ports::reservation_repository::{
    ReservationRepository as ReservationRepositoryTrait, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// ReservationRepositoryのインメモリ実装
///
/// 予約番号をキーに集約を丸ごと保持する。保存は集約単位の置き換えに
/// なるため、明細だけ取り残される部分書き込みは構造上起きない。
pub struct InMemoryReservationRepository {
    reservations: Mutex<HashMap<String, Reservation>>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self {
            reservations: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に保存件数を取得する
    pub fn len(&self) -> usize {
        self.reservations.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryReservationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepositoryTrait for InMemoryReservationRepository {
    async fn find_by_number(&self, number: &ReservationNumber) -> Result<Option<Reservation>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations.get(number.as_str()).cloned())
    }

    async fn save(&self, reservation: Reservation) -> Result<Reservation> {
        let mut reservations = self.reservations.lock().unwrap();
        reservations.insert(reservation.number.as_str().to_string(), reservation.clone());
        Ok(reservation)
    }

    async fn find_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations
            .values()
            .filter(|reservation| has_due_loans(reservation, cutoff))
            .cloned()
            .collect())
    }

    async fn find_by_filter(
        &self,
        request: &PagedRequest<ReservationFilter>,
    ) -> Result<PagedResponse<Reservation>> {
        let reservations = self.reservations.lock().unwrap();

        let number_filter = request
            .filter
            .as_ref()
            .and_then(|filter| filter.number.as_deref());

        let mut matched: Vec<Reservation> = reservations
            .values()
            .filter(|reservation| match number_filter {
                Some(number) => reservation.number.as_str() == number,
                None => true,
            })
            .cloned()
            .collect();

        // HashMapの列挙順は不定なので、ページングを安定させるために番号順に揃える
        matched.sort_by(|a, b| a.number.as_str().cmp(b.number.as_str()));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .collect();

        Ok(PagedResponse::new(items, total, request.page, request.size))
    }
}
