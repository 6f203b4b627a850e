use crate::domain::reservation::{Loan, Reservation};
use crate::domain::value_objects::{
    BookId, BookRef, CopyId, CopyRef, LoanId, MemberId, MemberSnapshot, ReservationId,
    ReservationNumber, ReservationStatus,
};
use crate::ports::pagination::{PagedRequest, PagedResponse, ReservationFilter};
use crate::ports::reservation_repository::{
    ReservationRepository as ReservationRepositoryTrait, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

/// Map a reservations row to the aggregate shell (loans loaded separately).
fn map_reservation_row(row: &PgRow) -> Result<Reservation> {
    let status_str: &str = row.get("status");
    let status = ReservationStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Reservation {
        reservation_id: ReservationId::from_uuid(row.get("reservation_id")),
        number: ReservationNumber::new(row.get::<String, _>("number")),
        member: MemberSnapshot {
            id: MemberId::from_uuid(row.get("member_id")),
            document_id: row.get("member_document_id"),
            name: row.get("member_name"),
        },
        status,
        request_date: row.get("request_date"),
        updated_at: row.get("updated_at"),
        loans: Vec::new(),
    })
}

fn map_loan_row(row: &PgRow) -> Loan {
    Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        title: row.get("title"),
        copy_number: row.get("copy_number"),
        book: row
            .get::<Option<Uuid>, _>("book_id")
            .map(|id| BookRef { book_id: BookId::from_uuid(id) }),
        copy: row
            .get::<Option<Uuid>, _>("copy_id")
            .map(|id| CopyRef { copy_id: CopyId::from_uuid(id) }),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
    }
}

/// PostgreSQL implementation of ReservationRepository
///
/// The aggregate is stored across `reservations` and `reservation_loans`;
/// both are always written inside a single transaction so a partial write
/// (reservation row updated, loan rows stale) cannot be observed.
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new ReservationRepository with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the ordered loan lines for one reservation.
    async fn load_loans(&self, reservation_id: ReservationId) -> Result<Vec<Loan>> {
        let mut rows = sqlx::query(
            r#"
            SELECT loan_id, title, copy_number, book_id, copy_id, due_date, return_date
            FROM reservation_loans
            WHERE reservation_id = $1
            ORDER BY position
            "#,
        )
        .bind(reservation_id.value())
        .fetch(&self.pool);

        let mut loans = Vec::new();
        while let Some(row) = rows.try_next().await? {
            loans.push(map_loan_row(&row));
        }

        Ok(loans)
    }

    async fn hydrate(&self, row: &PgRow) -> Result<Reservation> {
        let mut reservation = map_reservation_row(row)?;
        reservation.loans = self.load_loans(reservation.reservation_id).await?;
        Ok(reservation)
    }
}

#[async_trait]
impl ReservationRepositoryTrait for ReservationRepository {
    async fn find_by_number(&self, number: &ReservationNumber) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT reservation_id, number, member_id, member_document_id, member_name,
                   status, request_date, updated_at
            FROM reservations
            WHERE number = $1
            "#,
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// Save the aggregate atomically.
    ///
    /// Upserts the reservation row, then replaces the loan lines wholesale
    /// (request processing rebuilds them anyway). Batch INSERT uses UNNEST.
    /// Everything happens inside one transaction.
    async fn save(&self, reservation: Reservation) -> Result<Reservation> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reservations (
                reservation_id, number, member_id, member_document_id, member_name,
                status, request_date, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (reservation_id)
            DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(reservation.reservation_id.value())
        .bind(reservation.number.as_str())
        .bind(reservation.member.id.value())
        .bind(&reservation.member.document_id)
        .bind(&reservation.member.name)
        .bind(reservation.status.as_str())
        .bind(reservation.request_date)
        .bind(reservation.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM reservation_loans WHERE reservation_id = $1")
            .bind(reservation.reservation_id.value())
            .execute(&mut *tx)
            .await?;

        if !reservation.loans.is_empty() {
            let mut loan_ids = Vec::with_capacity(reservation.loans.len());
            let mut positions = Vec::with_capacity(reservation.loans.len());
            let mut titles = Vec::with_capacity(reservation.loans.len());
            let mut copy_numbers = Vec::with_capacity(reservation.loans.len());
            let mut book_ids = Vec::with_capacity(reservation.loans.len());
            let mut copy_ids = Vec::with_capacity(reservation.loans.len());
            let mut due_dates = Vec::with_capacity(reservation.loans.len());
            let mut return_dates = Vec::with_capacity(reservation.loans.len());

            for (position, loan) in reservation.loans.iter().enumerate() {
                loan_ids.push(loan.loan_id.value());
                positions.push(position as i32);
                titles.push(loan.title.clone());
                copy_numbers.push(loan.copy_number.clone());
                book_ids.push(loan.book.map(|book| book.book_id.value()));
                copy_ids.push(loan.copy.map(|copy| copy.copy_id.value()));
                due_dates.push(loan.due_date);
                return_dates.push(loan.return_date);
            }

            sqlx::query(
                r#"
                INSERT INTO reservation_loans (
                    reservation_id, loan_id, position, title, copy_number,
                    book_id, copy_id, due_date, return_date
                )
                SELECT $1, * FROM UNNEST(
                    $2::uuid[], $3::int[], $4::varchar[], $5::varchar[],
                    $6::uuid[], $7::uuid[], $8::timestamptz[], $9::timestamptz[]
                )
                "#,
            )
            .bind(reservation.reservation_id.value())
            .bind(&loan_ids)
            .bind(&positions)
            .bind(&titles)
            .bind(&copy_numbers)
            .bind(&book_ids)
            .bind(&copy_ids)
            .bind(&due_dates)
            .bind(&return_dates)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(reservation)
    }

    async fn find_due_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT r.reservation_id, r.number, r.member_id, r.member_document_id,
                   r.member_name, r.status, r.request_date, r.updated_at
            FROM reservations r
            JOIN reservation_loans l ON l.reservation_id = r.reservation_id
            WHERE l.return_date IS NULL AND l.due_date < $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in &rows {
            reservations.push(self.hydrate(row).await?);
        }

        Ok(reservations)
    }

    async fn find_by_filter(
        &self,
        request: &PagedRequest<ReservationFilter>,
    ) -> Result<PagedResponse<Reservation>> {
        let number = request
            .filter
            .as_ref()
            .and_then(|filter| filter.number.as_deref());

        // Matching and paging are pushed down to the store; NULL filter
        // matches everything.
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservations
            WHERE $1::varchar IS NULL OR number = $1
            "#,
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT reservation_id, number, member_id, member_document_id, member_name,
                   status, request_date, updated_at
            FROM reservations
            WHERE $1::varchar IS NULL OR number = $1
            ORDER BY number
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(number)
        .bind(i64::from(request.size))
        .bind(request.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(self.hydrate(row).await?);
        }

        Ok(PagedResponse::new(
            items,
            total as u64,
            request.page,
            request.size,
        ))
    }
}
