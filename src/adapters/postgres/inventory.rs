use crate::domain::value_objects::{BookId, BookRef, CopyId, CopyRef};
use crate::ports::inventory::{
    InventoryResolution, InventoryResolver as InventoryResolverTrait, Result,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of InventoryResolver
///
/// Read-only lookups against the catalog tables. A lookup miss is a normal
/// outcome, not an error; only transport/database failures surface as errors.
pub struct InventoryResolver {
    pool: PgPool,
}

impl InventoryResolver {
    /// Create a new InventoryResolver with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryResolverTrait for InventoryResolver {
    async fn resolve(
        &self,
        title: &str,
        copy_number: Option<&str>,
    ) -> Result<InventoryResolution> {
        let book_id: Option<Uuid> =
            sqlx::query_scalar("SELECT book_id FROM books WHERE title = $1")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;

        // A copy of a nonexistent book can never be referenced.
        let Some(book_id) = book_id else {
            return Ok(InventoryResolution::unresolved());
        };

        let copy = match copy_number {
            Some(number) => sqlx::query_scalar::<_, Uuid>(
                "SELECT copy_id FROM copies WHERE book_id = $1 AND copy_number = $2",
            )
            .bind(book_id)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .map(|copy_id| CopyRef {
                copy_id: CopyId::from_uuid(copy_id),
            }),
            None => None,
        };

        Ok(InventoryResolution {
            book: Some(BookRef {
                book_id: BookId::from_uuid(book_id),
            }),
            copy,
        })
    }
}
