use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Guest, GuestId, Result, Rsvp, SecondaryGuest, StoreError,
    store::{GuestStore, RsvpCommit},
};

const GUEST_COLUMNS: &str =
    "guest_id, first_name, last_name, guest_type, avail_guests, rsvp, selection, updated_at";

const SECONDARY_GUEST_COLUMNS: &str =
    "guest_id, primary_guest_id, first_name, last_name, rsvp, selection, created_at";

/// PostgreSQL-backed guest store implementation.
#[derive(Clone)]
pub struct PostgresGuestStore {
    pool: PgPool,
}

impl PostgresGuestStore {
    /// Creates a new PostgreSQL guest store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn parse_rsvp(row: &PgRow) -> Result<Rsvp> {
        row.try_get::<String, _>("rsvp")?.parse()
    }

    fn row_to_guest(row: PgRow) -> Result<Guest> {
        Ok(Guest {
            guest_id: GuestId::from_uuid(row.try_get::<Uuid, _>("guest_id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            guest_type: row.try_get("guest_type")?,
            avail_guests: row.try_get("avail_guests")?,
            rsvp: Self::parse_rsvp(&row)?,
            selection: row.try_get("selection")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_secondary_guest(row: PgRow) -> Result<SecondaryGuest> {
        Ok(SecondaryGuest {
            guest_id: GuestId::from_uuid(row.try_get::<Uuid, _>("guest_id")?),
            primary_guest_id: GuestId::from_uuid(row.try_get::<Uuid, _>("primary_guest_id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            rsvp: Self::parse_rsvp(&row)?,
            selection: row.try_get("selection")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl GuestStore for PostgresGuestStore {
    async fn insert_guest(&self, guest: &Guest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO guests (guest_id, first_name, last_name, guest_type, avail_guests, rsvp, selection, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(guest.guest_id.as_uuid())
        .bind(&guest.first_name)
        .bind(&guest.last_name)
        .bind(&guest.guest_type)
        .bind(guest.avail_guests)
        .bind(guest.rsvp.as_str())
        .bind(guest.selection)
        .bind(guest.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_guest_name")
            {
                return StoreError::DuplicateGuest {
                    first_name: guest.first_name.clone(),
                    last_name: guest.last_name.clone(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn find_guest_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Guest>> {
        let sql = format!("SELECT {GUEST_COLUMNS} FROM guests WHERE first_name = $1 AND last_name = $2");
        let row = sqlx::query(&sql)
            .bind(first_name)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_guest).transpose()
    }

    async fn get_guest(&self, guest_id: GuestId) -> Result<Option<Guest>> {
        let sql = format!("SELECT {GUEST_COLUMNS} FROM guests WHERE guest_id = $1");
        let row = sqlx::query(&sql)
            .bind(guest_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_guest).transpose()
    }

    async fn set_rsvp(
        &self,
        guest_id: GuestId,
        rsvp: Rsvp,
        selection: i16,
        updated_at: DateTime<Utc>,
    ) -> Result<Guest> {
        let sql = format!(
            r#"
            UPDATE guests
            SET rsvp = $2, selection = $3, updated_at = $4
            WHERE guest_id = $1
            RETURNING {GUEST_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(guest_id.as_uuid())
            .bind(rsvp.as_str())
            .bind(selection)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::GuestNotFound(guest_id))?;

        Self::row_to_guest(row)
    }

    async fn commit_rsvp(&self, commit: RsvpCommit) -> Result<Guest> {
        commit.validate()?;
        let seats = commit.seats();
        let RsvpCommit { guest, party } = commit;

        let mut tx = self.pool.begin().await?;

        // The pending and capacity checks and the write are one statement,
        // so two concurrent commits cannot both see PENDING.
        let sql = format!(
            r#"
            UPDATE guests
            SET avail_guests = avail_guests - $2, rsvp = $3, selection = $4, updated_at = $5
            WHERE guest_id = $1 AND rsvp = $6 AND avail_guests >= $2
            RETURNING {GUEST_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(guest.guest_id.as_uuid())
            .bind(seats)
            .bind(guest.rsvp.as_str())
            .bind(guest.selection)
            .bind(guest.updated_at)
            .bind(Rsvp::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE guest_id = $1)")
                    .bind(guest.guest_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                StoreError::ConcurrencyConflict {
                    guest_id: guest.guest_id,
                }
            } else {
                StoreError::GuestNotFound(guest.guest_id)
            });
        };
        let updated = Self::row_to_guest(row)?;

        if !party.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO secondary_guests ({SECONDARY_GUEST_COLUMNS}) "
            ));
            builder.push_values(&party, |mut b, member| {
                b.push_bind(member.guest_id.as_uuid())
                    .push_bind(member.primary_guest_id.as_uuid())
                    .push_bind(&member.first_name)
                    .push_bind(&member.last_name)
                    .push_bind(member.rsvp.as_str())
                    .push_bind(member.selection)
                    .push_bind(member.created_at);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::debug!(guest_id = %updated.guest_id, party_size = party.len(), "rsvp committed");
        Ok(updated)
    }

    async fn secondary_guests_for(
        &self,
        primary_guest_id: GuestId,
    ) -> Result<Vec<SecondaryGuest>> {
        let sql = format!(
            "SELECT {SECONDARY_GUEST_COLUMNS} FROM secondary_guests WHERE primary_guest_id = $1 ORDER BY seq ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(primary_guest_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_secondary_guest).collect()
    }
}
