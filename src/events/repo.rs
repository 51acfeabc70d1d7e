use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::error::EventError;
use super::repo_types::{Event, EventDraft, EventListing, EventParticipant, ParticipantView};
use super::rules::{self, Participation};
use super::store::EventStore;

macro_rules! event_columns {
    () => {
        "id, organizer_id, title, description, sport_type, location_lat, location_lng, \
         location_name, location_address, event_time, end_time, min_players, max_players, \
         skill_level, notes, is_cancelled, cancellation_reason, created_at, updated_at"
    };
}

macro_rules! listing_columns {
    () => {
        concat!(
            event_columns!(),
            ", (SELECT p.full_name FROM profiles p WHERE p.id = events.organizer_id) AS organizer_name"
        )
    };
}

macro_rules! participant_columns {
    () => {
        "id, event_id, user_id, joined_at, left_at, is_organizer"
    };
}

/// Postgres-backed event store.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn participation_in(
    conn: &mut PgConnection,
    event_id: Uuid,
    viewer: Uuid,
) -> Result<Participation, EventError> {
    let (active_count, viewer_joined): (i64, bool) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), false)
          FROM event_participants
         WHERE event_id = $1 AND left_at IS NULL
        "#,
    )
    .bind(event_id)
    .bind(viewer)
    .fetch_one(conn)
    .await?;
    Ok(Participation {
        active_count,
        viewer_joined,
    })
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(&self, organizer_id: Uuid, draft: &EventDraft) -> Result<Event, EventError> {
        let event = sqlx::query_as::<_, Event>(concat!(
            r#"
            INSERT INTO events (organizer_id, title, description, sport_type, location_lat, location_lng,
                                location_name, location_address, event_time, end_time, min_players,
                                max_players, skill_level, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING "#,
            event_columns!()
        ))
        .bind(organizer_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.sport_type)
        .bind(draft.location_lat)
        .bind(draft.location_lng)
        .bind(&draft.location_name)
        .bind(&draft.location_address)
        .bind(draft.event_time)
        .bind(draft.end_time)
        .bind(draft.min_players)
        .bind(draft.max_players)
        .bind(draft.skill_level)
        .bind(&draft.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<EventListing>, EventError> {
        let listing = sqlx::query_as::<_, EventListing>(concat!(
            "SELECT ",
            listing_columns!(),
            " FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> Result<Event, EventError> {
        let mut tx = self.pool.begin().await?;

        // Same lock as `join`, so a concurrent join cannot slip in between
        // the count and the new capacity.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(EventError::NotFound(id))?;

        let (active_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participants WHERE event_id = $1 AND left_at IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        rules::check_capacity_floor(draft.max_players, active_count)?;

        let event = sqlx::query_as::<_, Event>(concat!(
            r#"
            UPDATE events
               SET title = $2,
                   description = $3,
                   sport_type = $4,
                   location_lat = $5,
                   location_lng = $6,
                   location_name = $7,
                   location_address = $8,
                   event_time = $9,
                   end_time = $10,
                   min_players = $11,
                   max_players = $12,
                   skill_level = $13,
                   notes = $14,
                   updated_at = NOW()
             WHERE id = $1
            RETURNING "#,
            event_columns!()
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.sport_type)
        .bind(draft.location_lat)
        .bind(draft.location_lng)
        .bind(&draft.location_name)
        .bind(&draft.location_address)
        .bind(draft.event_time)
        .bind(draft.end_time)
        .bind(draft.min_players)
        .bind(draft.max_players)
        .bind(draft.skill_level)
        .bind(&draft.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(event_id = %id, active = active_count, max = ?draft.max_players, "event row updated");
        Ok(event)
    }

    async fn cancel_event(&self, id: Uuid, reason: Option<String>) -> Result<Event, EventError> {
        let event = sqlx::query_as::<_, Event>(concat!(
            r#"
            UPDATE events
               SET is_cancelled = true,
                   cancellation_reason = $2,
                   updated_at = NOW()
             WHERE id = $1 AND is_cancelled = false
            RETURNING "#,
            event_columns!()
        ))
        .bind(id)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;
        event.ok_or(EventError::Cancelled)
    }

    async fn list_upcoming(&self, now: OffsetDateTime) -> Result<Vec<EventListing>, EventError> {
        let rows = sqlx::query_as::<_, EventListing>(concat!(
            "SELECT ",
            listing_columns!(),
            r#"
              FROM events
             WHERE is_cancelled = false AND event_time >= $1
             ORDER BY event_time ASC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_organized(&self, organizer_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError> {
        let rows = sqlx::query_as::<_, Event>(concat!(
            "SELECT ",
            event_columns!(),
            r#"
              FROM events
             WHERE organizer_id = $1 AND event_time >= $2
             ORDER BY event_time ASC
            "#
        ))
        .bind(organizer_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_joined(&self, user_id: Uuid, now: OffsetDateTime) -> Result<Vec<Event>, EventError> {
        let rows = sqlx::query_as::<_, Event>(concat!(
            "SELECT ",
            event_columns!(),
            r#"
              FROM events
             WHERE id IN (SELECT event_id FROM event_participants
                           WHERE user_id = $1 AND left_at IS NULL)
               AND event_time >= $2
             ORDER BY event_time ASC
            "#
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn participation(
        &self,
        event_ids: &[Uuid],
        viewer: Uuid,
    ) -> Result<HashMap<Uuid, Participation>, EventError> {
        let rows: Vec<(Uuid, i64, bool)> = sqlx::query_as(
            r#"
            SELECT event_id, COUNT(*), COALESCE(BOOL_OR(user_id = $2), false)
              FROM event_participants
             WHERE event_id = ANY($1) AND left_at IS NULL
             GROUP BY event_id
            "#,
        )
        .bind(event_ids)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        let mut out: HashMap<Uuid, Participation> =
            event_ids.iter().map(|id| (*id, Participation::default())).collect();
        for (event_id, active_count, viewer_joined) in rows {
            out.insert(
                event_id,
                Participation {
                    active_count,
                    viewer_joined,
                },
            );
        }
        Ok(out)
    }

    async fn active_participants(&self, event_id: Uuid) -> Result<Vec<ParticipantView>, EventError> {
        let rows = sqlx::query_as::<_, ParticipantView>(
            r#"
            SELECT ep.id, ep.event_id, ep.user_id, ep.joined_at, ep.left_at, ep.is_organizer,
                   p.full_name, p.username
              FROM event_participants ep
              LEFT JOIN profiles p ON p.id = ep.user_id
             WHERE ep.event_id = $1 AND ep.left_at IS NULL
             ORDER BY ep.joined_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn join(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes joins per event so the count below stays valid
        // until commit.
        let event = sqlx::query_as::<_, Event>(concat!(
            "SELECT ",
            event_columns!(),
            " FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EventError::NotFound(event_id))?;

        let participation = participation_in(&mut tx, event_id, user_id).await?;
        rules::check_join(&event, &participation, user_id)?;

        let row = sqlx::query_as::<_, EventParticipant>(concat!(
            r#"
            INSERT INTO event_participants (event_id, user_id, joined_at, is_organizer)
            VALUES ($1, $2, $3, false)
            RETURNING "#,
            participant_columns!()
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(%event_id, %user_id, active = participation.active_count + 1, "participant row inserted");
        Ok(row)
    }

    async fn leave(&self, event_id: Uuid, user_id: Uuid, now: OffsetDateTime) -> Result<EventParticipant, EventError> {
        let row = sqlx::query_as::<_, EventParticipant>(concat!(
            r#"
            UPDATE event_participants
               SET left_at = $3
             WHERE event_id = $1 AND user_id = $2 AND left_at IS NULL
            RETURNING "#,
            participant_columns!()
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(EventError::NotParticipant)
    }
}
