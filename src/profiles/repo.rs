use sqlx::PgPool;
use uuid::Uuid;

use crate::events::repo_types::{SkillLevel, SportType};
use crate::profiles::repo_types::{Profile, ProfileChanges, SportPreference};

/// True when the error chain carries a Postgres unique violation (23505).
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|d| d.code())
        .is_some_and(|code| code == "23505")
}

impl Profile {
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, full_name, username, avatar_url, bio,
                   location_lat, location_lng, location_name, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Applies owner edits; absent fields keep their value.
    pub async fn update(db: &PgPool, id: Uuid, changes: &ProfileChanges) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
               SET full_name = COALESCE($2, full_name),
                   username = COALESCE($3, username),
                   bio = COALESCE($4, bio),
                   avatar_url = COALESCE($5, avatar_url),
                   location_name = COALESCE($6, location_name),
                   location_lat = COALESCE($7, location_lat),
                   location_lng = COALESCE($8, location_lng),
                   updated_at = NOW()
             WHERE id = $1
            RETURNING id, email, full_name, username, avatar_url, bio,
                      location_lat, location_lng, location_name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.full_name)
        .bind(&changes.username)
        .bind(&changes.bio)
        .bind(&changes.avatar_url)
        .bind(&changes.location_name)
        .bind(changes.location_lat)
        .bind(changes.location_lng)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }
}

impl SportPreference {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SportPreference>> {
        let rows = sqlx::query_as::<_, SportPreference>(
            r#"
            SELECT id, user_id, sport_type, skill_level, created_at
            FROM sport_preferences
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// One preference per sport; a second upsert replaces the skill level.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        sport_type: SportType,
        skill_level: SkillLevel,
    ) -> anyhow::Result<SportPreference> {
        let row = sqlx::query_as::<_, SportPreference>(
            r#"
            INSERT INTO sport_preferences (user_id, sport_type, skill_level)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, sport_type)
            DO UPDATE SET skill_level = EXCLUDED.skill_level
            RETURNING id, user_id, sport_type, skill_level, created_at
            "#,
        )
        .bind(user_id)
        .bind(sport_type)
        .bind(skill_level)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}
