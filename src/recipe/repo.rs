use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

/// The two flat, name-only record types attached to recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Tag,
    Ingredient,
}

impl ItemKind {
    pub fn table(self) -> &'static str {
        match self {
            ItemKind::Tag => "tags",
            ItemKind::Ingredient => "ingredients",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Tag => f.write_str("tag"),
            ItemKind::Ingredient => f.write_str("ingredient"),
        }
    }
}

/// A tag or ingredient row.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeItem {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    fn kind(&self) -> ItemKind;
    /// Items owned by `user_id`, name descending.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RecipeItem>, StoreError>;
    async fn create(&self, user_id: Uuid, name: &str) -> Result<RecipeItem, StoreError>;
}

#[derive(Clone)]
pub struct PgRecipeStore {
    db: PgPool,
    kind: ItemKind,
}

impl PgRecipeStore {
    pub fn new(db: PgPool, kind: ItemKind) -> Self {
        Self { db, kind }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    fn kind(&self) -> ItemKind {
        self.kind
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RecipeItem>, StoreError> {
        let sql = format!(
            r#"
            SELECT id, user_id, name, created_at
            FROM {}
            WHERE user_id = $1
            ORDER BY name DESC, id DESC
            "#,
            self.kind.table()
        );
        let rows = sqlx::query_as::<_, RecipeItem>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn create(&self, user_id: Uuid, name: &str) -> Result<RecipeItem, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, created_at
            "#,
            self.kind.table()
        );
        let row = sqlx::query_as::<_, RecipeItem>(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    pub struct MemoryRecipeStore {
        kind: ItemKind,
        rows: Mutex<Vec<RecipeItem>>,
    }

    impl MemoryRecipeStore {
        pub fn new(kind: ItemKind) -> Self {
            Self {
                kind,
                rows: Mutex::new(Vec::new()),
            }
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RecipeStore for MemoryRecipeStore {
        fn kind(&self) -> ItemKind {
            self.kind
        }

        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RecipeItem>, StoreError> {
            let mut out: Vec<RecipeItem> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            out.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
            Ok(out)
        }

        async fn create(&self, user_id: Uuid, name: &str) -> Result<RecipeItem, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = RecipeItem {
                id: rows.len() as i64 + 1,
                user_id,
                name: name.to_string(),
                created_at: OffsetDateTime::now_utc(),
            };
            rows.push(row.clone());
            Ok(row)
        }
    }
}
