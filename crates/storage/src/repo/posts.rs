use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use domain::{
    ports::{PostStore, StoreError},
    CriteriaSet, ListMode, Page, Post, PostId,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use tracing::debug;

use super::Conditions;
use crate::models::{SqlPost, POST_SELECT};
use crate::{persistence, Db};

impl Db {
    async fn load_tags(&self, post_id: PostId) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar::<_, String>(
            "SELECT tag FROM post_tags WHERE post_id = ? ORDER BY position ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)
    }

    async fn hydrate(&self, row: SqlPost) -> Result<Post, StoreError> {
        let tags = self.load_tags(row.id).await?;
        row.into_post(tags)
    }
}

async fn replace_tags(
    conn: &mut SqliteConnection,
    post_id: PostId,
    tags: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    for (position, tag) in tags.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag, position) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(tag)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Public listings only show enabled posts unless the caller filters on
/// `enabled` explicitly.
fn push_post_filters(qb: &mut QueryBuilder<'_, Sqlite>, criteria: &CriteriaSet) {
    let mut conditions = Conditions::new();
    let filters = &criteria.filters;

    let enabled = match (filters.enabled, criteria.mode) {
        (Some(enabled), _) => Some(enabled),
        (None, ListMode::Public) => Some(true),
        (None, ListMode::Admin) => None,
    };
    if let Some(enabled) = enabled {
        conditions.next(qb).push("p.enabled = ").push_bind(enabled);
    }

    if let Some(tag) = &filters.tag {
        conditions
            .next(qb)
            .push("EXISTS (SELECT 1 FROM post_tags t WHERE t.post_id = p.id AND t.tag = ")
            .push_bind(tag.clone())
            .push(")");
    }

    if let Some(author) = &filters.author {
        conditions
            .next(qb)
            .push("p.author = ")
            .push_bind(author.clone());
    }

    if let Some(date) = &filters.date {
        conditions
            .next(qb)
            .push("p.publication_date_start ")
            .push(date.op.as_sql())
            .push(" ")
            .push_bind(date.value);
    }
}

#[async_trait]
impl PostStore for Db {
    async fn find(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id);

        let row = qb
            .build_query_as::<SqlPost>()
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, post: Post) -> Result<Post, StoreError> {
        let now = Utc::now().naive_utc().trunc_subsecs(0);
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let id = match post.id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE posts SET
                        title = ?, slug = ?, abstract = ?, raw_content = ?, content = ?,
                        content_formatter = ?, author = ?, enabled = ?,
                        publication_date_start = ?, comments_enabled = ?,
                        comments_close_at = ?, comments_default_status = ?,
                        updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&post.title)
                .bind(&post.slug)
                .bind(&post.summary)
                .bind(&post.raw_content)
                .bind(&post.content)
                .bind(&post.content_formatter)
                .bind(&post.author)
                .bind(post.enabled)
                .bind(post.publication_date_start)
                .bind(post.comments_enabled)
                .bind(post.comments_close_at)
                .bind(post.comments_default_status.code())
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::NotFound);
                }
                id
            }
            None => {
                // a post without an explicit start is published from its first save
                let publication_date_start = post.publication_date_start.unwrap_or(now);
                sqlx::query(
                    r#"
                    INSERT INTO posts (
                        title, slug, abstract, raw_content, content, content_formatter,
                        author, enabled, publication_date_start, comments_enabled,
                        comments_close_at, comments_default_status, comments_count,
                        created_at, updated_at
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
                    "#,
                )
                .bind(&post.title)
                .bind(&post.slug)
                .bind(&post.summary)
                .bind(&post.raw_content)
                .bind(&post.content)
                .bind(&post.content_formatter)
                .bind(&post.author)
                .bind(post.enabled)
                .bind(publication_date_start)
                .bind(post.comments_enabled)
                .bind(post.comments_close_at)
                .bind(post.comments_default_status.code())
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?
                .last_insert_rowid()
            }
        };

        replace_tags(&mut *tx, id, &post.tags)
            .await
            .map_err(persistence)?;
        tx.commit().await.map_err(persistence)?;
        debug!(post_id = id, "post saved");

        self.find(id).await?.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, post: &Post) -> Result<(), StoreError> {
        let id = post.id.ok_or(StoreError::NotFound)?;
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        debug!(post_id = id, "post deleted");
        Ok(())
    }

    async fn paginate(&self, criteria: &CriteriaSet) -> Result<Page<Post>, StoreError> {
        let pagination = criteria.pagination();

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        push_post_filters(&mut count_qb, criteria);
        let total: i64 = count_qb
            .build()
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get(0))
            .map_err(persistence)?;

        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        push_post_filters(&mut qb, criteria);
        qb.push(" ORDER BY p.publication_date_start DESC, p.id DESC LIMIT ")
            .push_bind(i64::from(pagination.count))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<SqlPost>()
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(self.hydrate(row).await?);
        }

        Ok(Page::new(
            posts,
            pagination.page,
            pagination.count,
            total.max(0) as u64,
        ))
    }
}
