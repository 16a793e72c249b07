use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use domain::{
    ports::{CommentStore, StoreError},
    Comment, CommentId, CommentStatus, Page, Pagination, PostId,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use crate::models::{SqlComment, COMMENT_SELECT};
use crate::{persistence, Db};

/// Keeps `posts.comments_count` equal to the number of valid comments.
async fn refresh_comments_count(
    conn: &mut SqliteConnection,
    post_id: PostId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET comments_count = (
            SELECT COUNT(*) FROM comments WHERE post_id = ? AND status = ?
        )
        WHERE id = ?
        "#,
    )
    .bind(post_id)
    .bind(CommentStatus::Valid.code())
    .bind(post_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl CommentStore for Db {
    async fn find(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(COMMENT_SELECT);
        qb.push(" WHERE c.id = ").push_bind(id);

        let row = qb
            .build_query_as::<SqlComment>()
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        row.map(Comment::try_from).transpose()
    }

    async fn save(&self, comment: Comment) -> Result<Comment, StoreError> {
        let status = comment
            .status
            .ok_or_else(|| StoreError::InvalidInput("comment status is required".into()))?;
        let now = Utc::now().naive_utc().trunc_subsecs(0);
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let id = match comment.id {
            Some(id) => {
                let previous_post: Option<PostId> =
                    sqlx::query_scalar("SELECT post_id FROM comments WHERE id = ?")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(persistence)?;
                let previous_post = previous_post.ok_or(StoreError::NotFound)?;

                sqlx::query(
                    r#"
                    UPDATE comments SET
                        post_id = ?, name = ?, email = ?, url = ?, message = ?,
                        status = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(comment.post_id)
                .bind(&comment.name)
                .bind(&comment.email)
                .bind(&comment.url)
                .bind(&comment.message)
                .bind(status.code())
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(persistence)?;

                if previous_post != comment.post_id {
                    refresh_comments_count(&mut *tx, previous_post)
                        .await
                        .map_err(persistence)?;
                }
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO comments (
                    post_id, name, email, url, message, status, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(comment.post_id)
            .bind(&comment.name)
            .bind(&comment.email)
            .bind(&comment.url)
            .bind(&comment.message)
            .bind(status.code())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?
            .last_insert_rowid(),
        };

        refresh_comments_count(&mut *tx, comment.post_id)
            .await
            .map_err(persistence)?;
        tx.commit().await.map_err(persistence)?;
        debug!(comment_id = id, post_id = comment.post_id, "comment saved");

        CommentStore::find(self, id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, comment: &Comment) -> Result<(), StoreError> {
        let id = comment.id.ok_or(StoreError::NotFound)?;
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        refresh_comments_count(&mut *tx, comment.post_id)
            .await
            .map_err(persistence)?;
        tx.commit().await.map_err(persistence)?;
        debug!(comment_id = id, "comment deleted");
        Ok(())
    }

    async fn paginate(
        &self,
        post_id: PostId,
        pagination: Pagination,
    ) -> Result<Page<Comment>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)?;

        let mut qb = QueryBuilder::<Sqlite>::new(COMMENT_SELECT);
        qb.push(" WHERE c.post_id = ")
            .push_bind(post_id)
            .push(" ORDER BY c.created_at DESC, c.id DESC LIMIT ")
            .push_bind(i64::from(pagination.count))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));

        let comments = qb
            .build_query_as::<SqlComment>()
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(
            comments,
            pagination.page,
            pagination.count,
            total.max(0) as u64,
        ))
    }
}
