mod comments;
mod posts;

use sqlx::{QueryBuilder, Sqlite};

/// Appends ` WHERE ` for the first condition and ` AND ` afterwards.
pub(crate) struct Conditions {
    any: bool,
}

impl Conditions {
    pub(crate) fn new() -> Self {
        Self { any: false }
    }

    pub(crate) fn next<'q, 'args>(
        &mut self,
        qb: &'q mut QueryBuilder<'args, Sqlite>,
    ) -> &'q mut QueryBuilder<'args, Sqlite> {
        let keyword = if self.any { " AND " } else { " WHERE " };
        self.any = true;
        qb.push(keyword)
    }
}
