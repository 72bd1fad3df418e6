//! Query filter helpers shared by the list endpoints.

use sea_orm::sea_query::LikeExpr;

const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character so `LIKE` matches them literally.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// `LIKE` pattern matching `needle` anywhere in the column.
pub fn contains_literal(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape(LIKE_ESCAPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Expr, PostgresQueryBuilder, Query};

    #[test]
    fn plain_text_untouched() {
        assert_eq!(escape_like("etl"), "etl");
        assert_eq!(escape_like(""), "");
    }

    #[test]
    fn wildcards_escaped() {
        assert_eq!(escape_like("a_b%c"), r"a\_b\%c");
        assert_eq!(escape_like(r"x\y"), r"x\\y");
    }

    #[test]
    fn filter_declares_escape_char() {
        let sql = Query::select()
            .column(Alias::new("name"))
            .from(Alias::new("namespace"))
            .and_where(Expr::col(Alias::new("name")).like(contains_literal("etl")))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("LIKE '%etl%' ESCAPE"), "{sql}");
    }
}
