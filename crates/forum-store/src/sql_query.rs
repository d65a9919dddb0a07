use forum_tags::FacetQuery;
use rusqlite::types::Value as SqlValue;

/// Compiled facet query with bound parameters.
pub(crate) struct CompiledFacetQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Translate a FacetQuery into one grouped SQL statement.
///
/// Each post's tag rows are grouped and every facet becomes one
/// `SUM(inside facet) > 0` term in the HAVING clause, so k facets cost one
/// round trip instead of k.
pub(crate) fn compile_facet_query(q: &FacetQuery) -> CompiledFacetQuery {
    let mut params = Vec::with_capacity(q.facets.len() * 2);

    let mut conditions = Vec::with_capacity(q.facets.len());
    for facet in &q.facets {
        conditions.push("SUM(t.lft >= ? AND t.rgt <= ?) > 0".to_string());
        params.push(SqlValue::Integer(facet.lft()));
        params.push(SqlValue::Integer(facet.rgt()));
    }
    let having_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("HAVING {}", conditions.join(" AND "))
    };

    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
    let limit_offset = match (q.limit, q.offset) {
        (Some(limit), Some(offset)) => format!("LIMIT {} OFFSET {}", limit, offset),
        (Some(limit), None) => format!("LIMIT {}", limit),
        (None, Some(offset)) => format!("LIMIT -1 OFFSET {}", offset),
        (None, None) => String::new(),
    };

    let sql = format!(
        "SELECT p.id FROM posts p
         LEFT JOIN tags_to_posts tp ON tp.post_id = p.id
         LEFT JOIN tags t ON t.id = tp.tag_id
         WHERE p.quarantined = 0
         GROUP BY p.id, p.created
         {}
         ORDER BY p.created DESC, p.id ASC
         {}",
        having_clause, limit_offset
    );

    CompiledFacetQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_tags::TagSpan;

    #[test]
    fn one_having_term_per_facet() {
        let q = FacetQuery {
            facets: vec![TagSpan::new(3, 6).unwrap(), TagSpan::new(8, 11).unwrap()],
            limit: Some(20),
            offset: None,
        };
        let compiled = compile_facet_query(&q);
        assert_eq!(compiled.sql.matches("SUM(").count(), 2);
        assert!(compiled.sql.contains("LIMIT 20"));
        assert!(!compiled.sql.contains("OFFSET"));
        assert_eq!(
            compiled.params,
            vec![
                SqlValue::Integer(3),
                SqlValue::Integer(6),
                SqlValue::Integer(8),
                SqlValue::Integer(11)
            ]
        );
    }

    #[test]
    fn no_facets_has_no_having_clause() {
        let q = FacetQuery {
            facets: vec![],
            limit: None,
            offset: Some(5),
        };
        let compiled = compile_facet_query(&q);
        assert!(!compiled.sql.contains("HAVING"));
        assert!(compiled.sql.contains("LIMIT -1 OFFSET 5"));
        assert!(compiled.params.is_empty());
    }
}
