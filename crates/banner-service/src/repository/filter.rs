//! 横幅列表查询构造
//!
//! 按过滤条件拼出一条参数化 SQL。条件只在对应字段存在时追加，
//! 占位符按追加顺序编号，值全部通过 bind 传入。

use banner_shared::error::Result;

use crate::models::BannerFilter;

const SELECT_CLAUSE: &str = r#"SELECT b.id, b.feature_id, b.content, b.is_active, b.created_at, b.updated_at,
       COALESCE(array_agg(bt.tag_id ORDER BY bt.tag_id) FILTER (WHERE bt.tag_id IS NOT NULL), '{}') AS tag_ids
FROM banners b
LEFT JOIN banner_tags bt ON bt.banner_id = b.id"#;

/// 构造完成的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub sql: String,
    /// 与 `$1..$n` 一一对应
    pub binds: Vec<i64>,
}

/// 根据过滤条件构造列表查询
///
/// 顺序固定：feature_id 相等、tag_id 成员（子查询）、GROUP BY、ORDER BY、LIMIT、OFFSET。
/// tag 条件用子查询而不是直接过滤 join 结果，保证返回的 tag_ids 是横幅的完整集合。
pub fn build_list_query(filter: &BannerFilter) -> Result<ListQuery> {
    filter.check()?;

    let mut conditions = Vec::new();
    let mut binds = Vec::new();
    let mut param_idx = 1;

    if let Some(feature_id) = filter.feature_id {
        conditions.push(format!("b.feature_id = ${}", param_idx));
        binds.push(feature_id);
        param_idx += 1;
    }
    if let Some(tag_id) = filter.tag_id {
        conditions.push(format!(
            "b.id IN (SELECT banner_id FROM banner_tags WHERE tag_id = ${})",
            param_idx
        ));
        binds.push(tag_id);
        param_idx += 1;
    }

    let mut sql = String::from(SELECT_CLAUSE);
    if !conditions.is_empty() {
        sql.push_str("\nWHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str("\nGROUP BY b.id\nORDER BY b.id");

    if let Some(limit) = filter.limit {
        sql.push_str(&format!("\nLIMIT ${}", param_idx));
        binds.push(limit);
        param_idx += 1;
    }
    if let Some(offset) = filter.offset {
        sql.push_str(&format!("\nOFFSET ${}", param_idx));
        binds.push(offset);
    }

    Ok(ListQuery { sql, binds })
}
