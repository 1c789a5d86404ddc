//! 表格视图模型：把选中节点的子集投影成列/行结构
//!
//! 首列是键列（数组父节点为"#"，对象父节点为"@key"）；折叠模式下子节点
//! 整体显示在"@value"列，展开模式下每个不同的孙键按首见顺序成为一列。
//! 行上还提供过滤/排序/分页查询，语义与前端表格组件一致

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::model::tree::{NodeId, Tree};

/// 数组父节点的键列字段名
pub const COL_INDEX: &str = "#";
/// 对象父节点的键列字段名
pub const COL_KEY: &str = "@key";
/// 子节点整体值的列字段名
pub const COL_VALUE: &str = "@value";

#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    pub field: String,
    pub title: String,
    pub sortable: bool,
}

/// 表格的一行，对应选中节点的一个子节点
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub node: NodeId,
    /// 子节点的绝对路径，供选中联动与反查
    pub path: String,
    /// 与columns按下标对齐的显示单元格；无值的列为空串
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TableModel {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

/// 由选中节点的子集构建表格
///
/// "@value"列只在出现需要整体显示的行（叶子，或未展开的容器）时插入到
/// 第二列；展开模式下非叶子行摊开为孙键列。叶子选中节点得到空表
pub fn build_table(tree: &mut Tree, node: NodeId, expanded: bool) -> TableModel {
    let key_field = if tree.is_array(node) { COL_INDEX } else { COL_KEY };
    let mut fields: Vec<String> = vec![key_field.to_string()];
    let children = tree.children(node).to_vec();
    let mut raw_rows: Vec<(NodeId, Vec<(String, String)>)> = Vec::with_capacity(children.len());

    for child in children {
        let mut cells = vec![
            (key_field.to_string(), tree.key(child).to_string()),
            (COL_VALUE.to_string(), display_string(tree, child)),
        ];
        if expanded && !tree.is_leaf(child) {
            for grand in tree.children(child).to_vec() {
                let field = tree.key(grand).to_string();
                if !fields.iter().any(|f| *f == field) {
                    fields.push(field.clone());
                }
                cells.push((field, display_string(tree, grand)));
            }
        } else if !fields.iter().any(|f| f == COL_VALUE) {
            fields.insert(1, COL_VALUE.to_string());
        }
        raw_rows.push((child, cells));
    }

    let columns: Vec<TableColumn> = fields
        .iter()
        .map(|field| TableColumn {
            field: field.clone(),
            title: field.clone(),
            sortable: true,
        })
        .collect();
    let rows: Vec<TableRow> = raw_rows
        .into_iter()
        .map(|(child, cells)| TableRow {
            node: child,
            path: tree.path(child),
            cells: fields
                .iter()
                .map(|field| {
                    cells
                        .iter()
                        .find(|(f, _)| f == field)
                        .map(|(_, text)| text.clone())
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();

    tracing::debug!("表格构建完成: {}列 x {}行", columns.len(), rows.len());
    TableModel { columns, rows }
}

/// 默认展开启发式：孙节点总数相对"不同孙键数×子数"足够稠密时选择宽表
pub fn default_expand(tree: &mut Tree, node: NodeId) -> bool {
    let children = tree.children(node).to_vec();
    let mut distinct: HashSet<String> = HashSet::new();
    let mut total = 0usize;
    for child in &children {
        if !tree.is_leaf(*child) {
            for grand in tree.children(*child).to_vec() {
                distinct.insert(tree.key(grand).to_string());
                total += 1;
            }
        }
    }
    4 * total > distinct.len() * children.len()
}

/// 单元格显示串：基本类型为其JSON文本，容器为尺寸/类型标签
fn display_string(tree: &Tree, node: NodeId) -> String {
    if tree.is_simple_type(node) {
        tree.value(node).map(ToString::to_string).unwrap_or_default()
    } else {
        tree.type_size_label(node)
    }
}

/// 字段过滤：清单为成员匹配，文本为大小写不敏感的子串匹配
#[derive(Debug, Clone)]
pub enum FieldFilter {
    Text(String),
    OneOf(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// 行查询：先过滤，再稳定多键排序，最后offset/limit切片
#[derive(Debug, Clone, Default)]
pub struct RowQuery {
    pub filters: Vec<(String, FieldFilter)>,
    pub sort: Vec<(String, Order)>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// 查询结果；total是过滤后、切片前的行数，供分页显示
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<TableRow>,
    pub total: usize,
}

pub fn apply_row_query(model: &TableModel, query: &RowQuery) -> QueryResult {
    let col_index = |field: &str| model.columns.iter().position(|c| c.field == field);

    let mut rows: Vec<&TableRow> = model.rows.iter().collect();
    for (field, filter) in &query.filters {
        // 空文本过滤等于没有过滤；未知字段跳过
        if let FieldFilter::Text(text) = filter {
            if text.is_empty() {
                continue;
            }
        }
        let Some(index) = col_index(field) else {
            continue;
        };
        rows.retain(|row| {
            let cell = row.cells.get(index).map_or("", String::as_str);
            match filter {
                FieldFilter::OneOf(allowed) => allowed.iter().any(|v| v == cell),
                FieldFilter::Text(text) => {
                    !cell.is_empty() && cell.to_lowercase().contains(&text.to_lowercase())
                }
            }
        });
    }

    if !query.sort.is_empty() {
        rows.sort_by(|a, b| {
            for (field, order) in &query.sort {
                let Some(index) = col_index(field) else {
                    continue;
                };
                let left = a.cells.get(index).map_or("", String::as_str);
                let right = b.cells.get(index).map_or("", String::as_str);
                let cmp = compare_cells(left, right);
                let cmp = if *order == Order::Desc { cmp.reverse() } else { cmp };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });
    }

    let total = rows.len();
    let rows = rows
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    QueryResult { rows, total }
}

/// 两边都能解析成数字时按数值比较（与"#"索引列的直觉一致），否则按字符串
fn compare_cells(left: &str, right: &str) -> Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}
