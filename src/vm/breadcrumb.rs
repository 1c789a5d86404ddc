//! 面包屑视图模型：选中节点的祖先链

use serde::Serialize;

use crate::model::tree::{NodeId, Tree};

/// 面包屑的一级；path可直接喂给get_by_path回跳
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadcrumbItem {
    pub key: String,
    pub path: String,
    /// 链尾（当前选中）为true
    pub active: bool,
}

/// 从根到选中节点的祖先链，根在最前
pub fn breadcrumb(tree: &Tree, selected: NodeId) -> Vec<BreadcrumbItem> {
    let mut chain = Vec::new();
    let mut cur = Some(selected);
    while let Some(id) = cur {
        chain.push(id);
        cur = tree.parent(id);
    }
    chain.reverse();
    chain
        .iter()
        .map(|&id| BreadcrumbItem {
            key: tree.key(id).to_string(),
            path: tree.path(id),
            active: id == selected,
        })
        .collect()
}
