//! 惰性JSON树：按需物化的可寻址节点图与'/'路径解析
//!
//! 树持有唯一一份文档（serde_json::Value），节点是扁平arena中的行，
//! 用Copy的NodeId寻址；子节点集在首次访问时物化并缓存，之后恒定

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// 节点句柄：指向树内部arena的稳定索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

/// Tree的构建配置
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// 根节点的键名
    pub root_key: String,
    /// 为true时对象键按字典序物化；数组索引永远保持原顺序
    pub sorted: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            root_key: "root".to_string(),
            sorted: false,
        }
    }
}

/// arena中的一行：键、父节点回引与缓存的子节点集
#[derive(Debug)]
struct TreeNode {
    key: String,
    parent: Option<NodeId>,
    /// None表示尚未物化
    children: Option<Vec<NodeId>>,
}

/// 已解析JSON值的可寻址包装
#[derive(Debug)]
pub struct Tree {
    doc: Value,
    nodes: Vec<TreeNode>,
    /// 哈希标签值 -> 节点的二级索引，仅在节点物化时登记
    hash_map: HashMap<String, NodeId>,
    sorted: bool,
}

impl Tree {
    /// 类型标签键：值为节点的类型名，属于元数据而非数据
    pub const TAG_TYPE: &'static str = "$type";
    /// 哈希标签键：值为节点的全局标识
    pub const TAG_HASH: &'static str = "$hash";
    /// 哈希引用前缀，见resolve_ref
    pub const TAG_HASH_PREFIX: &'static str = "$hash:";

    /// 以默认配置包装任意JSON值（根键"root"）；任何值都可表示，不会失败
    pub fn new(value: Value) -> Self {
        Self::with_options(value, TreeOptions::default())
    }

    pub fn with_options(value: Value, options: TreeOptions) -> Self {
        let mut tree = Self {
            doc: value,
            nodes: vec![TreeNode {
                key: options.root_key,
                parent: None,
                children: None,
            }],
            hash_map: HashMap::new(),
            sorted: options.sorted,
        };
        let root = tree.root();
        tree.register_hash(root);
        tree
    }

    /// 根节点；构建时创建，树存活期间恒定
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// 已创建的节点总数（含根）
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 节点在父级中的键名或索引的字符串形式
    pub fn key(&self, id: NodeId) -> &str {
        self.nodes[id.0].key.as_str()
    }

    /// 父节点；根返回None
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// 节点对应的原始JSON值；从文档根沿键链导航，节点自身不复制值
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        let mut chain = Vec::new();
        let mut cur = id;
        while let Some(parent) = self.nodes[cur.0].parent {
            chain.push(self.nodes[cur.0].key.as_str());
            cur = parent;
        }
        let mut value = &self.doc;
        for key in chain.iter().rev() {
            value = index_value(value, key)?;
        }
        Some(value)
    }

    /// 按键（或数组的数字索引）读子值，不触发子节点物化；用于读标签值
    pub fn get_child_value(&self, id: NodeId, key: &str) -> Option<&Value> {
        index_value(self.value(id)?, key)
    }

    pub fn is_array(&self, id: NodeId) -> bool {
        self.value(id).map_or(false, Value::is_array)
    }

    pub fn is_object(&self, id: NodeId) -> bool {
        self.value(id).map_or(false, Value::is_object)
    }

    /// 既非数组也非对象，即基本类型或null
    pub fn is_simple_type(&self, id: NodeId) -> bool {
        !self.is_array(id) && !self.is_object(id)
    }

    /// 没有子节点（基本类型，或条目全部被过滤的容器）
    pub fn is_leaf(&mut self, id: NodeId) -> bool {
        self.children(id).is_empty()
    }

    /// 子节点数（过滤后）
    pub fn size(&mut self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// 子节点集；首次访问时物化并缓存
    ///
    /// 对象键按插入顺序枚举（sorted配置时按字典序），数组按索引顺序；
    /// 标签键与null值条目不物化为子节点
    pub fn children(&mut self, id: NodeId) -> &[NodeId] {
        if self.nodes[id.0].children.is_none() {
            let ids = self.materialize_children(id);
            self.nodes[id.0].children = Some(ids);
        }
        self.nodes[id.0].children.as_deref().unwrap_or(&[])
    }

    fn materialize_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let keys = self.child_keys(id);
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            let child = NodeId(self.nodes.len());
            self.nodes.push(TreeNode {
                key,
                parent: Some(id),
                children: None,
            });
            self.register_hash(child);
            ids.push(child);
        }
        tracing::debug!("物化子节点: key={}, 数量={}", self.nodes[id.0].key, ids.len());
        ids
    }

    /// 待物化的子键集：数组为幸存索引，对象为过滤后的键（可选排序）
    fn child_keys(&self, id: NodeId) -> Vec<String> {
        match self.value(id) {
            Some(Value::Object(map)) => {
                let mut keys: Vec<&String> = map
                    .iter()
                    .filter(|(key, value)| {
                        !value.is_null()
                            && key.as_str() != Self::TAG_TYPE
                            && key.as_str() != Self::TAG_HASH
                    })
                    .map(|(key, _)| key)
                    .collect();
                if self.sorted {
                    keys.sort();
                }
                keys.into_iter().cloned().collect()
            }
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_null())
                .map(|(index, _)| index.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn register_hash(&mut self, id: NodeId) {
        if let Some(hash) = self.hash(id) {
            self.hash_map.insert(hash, id);
        }
    }

    /// 解析'/'分隔路径：".."父节点、""回根、"."自身、其余为子键；
    /// 任一段解析失败则整体为None，不抛错
    pub fn get_by_path(&mut self, from: NodeId, path: &str) -> Option<NodeId> {
        let segments: Vec<&str> = path.split('/').collect();
        self.resolve_segments(from, &segments)
    }

    /// 已切分路径段的解析入口；用索引游标前进，不改动调用方的段序列
    pub fn resolve_segments(&mut self, from: NodeId, segments: &[&str]) -> Option<NodeId> {
        let mut current = from;
        for segment in segments {
            current = match *segment {
                ".." => self.parent(current)?,
                "" => self.root(),
                "." => current,
                key => self.child_by_key(current, key)?,
            };
        }
        Some(current)
    }

    fn child_by_key(&mut self, id: NodeId, key: &str) -> Option<NodeId> {
        self.children(id);
        let ids = self.nodes[id.0].children.as_deref()?;
        ids.iter()
            .copied()
            .find(|child| self.nodes[child.0].key == key)
    }

    /// 从根到该节点的绝对路径（根为"/"），可经get_by_path往返
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cur = id;
        while let Some(parent) = self.nodes[cur.0].parent {
            segments.push(self.nodes[cur.0].key.clone());
            cur = parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// 类型标签值（仅字符串形式有意义）
    pub fn type_tag(&self, id: NodeId) -> Option<&str> {
        self.get_child_value(id, Self::TAG_TYPE)?.as_str()
    }

    /// 哈希标签值；字符串和数字都按其显示形式登记
    pub fn hash(&self, id: NodeId) -> Option<String> {
        match self.get_child_value(id, Self::TAG_HASH)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 去掉泛型参数与包名前缀的裸类型名；无类型标签时为空串
    pub fn type_label(&self, id: NodeId) -> String {
        self.type_tag(id)
            .map_or_else(String::new, |name| simple_type_name(name).to_string())
    }

    /// 显示标签：原始尺寸（数组"[n]"/其余"{n}"，n为未过滤的键数）
    /// 加类型名与哈希后缀，如 "{6} <ActivityHist@h1>"
    pub fn type_size_label(&self, id: NodeId) -> String {
        let size = match self.value(id) {
            Some(Value::Array(items)) => format!("[{}]", items.len()),
            Some(Value::Object(map)) => format!("{{{}}}", map.len()),
            _ => "{0}".to_string(),
        };
        let mut label = self.type_label(id);
        if let Some(hash) = self.hash(id) {
            label.push('@');
            label.push_str(&hash);
        }
        if label.is_empty() {
            size
        } else {
            format!("{} <{}>", size, label)
        }
    }

    /// 按哈希标签值查找节点；只能命中已物化的节点
    pub fn find_by_hash(&self, hash: &str) -> Option<NodeId> {
        self.hash_map.get(hash).copied()
    }

    /// 解析哈希引用："$hash:xxx"形式或裸哈希值
    pub fn resolve_ref(&self, text: &str) -> Option<NodeId> {
        let hash = text.strip_prefix(Self::TAG_HASH_PREFIX).unwrap_or(text);
        self.find_by_hash(hash)
    }

    /// 整树缩进文本，每行"key: 标签或值"；逐层物化，与普通消费者走同一条路
    pub fn dump(&mut self) -> String {
        let mut out = String::new();
        self.dump_node(self.root(), "", &mut out);
        out
    }

    fn dump_node(&mut self, id: NodeId, indent: &str, out: &mut String) {
        let line = if self.is_simple_type(id) {
            let value = self.value(id).map_or_else(|| "null".to_string(), Value::to_string);
            format!("{}{}: {}\n", indent, self.key(id), value)
        } else {
            format!("{}{}: {}\n", indent, self.key(id), self.type_size_label(id))
        };
        out.push_str(&line);
        let child_indent = format!("{}  ", indent);
        for child in self.children(id).to_vec() {
            self.dump_node(child, &child_indent, out);
        }
    }
}

fn index_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(key.parse::<usize>().ok()?),
        _ => None,
    }
}

/// "com.foo.Bar<T>" -> "Bar"：先截掉首个'<'起的泛型参数，再截掉最后一个'.'之前的包名
fn simple_type_name(name: &str) -> &str {
    let base = match name.find('<') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    };
    match base.rfind('.') {
        Some(pos) => &base[pos + 1..],
        None => base,
    }
}
