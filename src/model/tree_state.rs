//! 选择与历史状态机：把树、当前选中、入口节点和访问历史捆在一起
//!
//! 任何输入（现成的树、结构化JSON值、待解析文本）都先归一化成Option<Tree>；
//! 文本走容错解析管线，解析失败得到的是"无树"状态而不是错误

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::history::History;
use crate::model::tree::{NodeId, Tree, TreeOptions};
use crate::utils::fs::read_text_file;

/// 模型层错误类型
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 构树输入：已建好的树原样复用，值直接包装，文本先解析
#[derive(Debug)]
pub enum TreeInput {
    Tree(Tree),
    Value(Value),
    Text(String),
}

impl From<Tree> for TreeInput {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Value> for TreeInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for TreeInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TreeInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// 树的选择状态；字段公开，直接读
#[derive(Debug, Default)]
pub struct TreeState {
    /// 当前文档树；输入无法解析时为None
    pub tree: Option<Tree>,
    pub history: History,
    /// 当前选中节点；只在没有树时为None
    pub selected: Option<NodeId>,
    /// 入口节点：最近一次以is_initial方式选中的节点
    pub initial_node: Option<NodeId>,
    /// 树的来源文件（仅load_file设置）
    pub source_path: Option<PathBuf>,
}

impl TreeState {
    /// 从任意输入构建状态；建树成功时根节点作为入口被选中
    pub fn new(input: impl Into<TreeInput>) -> Self {
        Self::with_options(input, TreeOptions::default())
    }

    pub fn with_options(input: impl Into<TreeInput>, options: TreeOptions) -> Self {
        let mut state = Self {
            tree: Self::build_tree(input.into(), options),
            ..Self::default()
        };
        if let Some(root) = state.tree.as_ref().map(Tree::root) {
            state.select_node(root, true);
        }
        state
    }

    /// 输入归一化；文本解析失败时返回None（已记日志），不是错误
    pub fn build_tree(input: TreeInput, options: TreeOptions) -> Option<Tree> {
        match input {
            TreeInput::Tree(tree) => Some(tree),
            TreeInput::Value(value) => Some(Tree::with_options(value, options)),
            TreeInput::Text(text) => {
                parse_json_relaxed(&text).map(|value| Tree::with_options(value, options))
            }
        }
    }

    /// 按路径选中（相对根解析）；路径不存在时选中保持不变
    pub fn select_path(&mut self, path: &str, is_initial: bool) {
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        let root = tree.root();
        match tree.get_by_path(root, path) {
            Some(node) => self.select_node(node, is_initial),
            None => tracing::debug!("路径未命中，保持当前选中: {}", path),
        }
    }

    /// 选中节点并推入历史；重复选中同一节点不产生历史条目
    pub fn select_node(&mut self, node: NodeId, is_initial: bool) {
        if self.tree.is_none() {
            return;
        }
        if is_initial {
            self.initial_node = Some(node);
        }
        if self.selected != Some(node) {
            self.selected = Some(node);
            self.history.append(node);
        }
    }

    pub fn is_root_selected(&self) -> bool {
        match (&self.tree, self.selected) {
            (Some(tree), Some(selected)) => selected == tree.root(),
            _ => false,
        }
    }

    pub fn is_initial_node_selected(&self) -> bool {
        self.tree.is_some() && self.selected.is_some() && self.selected == self.initial_node
    }

    pub fn can_back(&self) -> bool {
        self.history.can_back()
    }

    pub fn can_forward(&self) -> bool {
        self.history.can_forward()
    }

    /// 历史后退；无可退条目时返回None且选中不变
    pub fn back(&mut self) -> Option<NodeId> {
        let node = self.history.back();
        if let Some(node) = node {
            self.selected = Some(node);
        }
        node
    }

    /// 历史前进；无可进条目时返回None且选中不变
    pub fn forward(&mut self) -> Option<NodeId> {
        let node = self.history.forward();
        if let Some(node) = node {
            self.selected = Some(node);
        }
        node
    }

    /// 读入文件并经容错管线重建整个状态
    ///
    /// 文本无法解析不算错误（得到tree为None的状态），只有IO失败按错误返回
    pub fn load_file(&mut self, path: &Path) -> Result<(), TreeError> {
        let text = read_text_file(path)?;
        let mut next = Self::new(text);
        next.source_path = Some(path.to_path_buf());
        if next.tree.is_some() {
            tracing::info!("文件加载完成: {}", path.display());
        } else {
            tracing::warn!("文件内容无法解析为JSON: {}", path.display());
        }
        *self = next;
        Ok(())
    }
}

/// 容错解析：先按严格JSON解析，失败时回退到JSON5
/// （容忍未加引号的键、尾随逗号、单引号等手写习惯）；两者都失败返回None
pub fn parse_json_relaxed(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(strict_err) => match json5::from_str(text) {
            Ok(value) => {
                tracing::info!("严格JSON解析失败，已回退宽松解析: {}", strict_err);
                Some(value)
            }
            Err(relaxed_err) => {
                tracing::error!("JSON解析失败（宽松模式同样失败）: {}", relaxed_err);
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// 创建临时JSON文件用于测试
    fn create_test_json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(content.as_bytes()).expect("写入临时文件失败");
        file
    }

    #[test]
    fn test_build_from_value() {
        let tstate = TreeState::new(json!({"name": "测试", "value": 42}));
        assert!(tstate.tree.is_some(), "结构化输入应该建树");
        assert!(tstate.is_root_selected(), "初始选中应该是根节点");
        assert!(tstate.is_initial_node_selected(), "根节点应该被记录为入口节点");
        assert!(!tstate.can_back(), "初始历史不应该可后退");
        assert_eq!(tstate.history.len(), 1);
    }

    #[test]
    fn test_strict_text_input() {
        let mut tstate = TreeState::new(r#"{"a": 1}"#);
        let tree = tstate.tree.as_mut().expect("严格JSON文本应该建树");
        let root = tree.root();
        let a = tree.get_by_path(root, "/a").expect("子节点a应该存在");
        assert_eq!(tree.value(a), Some(&json!(1)));
    }

    #[test]
    fn test_relaxed_parse_fallback() {
        let mut tstate = TreeState::new("{a: 1,}");
        let tree = tstate.tree.as_mut().expect("宽松语法应该回退解析成功");
        let root = tree.root();
        assert!(tree.get_by_path(root, "/a").is_some());
    }

    #[test]
    fn test_unparseable_input_yields_no_tree() {
        let tstate = TreeState::new("{{{");
        assert!(tstate.tree.is_none(), "无法解析的文本应该得到无树状态");
        assert!(tstate.selected.is_none());
        assert!(!tstate.is_root_selected());
        assert!(!tstate.is_initial_node_selected());
        assert!(tstate.history.is_empty());
    }

    #[test]
    fn test_scalar_text_still_builds_tree() {
        // 解析结果是标量也算成功，不触发无树状态
        for text in ["0", "false", "\"\"", "null"] {
            let tstate = TreeState::new(text);
            assert!(tstate.tree.is_some(), "标量文本{}应该建树", text);
            assert!(tstate.is_root_selected());
        }
    }

    #[test]
    fn test_tree_passthrough_keeps_existing_tree() {
        let options = TreeOptions {
            root_key: "自定义".to_string(),
            sorted: false,
        };
        let tree = Tree::with_options(json!({"x": 1}), options);
        let built = TreeState::build_tree(tree.into(), TreeOptions::default())
            .expect("现成的树应该原样通过");
        assert_eq!(built.key(built.root()), "自定义", "passthrough不应该重建树");
    }

    #[test]
    fn test_parse_json_relaxed_variants() {
        assert_eq!(parse_json_relaxed(r#"{"a": 1}"#), Some(json!({"a": 1})));
        assert_eq!(parse_json_relaxed("{a: 1,}"), Some(json!({"a": 1})));
        assert_eq!(parse_json_relaxed("{'a': 'b'}"), Some(json!({"a": "b"})));
        assert!(parse_json_relaxed("{{{").is_none());
    }

    #[test]
    fn test_select_same_node_no_duplicate_history() {
        let mut tstate = TreeState::new(json!({"a": {"b": 1}}));
        let root = tstate.tree.as_ref().map(Tree::root).unwrap();
        tstate.select_node(root, false);
        assert!(!tstate.can_back(), "重复选中同一节点不应该追加历史");
        assert_eq!(tstate.history.len(), 1);
    }

    #[test]
    fn test_select_path_and_history_walk() {
        let mut tstate = TreeState::new(json!({"a": {"b": 1}}));
        tstate.select_path("/a", false);
        assert!(tstate.can_back());
        tstate.select_path("/a/b", false);

        assert!(tstate.back().is_some());
        let tree = tstate.tree.as_mut().unwrap();
        let root = tree.root();
        let a = tree.get_by_path(root, "/a");
        assert_eq!(tstate.selected, a, "后退应该回到/a");
        assert!(tstate.can_forward());

        assert!(tstate.forward().is_some());
        let tree = tstate.tree.as_mut().unwrap();
        let root = tree.root();
        let b = tree.get_by_path(root, "/a/b");
        assert_eq!(tstate.selected, b, "前进应该回到/a/b");
    }

    #[test]
    fn test_select_unknown_path_keeps_selection() {
        let mut tstate = TreeState::new(json!({"a": 1}));
        tstate.select_path("/不存在", false);
        assert!(tstate.is_root_selected(), "未命中路径应该保持原选中");
        assert!(!tstate.can_back());
    }

    #[test]
    fn test_initial_node_tracking() {
        let mut tstate = TreeState::new(json!({"a": {"b": 1}}));
        tstate.select_path("/a", true);
        assert!(tstate.is_initial_node_selected());
        tstate.select_path("/a/b", false);
        assert!(!tstate.is_initial_node_selected());
        tstate.back();
        assert!(tstate.is_initial_node_selected(), "后退到入口节点后判定应该为真");
    }

    #[test]
    fn test_unguarded_back_keeps_selection() {
        let mut tstate = TreeState::new(json!({"a": 1}));
        assert!(tstate.back().is_none(), "无历史可退时返回None");
        assert!(tstate.is_root_selected(), "失败的后退不应该清掉选中");
        assert!(tstate.forward().is_none());
        assert!(tstate.is_root_selected());
    }

    #[test]
    fn test_load_file_strict_json() {
        let file = create_test_json_file(r#"{"name": "测试", "value": 42}"#);
        let mut tstate = TreeState::default();
        let result = tstate.load_file(file.path());
        assert!(result.is_ok(), "加载合法JSON文件应该成功");
        assert!(tstate.tree.is_some());
        assert!(tstate.is_root_selected());
        assert_eq!(tstate.source_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_file_relaxed_syntax() {
        let file = create_test_json_file("{a: 1, b: 'x',}");
        let mut tstate = TreeState::default();
        tstate.load_file(file.path()).expect("宽松语法文件应该加载成功");
        assert!(tstate.tree.is_some());
    }

    #[test]
    fn test_load_file_unparseable_is_not_an_error() {
        let file = create_test_json_file("{{{");
        let mut tstate = TreeState::default();
        let result = tstate.load_file(file.path());
        assert!(result.is_ok(), "解析失败走容错管线，不算IO错误");
        assert!(tstate.tree.is_none());
        assert!(tstate.selected.is_none());
    }

    #[test]
    fn test_load_file_missing_path() {
        let mut tstate = TreeState::default();
        let result = tstate.load_file(Path::new("/不存在/文件.json"));
        assert!(matches!(result, Err(TreeError::Io(_))), "文件不存在应该报IO错误");
    }

    #[test]
    fn test_load_file_replaces_previous_state() {
        let mut tstate = TreeState::new(json!({"旧": 1}));
        tstate.select_path("/旧", false);
        let file = create_test_json_file(r#"{"新": 2}"#);
        tstate.load_file(file.path()).unwrap();
        assert!(tstate.is_root_selected(), "加载新文件后选中应该回到新树的根");
        assert_eq!(tstate.history.len(), 1, "历史应该重置");
    }
}
