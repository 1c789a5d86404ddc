//! JSON树表格核心库
//!
//! 提供JSON值的惰性树化（Tree/NodeId）、选择与历史状态机（TreeState/History）、
//! '/'分隔路径寻址，以及表格/面包屑视图模型
//! 渲染层是外部协作者，这里只暴露节点级的读取API

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::history::History;
pub use model::tree::{NodeId, Tree, TreeOptions};
pub use model::tree_state::{TreeError, TreeInput, TreeState};
