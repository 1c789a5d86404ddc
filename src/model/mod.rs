//! 数据模型层：树、历史与选择状态

pub mod history;
pub mod performance;
pub mod tree;
pub mod tree_state;
