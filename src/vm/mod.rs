//! 视图模型层：把模型投影成可直接渲染的结构

pub mod breadcrumb;
pub mod table;
