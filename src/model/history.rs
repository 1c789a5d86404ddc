//! 访问历史：浏览器式的后退/前进导航栈

use crate::model::tree::NodeId;

/// 线性访问历史；在中间位置追加会先丢弃游标之后的前进分支
#[derive(Debug, Default)]
pub struct History {
    items: Vec<NodeId>,
    /// 当前游标；None表示还没有条目
    pos: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 当前游标处的条目
    pub fn current(&self) -> Option<NodeId> {
        self.items.get(self.pos?).copied()
    }

    pub fn can_back(&self) -> bool {
        self.pos.map_or(false, |pos| pos > 0)
    }

    pub fn can_forward(&self) -> bool {
        self.pos.map_or(false, |pos| pos + 1 < self.items.len())
    }

    /// 追加新条目并把游标移到它上面；游标后面的前进分支被截断
    pub fn append(&mut self, node: NodeId) {
        match self.pos {
            Some(pos) => {
                self.items.truncate(pos + 1);
                self.items.push(node);
                self.pos = Some(pos + 1);
            }
            None => {
                self.items.clear();
                self.items.push(node);
                self.pos = Some(0);
            }
        }
    }

    /// 游标后退一格并返回该条目；已在最早处返回None且游标不动
    pub fn back(&mut self) -> Option<NodeId> {
        if !self.can_back() {
            return None;
        }
        let pos = self.pos? - 1;
        self.pos = Some(pos);
        self.items.get(pos).copied()
    }

    /// 游标前进一格并返回该条目；已在最新处返回None且游标不动
    pub fn forward(&mut self) -> Option<NodeId> {
        if !self.can_forward() {
            return None;
        }
        let pos = self.pos? + 1;
        self.pos = Some(pos);
        self.items.get(pos).copied()
    }
}
