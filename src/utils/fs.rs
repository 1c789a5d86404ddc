//! IO helper: safe file read/write for JSON

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use crate::model::tree_state::TreeError;
use serde_json::Value;

/// 从文件读取严格JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, TreeError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 读取原始文本；宽松解析管线需要未解析的输入
pub fn read_text_file(p: &Path) -> Result<String, TreeError> {
    let f = File::open(p)?;
    let mut rdr = BufReader::new(f);
    let mut text = String::new();
    rdr.read_to_string(&mut text)?;
    Ok(text)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), TreeError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}
