//! 性能基准测试模块
//!
//! 用于测试大文档的树物化、文本解析与路径解析性能

use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};

use crate::model::tree::{NodeId, Tree};
use crate::model::tree_state::TreeState;

/// 性能测试结果
#[derive(Debug, Serialize)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }

    /// 单行文本摘要
    pub fn summary(&self) -> String {
        let flag = if self.success { "OK" } else { "FAIL" };
        format!("[{}] {} - {}ms ({})", flag, self.operation, self.duration_ms, self.details)
    }
}

/// 生成大型测试JSON数据；部分对象带$type/$hash标签和null字段，
/// 以覆盖标签排除与null跳过的物化路径
pub fn generate_large_json(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("叶子节点值");
        }

        let mut obj = serde_json::Map::new();
        obj.insert(
            Tree::TAG_TYPE.to_string(),
            json!(format!("com.example.bench.Level{}", current_depth)),
        );

        // 混合各种类型的字段
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => Value::Null,
                _ => create_nested_object(current_depth + 1, max_depth, width / 2),
            };
            obj.insert(key, value);
        }

        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "$type": "com.example.bench.Metadata",
            "depth": depth,
            "width": width,
            "description": "性能测试用大型JSON文档"
        }),
    );

    root.insert("data".to_string(), create_nested_object(0, depth, width));

    // 大型数组，每个元素携带哈希标签
    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "$hash": format!("item-{}", i),
                "id": i,
                "name": format!("项目_{}", i),
                "value": i * 2,
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试整树物化性能
pub fn benchmark_materialization(json_data: &Value) -> PerformanceResult {
    let mut tree = Tree::new(json_data.clone());
    let root = tree.root();

    let start = Instant::now();
    let count = materialize_all(&mut tree, root);
    let duration = start.elapsed();

    PerformanceResult::new(
        "树物化",
        duration.as_millis(),
        count > 0,
        &format!("物化了 {} 个节点", count),
    )
}

/// 递归物化全部子节点，返回节点总数（含起点）
fn materialize_all(tree: &mut Tree, id: NodeId) -> usize {
    let mut count = 1;
    for child in tree.children(id).to_vec() {
        count += materialize_all(tree, child);
    }
    count
}

/// 测试严格JSON解析性能
pub fn benchmark_json_parsing(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = serde_json::from_str::<Value>(json_str);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            true,
            &format!("解析了 {} 字节的JSON", json_str.len()),
        ),
        Err(e) => PerformanceResult::new(
            "JSON解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试宽松(JSON5)解析性能；严格语法的输入同样走得通
pub fn benchmark_relaxed_parsing(text: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result: Result<Value, _> = json5::from_str(text);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "JSON5解析",
            duration.as_millis(),
            true,
            &format!("解析了 {} 字节", text.len()),
        ),
        Err(e) => PerformanceResult::new(
            "JSON5解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试路径解析性能
pub fn benchmark_path_resolution(tree: &mut Tree, paths: &[&str]) -> Vec<PerformanceResult> {
    let root = tree.root();
    let mut results = Vec::new();

    for path in paths {
        let start = Instant::now();
        let hit = tree.get_by_path(root, path);
        let duration = start.elapsed();

        match hit {
            Some(node) => {
                results.push(PerformanceResult::new(
                    &format!("路径解析: {}", path),
                    duration.as_millis(),
                    true,
                    &format!("命中节点 {}", tree.path(node)),
                ));
            }
            None => {
                results.push(PerformanceResult::new(
                    &format!("路径解析: {}", path),
                    duration.as_millis(),
                    false,
                    "路径未命中",
                ));
            }
        }
    }

    results
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10),   // 小型：深度3，宽度10
        (4, 20),   // 中型：深度4，宽度20
        (5, 30),   // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        println!("测试规模：深度{}，宽度{}", depth, width);

        // 生成测试数据
        let start = Instant::now();
        let json_data = generate_large_json(depth, width);
        let generation_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            generation_time.as_millis(),
            true,
            &format!("生成了深度{}宽度{}的JSON", depth, width),
        ));

        // 序列化测试
        let start = Instant::now();
        let json_str = serde_json::to_string(&json_data).unwrap();
        let serialization_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("JSON序列化({}x{})", depth, width),
            serialization_time.as_millis(),
            true,
            &format!("序列化了 {} 字节", json_str.len()),
        ));

        // 两条解析管线
        results.push(benchmark_json_parsing(&json_str));
        results.push(benchmark_relaxed_parsing(&json_str));

        // 整树物化测试
        results.push(benchmark_materialization(&json_data));

        // TreeState构建测试（含根节点选中）
        let start = Instant::now();
        let mut tstate = TreeState::new(json_data.clone());
        let build_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("TreeState构建({}x{})", depth, width),
            build_time.as_millis(),
            tstate.tree.is_some(),
            if tstate.tree.is_some() { "构建成功" } else { "构建失败" },
        ));

        if let Some(tree) = tstate.tree.as_mut() {
            // 路径解析测试
            let test_paths = ["/", "/metadata", "/data/field_4", "/items/0/name", "/items/0/.."];
            results.extend(benchmark_path_resolution(tree, &test_paths));

            // 哈希引用查找；物化items之后索引已填充
            let start = Instant::now();
            let hit = tree.resolve_ref("$hash:item-5");
            let duration = start.elapsed();
            results.push(PerformanceResult::new(
                &format!("哈希查找({}x{})", depth, width),
                duration.as_millis(),
                hit.is_some(),
                "引用: $hash:item-5",
            ));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_large_json() {
        let json = generate_large_json(2, 3);
        assert!(json.is_object());

        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("metadata"));
        assert!(obj.contains_key("data"));
        assert!(obj.contains_key("items"));
    }

    #[test]
    fn test_performance_benchmarks() {
        let json = generate_large_json(2, 5);

        // 整树物化
        let mat_result = benchmark_materialization(&json);
        assert!(mat_result.success);
        assert!(mat_result.duration_ms < 1000); // 应该在1秒内完成

        // 两条解析管线
        let json_str = serde_json::to_string(&json).unwrap();
        let parse_result = benchmark_json_parsing(&json_str);
        assert!(parse_result.success);
        assert!(parse_result.duration_ms < 1000); // 应该在1秒内完成
        let relaxed_result = benchmark_relaxed_parsing(&json_str);
        assert!(relaxed_result.success, "严格语法走JSON5管线也应该成功");
    }

    #[test]
    fn test_path_resolution_benchmark() {
        let json = generate_large_json(2, 5);
        let mut tree = Tree::new(json);
        let results = benchmark_path_resolution(&mut tree, &["/metadata", "/不存在"]);
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(!results[1].success);
    }

    #[test]
    fn test_result_summary_format() {
        let result = PerformanceResult::new("树物化", 12, true, "物化了 100 个节点");
        assert_eq!(result.summary(), "[OK] 树物化 - 12ms (物化了 100 个节点)");
    }
}
