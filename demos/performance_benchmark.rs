//! 性能基准测试运行器
//!
//! 运行：cargo run --release --example performance_benchmark [-- --json]

use tracing_subscriber::fmt::SubscriberBuilder;

use json_tree_table::model::performance::run_performance_suite;

fn main() {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    tracing::info!("开始运行性能基准测试");
    let results = run_performance_suite();

    println!();
    println!("=== 基准结果汇总 ===");
    for result in &results {
        println!("{}", result.summary());
    }

    let failed = results.iter().filter(|r| !r.success).count();
    println!();
    println!("共 {} 项，失败 {} 项", results.len(), failed);

    // --json: 以JSON形式输出完整结果，方便存档比较
    if std::env::args().any(|a| a == "--json") {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("序列化结果失败: {}", e),
        }
    }
}
