//! 程序入口：终端演示，加载JSON文档后打印树/面包屑/表格并演练导航历史

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use serde_json::Value;
use tracing_subscriber::fmt::SubscriberBuilder;

use json_tree_table::utils::{clipboard, fs};
use json_tree_table::vm::breadcrumb::breadcrumb;
use json_tree_table::vm::table::{
    apply_row_query, build_table, default_expand, QueryResult, RowQuery, TableModel,
};
use json_tree_table::TreeState;

/// 内置示例文档（宽松语法：未加引号的键、尾随逗号），来自组件演示页
const SAMPLE_JSON: &str = r#"
{
  refundAmtMoney: "USD 15.32",
  activityHistory: [
    {
      $type: "com.example.trade.ActivityHist",
      creationDate: "2014/10/02 10:20:37",
      lastModifiedDate: "2014/10/02 10:20:37",
      runtimeContext: "t=118",
      partitionKey: 0,
      activityType: "1-buyerCreateCancel",
    },
    {
      $type: "com.example.trade.ActivityHistBoImpl",
      creationDate: "2014/10/02 11:15:13",
      lastModifiedDate: "2014/10/02 11:15:13",
      runtimeContext: "m=t=148",
      partitionKey: 0,
      activityType: "6-sellerApprove",
    }
  ]
}
"#;

/// 示例文档的默认入口路径
const SAMPLE_INITIAL_PATH: &str = "/activityHistory";

struct DemoArgs {
    file: Option<PathBuf>,
    initial_path: Option<String>,
    copy: bool,
    export: Option<PathBuf>,
}

fn parse_args() -> DemoArgs {
    let mut args = DemoArgs {
        file: None,
        initial_path: None,
        copy: false,
        export: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--copy" => args.copy = true,
            "--path" => args.initial_path = iter.next(),
            "--export" => args.export = iter.next().map(PathBuf::from),
            _ => args.file = Some(PathBuf::from(arg)),
        }
    }
    args
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let args = parse_args();

    // === 加载文档 ===
    let start = Instant::now();
    let mut tstate = match &args.file {
        Some(path) => {
            let mut state = TreeState::default();
            state
                .load_file(path)
                .with_context(|| format!("加载文件失败: {}", path.display()))?;
            state
        }
        None => {
            tracing::info!("未指定文件，使用内置示例文档");
            TreeState::new(SAMPLE_JSON)
        }
    };
    let load_ms = start.elapsed().as_millis();

    if tstate.tree.is_none() {
        println!("无数据：输入无法解析为JSON");
        return Ok(());
    }

    // === 入口选中 ===
    let initial_path = match (&args.initial_path, &args.file) {
        (Some(path), _) => Some(path.clone()),
        (None, None) => Some(SAMPLE_INITIAL_PATH.to_string()),
        (None, Some(_)) => None,
    };
    if let Some(path) = initial_path {
        tstate.select_path(&path, true);
    }

    handle_dump(&mut tstate, load_ms);
    handle_breadcrumb(&tstate);
    handle_table(&mut tstate);
    handle_navigation(&mut tstate);
    if args.copy {
        handle_copy(&tstate);
    }
    if let Some(path) = &args.export {
        handle_export(&tstate, path);
    }

    Ok(())
}

/// 打印整树缩进文本与加载统计
fn handle_dump(tstate: &mut TreeState, load_ms: u128) {
    let Some(tree) = tstate.tree.as_mut() else {
        return;
    };
    println!("=== JSON树 ===");
    print!("{}", tree.dump());
    println!("加载: {}ms | 节点: {}", load_ms, tree.node_count());
}

/// 打印当前选中的面包屑路径
fn handle_breadcrumb(tstate: &TreeState) {
    let (Some(tree), Some(selected)) = (tstate.tree.as_ref(), tstate.selected) else {
        return;
    };
    let trail = breadcrumb(tree, selected);
    let line: Vec<String> = trail
        .iter()
        .map(|item| {
            if item.active {
                format!("[{}]", item.key)
            } else {
                item.key.clone()
            }
        })
        .collect();
    println!("=== 面包屑 ===");
    println!("{}", line.join(" > "));
}

/// 为当前选中节点构建表格并按默认查询打印
fn handle_table(tstate: &mut TreeState) {
    let Some(selected) = tstate.selected else {
        return;
    };
    let Some(tree) = tstate.tree.as_mut() else {
        return;
    };
    let expanded = default_expand(tree, selected);
    let model = build_table(tree, selected, expanded);
    let query = RowQuery {
        limit: Some(20),
        ..RowQuery::default()
    };
    let result = apply_row_query(&model, &query);
    println!("=== 表格（展开: {}，{}/{}行） ===", expanded, result.rows.len(), result.total);
    print_table(&model, &result);
}

fn print_table(model: &TableModel, result: &QueryResult) {
    let header: Vec<&str> = model.columns.iter().map(|c| c.title.as_str()).collect();
    println!("{}", header.join(" | "));
    for row in &result.rows {
        println!("{}", row.cells.join(" | "));
    }
}

/// 演练选择历史：沿第一个子节点深入两级，然后后退/前进
fn handle_navigation(tstate: &mut TreeState) {
    println!("=== 导航演练 ===");
    for _ in 0..2 {
        let Some(selected) = tstate.selected else {
            return;
        };
        let Some(tree) = tstate.tree.as_mut() else {
            return;
        };
        let Some(&first) = tree.children(selected).first() else {
            break;
        };
        let path = tree.path(first);
        tstate.select_path(&path, false);
        println!("选中: {}", path);
    }
    if tstate.can_back() {
        tstate.back();
        println!("后退 -> {}", current_path(tstate));
    }
    if tstate.can_forward() {
        tstate.forward();
        println!("前进 -> {}", current_path(tstate));
    }
}

fn current_path(tstate: &TreeState) -> String {
    match (tstate.tree.as_ref(), tstate.selected) {
        (Some(tree), Some(selected)) => tree.path(selected),
        _ => "(无)".to_string(),
    }
}

/// 把当前选中节点的格式化JSON复制到系统剪贴板
fn handle_copy(tstate: &TreeState) {
    let (Some(tree), Some(selected)) = (tstate.tree.as_ref(), tstate.selected) else {
        return;
    };
    match clipboard::copy_node_json(tree, selected) {
        Ok(()) => println!("状态: 已复制到剪贴板"),
        Err(e) => {
            tracing::error!("复制失败: {}", e);
            println!("状态: 错误: {}", e);
        }
    }
}

/// 把当前选中节点的子树导出为格式化JSON文件
fn handle_export(tstate: &TreeState, path: &Path) {
    let (Some(tree), Some(selected)) = (tstate.tree.as_ref(), tstate.selected) else {
        return;
    };
    match fs::write_json_file(path, tree.value(selected).unwrap_or(&Value::Null)) {
        Ok(()) => println!("状态: 已导出到 {}", path.display()),
        Err(e) => {
            tracing::error!("导出失败: {}", e);
            println!("状态: 错误: {}", e);
        }
    }
}
