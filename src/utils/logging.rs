/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`；未设置时默认 info，`verbose` 为 true 时本 crate 输出 debug
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,ai_scraper=debug,tower_http=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 测试中可能被多次调用，重复初始化直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 AI 抓取服务启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📡 监听地址: {}", config.bind_addr);
    info!("🧠 LLM 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!(
        "🔁 最多尝试 {} 次, 成功阈值 {:.0}%",
        config.tuning.max_attempts,
        config.tuning.success_threshold * 100.0
    );
    if !config.has_llm_credentials() {
        info!("⚠️ 未配置 LLM_API_KEY，抓取请求将返回错误");
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本，超出部分以 "..." 表示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
