use std::future::IntoFuture;

use cutout_backend::{AppConfig, AppState, build_router, shutdown, startup};
use tokio::sync::oneshot;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.default_filter().into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format.eq_ignore_ascii_case("compact") {
        builder.compact().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // 先加载 .env，使 REPLICATE_API_TOKEN 等变量对配置加载可见
    let dotenv_loaded = dotenv::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            // 日志尚未初始化，只能直接输出到 stderr
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);
    if let Some(path) = dotenv_loaded {
        tracing::info!("已加载环境文件: {:?}", path);
    }

    // 凭据缺失只告警，逐请求再校验
    startup::run_startup_checks(&config);

    let state = match AppState::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("应用状态初始化失败: {}", e);
            std::process::exit(1);
        }
    };
    let app = build_router(&config, state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Upstream: {}", config.upstream.base_url);

    // 收到信号后通知超时计时器；在途请求最多再等待 shutdown.timeout_secs
    let (signal_tx, signal_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown::wait_for_signal().await;
            tracing::info!("开始优雅关闭HTTP服务器...");
            let _ = signal_tx.send(());
        })
        .into_future();

    let shutdown_timeout = config.shutdown.timeout_duration();
    let deadline = async move {
        if signal_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = deadline => {
            tracing::warn!(
                "优雅退出超时（{}秒），放弃等待在途请求",
                config.shutdown.timeout_secs
            );
        }
    }
}
