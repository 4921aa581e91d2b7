//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    prometheus: PrometheusHandle,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl MetricsHandle {
    /// 以 Prometheus 文本格式渲染当前指标
    pub fn render(&self) -> String {
        self.prometheus.render()
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let prometheus = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, prometheus.clone()).await?;

    Ok(MetricsHandle {
        prometheus,
        _server_handle: server_handle,
    })
}

fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!(
        "banner_resolutions_total",
        "Total number of banner resolutions by outcome"
    );
    metrics::describe_counter!(
        "banner_tag_replacements_total",
        "Total number of banner tag-set replacements by outcome"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录横幅解析结果（hit / miss / error）
#[inline]
pub fn record_banner_resolution(outcome: &str) {
    metrics::counter!("banner_resolutions_total", "outcome" => outcome.to_string()).increment(1);
}

/// 记录标签集合替换结果（committed / rolled_back）
#[inline]
pub fn record_tag_replacement(outcome: &str) {
    metrics::counter!("banner_tag_replacements_total", "outcome" => outcome.to_string())
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 未安装 recorder 时也不应 panic
        record_http_request("GET", "/user_banner", 200, 0.1);
        record_banner_resolution("hit");
        record_tag_replacement("committed");
    }

    // 进程内只安装一次 recorder，其余测试不得调用 init
    #[tokio::test]
    async fn test_init_exposes_recorded_metrics() {
        let config = ObservabilityConfig {
            service_name: "banner-service-test".to_string(),
            metrics_port: 0,
            ..Default::default()
        };

        let handle = init(&config).await.unwrap();
        record_banner_resolution("hit");

        let rendered = handle.render();
        assert!(rendered.contains("banner_resolutions_total"));
        assert!(rendered.contains("outcome=\"hit\""));
    }
}
