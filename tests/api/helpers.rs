use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use cloudrun_api::{
    configuration::get_configuration,
    domain::ProjectId,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing_subscriber::fmt::{MakeWriter, writer::MakeWriterExt};

pub const TEST_PROJECT_ID: &str = "test-project";

/// In-memory sink shared by every test in this binary.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn records(&self) -> Vec<Value> {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static CAPTURED: Lazy<CapturedLogs> = Lazy::new(CapturedLogs::default);

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    let project_id = ProjectId::parse(TEST_PROJECT_ID).unwrap();

    if std::env::var("TEST_LOG").is_ok() {
        let sink = CAPTURED.clone().and(std::io::stdout);
        let subscriber = get_subscriber(subscriber_name, default_filter_level, project_id, sink);
        init_subscriber(subscriber);
    } else {
        let subscriber =
            get_subscriber(subscriber_name, default_filter_level, project_id, CAPTURED.clone());
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self.api_client.get(format!("{}{}", self.address, path));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn get_home(&self, headers: &[(&str, &str)]) -> reqwest::Response {
        self.get("/", headers).await
    }

    pub async fn get_health_check(&self) -> reqwest::Response {
        self.get("/healthz", &[]).await
    }
}

/// Log records carrying `correlation_id`, once the request's span has closed.
pub async fn request_logs(correlation_id: &str) -> Vec<Value> {
    for _ in 0..200 {
        let records: Vec<Value> = CAPTURED
            .records()
            .into_iter()
            .filter(|r| r["correlation_id"] == correlation_id)
            .collect();

        if records.iter().any(|r| r["message"] == "HTTP request completed") {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("No completed request logged for correlation id {correlation_id}");
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let config = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.app.host = "127.0.0.1".into();
        c.app.port = 0;
        c
    };

    let application = Application::build(config)
        .await
        .expect("Failed to build application.");
    let port = application.get_port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        port,
        api_client: reqwest::Client::new(),
    }
}
