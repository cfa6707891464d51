use std::collections::{HashMap, HashSet};

use claims::assert_some;
use uuid::Uuid;

use crate::helpers::{TEST_PROJECT_ID, request_logs, spawn_app};

#[tokio::test]
async fn supplied_correlation_id_is_echoed_and_logged() {
    let app = spawn_app().await;
    let correlation_id = format!("abc-{}", Uuid::new_v4());

    let response = app
        .get_home(&[("X-Correlation-ID", correlation_id.as_str())])
        .await;

    assert_eq!(
        response.headers()["x-correlation-id"].to_str().unwrap(),
        correlation_id
    );

    let records = request_logs(&correlation_id).await;
    let messages: HashSet<&str> = records
        .iter()
        .filter_map(|r| r["message"].as_str())
        .collect();
    assert!(messages.contains("Root endpoint accessed"));
    assert!(messages.contains("Processing root endpoint request completed"));

    let completed = records
        .iter()
        .find(|r| r["message"] == "HTTP request completed")
        .unwrap();
    assert_eq!(completed["severity"], "INFO");
    assert_eq!(completed["http.status_code"], 200);
    assert_eq!(completed["service"], "test");
}

#[tokio::test]
async fn missing_correlation_id_falls_back_to_the_request_id() {
    let app = spawn_app().await;

    let response = app.get_health_check().await;

    let correlation_id = response.headers()["x-correlation-id"]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(!correlation_id.is_empty());

    let records = request_logs(&correlation_id).await;
    for record in &records {
        assert_eq!(record["request_id"], correlation_id.as_str());
    }
}

#[tokio::test]
async fn inbound_trace_context_is_attached_to_request_logs() {
    let app = spawn_app().await;
    let correlation_id = Uuid::new_v4().to_string();

    app.get_home(&[
        ("X-Correlation-ID", correlation_id.as_str()),
        (
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        ),
    ])
    .await;

    let records = request_logs(&correlation_id).await;
    let expected_trace =
        format!("projects/{TEST_PROJECT_ID}/traces/4bf92f3577b34da6a3ce929d0e0e4736");
    for record in &records {
        assert_eq!(record["logging.googleapis.com/trace"], expected_trace.as_str());
        assert_eq!(record["logging.googleapis.com/trace_sampled"], true);
        assert_eq!(record["logging.googleapis.com/spanId"], "00f067aa0ba902b7");
    }
}

#[tokio::test]
async fn untraced_requests_omit_trace_fields() {
    let app = spawn_app().await;
    let correlation_id = Uuid::new_v4().to_string();

    app.get_home(&[("X-Correlation-ID", correlation_id.as_str())])
        .await;

    for record in request_logs(&correlation_id).await {
        let record = record.as_object().unwrap();
        assert!(!record.contains_key("logging.googleapis.com/trace"));
        assert!(!record.contains_key("logging.googleapis.com/trace_sampled"));
        assert!(!record.contains_key("logging.googleapis.com/spanId"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_keep_their_own_correlation_id() {
    let app = spawn_app().await;
    let ids: Vec<String> = (0..20).map(|_| Uuid::new_v4().to_string()).collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let client = app.api_client.clone();
            let url = format!("{}/", app.address);
            tokio::spawn(async move {
                let response = client
                    .get(url)
                    .header("X-Correlation-ID", id.as_str())
                    .send()
                    .await
                    .expect("Failed to execute request.");
                (id, response)
            })
        })
        .collect();

    for handle in handles {
        let (id, response) = handle.await.unwrap();
        assert_eq!(response.headers()["x-correlation-id"].to_str().unwrap(), id);
    }

    let mut request_ids: HashMap<String, String> = HashMap::new();
    for id in &ids {
        let records = request_logs(id).await;
        let owners: HashSet<&str> = records
            .iter()
            .filter_map(|r| r["request_id"].as_str())
            .collect();
        assert_eq!(owners.len(), 1, "{id} was logged under several requests");

        let request_id = assert_some!(owners.into_iter().next()).to_owned();
        assert!(
            request_ids.insert(request_id, id.clone()).is_none(),
            "two correlation ids shared one request"
        );
    }
}
