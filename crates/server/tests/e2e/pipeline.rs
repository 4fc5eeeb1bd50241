use std::time::Duration;

use crate::helpers::Cluster;

#[tokio::test]
async fn workers_complete_submitted_expressions() {
    let cluster = Cluster::start(3).await;

    let cases = [
        ("1+1", 2.0),
        ("(1+2)*3", 9.0),
        ("2 + 2 * 2 - 10 / 4", 3.5),
        ("-(4 - 6) * (1.5 + 0.5)", 4.0),
        ("42", 42.0),
    ];
    let mut ids = Vec::new();
    for (text, _) in &cases {
        let (status, body) = cluster.submit(text).await;
        assert_eq!(status, 201);
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    for (id, (text, expected)) in ids.iter().zip(cases.iter()) {
        let view = cluster.wait_for_status(id, "completed").await;
        assert_eq!(view["expression"], *text);
        assert_eq!(view["result"].as_f64(), Some(*expected), "{}", text);
    }

    let health = cluster.health().await;
    assert_eq!(health["pending_tasks"], 0);
    assert_eq!(health["queued_tasks"], 0);
    assert_eq!(health["expressions"], 5);

    let stats = cluster.stop().await;
    assert!(stats.submitted >= 8);
    assert_eq!(stats.submit_failures, 0);
}

#[tokio::test]
async fn division_by_zero_stays_in_progress() {
    let cluster = Cluster::start(1).await;

    let (status, body) = cluster.submit("10/0").await;
    assert_eq!(status, 201);
    let id = body["id"].as_str().unwrap().to_string();

    let view = cluster.wait_for_status(&id, "in_progress").await;
    assert!(view.get("result").is_none());

    // Give the worker time to (not) report back.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cluster.expression(&id).await["status"], "in_progress");
    assert_eq!(cluster.health().await["pending_tasks"], 1);

    let stats = cluster.stop().await;
    assert_eq!(stats.compute_failures, 1);
    assert_eq!(stats.submitted, 0);
}

#[tokio::test]
async fn invalid_expression_is_rejected() {
    let cluster = Cluster::start(1).await;
    let (status, body) = cluster.submit("1+").await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "Invalid expression");
    assert_eq!(cluster.health().await["expressions"], 0);
    cluster.stop().await;
}
