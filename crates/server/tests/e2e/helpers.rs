use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use distcalc_agent::{Agent, WorkerStats};
use distcalc_core::{AgentConfig, Config, OperationTimes};
use distcalc_server::{serve, AppState};

/// Orchestrator plus agent pool, torn down by [`Cluster::stop`].
pub struct Cluster {
    pub base_url: String,
    pub http: reqwest::Client,
    shutdown: watch::Sender<bool>,
    server: JoinHandle<std::io::Result<()>>,
    agent: JoinHandle<WorkerStats>,
}

impl Cluster {
    pub async fn start(computing_power: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let mut config = Config::default();
        config.operations = OperationTimes::uniform(5);
        config.server.queue_report_interval_secs = 1;
        let state = Arc::new(AppState::new(config));

        let (shutdown, rx) = watch::channel(false);
        let server = tokio::spawn(serve(listener, state, rx.clone()));

        let agent_config = AgentConfig {
            computing_power,
            orchestrator_url: base_url.clone(),
            idle_backoff_ms: 10,
            request_timeout_ms: 2000,
        };
        let agent = tokio::spawn(Agent::connect(agent_config).unwrap().run(rx));

        Self {
            base_url,
            http: reqwest::Client::new(),
            shutdown,
            server,
            agent,
        }
    }

    pub async fn submit(&self, expression: &str) -> (u16, Value) {
        let resp = self
            .http
            .post(format!("{}/api/v1/calculate", self.base_url))
            .json(&json!({ "expression": expression }))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    pub async fn expression(&self, id: &str) -> Value {
        let resp = self
            .http
            .get(format!("{}/api/v1/expressions/{}", self.base_url, id))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        body["expression"].clone()
    }

    /// Poll until the expression reaches `status` or the deadline passes.
    pub async fn wait_for_status(&self, id: &str, status: &str) -> Value {
        let mut last = Value::Null;
        for _ in 0..500 {
            last = self.expression(id).await;
            if last["status"] == status {
                return last;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expression {} never reached {}: {}", id, status, last);
    }

    pub async fn health(&self) -> Value {
        self.http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn stop(self) -> WorkerStats {
        self.shutdown.send(true).unwrap();
        self.server.await.unwrap().unwrap();
        self.agent.await.unwrap()
    }
}
