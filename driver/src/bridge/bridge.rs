use crate::bridge::model::{ErrorResponse, ProcessRequest, ProcessResponse};
use crate::workflow::runner::Runner;
use log::{info, warn};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use warp::{http::StatusCode, reply, Filter};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn process(runner: &Runner, request: ProcessRequest) -> anyhow::Result<ProcessResponse> {
    let result = match request.config {
        Some(config) => Runner::new(config)?.execute_text(&request.table)?,
        None => runner.execute_text(&request.table)?,
    };
    Ok(ProcessResponse {
        status: result.output.status,
        rows: result.rows(),
        generated: result.output.generated_count,
        points: result.output.selected().points().to_vec(),
        table: result.table,
    })
}

/// Stateless HTTP front for the pipeline: every request carries its own table.
pub struct Bridge {
    runner: Arc<Runner>,
}

impl Bridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self { runner }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let health_route = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| reply::json(&json!({"status": "ok"})));

        let process_route = warp::path("process")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(runner_filter)
            .map(|request: ProcessRequest, runner: Arc<Runner>| {
                match process(&runner, request) {
                    Ok(response) => {
                        info!("process request -> {} rows", response.rows);
                        reply::with_status(reply::json(&response), StatusCode::OK)
                    }
                    Err(err) => {
                        warn!("process request failed: {:#}", err);
                        reply::with_status(
                            reply::json(&ErrorResponse {
                                error: format!("{:#}", err),
                            }),
                            StatusCode::BAD_REQUEST,
                        )
                    }
                }
            });

        health_route.or(process_route)
    }

    /// Serves the routes on a background thread with its own runtime.
    pub fn spawn(&self, address: SocketAddr) -> thread::JoinHandle<()> {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        })
    }
}
