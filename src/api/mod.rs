mod params;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{SimulationParameters, SimulationResult, simulate, simulate_with_rng};

pub use params::ParameterError;
use params::{Cli, SimulatePayload, api_request_from_payload, build_parameters};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error(transparent)]
    Parameters(#[from] ParameterError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse<'a> {
    parameters: &'a SimulationParameters,
    result: &'a SimulationResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Parses `args` (first element is the program name), runs one projection and
/// returns the pretty-printed JSON response.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let params = build_parameters(&cli)?;

    let result = match cli.seed {
        Some(seed) => simulate_with_rng(&params, &mut ChaCha8Rng::seed_from_u64(seed)),
        None => simulate(&params),
    };
    info!(
        mode = ?params.simulation_mode,
        seed = ?cli.seed,
        fire_number = ?result.fire_number,
        "simulation finished"
    );

    let response = SimulateResponse {
        parameters: &params,
        result: &result,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE projection API listening");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    query: Result<Query<SimulatePayload>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(payload)) => simulate_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn simulate_post_handler(
    body: Result<Json<SimulatePayload>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(reason: &str) -> Response {
    warn!(reason, "undecodable simulate request");
    error_response(StatusCode::BAD_REQUEST, reason)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let params = match api_request_from_payload(payload) {
        Ok(params) => params,
        Err(err) => {
            warn!(%err, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let result = simulate(&params);
    debug!(
        mode = ?params.simulation_mode,
        records = result.yearly_records.len(),
        fire_number = ?result.fire_number,
        "simulate request served"
    );

    json_response(
        StatusCode::OK,
        SimulateResponse {
            parameters: &params,
            result: &result,
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
