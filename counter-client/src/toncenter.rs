// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A [`ChainReader`] talking to the JSON-RPC endpoint of a TON Center HTTP API (v2).

use std::time::Duration;

use async_trait::async_trait;
use counter_base::Address;
#[cfg(with_metrics)]
use counter_base::{
    prometheus_util::{self, MeasureLatency as _},
    sync::Lazy,
};
#[cfg(with_metrics)]
use prometheus::HistogramVec;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::rpc::{parse_number, ChainReader, RpcError, Stack, StackEntry};

#[cfg(test)]
#[path = "unit_tests/toncenter.rs"]
mod tests;

/// The JSON-RPC endpoint of the public test network API.
pub const TESTNET_ENDPOINT: &str = "https://testnet.toncenter.com/api/v2/jsonRPC";
/// The JSON-RPC endpoint of the public main network API.
pub const MAINNET_ENDPOINT: &str = "https://toncenter.com/api/v2/jsonRPC";

/// The header carrying the API key.
const API_KEY_HEADER: &str = "X-API-Key";

#[cfg(with_metrics)]
static GET_METHOD_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    prometheus_util::register_histogram_vec(
        "toncenter_get_method_latency",
        "Latency of get-method calls to the TON Center API",
        &[],
        None,
    )
    .expect("Histogram creation should not fail")
});

/// A client of the TON Center HTTP API.
#[derive(Clone, Debug)]
pub struct TonCenterClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl TonCenterClient {
    /// Creates a client sending requests to the JSON-RPC `endpoint`, giving up on requests
    /// that take longer than `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(TonCenterClient {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Returns the endpoint this client sends requests to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, request: &JsonRpcRequest<'_>) -> reqwest::RequestBuilder {
        let builder = self.http.post(&self.endpoint).json(request);
        match &self.api_key {
            Some(api_key) => builder.header(API_KEY_HEADER, api_key),
            None => builder,
        }
    }

    async fn call(&self, request: &JsonRpcRequest<'_>) -> Result<Value, RpcError> {
        let response = self
            .post(request)
            .send()
            .await?
            .json::<JsonRpcResponse>()
            .await?;
        response.into_result()
    }
}

#[async_trait]
impl ChainReader for TonCenterClient {
    #[instrument(level = "debug", skip(self, address, stack), fields(address = %address))]
    async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        stack: &[StackEntry],
    ) -> Result<Stack, RpcError> {
        #[cfg(with_metrics)]
        let latency = GET_METHOD_LATENCY.measure_latency();

        let address = address.to_string();
        let request = JsonRpcRequest::run_get_method(&address, method, stack)?;
        let result = self.call(&request).await?;

        #[cfg(with_metrics)]
        debug!(latency_ms = latency.finish(), %result, "get-method returned");
        #[cfg(not(with_metrics))]
        debug!(%result, "get-method returned");
        parse_run_result(method, result)
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    id: u64,
    jsonrpc: &'static str,
    method: &'static str,
    params: RunGetMethodParams<'a>,
}

impl<'a> JsonRpcRequest<'a> {
    fn run_get_method(
        address: &'a str,
        method: &'a str,
        stack: &[StackEntry],
    ) -> Result<Self, RpcError> {
        Ok(JsonRpcRequest {
            id: 1,
            jsonrpc: "2.0",
            method: "runGetMethod",
            params: RunGetMethodParams {
                address,
                method,
                stack: stack.iter().map(encode_argument).collect::<Result<_, _>>()?,
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct RunGetMethodParams<'a> {
    address: &'a str,
    method: &'a str,
    stack: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, RpcError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(RpcError::MalformedResponse(
                "successful response without a result".to_owned(),
            )),
            (false, _) => Err(RpcError::Node {
                code: self.code,
                message: self.error.unwrap_or_else(|| "unknown error".to_owned()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunResult {
    exit_code: i64,
    stack: Vec<(String, Value)>,
}

/// Interprets the result of a `runGetMethod` call.
fn parse_run_result(method: &str, result: Value) -> Result<Stack, RpcError> {
    let result = serde_json::from_value::<RunResult>(result)?;
    // Exit code 1 is the alternative success code of the virtual machine.
    if result.exit_code != 0 && result.exit_code != 1 {
        return Err(RpcError::ExitCode {
            method: method.to_owned(),
            exit_code: result.exit_code,
        });
    }
    result
        .stack
        .into_iter()
        .map(|(kind, value)| decode_entry(kind, value))
        .collect()
}

fn decode_entry(kind: String, value: Value) -> Result<StackEntry, RpcError> {
    match kind.as_str() {
        "num" => {
            let number = value.as_str().ok_or_else(|| {
                RpcError::MalformedResponse(format!("number entry is not a string: {value}"))
            })?;
            Ok(StackEntry::Number(parse_number(number)?))
        }
        "cell" | "slice" => {
            let bytes = value
                .get("bytes")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    RpcError::MalformedResponse(format!("{kind} entry without bytes: {value}"))
                })?
                .to_owned();
            Ok(if kind == "cell" {
                StackEntry::Cell(bytes)
            } else {
                StackEntry::Slice(bytes)
            })
        }
        "null" => Ok(StackEntry::Null),
        _ => Ok(StackEntry::Other { kind, value }),
    }
}

fn encode_argument(entry: &StackEntry) -> Result<Value, RpcError> {
    match entry {
        StackEntry::Number(number) => Ok(json!(["num", number.to_string()])),
        StackEntry::Cell(boc) => Ok(json!(["tvm.Cell", boc])),
        StackEntry::Slice(boc) => Ok(json!(["tvm.Slice", boc])),
        other => Err(RpcError::UnsupportedArgument(other.kind().to_owned())),
    }
}
