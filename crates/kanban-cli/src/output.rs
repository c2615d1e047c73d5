use kanban_core::{ApiResult, ErrorKind, NormalizedError};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub title: String,
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

fn to_json<T: Serialize>(response: &CliResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"api_version":"{}","error":{{"message":"Failed to encode output: {}","status":null,"title":"Erreur"}}}}"#,
            env!("CARGO_PKG_VERSION"),
            e
        )
    })
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    println!("{}", to_json(&response));
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    let count = items.len();
    let list = ListResponse { items, count };
    output_success(list);
}

fn exit_with(error: ErrorBody) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(error),
    };
    eprintln!("{}", to_json(&response));
    std::process::exit(1);
}

/// Prints a local (non-remote) failure to stderr and exits with code 1.
pub fn output_error(message: &str) -> ! {
    exit_with(ErrorBody {
        kind: None,
        message: message.to_string(),
        status: None,
        details: None,
        title: "Erreur".to_string(),
    })
}

/// Prints a remote failure, with its presentation title, and exits with code 1.
pub fn output_api_error(error: &NormalizedError) -> ! {
    exit_with(ErrorBody {
        kind: Some(error.kind),
        message: error.message.clone(),
        status: error.status,
        details: error.details.clone(),
        title: error.presentation().title,
    })
}

/// The value on success; otherwise print the error and exit.
pub fn or_exit<T>(result: ApiResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => output_api_error(&e),
    }
}
