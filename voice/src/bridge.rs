//! Function bridge: maps model function calls onto the feed provider.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use skytalk_realtime::Tool;
use skytalk_timeline::{FeedProvider, render};
use tracing::debug;

pub const GET_PAGE_SUMMARY: &str = "get_page_summary";
pub const GET_POST_DETAIL: &str = "get_post_detail";

/// Outcome of a function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionStatus {
    Success,
    Error,
}

/// The payload returned to the model as the function call output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub status: FunctionStatus,
    pub message: String,
}

impl FunctionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: FunctionStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: FunctionStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FunctionStatus::Success
    }

    /// Serializes to the JSON string sent as `function_call_output.output`.
    pub fn to_output(&self) -> String {
        json!({"status": self.status, "message": self.message}).to_string()
    }
}

/// Executes the functions exposed to the model.
#[derive(Clone)]
pub struct FunctionBridge {
    provider: Arc<dyn FeedProvider>,
}

impl FunctionBridge {
    pub fn new(provider: Arc<dyn FeedProvider>) -> Self {
        Self { provider }
    }

    /// Tool declarations for `session.update`.
    pub fn tools() -> Vec<Tool> {
        vec![
            Tool::function(GET_PAGE_SUMMARY)
                .with_description("Returns a summary of the posts on the given page number.")
                .with_parameters(int_params("page", "The page number to get the summary for.")),
            Tool::function(GET_POST_DETAIL)
                .with_description(
                    "Returns detailed information about the post with the given post number.",
                )
                .with_parameters(int_params(
                    "post_number",
                    "The post number to get details for.",
                )),
        ]
    }

    /// Runs function `name` with its raw JSON `arguments`.
    ///
    /// Never fails: bad arguments, unknown names and provider errors all
    /// become error results the model can read.
    pub async fn execute(&self, name: &str, arguments: &str) -> FunctionResult {
        let Some(function) = Function::from_name(name) else {
            return FunctionResult::error(format!("Unknown function: {}", name));
        };
        let number = match parse_arguments(arguments).and_then(|args| int_arg(&args, function.arg()))
        {
            Ok(n) => n,
            Err(msg) => return FunctionResult::error(msg),
        };
        debug!(function = name, number, "executing function");

        match function {
            Function::PageSummary => match self.provider.page(number).await {
                Ok(posts) if posts.is_empty() => {
                    FunctionResult::success(format!("No posts on page {}.", number))
                }
                Ok(posts) => FunctionResult::success(render::format_page(&posts, Utc::now())),
                Err(e) => FunctionResult::error(e.to_string()),
            },
            Function::PostDetail => match self.provider.detail(number).await {
                Ok(post) => FunctionResult::success(render::format_detail(&post, Utc::now())),
                Err(e) => FunctionResult::error(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Function {
    PageSummary,
    PostDetail,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            GET_PAGE_SUMMARY => Some(Function::PageSummary),
            GET_POST_DETAIL => Some(Function::PostDetail),
            _ => None,
        }
    }

    /// The single integer argument the function takes.
    fn arg(self) -> &'static str {
        match self {
            Function::PageSummary => "page",
            Function::PostDetail => "post_number",
        }
    }
}

fn int_params(name: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name: {"type": "integer", "description": description}
        },
        "required": [name]
    })
}

fn parse_arguments(arguments: &str) -> Result<Map<String, Value>, String> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(format!("Invalid arguments: expected an object, got {}", other)),
        Err(e) => Err(format!("Invalid arguments: {}", e)),
    }
}

/// Reads an integer argument, defaulting to 1 when absent.
/// Numeric strings are accepted since models sometimes quote numbers.
fn int_arg(args: &Map<String, Value>, key: &str) -> Result<usize, String> {
    let value = match args.get(key) {
        None | Some(Value::Null) => return Ok(1),
        Some(v) => v,
    };
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("Invalid {}: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skytalk_timeline::{Author, Engagement, PostDetail, Snapshot};

    fn bridge(n: usize) -> FunctionBridge {
        let posts = (1..=n)
            .map(|i| PostDetail {
                number: 0,
                uri: format!("at://p/{}", i),
                cid: format!("cid{}", i),
                author: Author {
                    did: format!("did:plc:{}", i),
                    handle: format!("user{}.test", i),
                    display_name: Some(format!("User {}", i)),
                },
                text: format!("hello from {}", i),
                engagement: Engagement::default(),
                embed: None,
                reposted_by: None,
                created_at: None,
            })
            .collect();
        FunctionBridge::new(Arc::new(Snapshot::new(posts)))
    }

    #[test]
    fn test_tools() {
        let tools = FunctionBridge::tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, GET_PAGE_SUMMARY);
        let params = tools[1].parameters.as_ref().unwrap();
        assert_eq!(params["required"], json!(["post_number"]));
        assert_eq!(params["properties"]["post_number"]["type"], "integer");
    }

    #[tokio::test]
    async fn test_page_summary() {
        let bridge = bridge(12);
        let result = bridge.execute(GET_PAGE_SUMMARY, r#"{"page": 1}"#).await;
        assert!(result.is_success());
        assert_eq!(result.message.lines().count(), 10);
        assert!(result.message.starts_with("1. User 1 - hello from 1"));

        let page2 = bridge.execute(GET_PAGE_SUMMARY, r#"{"page": "2"}"#).await;
        assert_eq!(page2.message.lines().count(), 2);

        let empty = bridge.execute(GET_PAGE_SUMMARY, r#"{"page": 5}"#).await;
        assert_eq!(empty, FunctionResult::success("No posts on page 5."));
    }

    #[tokio::test]
    async fn test_missing_argument_defaults_to_one() {
        let bridge = bridge(3);
        let result = bridge.execute(GET_PAGE_SUMMARY, "").await;
        assert!(result.is_success());
        assert_eq!(result.message.lines().count(), 3);

        let detail = bridge.execute(GET_POST_DETAIL, "{}").await;
        assert!(detail.is_success());
        assert!(detail.message.contains("[@user1.test] User 1 - hello from 1"));
    }

    #[tokio::test]
    async fn test_errors() {
        let bridge = bridge(3);

        let missing = bridge.execute(GET_POST_DETAIL, r#"{"post_number": 999}"#).await;
        assert_eq!(missing.status, FunctionStatus::Error);
        assert_eq!(missing.message, "No post found with number 999.");

        let unknown = bridge.execute("delete_everything", "{}").await;
        assert_eq!(unknown, FunctionResult::error("Unknown function: delete_everything"));

        // The name is checked before the arguments are parsed.
        let unknown_bad_args = bridge.execute("launch", "{bad").await;
        assert_eq!(unknown_bad_args, FunctionResult::error("Unknown function: launch"));

        let garbage = bridge.execute(GET_PAGE_SUMMARY, "{not json").await;
        assert_eq!(garbage.status, FunctionStatus::Error);

        let negative = bridge.execute(GET_PAGE_SUMMARY, r#"{"page": -1}"#).await;
        assert_eq!(negative.status, FunctionStatus::Error);

        let zero = bridge.execute(GET_PAGE_SUMMARY, r#"{"page": 0}"#).await;
        assert_eq!(zero.status, FunctionStatus::Error);
    }

    #[test]
    fn test_output_shape() {
        let output = FunctionResult::error("boom").to_output();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, json!({"status": "error", "message": "boom"}));
    }
}
