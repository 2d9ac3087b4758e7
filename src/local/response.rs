use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CODE_SUCCESS: u16 = 200;
pub const CODE_ERROR: u16 = 500;

/// Uniform result envelope returned by every local data call.
///
/// Serializes as `{"code": .., "message": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: u16,
    pub message: String,
    pub data: Value,
}

impl Response {
    pub fn new(code: u16, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn success(data: impl Into<Value>) -> Self {
        Self::new(CODE_SUCCESS, "success", data.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CODE_ERROR, message, Value::Null)
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape() {
        let value = serde_json::to_value(Response::success("abc")).unwrap();
        assert_eq!(value, json!({"code": 200, "message": "success", "data": "abc"}));

        let value = serde_json::to_value(Response::error("boom")).unwrap();
        assert_eq!(value, json!({"code": 500, "message": "boom", "data": null}));
    }
}
