//! Chain-agnostic views of fullnode responses.

use crate::error::ChainError;
use crate::shared::ObjectIdStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Type and ownership of one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    pub object_id: ObjectIdStr,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// The owner as the node reports it.
    pub owner: Value,
    /// Initial shared version, for shared objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_version: Option<u64>,
}

impl ObjectSummary {
    pub fn is_shared(&self) -> bool {
        self.shared_version.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinSummary {
    pub coin_object_id: ObjectIdStr,
    pub balance: u64,
}

// ── Dev-inspect ─────────────────────────────────────────────────────────────

/// One BCS-encoded return value of a Move call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    pub bytes: Vec<u8>,
    pub type_tag: String,
}

impl ReturnValue {
    pub fn new(bytes: Vec<u8>, type_tag: &str) -> Self {
        Self {
            bytes,
            type_tag: type_tag.to_string(),
        }
    }

    /// BCS-encode `value` as if a Move call had returned it.
    pub fn encode<T: Serialize>(value: &T, type_tag: &str) -> Result<Self, ChainError> {
        let bytes = bcs::to_bytes(value).map_err(|e| ChainError::Inspect(e.to_string()))?;
        Ok(Self::new(bytes, type_tag))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ChainError> {
        bcs::from_bytes(&self.bytes)
            .map_err(|e| ChainError::Inspect(format!("decode {}: {}", self.type_tag, e)))
    }
}

/// Return values of a dev-inspected draft, indexed by draft step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectResults {
    steps: Vec<Vec<ReturnValue>>,
}

impl InspectResults {
    pub fn new(steps: Vec<Vec<ReturnValue>>) -> Self {
        Self { steps }
    }

    /// Parse a `devInspectTransactionBlock` response. `step_commands[i]` is
    /// the command index whose results belong to draft step `i`.
    pub fn from_dev_inspect(value: &Value, step_commands: &[usize]) -> Result<Self, ChainError> {
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(ChainError::Inspect(error.to_string()));
        }
        let commands = value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let parsed: Vec<Vec<ReturnValue>> = commands
            .iter()
            .map(|command| {
                command
                    .get("returnValues")
                    .and_then(Value::as_array)
                    .map(|values| values.iter().filter_map(parse_return_value).collect())
                    .unwrap_or_default()
            })
            .collect();

        let steps = step_commands
            .iter()
            .map(|&c| parsed.get(c).cloned().unwrap_or_default())
            .collect();
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Return value `index` of draft step `step`.
    pub fn value(&self, step: usize, index: usize) -> Result<&ReturnValue, ChainError> {
        self.steps
            .get(step)
            .and_then(|values| values.get(index))
            .ok_or_else(|| {
                ChainError::Inspect(format!("step {} has no return value {}", step, index))
            })
    }

    /// Decode return value `index` of draft step `step`.
    pub fn decode<T: DeserializeOwned>(&self, step: usize, index: usize) -> Result<T, ChainError> {
        self.value(step, index)?.decode()
    }
}

/// `[[bytes…], "type"]`
fn parse_return_value(value: &Value) -> Option<ReturnValue> {
    let pair = value.as_array()?;
    let bytes = pair
        .first()?
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect::<Option<Vec<u8>>>()?;
    let type_tag = pair.get(1).and_then(Value::as_str).unwrap_or_default();
    Some(ReturnValue::new(bytes, type_tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dev_inspect_results_indexed_by_step() {
        let mid = bcs::to_bytes(&1_230_000u64).unwrap();
        let v = json!({
            "effects": {},
            "results": [
                {"returnValues": []},
                {"returnValues": [[mid, "u64"]]}
            ]
        });
        // Step 0 compiled to command 1.
        let r = InspectResults::from_dev_inspect(&v, &[1]).unwrap();
        assert_eq!(r.decode::<u64>(0, 0).unwrap(), 1_230_000);
        assert!(r.value(0, 1).is_err());
    }

    #[test]
    fn test_dev_inspect_error_surfaces() {
        let v = json!({"error": "MoveAbort in pool::mid_price"});
        match InspectResults::from_dev_inspect(&v, &[0]) {
            Err(ChainError::Inspect(msg)) => assert!(msg.contains("mid_price")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_vector_u128_round_trip() {
        let ids: Vec<u128> = vec![1, u128::MAX];
        let rv = ReturnValue::encode(&ids, "vector<u128>").unwrap();
        assert_eq!(rv.decode::<Vec<u128>>().unwrap(), ids);
    }
}
