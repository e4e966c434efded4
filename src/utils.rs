use serde_json::Value;

/// Renders a bucket key the way it is compared and joined into path keys.
///
/// Floating point keys drop a trailing `.0`, so a histogram bucket keyed `100.0`
/// renders as `100`.
pub fn json_to_string(key: &Value) -> Option<String> {
    match key {
        Value::Null => None,
        Value::Bool(b) => Some(if *b {
            "true".to_string()
        } else {
            "false".to_string()
        }),
        Value::Number(n) => Some(match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        }),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::json_to_string;
    use serde_json::json;

    #[test]
    fn test_json_to_string_scalars() {
        assert_eq!(json_to_string(&json!("ios")), Some("ios".to_string()));
        assert_eq!(json_to_string(&json!("")), Some(String::new()));
        assert_eq!(json_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(json_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(json_to_string(&json!(-3)), Some("-3".to_string()));
    }

    #[test]
    fn test_json_to_string_floats() {
        assert_eq!(json_to_string(&json!(100.0)), Some("100".to_string()));
        assert_eq!(json_to_string(&json!(2.5)), Some("2.5".to_string()));
    }

    #[test]
    fn test_json_to_string_unsupported() {
        assert_eq!(json_to_string(&json!(null)), None);
        assert_eq!(json_to_string(&json!([1, 2])), None);
        assert_eq!(json_to_string(&json!({"a": 1})), None);
    }
}
