use serde::Serialize;
use serde_json::{Map, Value};

pub fn stringify<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Serializes an optional value the way `JSON.stringify` treats `undefined`: an absent value
/// stays absent instead of becoming the string `"null"`.
pub fn stringify_optional(value: Option<&Value>) -> serde_json::Result<Option<String>> {
    value.map(stringify).transpose()
}

/// Shallow spread of `source` on top of `target`; later keys win.
pub fn spread(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringify_produces_compact_json() {
        let encoded = stringify(&json!({"value": 10})).unwrap();
        assert_eq!(encoded, r#"{"value":10}"#);
    }

    #[test]
    fn stringify_optional_keeps_absence() {
        assert_eq!(stringify_optional(None).unwrap(), None);
        assert_eq!(
            stringify_optional(Some(&Value::Null)).unwrap(),
            Some("null".to_string())
        );
    }

    #[test]
    fn spread_overrides_existing_keys() {
        let mut target = json!({"command": "logEvent", "name": "a"})
            .as_object()
            .unwrap()
            .clone();
        let source = json!({"name": "b", "extra": true}).as_object().unwrap().clone();
        spread(&mut target, &source);
        assert_eq!(
            Value::Object(target),
            json!({"command": "logEvent", "name": "b", "extra": true})
        );
    }
}
