//! Deserialization of fields that distinguish "absent" from "null".

use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some(value)`, keeping `null` as `Some(None)`.
///
/// Pair with `#[serde(default)]` so that a missing field stays `None`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, with = "super")]
        group: Option<Option<i64>>,
    }

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"group": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"group": 3}"#).unwrap();

        assert_eq!(absent.group, None);
        assert_eq!(null.group, Some(None));
        assert_eq!(value.group, Some(Some(3)));
    }
}
