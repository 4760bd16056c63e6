//! Custom serde helpers for API wire formats.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Deserializes an identifier sent either as a JSON number or a string.
///
/// Large post ids exceed the range JavaScript clients handle, so the API
/// sends some of them as strings (`id_string`) and others as bare numbers.
/// Both become the decimal string; `null` becomes the empty string.
pub fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Deserializes an explicit `null` as the type's default value.
///
/// `#[serde(default)]` only covers absent keys; the API also sends `null`
/// for empty strings, lists and counters.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "super::number_or_string")]
        id: String,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Nullable {
        #[serde(deserialize_with = "super::null_default")]
        tags: Vec<String>,
        #[serde(deserialize_with = "super::null_default")]
        count: i64,
    }

    #[test]
    fn test_number_or_string() {
        let w: Wrapper = serde_json::from_str(r#"{"id": 719366524427616256}"#).unwrap();
        assert_eq!(w.id, "719366524427616256");
        let w: Wrapper = serde_json::from_str(r#"{"id": "719366524427616256"}"#).unwrap();
        assert_eq!(w.id, "719366524427616256");
        let w: Wrapper = serde_json::from_str(r#"{"id": -3}"#).unwrap();
        assert_eq!(w.id, "-3");
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": 1.5}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": [1]}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id": {}}"#).is_err());
    }

    #[test]
    fn test_null_id_is_empty() {
        let w: Wrapper = serde_json::from_str(r#"{"id": null}"#).unwrap();
        assert_eq!(w.id, "");
    }

    #[test]
    fn test_null_default() {
        let n: Nullable = serde_json::from_str(r#"{"tags": null, "count": null}"#).unwrap();
        assert!(n.tags.is_empty());
        assert_eq!(n.count, 0);

        let n: Nullable = serde_json::from_str(r#"{"tags": ["a"]}"#).unwrap();
        assert_eq!(n.tags, vec!["a"]);
        assert_eq!(n.count, 0);

        assert!(serde_json::from_str::<Nullable>(r#"{"count": "x"}"#).is_err());
    }
}
