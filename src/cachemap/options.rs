//! Cache mount option values
//!
//! A cache map value is either a bare target path string or a structured
//! record with a required `target` plus an open set of extra mount options
//! (`id`, `uid`, `gid`, `sharing`, ...). The two shapes are an explicit
//! tagged variant here rather than runtime shape inspection.

use crate::error::{MuleError, MuleResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Options for a single cache mount, as configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CacheOptions {
    /// Bare target path, no explicit identity or extra options
    Target(String),

    /// Structured options: required target plus extra mount options
    Options(MountOptions),
}

/// Structured mount options with extras kept in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountOptions {
    /// Container-internal mount path
    pub target: String,
    /// Extra mount options, appended to the mount argument verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CacheOptions {
    /// Structured options from a target and extra option pairs.
    pub fn structured(target: impl Into<String>, extra: Map<String, Value>) -> Self {
        Self::Options(MountOptions {
            target: target.into(),
            extra,
        })
    }

    /// Parse a cache map value from its JSON form.
    ///
    /// `key` is the cache map key, used only for error reporting.
    pub fn from_value(key: &str, value: Value) -> MuleResult<Self> {
        match value {
            Value::String(target) => Ok(Self::Target(target)),
            Value::Object(mut map) => {
                let target = match map.shift_remove("target") {
                    Some(Value::String(t)) => t,
                    Some(_) => {
                        return Err(MuleError::config(format!(
                            "entry '{key}': 'target' must be a string"
                        )))
                    }
                    None => {
                        return Err(MuleError::ConfigMissingTarget {
                            key: key.to_string(),
                        })
                    }
                };
                Ok(Self::structured(target, map))
            }
            other => Err(MuleError::config(format!(
                "entry '{key}': expected a target string or an options object, got {other}"
            ))),
        }
    }

    /// The container-internal mount path.
    pub fn target(&self) -> &str {
        match self {
            Self::Target(t) => t,
            Self::Options(opts) => &opts.target,
        }
    }

    /// Render the full BuildKit mount argument string,
    /// e.g. `type=cache,target=/go/pkg/mod,id=go-mod`.
    ///
    /// Extra options are appended verbatim in configuration order.
    pub fn mount_args(&self) -> String {
        let mut args = format!("type=cache,target={}", self.target());
        if let Self::Options(opts) = self {
            for (k, v) in &opts.extra {
                args.push(',');
                args.push_str(k);
                args.push('=');
                args.push_str(&scalar_to_string(v));
            }
        }
        args
    }

    /// Look up an extra option as a string, if present.
    pub fn extra(&self, name: &str) -> Option<String> {
        match self {
            Self::Target(_) => None,
            Self::Options(opts) => opts.extra.get(name).map(scalar_to_string),
        }
    }

    /// Ownership fixup values, when both `uid` and `gid` are configured.
    pub fn uid_gid(&self) -> Option<(String, String)> {
        Some((self.extra("uid")?, self.extra("gid")?))
    }
}

/// Render a JSON scalar the way it appears in a mount argument:
/// strings without quotes, numbers and booleans as written.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_target_string() {
        let opts = CacheOptions::from_value("apt", json!("/var/cache/apt")).unwrap();
        assert_eq!(opts, CacheOptions::Target("/var/cache/apt".to_string()));
        assert_eq!(opts.target(), "/var/cache/apt");
        assert_eq!(opts.mount_args(), "type=cache,target=/var/cache/apt");
    }

    #[test]
    fn structured_options() {
        let opts = CacheOptions::from_value(
            "go-mod",
            json!({"target": "/go/pkg/mod", "id": "go-mod", "sharing": "locked"}),
        )
        .unwrap();
        assert_eq!(opts.target(), "/go/pkg/mod");
        assert_eq!(
            opts.mount_args(),
            "type=cache,target=/go/pkg/mod,id=go-mod,sharing=locked"
        );
    }

    #[test]
    fn extra_option_order_preserved() {
        let opts = CacheOptions::from_value(
            "x",
            json!({"target": "/t", "uid": 1000, "gid": 1000, "id": "x"}),
        )
        .unwrap();
        assert_eq!(opts.mount_args(), "type=cache,target=/t,uid=1000,gid=1000,id=x");
    }

    #[test]
    fn numeric_and_bool_options() {
        let opts =
            CacheOptions::from_value("x", json!({"target": "/t", "uid": 1000, "ro": true}))
                .unwrap();
        assert_eq!(opts.extra("uid").as_deref(), Some("1000"));
        assert_eq!(opts.extra("ro").as_deref(), Some("true"));
        assert_eq!(opts.uid_gid(), None);
    }

    #[test]
    fn uid_gid_pair() {
        let opts = CacheOptions::from_value(
            "x",
            json!({"target": "/t", "uid": "1001", "gid": "1001"}),
        )
        .unwrap();
        assert_eq!(
            opts.uid_gid(),
            Some(("1001".to_string(), "1001".to_string()))
        );
    }

    #[test]
    fn missing_target_fails() {
        let err = CacheOptions::from_value("go-mod", json!({"id": "go-mod"})).unwrap_err();
        assert!(matches!(err, MuleError::ConfigMissingTarget { key } if key == "go-mod"));
    }

    #[test]
    fn non_string_target_fails() {
        assert!(CacheOptions::from_value("x", json!({"target": 7})).is_err());
    }

    #[test]
    fn unsupported_shape_fails() {
        assert!(CacheOptions::from_value("x", json!(42)).is_err());
        assert!(CacheOptions::from_value("x", json!(["a"])).is_err());
    }

    #[test]
    fn serializes_like_input() {
        let bare = CacheOptions::Target("/t".to_string());
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!("/t"));

        let structured =
            CacheOptions::from_value("x", json!({"target": "/t", "id": "x"})).unwrap();
        assert_eq!(
            serde_json::to_value(&structured).unwrap(),
            json!({"target": "/t", "id": "x"})
        );
    }
}
