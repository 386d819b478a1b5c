//! Language to endpoint table, built-in or loaded from YAML.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::ResolvedEndpoint;
use crate::{Error, ErrorContext, Result};

const DEFAULT_TOKEN: &str = "mi2stts";

static BUILTIN: Lazy<EndpointTable> = Lazy::new(|| EndpointTable {
    endpoints: vec![
        EndpointEntry {
            name: "chinese".to_string(),
            rule: LanguageMatch::Exact(vec!["chinese".to_string()]),
            port: 10015,
            token: DEFAULT_TOKEN.to_string(),
            fixed_model: Some("M60".to_string()),
        },
        EndpointEntry {
            name: "taiwanese".to_string(),
            rule: LanguageMatch::Exact(vec!["taiwanese".to_string(), "tailuo".to_string()]),
            port: 10011,
            token: DEFAULT_TOKEN.to_string(),
            fixed_model: None,
        },
        EndpointEntry {
            name: "taiwanese_sandhi".to_string(),
            rule: LanguageMatch::Exact(vec![
                "taiwanese_sandhi".to_string(),
                "tailuo_sandhi".to_string(),
            ]),
            port: 10012,
            token: DEFAULT_TOKEN.to_string(),
            fixed_model: None,
        },
        EndpointEntry {
            name: "hakka".to_string(),
            rule: LanguageMatch::Contains("hakka".to_string()),
            port: 10010,
            token: DEFAULT_TOKEN.to_string(),
            fixed_model: None,
        },
    ],
});

/// How an entry recognizes a language identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMatch {
    /// Identifier equals one of the listed names.
    Exact(Vec<String>),
    /// Identifier contains the pattern anywhere.
    Contains(String),
}

impl LanguageMatch {
    pub fn matches(&self, language: &str) -> bool {
        match self {
            Self::Exact(names) => names.iter().any(|n| n == language),
            Self::Contains(pattern) => language.contains(pattern.as_str()),
        }
    }
}

/// One server channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub name: String,
    #[serde(rename = "match", with = "serde_yaml::with::singleton_map")]
    pub rule: LanguageMatch,
    pub port: u16,
    pub token: String,
    /// When set, the caller's model is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_model: Option<String>,
}

/// Ordered endpoint table. The first matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTable {
    pub endpoints: Vec<EndpointEntry>,
}

impl EndpointTable {
    /// The table the public HTS service is deployed with.
    pub fn builtin() -> &'static EndpointTable {
        &BUILTIN
    }

    /// Parse and validate a table from YAML.
    ///
    /// ```yaml
    /// endpoints:
    ///   - name: chinese
    ///     match: { exact: [chinese] }
    ///     port: 10015
    ///     token: mi2stts
    ///     fixed_model: M60
    ///   - name: hakka
    ///     match: { contains: hakka }
    ///     port: 10010
    ///     token: mi2stts
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let table: EndpointTable = serde_yaml::from_str(content).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid endpoint table: {}", e),
                ErrorContext::new().with_source("endpoint_table"),
            )
        })?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to read endpoint table: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("endpoint_table"),
            )
        })?;
        let table = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            entries = table.endpoints.len(),
            "loaded endpoint table"
        );
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(invalid_entry("endpoints", "table has no entries"));
        }
        for (i, entry) in self.endpoints.iter().enumerate() {
            let field = |name: &str| format!("endpoints[{}].{}", i, name);
            match &entry.rule {
                LanguageMatch::Exact(names) if names.is_empty() => {
                    return Err(invalid_entry(field("match"), "exact list is empty"));
                }
                LanguageMatch::Exact(names) if names.iter().any(|n| n.is_empty()) => {
                    return Err(invalid_entry(field("match"), "exact name is empty"));
                }
                LanguageMatch::Contains(pattern) if pattern.is_empty() => {
                    return Err(invalid_entry(field("match"), "contains pattern is empty"));
                }
                _ => {}
            }
            if entry.port == 0 {
                return Err(invalid_entry(field("port"), "port must be non-zero"));
            }
            if entry.token.is_empty() {
                return Err(invalid_entry(field("token"), "token is empty"));
            }
        }
        Ok(())
    }

    /// Identifiers (or patterns) this table recognizes.
    ///
    /// Exact names are listed by alias position across entries (every first
    /// alias, then every second alias, ...), followed by substring patterns.
    pub fn accepted_languages(&self) -> Vec<&str> {
        let exact: Vec<&[String]> = self
            .endpoints
            .iter()
            .filter_map(|entry| match &entry.rule {
                LanguageMatch::Exact(names) => Some(names.as_slice()),
                LanguageMatch::Contains(_) => None,
            })
            .collect();
        let depth = exact.iter().map(|names| names.len()).max().unwrap_or(0);

        let mut accepted = Vec::new();
        for position in 0..depth {
            accepted.extend(
                exact
                    .iter()
                    .filter_map(|names| names.get(position))
                    .map(String::as_str),
            );
        }
        accepted.extend(self.endpoints.iter().filter_map(|entry| match &entry.rule {
            LanguageMatch::Contains(pattern) => Some(pattern.as_str()),
            LanguageMatch::Exact(_) => None,
        }));
        accepted
    }

    pub fn lookup(&self, language: &str) -> Option<&EndpointEntry> {
        self.endpoints.iter().find(|e| e.rule.matches(language))
    }

    /// Resolve `language` to a port, token and model. No network I/O.
    pub fn resolve(&self, language: &str, model: &str) -> Result<ResolvedEndpoint> {
        let entry = self.lookup(language).ok_or_else(|| {
            Error::configuration_with_context(
                format!(
                    "language must be one of {}",
                    self.accepted_languages().join(", ")
                ),
                ErrorContext::new()
                    .with_field_path("language")
                    .with_details(format!("got '{}'", language)),
            )
        })?;
        let model = entry.fixed_model.as_deref().unwrap_or(model);
        let resolved = ResolvedEndpoint::new(language, entry.port, entry.token.as_str(), model);
        tracing::debug!(
            language,
            entry = %entry.name,
            port = resolved.port(),
            model = resolved.model(),
            mode = ?resolved.mode(),
            "resolved endpoint"
        );
        Ok(resolved)
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn invalid_entry(field: impl Into<String>, details: &str) -> Error {
    Error::configuration_with_context(
        "Invalid endpoint table",
        ErrorContext::new()
            .with_field_path(field)
            .with_details(details)
            .with_source("endpoint_table"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::ResponseMode;

    #[test]
    fn test_chinese_always_uses_m60() {
        let table = EndpointTable::builtin();
        for model in ["M10", "F01", ""] {
            let resolved = table.resolve("chinese", model).unwrap();
            assert_eq!(resolved.model(), "M60");
            assert_eq!(resolved.port(), 10015);
        }
    }

    #[test]
    fn test_taiwanese_aliases_share_endpoint() {
        let table = EndpointTable::builtin();
        let a = table.resolve("taiwanese", "M10").unwrap();
        let b = table.resolve("tailuo", "M10").unwrap();
        assert_eq!((a.port(), a.token()), (b.port(), b.token()));
        assert_eq!(a.model(), "M10");
        assert_eq!(b.model(), "M10");
    }

    #[test]
    fn test_sandhi_is_distinct_from_taiwanese() {
        let table = EndpointTable::builtin();
        let a = table.resolve("taiwanese_sandhi", "X").unwrap();
        let b = table.resolve("tailuo_sandhi", "X").unwrap();
        let plain = table.resolve("taiwanese", "X").unwrap();
        assert_eq!((a.port(), a.token()), (b.port(), b.token()));
        assert_ne!(a.port(), plain.port());
    }

    #[test]
    fn test_hakka_substring_match() {
        let resolved = EndpointTable::builtin()
            .resolve("some_hakka_variant", "X")
            .unwrap();
        assert_eq!(resolved.port(), 10010);
        assert_eq!(resolved.model(), "X");
        assert_eq!(resolved.mode(), ResponseMode::Stream);
    }

    #[test]
    fn test_pinyin_language_uses_text_mode() {
        let resolved = EndpointTable::builtin()
            .resolve("hakka_pinyin", "X")
            .unwrap();
        assert_eq!(resolved.mode(), ResponseMode::Text);
    }

    #[test]
    fn test_exact_match_is_not_a_prefix_match() {
        let err = EndpointTable::builtin()
            .resolve("taiwanese2", "M10")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_unknown_language_lists_accepted_names() {
        let err = EndpointTable::builtin()
            .resolve("unknown_language", "X")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("language must be one of"));
        for name in [
            "chinese",
            "taiwanese",
            "taiwanese_sandhi",
            "tailuo",
            "tailuo_sandhi",
            "hakka",
        ] {
            assert!(msg.contains(name), "missing {name} in {msg}");
        }
        assert_eq!(err.context().unwrap().field_path.as_deref(), Some("language"));
    }

    #[test]
    fn test_unknown_language_message_for_builtin_table() {
        match EndpointTable::builtin().resolve("klingon", "X").unwrap_err() {
            Error::Configuration { message, .. } => assert_eq!(
                message,
                "language must be one of chinese, taiwanese, taiwanese_sandhi, tailuo, tailuo_sandhi, hakka"
            ),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_map_form_for_match_rules() {
        let yaml = r#"
endpoints:
  - name: chinese
    match: { exact: [chinese] }
    port: 10015
    token: mi2stts
    fixed_model: M60
  - name: hakka
    match:
      contains: hakka
    port: 10010
    token: mi2stts
"#;
        let table = EndpointTable::from_yaml_str(yaml).unwrap();
        assert_eq!(
            table.endpoints[0].rule,
            LanguageMatch::Exact(vec!["chinese".to_string()])
        );
        assert_eq!(table.endpoints[1].rule, LanguageMatch::Contains("hakka".to_string()));
        assert_eq!(table.resolve("hakka_pinyin", "F01").unwrap().port(), 10010);
    }

    #[test]
    fn test_serialized_table_uses_map_form() {
        let yaml = serde_yaml::to_string(EndpointTable::builtin()).unwrap();
        assert!(yaml.contains("exact:"), "{yaml}");
        assert!(yaml.contains("contains: hakka"), "{yaml}");
        assert!(!yaml.contains('!'), "{yaml}");
    }

    #[test]
    fn test_yaml_table_replaces_builtin() {
        let yaml = r#"
endpoints:
  - name: local
    match: { exact: [chinese] }
    port: 9000
    token: secret
"#;
        let table = EndpointTable::from_yaml_str(yaml).unwrap();
        let resolved = table.resolve("chinese", "F01").unwrap();
        assert_eq!(resolved.port(), 9000);
        assert_eq!(resolved.token(), "secret");
        assert_eq!(resolved.model(), "F01");
        assert!(table.resolve("hakka", "F01").is_err());
    }

    #[test]
    fn test_yaml_table_rejects_zero_port() {
        let yaml = r#"
endpoints:
  - name: broken
    match: { contains: hakka }
    port: 0
    token: secret
"#;
        let err = EndpointTable::from_yaml_str(yaml).unwrap_err();
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("endpoints[0].port"));
    }

    #[test]
    fn test_yaml_table_rejects_empty_table() {
        let err = EndpointTable::from_yaml_str("endpoints: []").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_builtin_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(EndpointTable::builtin()).unwrap();
        let parsed = EndpointTable::from_yaml_str(&yaml).unwrap();
        assert_eq!(&parsed, EndpointTable::builtin());
    }
}
