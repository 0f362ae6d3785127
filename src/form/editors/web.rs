//! Editors for the HTTP-like types: http/https/keyword/json_query,
//! websocket, gRPC and CDN.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{
    HeaderPair, ListField, NumberInput, join_list, map_to_pairs, optional_raw, optional_text, pairs_to_map,
    parse_list,
};
use crate::monitor::MonitorType;
use crate::monitor::config::{
    Assertions, BodyAssertions, CdnConfig, GrpcConfig, HttpConfig, HttpMethod, JsonPathAssertion, WebsocketConfig,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpEditor {
    pub method: Option<HttpMethod>,
    pub headers: ListField<HeaderPair>,
    pub body: String,
    pub follow_redirects: Option<bool>,
    pub verify_tls: Option<bool>,
    pub keyword: String,
    pub keyword_inverted: Option<bool>,
    pub json_path: String,
    pub expected_value: String,
    pub assertions: AssertionsEditor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonPathInput {
    pub path: String,
    pub value: String,
}

/// Response assertions; `status_codes` is a comma/newline list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionsEditor {
    pub status_codes: String,
    pub response_time: NumberInput,
    pub headers: ListField<HeaderPair>,
    pub body_contains: String,
    pub body_not_contains: String,
    pub body_regex: String,
    pub json_path: ListField<JsonPathInput>,
}

impl AssertionsEditor {
    fn hydrate(assertions: &Assertions) -> Self {
        let body = assertions.body.clone().unwrap_or_default();
        Self {
            status_codes: assertions
                .status_code
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            response_time: NumberInput::from_optional(assertions.response_time),
            headers: assertions.headers.as_ref().map(map_to_pairs).unwrap_or_default(),
            body_contains: body.contains.unwrap_or_default(),
            body_not_contains: body.not_contains.unwrap_or_default(),
            body_regex: body.regex.unwrap_or_default(),
            json_path: body
                .json_path
                .into_iter()
                .map(|a| JsonPathInput {
                    path: a.path,
                    value: a.value,
                })
                .collect(),
        }
    }

    fn build(&self, field: &str, errors: &mut ValidationErrors) -> Option<Assertions> {
        let mut status_code = Vec::new();
        for raw in parse_list(&self.status_codes) {
            match raw.parse::<u16>() {
                Ok(code) if (100..=599).contains(&code) => status_code.push(code),
                _ => errors.push(
                    format!("{field}.statusCode"),
                    format!("'{raw}' is not an HTTP status code"),
                ),
            }
        }

        let response_time = self.response_time.read::<f64>(&format!("{field}.responseTime"));
        if response_time.is_some_and(|ms| ms <= 0.0) {
            errors.push(format!("{field}.responseTime"), "Must be greater than 0");
        }

        let headers = pairs_to_map(self.headers.as_slice());

        let body_regex = optional_raw(&self.body_regex);
        if let Some(pattern) = &body_regex {
            if let Err(e) = Regex::new(pattern) {
                errors.push(format!("{field}.body.regex"), format!("Invalid regular expression: {e}"));
            }
        }

        let mut json_path = Vec::new();
        for (index, row) in self.json_path.iter().enumerate() {
            match (optional_text(&row.path), optional_text(&row.value)) {
                (Some(path), Some(value)) => json_path.push(JsonPathAssertion { path, value }),
                (None, None) => {}
                (None, Some(_)) => errors.push(format!("{field}.body.jsonPath[{index}].path"), "Path is required"),
                (Some(_), None) => errors.push(format!("{field}.body.jsonPath[{index}].value"), "Value is required"),
            }
        }

        let body = BodyAssertions {
            contains: optional_raw(&self.body_contains),
            not_contains: optional_raw(&self.body_not_contains),
            regex: body_regex,
            json_path,
        };
        let body = (body != BodyAssertions::default()).then_some(body);

        let assertions = Assertions {
            status_code,
            response_time,
            headers: (!headers.is_empty()).then_some(headers),
            body,
        };
        (assertions != Assertions::default()).then_some(assertions)
    }
}

impl ConfigEditor for HttpEditor {
    type Block = HttpConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &HttpConfig) -> Self {
        Self {
            method: block.method,
            headers: map_to_pairs(&block.headers),
            body: block.body.clone().unwrap_or_default(),
            follow_redirects: block.follow_redirects,
            verify_tls: block.verify_tls,
            keyword: block.keyword.clone().unwrap_or_default(),
            keyword_inverted: block.keyword_inverted,
            json_path: block.json_path.clone().unwrap_or_default(),
            expected_value: block.expected_value.clone().unwrap_or_default(),
            assertions: block
                .assertions
                .as_ref()
                .map(AssertionsEditor::hydrate)
                .unwrap_or_default(),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<HttpConfig> {
        let mut config = HttpConfig {
            method: self.method,
            headers: pairs_to_map(self.headers.as_slice()),
            body: optional_raw(&self.body),
            follow_redirects: self.follow_redirects,
            verify_tls: self.verify_tls,
            assertions: self.assertions.build(&ctx.field("assertions"), errors),
            ..Default::default()
        };

        match ctx.monitor_type {
            MonitorType::Keyword => {
                config.keyword = optional_raw(&self.keyword);
                config.keyword_inverted = self.keyword_inverted;
                if config.keyword.is_none() {
                    errors.push(ctx.field("keyword"), "Keyword is required");
                }
            }
            MonitorType::JsonQuery => {
                config.json_path = optional_text(&self.json_path);
                config.expected_value = optional_text(&self.expected_value);
                if config.json_path.is_none() {
                    errors.push(ctx.field("jsonPath"), "JSON path is required");
                }
            }
            _ => {}
        }

        Some(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsocketEditor {
    pub headers: ListField<HeaderPair>,
    pub send_message: String,
    pub expected_response: String,
}

impl ConfigEditor for WebsocketEditor {
    type Block = WebsocketConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &WebsocketConfig) -> Self {
        Self {
            headers: map_to_pairs(&block.headers),
            send_message: block.send_message.clone().unwrap_or_default(),
            expected_response: block.expected_response.clone().unwrap_or_default(),
        }
    }

    fn build(&self, _ctx: &BuildContext<'_>, _errors: &mut ValidationErrors) -> Option<WebsocketConfig> {
        Some(WebsocketConfig {
            headers: pairs_to_map(self.headers.as_slice()),
            send_message: optional_raw(&self.send_message),
            expected_response: optional_raw(&self.expected_response),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcEditor {
    pub service: String,
    pub use_tls: Option<bool>,
    pub metadata: ListField<HeaderPair>,
}

impl ConfigEditor for GrpcEditor {
    type Block = GrpcConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &GrpcConfig) -> Self {
        Self {
            service: block.service.clone().unwrap_or_default(),
            use_tls: block.use_tls,
            metadata: map_to_pairs(&block.metadata),
        }
    }

    fn build(&self, _ctx: &BuildContext<'_>, _errors: &mut ValidationErrors) -> Option<GrpcConfig> {
        Some(GrpcConfig {
            service: optional_text(&self.service),
            use_tls: self.use_tls,
            metadata: pairs_to_map(self.metadata.as_slice()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnEditor {
    pub headers: ListField<HeaderPair>,
    pub expected_cache_status: String,
    pub edge_regions: String,
}

impl ConfigEditor for CdnEditor {
    type Block = CdnConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &CdnConfig) -> Self {
        Self {
            headers: map_to_pairs(&block.headers),
            expected_cache_status: join_list(&block.expected_cache_status),
            edge_regions: join_list(&block.edge_regions),
        }
    }

    fn build(&self, _ctx: &BuildContext<'_>, _errors: &mut ValidationErrors) -> Option<CdnConfig> {
        Some(CdnConfig {
            headers: pairs_to_map(self.headers.as_slice()),
            expected_cache_status: parse_list(&self.expected_cache_status),
            edge_regions: parse_list(&self.edge_regions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(monitor_type: MonitorType) -> BuildContext<'static> {
        BuildContext {
            monitor_type,
            url: "https://example.com",
        }
    }

    #[test]
    fn test_keyword_fields_only_for_keyword_type() {
        let editor = HttpEditor {
            keyword: "Welcome".into(),
            json_path: "$.status".into(),
            ..Default::default()
        };

        let mut errors = ValidationErrors::new();
        let https = editor.build(&ctx(MonitorType::Https), &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(https.keyword, None);
        assert_eq!(https.json_path, None);

        let keyword = editor.build(&ctx(MonitorType::Keyword), &mut errors).unwrap();
        assert_eq!(keyword.keyword.as_deref(), Some("Welcome"));
        assert_eq!(keyword.json_path, None);
    }

    #[test]
    fn test_keyword_type_requires_keyword() {
        let mut errors = ValidationErrors::new();
        HttpEditor::default().build(&ctx(MonitorType::Keyword), &mut errors);
        assert_eq!(errors.for_field("config.http.keyword"), Some("Keyword is required"));
    }

    #[test]
    fn test_assertions_are_pruned_when_empty() {
        let mut errors = ValidationErrors::new();
        let config = HttpEditor::default().build(&ctx(MonitorType::Https), &mut errors).unwrap();
        assert_eq!(config.assertions, None);
        assert_eq!(serde_json::to_value(&config).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_assertions_parse_and_validate() {
        let mut editor = HttpEditor::default();
        editor.assertions.status_codes = "200, 204\n999".into();
        editor.assertions.response_time.set("");
        editor.assertions.body_regex = "([a-z".into();
        editor.assertions.json_path.append(JsonPathInput {
            path: "$.ok".into(),
            value: "true".into(),
        });
        editor.assertions.json_path.append(JsonPathInput::default());

        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx(MonitorType::Https), &mut errors).unwrap();
        let assertions = config.assertions.unwrap();

        assert_eq!(assertions.status_code, vec![200, 204]);
        assert_eq!(assertions.response_time, None);
        assert_eq!(assertions.body.unwrap().json_path.len(), 1);
        assert!(errors.for_field("config.http.assertions.statusCode").is_some());
        assert!(errors.for_field("config.http.assertions.body.regex").is_some());
    }

    #[test]
    fn test_http_round_trip() {
        let block = HttpConfig {
            method: Some(HttpMethod::Post),
            headers: [("Authorization".to_string(), "Bearer x".to_string())].into(),
            body: Some("{\"ping\":true}".into()),
            follow_redirects: Some(false),
            assertions: Some(Assertions {
                status_code: vec![200],
                response_time: Some(1500.0),
                headers: None,
                body: Some(BodyAssertions {
                    contains: Some("ok".into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        let rebuilt = HttpEditor::hydrate(&block).build(&ctx(MonitorType::Https), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(rebuilt, Some(block));
    }

    #[test]
    fn test_cdn_lists_are_split_and_kept_as_entered() {
        let editor = CdnEditor {
            expected_cache_status: "hit, Miss".into(),
            edge_regions: "fra\nams".into(),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx(MonitorType::Cdn), &mut errors).unwrap();
        assert_eq!(config.expected_cache_status, vec!["hit", "Miss"]);
        assert_eq!(config.edge_regions, vec!["fra", "ams"]);
    }
}
