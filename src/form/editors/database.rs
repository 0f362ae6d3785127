use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, optional_raw, optional_text};
use crate::monitor::MonitorType;
use crate::monitor::config::DatabaseConfig;

/// Port for service types with a well-known port: the input box, else the
/// port in the target, else the type's default.
pub(crate) fn service_port(input: &NumberInput, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<u16> {
    if !input.has_integer() {
        return ctx.target_port().or_else(|| ctx.default_port());
    }
    input.read_port(&ctx.field("port"), errors)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseEditor {
    pub port: NumberInput,
    pub database: String,
    pub username: String,
    pub password: String,
    pub query: String,
    pub expected_row_count: NumberInput,
    pub tls: Option<bool>,
}

impl ConfigEditor for DatabaseEditor {
    type Block = DatabaseConfig;

    fn defaults(monitor_type: MonitorType) -> Self {
        Self {
            port: NumberInput::from_optional(monitor_type.metadata().default_port),
            ..Default::default()
        }
    }

    fn hydrate(block: &DatabaseConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            database: block.database.clone().unwrap_or_default(),
            username: block.username.clone().unwrap_or_default(),
            password: block.password.clone().unwrap_or_default(),
            query: block.query.clone().unwrap_or_default(),
            expected_row_count: NumberInput::from_optional(block.expected_row_count),
            tls: block.tls,
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<DatabaseConfig> {
        let query = optional_raw(&self.query);
        let expected_row_count = self.expected_row_count.read::<u64>(&ctx.field("expectedRowCount"));
        if expected_row_count.is_some() && query.is_none() {
            errors.push(ctx.field("query"), "A query is required to check the row count");
        }
        Some(DatabaseConfig {
            port: service_port(&self.port, ctx, errors),
            database: optional_text(&self.database),
            username: optional_text(&self.username),
            password: optional_raw(&self.password),
            query,
            expected_row_count,
            tls: self.tls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_well_known_port() {
        assert_eq!(DatabaseEditor::defaults(MonitorType::Postgres).port.raw(), "5432");
        assert_eq!(DatabaseEditor::defaults(MonitorType::Redis).port.raw(), "6379");
        assert_eq!(DatabaseEditor::defaults(MonitorType::Mongodb).port.raw(), "27017");
    }

    #[test]
    fn test_cleared_port_falls_back() {
        let editor = DatabaseEditor::default();
        let mut errors = ValidationErrors::new();

        let ctx = BuildContext {
            monitor_type: MonitorType::Mysql,
            url: "db.internal",
        };
        assert_eq!(editor.build(&ctx, &mut errors).unwrap().port, Some(3306));

        let ctx = BuildContext {
            monitor_type: MonitorType::Mysql,
            url: "db.internal:3307",
        };
        assert_eq!(editor.build(&ctx, &mut errors).unwrap().port, Some(3307));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_password_is_not_trimmed_and_row_count_needs_query() {
        let editor = DatabaseEditor {
            password: " s3cret ".into(),
            expected_row_count: NumberInput::new("1"),
            ..DatabaseEditor::defaults(MonitorType::Postgres)
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Postgres,
            url: "db.internal",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert_eq!(config.password.as_deref(), Some(" s3cret "));
        assert!(errors.for_field("config.database.query").is_some());
    }
}
