use serde::{Deserialize, Serialize};

use super::database::service_port;
use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, join_list, optional_raw, optional_text, parse_list};
use crate::monitor::MonitorType;
use crate::monitor::config::{EmailAuthConfig, EmailConfig, EmailSecurity};

/// Security mode implied by a mail port, if it is a standard one.
fn security_for_port(port: Option<u16>) -> Option<EmailSecurity> {
    match port? {
        465 | 993 | 995 => Some(EmailSecurity::Tls),
        587 => Some(EmailSecurity::Starttls),
        25 | 110 | 143 => Some(EmailSecurity::None),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailEditor {
    pub port: NumberInput,
    pub security: Option<EmailSecurity>,
    pub username: String,
    pub password: String,
}

impl ConfigEditor for EmailEditor {
    type Block = EmailConfig;

    fn defaults(monitor_type: MonitorType) -> Self {
        let port = monitor_type.metadata().default_port;
        Self {
            port: NumberInput::from_optional(port),
            security: security_for_port(port),
            ..Default::default()
        }
    }

    fn hydrate(block: &EmailConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            security: block.security,
            username: block.username.clone().unwrap_or_default(),
            password: block.password.clone().unwrap_or_default(),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<EmailConfig> {
        let username = optional_text(&self.username);
        let password = optional_raw(&self.password);
        if password.is_some() && username.is_none() {
            errors.push(ctx.field("username"), "Username is required when a password is set");
        }
        Some(EmailConfig {
            port: service_port(&self.port, ctx, errors),
            security: self.security,
            username,
            password,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailAuthEditor {
    pub dkim_selectors: String,
    pub check_spf: Option<bool>,
    pub check_dmarc: Option<bool>,
}

impl ConfigEditor for EmailAuthEditor {
    type Block = EmailAuthConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &EmailAuthConfig) -> Self {
        Self {
            dkim_selectors: join_list(&block.dkim_selectors),
            check_spf: block.check_spf,
            check_dmarc: block.check_dmarc,
        }
    }

    fn build(&self, _ctx: &BuildContext<'_>, _errors: &mut ValidationErrors) -> Option<EmailAuthConfig> {
        Some(EmailAuthConfig {
            dkim_selectors: parse_list(&self.dkim_selectors),
            check_spf: self.check_spf,
            check_dmarc: self.check_dmarc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_port() {
        let smtp = EmailEditor::defaults(MonitorType::Smtp);
        assert_eq!(smtp.port.raw(), "587");
        assert_eq!(smtp.security, Some(EmailSecurity::Starttls));

        let imap = EmailEditor::defaults(MonitorType::Imap);
        assert_eq!(imap.security, Some(EmailSecurity::Tls));
    }

    #[test]
    fn test_password_without_username() {
        let editor = EmailEditor {
            password: "hunter2".into(),
            ..EmailEditor::defaults(MonitorType::Pop3)
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Pop3,
            url: "mail.example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert_eq!(config.port, Some(995));
        assert!(errors.for_field("config.email.username").is_some());
    }

    #[test]
    fn test_dkim_selectors_from_delimited_text() {
        let editor = EmailAuthEditor {
            dkim_selectors: "google, k1\nselector2".into(),
            check_spf: Some(true),
            check_dmarc: None,
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::EmailAuth,
            url: "example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            serde_json::json!({"dkimSelectors": ["google", "k1", "selector2"], "checkSpf": true})
        );
    }
}
