use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, join_list, parse_list};
use crate::monitor::MonitorType;
use crate::monitor::config::{SslConfig, TlsVersion};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SslEditor {
    pub expiry_threshold_days: NumberInput,
    pub min_tls_version: Option<TlsVersion>,
    pub allowed_ciphers: String,
    pub caa_issuers: String,
    pub check_chain: Option<bool>,
}

impl ConfigEditor for SslEditor {
    type Block = SslConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &SslConfig) -> Self {
        Self {
            expiry_threshold_days: NumberInput::from_optional(block.expiry_threshold_days),
            min_tls_version: block.min_tls_version,
            allowed_ciphers: join_list(&block.allowed_ciphers),
            caa_issuers: join_list(&block.caa_issuers),
            check_chain: block.check_chain,
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<SslConfig> {
        Some(SslConfig {
            expiry_threshold_days: self.expiry_threshold_days.read_in_range(
                &ctx.field("expiryThresholdDays"),
                1,
                365,
                errors,
            ),
            min_tls_version: self.min_tls_version,
            allowed_ciphers: parse_list(&self.allowed_ciphers),
            caa_issuers: parse_list(&self.caa_issuers),
            check_chain: self.check_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_and_threshold() {
        let editor = SslEditor {
            expiry_threshold_days: NumberInput::new("14"),
            allowed_ciphers: "TLS_AES_128_GCM_SHA256,\nTLS_AES_256_GCM_SHA384".into(),
            caa_issuers: "LetsEncrypt.org, digicert.com".into(),
            ..Default::default()
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Ssl,
            url: "example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(config.expiry_threshold_days, Some(14));
        assert_eq!(config.allowed_ciphers.len(), 2);
        assert_eq!(config.caa_issuers, vec!["LetsEncrypt.org", "digicert.com"]);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let editor = SslEditor {
            expiry_threshold_days: NumberInput::new("400"),
            ..Default::default()
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Ssl,
            url: "example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert_eq!(config.expiry_threshold_days, None);
        assert!(errors.for_field("config.ssl.expiryThresholdDays").is_some());
    }
}
