use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::export::pdf::MIN_SCALE;
use crate::export::PdfSettings;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bullet rewriting is disabled when unset.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub pdf: PdfSettings,
    /// Font for PDF text outside WinAnsi. Common system fonts are tried when unset.
    pub pdf_unicode_font: Option<PathBuf>,
    pub max_sessions: usize,
    pub rewrite_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let scale: f32 = parse_or(&var, "PDF_RENDER_SCALE", MIN_SCALE)?;
        if !(scale >= MIN_SCALE) {
            bail!("PDF_RENDER_SCALE must be at least {MIN_SCALE}, got {scale}");
        }
        let margin_in: f32 = parse_or(&var, "PDF_MARGIN_IN", 0.5)?;
        if !(0.0..4.25).contains(&margin_in) {
            bail!("PDF_MARGIN_IN must be between 0 and 4.25 inches, got {margin_in}");
        }
        let max_sessions: usize = parse_or(&var, "MAX_SESSIONS", 1024)?;
        if max_sessions == 0 {
            bail!("MAX_SESSIONS must be positive");
        }
        let rewrite_timeout_secs: u64 = parse_or(&var, "REWRITE_TIMEOUT_SECS", 30)?;

        Ok(Config {
            anthropic_api_key: var("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            pdf: PdfSettings {
                scale,
                margin_in,
                fallback_font: None,
            },
            pdf_unicode_font: var("PDF_UNICODE_FONT")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            max_sessions,
            rewrite_timeout: Duration::from_secs(rewrite_timeout_secs),
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.rust_log, "info");
        assert_eq!(c.pdf, PdfSettings::default());
        assert_eq!(c.max_sessions, 1024);
        assert_eq!(c.rewrite_timeout, Duration::from_secs(30));
        assert!(c.anthropic_api_key.is_none());
        assert!(c.pdf_unicode_font.is_none());
    }

    #[test]
    fn test_unicode_font_path() {
        let c = config(&[("PDF_UNICODE_FONT", "/fonts/NotoSans.ttf")]).unwrap();
        assert_eq!(c.pdf_unicode_font, Some(PathBuf::from("/fonts/NotoSans.ttf")));
    }

    #[test]
    fn test_scale_below_two_is_rejected() {
        assert!(config(&[("PDF_RENDER_SCALE", "1.5")]).is_err());
        assert_eq!(config(&[("PDF_RENDER_SCALE", "3")]).unwrap().pdf.scale, 3.0);
    }

    #[test]
    fn test_malformed_port_is_rejected() {
        assert!(config(&[("PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_blank_api_key_disables_rewrites() {
        assert!(config(&[("ANTHROPIC_API_KEY", " ")])
            .unwrap()
            .anthropic_api_key
            .is_none());
    }
}
