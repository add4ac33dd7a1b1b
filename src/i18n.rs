//! Localized API messages.
//!
//! Only the messages returned by the contact endpoint live here. The site
//! itself handles its own translations.

use std::fmt;
use std::time::Duration;

use axum::http::{header::ACCEPT_LANGUAGE, HeaderMap};

/// Supported response locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

/// Keys for the messages the API can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    TooManyRequests,
    InvalidFormData,
    FailedToSendEmail,
    InternalServerError,
    Hour,
    Hours,
    Minute,
    Minutes,
    Second,
    Seconds,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` value.
    ///
    /// Only the first language tag is considered, and only its primary
    /// subtag: any Portuguese variant maps to `pt-BR`, everything else to
    /// English.
    pub fn from_accept_language(value: &str) -> Self {
        let primary = value
            .split(',')
            .next()
            .and_then(|tag| tag.split(';').next())
            .and_then(|tag| tag.trim().split('-').next())
            .unwrap_or_default();

        if primary.eq_ignore_ascii_case("pt") {
            Locale::PtBr
        } else {
            Locale::En
        }
    }

    /// Pick a locale from request headers, defaulting to English.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_accept_language)
            .unwrap_or_default()
    }

    /// The BCP 47 tag for this locale.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }

    /// Look up a message in this locale.
    pub fn message(&self, key: MessageKey) -> &'static str {
        use MessageKey::*;

        match self {
            Locale::En => match key {
                TooManyRequests => "Too many requests. Please try again in",
                InvalidFormData => "Invalid form data",
                FailedToSendEmail => "Failed to send email",
                InternalServerError => "Internal server error",
                Hour => "hour",
                Hours => "hours",
                Minute => "minute",
                Minutes => "minutes",
                Second => "second",
                Seconds => "seconds",
            },
            Locale::PtBr => match key {
                TooManyRequests => "Muitas tentativas. Por favor, tente novamente em",
                InvalidFormData => "Dados do formulário inválidos",
                FailedToSendEmail => "Falha ao enviar e-mail",
                InternalServerError => "Erro interno do servidor",
                Hour => "hora",
                Hours => "horas",
                Minute => "minuto",
                Minutes => "minutos",
                Second => "segundo",
                Seconds => "segundos",
            },
        }
    }

    /// Human-readable wait time, e.g. `"2 hours"` or `"1 minuto"`.
    pub fn format_retry(&self, remaining: Duration) -> String {
        const MINUTE: u128 = 60 * 1000;
        const HOUR: u128 = 60 * MINUTE;

        let millis = remaining.as_millis();
        let (value, singular, plural) = if millis >= HOUR {
            (millis.div_ceil(HOUR), MessageKey::Hour, MessageKey::Hours)
        } else if millis >= MINUTE {
            (millis.div_ceil(MINUTE), MessageKey::Minute, MessageKey::Minutes)
        } else {
            (millis.div_ceil(1000).max(1), MessageKey::Second, MessageKey::Seconds)
        };

        let unit = if value > 1 { plural } else { singular };
        format!("{} {}", value, self.message(unit))
    }

    /// The full rejection message returned with a 429.
    pub fn too_many_requests(&self, remaining: Duration) -> String {
        format!(
            "{} {}.",
            self.message(MessageKey::TooManyRequests),
            self.format_retry(remaining)
        )
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_locale_from_accept_language() {
        assert_eq!(Locale::from_accept_language("pt-BR,pt;q=0.9,en;q=0.8"), Locale::PtBr);
        assert_eq!(Locale::from_accept_language("pt"), Locale::PtBr);
        assert_eq!(Locale::from_accept_language("PT-pt"), Locale::PtBr);
        assert_eq!(Locale::from_accept_language("en-US,pt;q=0.9"), Locale::En);
        assert_eq!(Locale::from_accept_language("de"), Locale::En);
        assert_eq!(Locale::from_accept_language(""), Locale::En);
    }

    #[test]
    fn test_locale_from_headers() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()), Locale::En);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR"));
        assert_eq!(Locale::from_headers(&headers), Locale::PtBr);
    }

    #[test]
    fn test_format_retry_units() {
        let en = Locale::En;
        assert_eq!(en.format_retry(Duration::from_millis(7_200_000)), "2 hours");
        assert_eq!(en.format_retry(Duration::from_millis(3_600_000)), "1 hour");
        assert_eq!(en.format_retry(Duration::from_millis(3_600_001)), "2 hours");
        assert_eq!(en.format_retry(Duration::from_secs(90)), "2 minutes");
        assert_eq!(en.format_retry(Duration::from_secs(60)), "1 minute");
        assert_eq!(en.format_retry(Duration::from_millis(45_200)), "46 seconds");
        assert_eq!(en.format_retry(Duration::from_millis(400)), "1 second");
        assert_eq!(en.format_retry(Duration::ZERO), "1 second");
    }

    #[test]
    fn test_format_retry_portuguese() {
        let pt = Locale::PtBr;
        assert_eq!(pt.format_retry(Duration::from_secs(7_199)), "2 horas");
        assert_eq!(pt.format_retry(Duration::from_secs(61)), "2 minutos");
        assert_eq!(pt.format_retry(Duration::from_secs(1)), "1 segundo");
    }

    #[test]
    fn test_too_many_requests_message() {
        assert_eq!(
            Locale::En.too_many_requests(Duration::from_secs(7_200)),
            "Too many requests. Please try again in 2 hours."
        );
        assert_eq!(
            Locale::PtBr.too_many_requests(Duration::from_secs(30)),
            "Muitas tentativas. Por favor, tente novamente em 30 segundos."
        );
    }
}
