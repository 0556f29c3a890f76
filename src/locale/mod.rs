use lazy_static::lazy_static;
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fmt;

/// Supported title languages. Anything outside this set resolves to `En`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    De,
    En,
    Es,
    Fr,
    It,
    Nl,
    Pt,
}

impl LanguageCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::De => "de",
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::It => "it",
            LanguageCode::Nl => "nl",
            LanguageCode::Pt => "pt",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "de" => Some(LanguageCode::De),
            "en" => Some(LanguageCode::En),
            "es" => Some(LanguageCode::Es),
            "fr" => Some(LanguageCode::Fr),
            "it" => Some(LanguageCode::It),
            "nl" => Some(LanguageCode::Nl),
            "pt" => Some(LanguageCode::Pt),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct TitleStrings {
    placeholder: &'static str,
    generic: &'static str,
}

lazy_static! {
    static ref TITLE_STRINGS: HashMap<LanguageCode, TitleStrings> = {
        let mut m = HashMap::new();
        m.insert(LanguageCode::De, TitleStrings {
            placeholder: "Neue Unterhaltung",
            generic: "Allgemeine Fragen",
        });
        m.insert(LanguageCode::En, TitleStrings {
            placeholder: "New conversation",
            generic: "General questions",
        });
        m.insert(LanguageCode::Es, TitleStrings {
            placeholder: "Nueva conversación",
            generic: "Preguntas generales",
        });
        m.insert(LanguageCode::Fr, TitleStrings {
            placeholder: "Nouvelle conversation",
            generic: "Questions générales",
        });
        m.insert(LanguageCode::It, TitleStrings {
            placeholder: "Nuova conversazione",
            generic: "Domande generali",
        });
        m.insert(LanguageCode::Nl, TitleStrings {
            placeholder: "Nieuw gesprek",
            generic: "Algemene vragen",
        });
        m.insert(LanguageCode::Pt, TitleStrings {
            placeholder: "Nova conversa",
            generic: "Perguntas gerais",
        });
        m
    };
}

/// Normalizes a free-form language tag ("en-US", "DE", garbage, missing)
/// down to one of the supported codes, defaulting to English. Total: never
/// fails, never panics.
pub fn normalize_language(raw: Option<&str>) -> LanguageCode {
    let raw = match raw {
        Some(s) => s.trim(),
        None => {
            return LanguageCode::En;
        }
    };
    let primary = raw
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    LanguageCode::from_code(&primary).unwrap_or(LanguageCode::En)
}

/// The title shown for a conversation that has not been named yet.
pub fn placeholder_title(language: LanguageCode) -> &'static str {
    TITLE_STRINGS[&language].placeholder
}

/// The generic fallback used when the AI fails to produce anything better
/// than a placeholder.
pub fn generic_title(language: LanguageCode) -> &'static str {
    TITLE_STRINGS[&language].generic
}

/// True if `title` is empty/whitespace, matches the resolved placeholder for
/// `language`, or matches the placeholder of ANY supported language. The
/// cross-language check keeps stale placeholders from surviving a language
/// switch mid-conversation.
pub fn is_placeholder_title(title: &str, language: LanguageCode) -> bool {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == placeholder_title(language).to_lowercase() {
        return true;
    }
    TITLE_STRINGS.values().any(|s| lowered == s.placeholder.to_lowercase())
}
