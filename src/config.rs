//! Process-level configuration read once from the environment at startup.

const SUPABASE_URL_VAR: &str = "IDEAPAL_SUPABASE_URL";
const SUPABASE_ANON_KEY_VAR: &str = "IDEAPAL_SUPABASE_ANON_KEY";
const GEMINI_API_KEY_VAR: &str = "IDEAPAL_GEMINI_API_KEY";
const DEBUG_VAR: &str = "IDEAPAL_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` when either the URL or the anon key is missing.
    pub supabase: Option<SupabaseConfig>,
    pub gemini_api_key: Option<String>,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let supabase = match (non_blank(SUPABASE_URL_VAR), non_blank(SUPABASE_ANON_KEY_VAR)) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        let debug = lookup(DEBUG_VAR)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            supabase,
            gemini_api_key: non_blank(GEMINI_API_KEY_VAR),
            debug,
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
