use std::env;

/// Runtime configuration, read once at startup from the environment
/// (`.env` is loaded before this in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// ISO 4217 code for invoices, or "XTR" for Telegram Stars.
    pub payment_currency: String,
    /// Payment provider token from BotFather; not needed for Stars.
    pub payment_provider_token: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL not set"),
            payment_currency: var_or("PAYMENT_CURRENCY", "XTR"),
            payment_provider_token: env::var("PAYMENT_PROVIDER_TOKEN").ok(),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            info!("{} not set, using default: {}", key, default);
            default.to_string()
        }
    }
}
