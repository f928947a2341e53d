use anyhow::{Context, Result};

use super::config_model::{
    BackendServer, Cors, Database, DotEnvyConfig, Identity, Payments, Stripe,
};

const DEFAULT_CURRENCY: &str = "inr";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let required = |key: &str| var(key).with_context(|| format!("{key} is not set"));

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let identity = Identity {
        jwt_secret: required("IDENTITY_JWT_SECRET")?,
        audience: var("IDENTITY_JWT_AUDIENCE"),
    };

    let stripe = var("STRIPE_SECRET_KEY").map(|secret_key| Stripe {
        secret_key,
        webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
        api_base: var("STRIPE_API_BASE"),
    });

    let dummy_enabled = match var("PAYMENTS_DUMMY_ENABLED") {
        None => true,
        Some(raw) => parse_bool(&raw)
            .with_context(|| format!("PAYMENTS_DUMMY_ENABLED is invalid: {raw}"))?,
    };

    let payments = Payments {
        stripe,
        default_currency: var("PAYMENTS_DEFAULT_CURRENCY")
            .map(|currency| currency.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        dummy_enabled,
    };

    let cors = Cors {
        allowed_origin: var("CORS_ALLOWED_ORIGIN"),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        identity,
        payments,
        cors,
    })
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
