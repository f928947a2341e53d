#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub identity: Identity,
    pub payments: Payments,
    pub cors: Cors,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub jwt_secret: String,
    pub audience: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Payments {
    /// `None` disables the gateway path.
    pub stripe: Option<Stripe>,
    pub default_currency: String,
    pub dummy_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub webhook_secret: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Cors {
    pub allowed_origin: Option<String>,
}
