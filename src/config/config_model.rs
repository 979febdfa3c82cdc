#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub gateway: Gateway,
    pub replica: Option<Replica>,
    pub sweep: Sweep,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Gateway {
    pub secret_key: String,
    pub callback_token: String,
    pub exchange_rate_idr: f64,
}

/// Secondary REST-style data store mirrored best-effort at settlement time.
#[derive(Debug, Clone)]
pub struct Replica {
    pub project_url: String,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct Sweep {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct AuthSecret {
    pub jwt_secret: String,
}
