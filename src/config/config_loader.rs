use anyhow::Result;

use super::config_model::{AuthSecret, DotEnvyConfig};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    // An empty secret key is tolerated here; the gateway client reports it as
    // an Unconfigured error when an intent is actually requested.
    let gateway = super::config_model::Gateway {
        secret_key: std::env::var("XENDIT_SECRET_KEY").unwrap_or_default(),
        callback_token: std::env::var("XENDIT_CALLBACK_TOKEN")
            .expect("XENDIT_CALLBACK_TOKEN is invalid"),
        exchange_rate_idr: std::env::var("EXCHANGE_RATE_IDR")
            .unwrap_or_else(|_| "16000".to_string())
            .parse()?,
    };

    let replica = match (
        std::env::var("SUPABASE_PROJECT_URL"),
        std::env::var("SUPABASE_SERVICE_ROLE_KEY"),
    ) {
        (Ok(project_url), Ok(service_role_key)) => Some(super::config_model::Replica {
            project_url,
            service_role_key,
        }),
        _ => None,
    };

    let sweep = super::config_model::Sweep {
        interval_seconds: std::env::var("SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        gateway,
        replica,
        sweep,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: std::env::var("JWT_USER_SECRET").expect("JWT_USER_SECRET is invalid"),
    })
}
