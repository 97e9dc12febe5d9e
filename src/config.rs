use std::env;

/// Runtime settings, read once at startup. A `.env` file is honored in
/// development; deployments set real environment variables.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{} must be set", name))
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .map(|v| v.parse().expect("JWT_EXPIRATION_HOURS must be a number"))
            .unwrap_or(24);
        let server_port = env::var("SERVER_PORT")
            .map(|v| v.parse().expect("SERVER_PORT must be a number"))
            .unwrap_or(3000);

        Self {
            database_url: required("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET"),
            jwt_expiration_hours,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
