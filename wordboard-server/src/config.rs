use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub guesses_path: String,
    pub solutions_path: String,
    pub request_timeout_seconds: u64,
    pub auth_dev_mode: bool,
    pub oidc_issuer: String,
    pub oidc_audience: String,
    pub oidc_jwks_url: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            guesses_path: env::var("GUESSES_PATH")
                .unwrap_or_else(|_| "./words/guesses.txt".to_string()),
            solutions_path: env::var("SOLUTIONS_PATH")
                .unwrap_or_else(|_| "./words/solutions.txt".to_string()),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid REQUEST_TIMEOUT_SECONDS"),
            auth_dev_mode: env::var("AUTH_DEV_MODE").unwrap_or_else(|_| "false".to_string())
                == "true",
            oidc_issuer: env::var("OIDC_ISSUER").unwrap_or_default(),
            oidc_audience: env::var("OIDC_AUDIENCE").unwrap_or_default(),
            oidc_jwks_url: env::var("OIDC_JWKS_URL").unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
