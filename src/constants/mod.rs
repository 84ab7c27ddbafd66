pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

fn required(name: &str) -> String {
    std::env::var(name)
        .unwrap_or_else(|_| panic!("{name} must be set in .env file or environment variable"))
}

fn or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Env {
    fn new() -> Self {
        let access_token_expiration = or_default("ACCESS_TOKEN_EXPIRATION", "900")
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let refresh_token_expiration = or_default("REFRESH_TOKEN_EXPIRATION", "604800")
            .parse::<u64>()
            .expect("REFRESH_TOKEN_EXPIRATION must be a valid u64 integer");
        let port = or_default("PORT", "8080").parse::<u16>().expect("PORT must be a valid u16 integer");

        Env {
            jwt_secret: required("SECRET_KEY"),
            access_token_expiration,
            refresh_token_expiration,
            database_url: required("DATABASE_URL"),
            redis_url: required("REDIS_URL"),
            frontend_url: or_default("FRONTEND_URL", "http://localhost:3000"),
            ip: or_default("IP", "127.0.0.1"),
            port,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
