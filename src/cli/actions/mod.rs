pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        frontend_base_url: String,
        email_token_ttl_seconds: i64,
        resend_cooldown_seconds: i64,
    },
}
