use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- AI Backend Args ---
    /// Base URL of the AI backend exposing the title-generation route.
    #[arg(long, env = "AI_BASE_URL", default_value = "http://localhost:8000")]
    pub ai_base_url: String,

    /// Optional bearer token sent to the AI backend.
    #[arg(long, env = "AI_API_KEY")]
    pub ai_api_key: Option<String>,

    // --- Conversation Store Args ---
    /// Conversation store type (redis, memory).
    #[arg(long, env = "HISTORY_TYPE", default_value = "redis")]
    pub history_type: String,

    /// Conversation store host endpoint (e.g., redis://127.0.0.1:6379).
    #[arg(long, env = "HISTORY_HOST", default_value = "redis://127.0.0.1:6379")]
    pub history_host: String,

    /// Prefix for Redis conversation keys.
    #[arg(long, env = "HISTORY_REDIS_PREFIX", default_value = "conversation:")]
    pub history_redis_prefix: String,

    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,
}
