//! Default values shared by settings and their consumers

/// Service endpoints
pub mod endpoints {
    /// Local Ollama server
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// OpenAI-compatible API base
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    pub const SCYLLA_DEFAULT: &str = "127.0.0.1:9042";
}

/// Session lifecycle defaults
pub mod session {
    pub const MAX_SESSIONS: usize = 1000;

    /// Idle time before an active session is ended
    pub const SESSION_TIMEOUT_SECS: u64 = 3600;

    pub const CLEANUP_INTERVAL_SECS: u64 = 300;

    /// Upper bound on one AI feedback call
    pub const AI_TIMEOUT_MS: u64 = 20_000;

    /// Prior turns sent to the AI with each utterance
    pub const HISTORY_WINDOW: usize = 10;

    pub const MAX_UTTERANCE_CHARS: usize = 2000;
}

/// LLM defaults
pub mod llm {
    pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

    /// Low temperature keeps the JSON answer format stable
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    pub const DEFAULT_MAX_TOKENS: usize = 512;

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub const DEFAULT_MAX_RETRIES: u32 = 2;
}

/// Persistence defaults
pub mod persistence {
    pub const DEFAULT_KEYSPACE: &str = "lingo_tutor";
}
