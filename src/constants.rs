/// Constants module to avoid magic numbers in the codebase

// Application identity
pub const APP_NAME: &str = "Voice Assistant ChatBot API";
pub const APP_DESCRIPTION: &str =
    "A voice assistant with To-do, Job finding, and General chat capabilities";

// Session defaults
pub const DEFAULT_USER_ID: &str = "default";
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 10;

// Network Configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com";
pub const DEFAULT_GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;

// Default Model Configuration
pub const DEFAULT_CHAT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-large-v3";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 1024;

// Speech
pub const DEFAULT_TTS_LANGUAGE: &str = "en";
pub const DEFAULT_AUDIO_DIR: &str = "audio_responses";
/// Longest text slice the translate TTS endpoint accepts per request
pub const TTS_MAX_CHUNK_CHARS: usize = 100;
pub const AUDIO_FILE_EXTENSION: &str = "mp3";

// System prompts
pub const TASK_PROMPT: &str = "You are a helpful To-Do assistant. Help users manage their tasks, \
create to-do lists, set reminders, prioritize tasks, and organize their daily activities. \
Be concise and actionable. Only answer questions related to to-do tasks; politely decline anything else.";

pub const JOBSEARCH_PROMPT: &str = "You are a job search assistant. Help users with job hunting, \
interview preparation, career guidance, and job market insights. Provide practical and \
professional advice. Only answer questions related to finding a job; politely decline anything else.";

pub const GENERAL_PROMPT: &str = "You are a helpful general assistant. Answer questions on various \
topics, provide information, and assist with general inquiries in a friendly and informative manner.";
