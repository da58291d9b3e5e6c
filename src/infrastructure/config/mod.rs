use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::synthesis::{SpeechModel, SynthesisCacheConfig, Voice, DEFAULT_MAX_CHUNK_LENGTH};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub tts_provider: TtsProvider,
    pub aws_region: String,
    // Audio storage
    pub audio_s3_bucket: Option<String>,
    pub audio_s3_public_base_url: Option<String>,
    pub local_audio_dir: PathBuf,
    pub local_audio_url_prefix: String,
    // Synthesis
    pub tts_chunk_max_length: usize,
    pub provider_timeout: Duration,
    pub tts_cache_enabled: bool,
    pub default_voice: Voice,
    pub default_model: SpeechModel,
    pub transcription_model: String,
    pub lessons_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    OpenAi,
    Polly,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = Config {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse()?,
            environment: match var("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            tts_provider: match var("TTS_PROVIDER", "openai").to_lowercase().as_str() {
                "openai" => TtsProvider::OpenAi,
                "polly" => TtsProvider::Polly,
                other => return Err(format!("unknown TTS_PROVIDER: {}", other).into()),
            },
            aws_region: var("AWS_REGION", "ap-northeast-1"),
            audio_s3_bucket: optional("AUDIO_S3_BUCKET"),
            audio_s3_public_base_url: optional("AUDIO_S3_PUBLIC_BASE_URL"),
            local_audio_dir: PathBuf::from(var("LOCAL_AUDIO_DIR", "public/audio")),
            local_audio_url_prefix: var("LOCAL_AUDIO_URL_PREFIX", "/audio"),
            tts_chunk_max_length: var("TTS_CHUNK_MAX_LENGTH", &DEFAULT_MAX_CHUNK_LENGTH.to_string())
                .parse()?,
            provider_timeout: Duration::from_secs(var("PROVIDER_TIMEOUT_SECS", "30").parse()?),
            tts_cache_enabled: var("TTS_CACHE_ENABLED", "true").to_lowercase() == "true",
            default_voice: Voice::parse_or_default(optional("DEFAULT_VOICE").as_deref()),
            default_model: SpeechModel::parse_or_default(optional("DEFAULT_MODEL").as_deref()),
            transcription_model: var("OPENAI_TRANSCRIPTION_MODEL", "whisper-1"),
            lessons_dir: PathBuf::from(var("LESSONS_DIR", "lessons")),
        };

        if config.tts_chunk_max_length == 0 {
            return Err("TTS_CHUNK_MAX_LENGTH must be greater than zero".into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// S3 leads the storage chain only in production with a bucket set.
    pub fn s3_storage(&self) -> Option<(String, String)> {
        if self.is_development() {
            return None;
        }
        let bucket = self.audio_s3_bucket.clone()?;
        let base_url = self
            .audio_s3_public_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", bucket, self.aws_region));
        Some((bucket, base_url))
    }

    pub fn synthesis_cache_config(&self) -> SynthesisCacheConfig {
        SynthesisCacheConfig {
            max_chunk_length: self.tts_chunk_max_length,
            provider_timeout: self.provider_timeout,
            memo_enabled: self.tts_cache_enabled,
        }
    }
}
