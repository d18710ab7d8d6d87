pub mod persona;

use crate::cli::Args;
use crate::llm::LlmConfig;
use self::persona::{ load_catalogue, PersonaConfig, PersonaError };

use axum::http::HeaderValue;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    Assembly,
    Relay,
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyMode::Assembly => write!(f, "assembly"),
            ProxyMode::Relay => write!(f, "relay"),
        }
    }
}

impl FromStr for ProxyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assembly" => Ok(ProxyMode::Assembly),
            "relay" | "passthrough" => Ok(ProxyMode::Relay),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// Reasons the process refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is required when serving the chat endpoint")]
    MissingCredential,
    #[error("RELAY_URL is required in relay mode")]
    MissingRelayUrl,
    #[error("Invalid proxy mode: '{0}' (expected 'assembly' or 'relay')")]
    InvalidMode(String),
    #[error("Invalid URL for {name}: '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid CORS origin: '{0}'")]
    InvalidOrigin(String),
    #[error("System persona text must not be empty")]
    EmptyPersona,
    #[error(transparent)]
    Persona(#[from] PersonaError),
    #[error("Both --tls-cert-path and --tls-key-path must be provided to enable TLS")]
    IncompleteTls,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

/// Settings for the persona-guided chat endpoint.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    pub llm: LlmConfig,
    pub persona: PersonaConfig,
    pub persona_name: String,
}

#[derive(Debug, Clone)]
pub enum ModeConfig {
    Assembly(AssemblyConfig),
    Relay {
        url: Url,
    },
}

/// Immutable process configuration, resolved once before the server binds.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: String,
    pub cors: CorsOrigins,
    pub mode: ModeConfig,
    pub tls: Option<TlsPaths>,
    pub upstream_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mode: ProxyMode = args.mode.parse()?;
        let upstream_timeout = args.upstream_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs);

        let mode = match mode {
            ProxyMode::Assembly => ModeConfig::Assembly(assembly_config(args, upstream_timeout)?),
            ProxyMode::Relay => {
                let raw = non_blank(args.relay_url.as_deref()).ok_or(ConfigError::MissingRelayUrl)?;
                ModeConfig::Relay { url: parse_url("RELAY_URL", raw)? }
            }
        };

        Ok(Self {
            server_addr: args.server_addr.clone(),
            cors: parse_cors_origins(&args.cors_origins)?,
            mode,
            tls: tls_paths(args)?,
            upstream_timeout,
        })
    }

    pub fn proxy_mode(&self) -> ProxyMode {
        match self.mode {
            ModeConfig::Assembly(_) => ProxyMode::Assembly,
            ModeConfig::Relay { .. } => ProxyMode::Relay,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}

fn assembly_config(
    args: &Args,
    timeout: Option<Duration>
) -> Result<AssemblyConfig, ConfigError> {
    let api_key = non_blank(args.groq_api_key.as_deref()).ok_or(ConfigError::MissingCredential)?;
    parse_url("CHAT_BASE_URL", &args.chat_base_url)?;

    let (persona_name, prompt, persona_escapes) = match args.system_persona.as_deref() {
        Some(text) => {
            if text.trim().is_empty() {
                return Err(ConfigError::EmptyPersona);
            }
            ("inline".to_string(), text.to_string(), false)
        }
        None => {
            let catalogue = load_catalogue(&args.personas_path)?;
            let (name, definition) = catalogue.select(non_blank(args.persona.as_deref()))?;
            (name.to_string(), definition.prompt.clone(), definition.escape_input)
        }
    };

    Ok(AssemblyConfig {
        llm: LlmConfig {
            api_key: api_key.to_string(),
            base_url: Some(args.chat_base_url.clone()),
            timeout,
        },
        persona: PersonaConfig {
            prompt,
            escape_input: args.escape_input.unwrap_or(persona_escapes),
            model: args.chat_model.clone(),
        },
        persona_name,
    })
}

pub fn parse_cors_origins(raw: &str) -> Result<CorsOrigins, ConfigError> {
    let origins: Vec<&str> = raw.split(',').map(str::trim).filter(|o| !o.is_empty()).collect();
    if origins.is_empty() || origins.contains(&"*") {
        return Ok(CorsOrigins::Any);
    }
    origins
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigins::List)
}

fn tls_paths(args: &Args) -> Result<Option<TlsPaths>, ConfigError> {
    if !args.enable_tls {
        return Ok(None);
    }
    match (&args.tls_cert_path, &args.tls_key_path) {
        (Some(cert_path), Some(key_path)) =>
            Ok(Some(TlsPaths { cert_path: cert_path.clone(), key_path: key_path.clone() })),
        _ => Err(ConfigError::IncompleteTls),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{ CommandFactory, FromArgMatches };

    /// Parses flags only; exported variables in the calling shell are ignored.
    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["pathvest-proxy"];
        argv.extend_from_slice(extra);
        let command = Args::command().mut_args(|arg| arg.env(None::<&'static str>));
        Args::from_arg_matches(&command.get_matches_from(argv)).unwrap()
    }

    fn shipped_personas() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/json/personas.json").to_string()
    }

    #[test]
    fn assembly_requires_credential() {
        let parsed = args(&["--mode", "assembly", "--groq-api-key", "  ", "--system-persona", "p"]);
        assert!(matches!(AppConfig::from_args(&parsed), Err(ConfigError::MissingCredential)));
    }

    #[test]
    fn inline_persona_wins_over_catalogue() {
        let parsed = args(&[
            "--groq-api-key", "k",
            "--system-persona", "You only discuss budgets.",
            "--personas-path", "missing.json",
        ]);
        let config = AppConfig::from_args(&parsed).unwrap();
        match config.mode {
            ModeConfig::Assembly(assembly) => {
                assert_eq!(assembly.persona.prompt, "You only discuss budgets.");
                assert!(!assembly.persona.escape_input);
                assert_eq!(assembly.persona.model, "llama3-8b-8192");
                assert_eq!(assembly.persona_name, "inline");
            }
            other => panic!("expected assembly mode, got {:?}", other),
        }
    }

    #[test]
    fn catalogue_persona_and_escape_override() {
        let path = shipped_personas();
        let parsed = args(&[
            "--groq-api-key", "k",
            "--personas-path", path.as_str(),
            "--persona", "coding_hint",
            "--escape-input", "false",
            "--chat-model", "mixtral-8x7b-32768",
        ]);
        let config = AppConfig::from_args(&parsed).unwrap();
        let ModeConfig::Assembly(assembly) = config.mode else {
            panic!("expected assembly mode");
        };
        assert_eq!(assembly.persona_name, "coding_hint");
        assert!(!assembly.persona.escape_input);
        assert_eq!(assembly.persona.model, "mixtral-8x7b-32768");
    }

    #[test]
    fn catalogue_escape_setting_is_used_by_default() {
        let path = shipped_personas();
        let parsed = args(&["--groq-api-key", "k", "--personas-path", path.as_str(), "--persona", "coding_hint"]);
        let ModeConfig::Assembly(assembly) = AppConfig::from_args(&parsed).unwrap().mode else {
            panic!("expected assembly mode");
        };
        assert!(assembly.persona.escape_input);
    }

    #[test]
    fn relay_mode_needs_url_but_no_credential() {
        assert!(matches!(
            AppConfig::from_args(&args(&["--mode", "relay"])),
            Err(ConfigError::MissingRelayUrl)
        ));

        let config = AppConfig::from_args(
            &args(&["--mode", "relay", "--relay-url", "https://chat.example.com"])
        ).unwrap();
        assert_eq!(config.proxy_mode(), ProxyMode::Relay);
    }

    #[test]
    fn rejects_bad_mode_and_urls() {
        assert!(matches!(
            AppConfig::from_args(&args(&["--mode", "streaming"])),
            Err(ConfigError::InvalidMode(_))
        ));
        assert!(matches!(
            AppConfig::from_args(&args(&["--mode", "relay", "--relay-url", "not a url"])),
            Err(ConfigError::InvalidUrl { name: "RELAY_URL", .. })
        ));
    }

    #[test]
    fn cors_origin_lists() {
        assert_eq!(parse_cors_origins("*").unwrap(), CorsOrigins::Any);
        assert_eq!(parse_cors_origins("").unwrap(), CorsOrigins::Any);
        assert_eq!(
            parse_cors_origins("https://a.example, https://b.example").unwrap(),
            CorsOrigins::List(vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("https://b.example")
            ])
        );
        assert!(matches!(parse_cors_origins("bad\norigin"), Err(ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn tls_needs_both_paths() {
        let parsed = args(&["--mode", "relay", "--relay-url", "http://x", "--enable-tls", "--tls-cert-path", "c.pem"]);
        assert!(matches!(AppConfig::from_args(&parsed), Err(ConfigError::IncompleteTls)));
    }

    #[test]
    fn zero_timeout_means_none() {
        let parsed = args(&["--mode", "relay", "--relay-url", "http://x", "--upstream-timeout-secs", "0"]);
        assert_eq!(AppConfig::from_args(&parsed).unwrap().upstream_timeout, None);
    }
}
