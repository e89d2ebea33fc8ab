//! Signature catalog for AI agent and automation detection.
//!
//! Holds three registries:
//! - AI agent identifiers matched as case-insensitive User-Agent substrings
//! - Header names that only automation clients send
//! - Weighted behavior patterns matched against the User-Agent
//!
//! The catalog can be loaded from a JSON or YAML file. A missing file falls
//! back to the built-in defaults.

use crate::error::{AiGuardError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info};

/// A known AI agent identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSignature {
    /// Substring searched for in the User-Agent (case-insensitive)
    pub identifier: String,

    /// Operator of the agent, for audit output
    #[serde(default)]
    pub operator: Option<String>,
}

/// A behavior pattern definition as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPatternDef {
    /// Regular expression applied to the User-Agent
    pub pattern: String,

    /// Category label reported when the pattern matches
    pub category: String,

    /// Confidence added when the pattern matches
    pub weight: f64,
}

/// Serializable form of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDefinition {
    pub agents: Vec<AgentSignature>,
    pub suspicious_headers: Vec<String>,
    pub behaviors: Vec<BehaviorPatternDef>,
}

impl Default for CatalogDefinition {
    fn default() -> Self {
        let agents = DEFAULT_AGENTS
            .iter()
            .map(|(identifier, operator)| AgentSignature {
                identifier: identifier.to_string(),
                operator: Some(operator.to_string()),
            })
            .collect();

        let behaviors = DEFAULT_BEHAVIORS
            .iter()
            .map(|(pattern, category, weight)| BehaviorPatternDef {
                pattern: pattern.to_string(),
                category: category.to_string(),
                weight: *weight,
            })
            .collect();

        Self {
            agents,
            suspicious_headers: DEFAULT_SUSPICIOUS_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            behaviors,
        }
    }
}

/// AI crawlers, assistants and agent frameworks.
const DEFAULT_AGENTS: &[(&str, &str)] = &[
    ("GPTBot", "OpenAI"),
    ("ChatGPT-User", "OpenAI"),
    ("OAI-SearchBot", "OpenAI"),
    ("ClaudeBot", "Anthropic"),
    ("Claude-Web", "Anthropic"),
    ("Claude-User", "Anthropic"),
    ("anthropic-ai", "Anthropic"),
    ("PerplexityBot", "Perplexity"),
    ("Perplexity-User", "Perplexity"),
    ("Google-Extended", "Google"),
    ("Applebot-Extended", "Apple"),
    ("CCBot", "Common Crawl"),
    ("Bytespider", "ByteDance"),
    ("Amazonbot", "Amazon"),
    ("cohere-ai", "Cohere"),
    ("Meta-ExternalAgent", "Meta"),
    ("Meta-ExternalFetcher", "Meta"),
    ("Diffbot", "Diffbot"),
    ("YouBot", "You.com"),
    ("MistralAI-User", "Mistral"),
    ("ImagesiftBot", "Hive"),
    ("Timpibot", "Timpi"),
    ("omgili", "Webz.io"),
];

/// Headers set by AI SDKs and browser automation drivers.
const DEFAULT_SUSPICIOUS_HEADERS: &[&str] = &[
    "x-stainless-lang",
    "x-stainless-package-version",
    "x-stainless-runtime",
    "openai-organization",
    "anthropic-version",
    "x-openai-client-user-agent",
    "x-selenium",
    "x-puppeteer",
    "x-playwright",
    "x-automation",
    "x-headless",
];

/// (pattern, category, weight)
const DEFAULT_BEHAVIORS: &[(&str, &str, f64)] = &[
    (
        r"(?i)(headless|phantomjs|selenium|puppeteer|playwright|webdriver)",
        "automation-tool",
        0.8,
    ),
    (
        r"(?i)(python|curl/|wget|httpie|go-http-client|java/|okhttp|libwww|node-fetch|axios|aiohttp|httpx|undici)",
        "automation",
        0.6,
    ),
    (
        r"(?i)(api[-_ ]?client|sdk/|postman|insomnia|openapi)",
        "api-client",
        0.5,
    ),
    (
        r"(?i)(scrap|crawl|spider|harvest|extractor)",
        "scraping",
        0.7,
    ),
    (
        r"(?i)(research|academic|university|dataset|corpus)",
        "research",
        0.4,
    ),
    (
        r"(?i)(monitor|uptime|pingdom|healthcheck|statuscake)",
        "monitoring",
        0.3,
    ),
];

/// Compiled behavior pattern.
#[derive(Debug, Clone)]
pub struct BehaviorPattern {
    pub pattern: Regex,
    pub category: String,
    pub weight: f64,
}

/// Compiled agent signature with a pre-lowercased needle.
#[derive(Debug, Clone)]
pub struct CompiledAgent {
    pub identifier: String,
    pub needle: String,
    pub operator: Option<String>,
}

/// Compiled catalog, ready for lookup.
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    agents: Vec<CompiledAgent>,
    suspicious_headers: Vec<String>,
    behaviors: Vec<BehaviorPattern>,
}

impl SignatureCatalog {
    /// Load the catalog from `path`, or the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let definition: CatalogDefinition = crate::error::load_data_file(path)?;
            let catalog = Self::compile(definition)?;
            info!(
                path = %path.display(),
                agents = catalog.agents.len(),
                headers = catalog.suspicious_headers.len(),
                behaviors = catalog.behaviors.len(),
                "Loaded signature catalog"
            );
            Ok(catalog)
        } else {
            debug!(path = %path.display(), "Signature file not found, using built-in catalog");
            Ok(Self::default())
        }
    }

    /// Compile a definition. Fails on an invalid regex or a negative weight.
    pub fn compile(definition: CatalogDefinition) -> Result<Self> {
        let agents = definition
            .agents
            .into_iter()
            .filter(|a| !a.identifier.trim().is_empty())
            .map(|a| CompiledAgent {
                needle: a.identifier.to_lowercase(),
                identifier: a.identifier,
                operator: a.operator,
            })
            .collect();

        let suspicious_headers = definition
            .suspicious_headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        let behaviors = definition
            .behaviors
            .into_iter()
            .map(|def| {
                if !def.weight.is_finite() || def.weight < 0.0 {
                    return Err(AiGuardError::InvalidConfig(format!(
                        "behavior `{}` has invalid weight {}",
                        def.category, def.weight
                    )));
                }
                let pattern = Regex::new(&def.pattern).map_err(|source| {
                    AiGuardError::InvalidPattern {
                        pattern: def.pattern.clone(),
                        source,
                    }
                })?;
                Ok(BehaviorPattern {
                    pattern,
                    category: def.category,
                    weight: def.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            agents,
            suspicious_headers,
            behaviors,
        })
    }

    /// AI agent identifiers found in the User-Agent, in catalog order.
    pub fn match_agents<'a>(&'a self, user_agent: &str) -> impl Iterator<Item = &'a CompiledAgent> {
        let ua_lower = user_agent.to_lowercase();
        self.agents
            .iter()
            .filter(move |agent| ua_lower.contains(&agent.needle))
    }

    /// Behavior patterns matching the User-Agent, in catalog order.
    pub fn match_behaviors<'a>(
        &'a self,
        user_agent: &'a str,
    ) -> impl Iterator<Item = &'a BehaviorPattern> {
        self.behaviors
            .iter()
            .filter(move |b| b.pattern.is_match(user_agent))
    }

    pub fn agents(&self) -> &[CompiledAgent] {
        &self.agents
    }

    /// Suspicious header names, lower-cased.
    pub fn suspicious_headers(&self) -> &[String] {
        &self.suspicious_headers
    }

    pub fn behaviors(&self) -> &[BehaviorPattern] {
        &self.behaviors
    }
}

impl Default for SignatureCatalog {
    fn default() -> Self {
        Self::compile(CatalogDefinition::default()).unwrap_or_else(|e| {
            error!(error = %e, "Built-in signature catalog failed to compile, detection disabled");
            Self {
                agents: Vec::new(),
                suspicious_headers: Vec::new(),
                behaviors: Vec::new(),
            }
        })
    }
}
