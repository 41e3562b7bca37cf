// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring and model preparation.
//!
//! [`App::build`] connects the Ollama adapters, the in-memory store, the FAQ
//! matcher, and the image describer without touching the network.
//! [`prepare_models`] pulls models with a progress bar and prints their details.

use std::sync::Arc;

use colored::Colorize;
use faqchat_config::FaqchatConfig;
use faqchat_core::traits::PluginAdapter;
use faqchat_core::types::HealthStatus;
use faqchat_core::FaqchatError;
use faqchat_memory::{FaqMatcher, InMemoryVectorStore};
use faqchat_ollama::{
    client_from_config, describe_model, ModelSummary, OllamaClient, OllamaEmbedder,
    OllamaProvider,
};
use faqchat_skill::builtin::register_builtins;
use faqchat_skill::{ImageDescriber, ToolRegistry};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Width of the label column in model details.
const LABEL_WIDTH: usize = 24;

/// The wired-up components of one faqchat run.
pub struct App {
    pub config: FaqchatConfig,
    pub client: OllamaClient,
    pub provider: Arc<OllamaProvider>,
    pub matcher: Arc<FaqMatcher>,
    pub describer: Arc<ImageDescriber>,
}

impl App {
    pub fn build(config: FaqchatConfig) -> Result<Self, FaqchatError> {
        let client = client_from_config(&config.ollama)?;
        let provider = Arc::new(OllamaProvider::new(client.clone()));
        let embedder = Arc::new(OllamaEmbedder::new(
            client.clone(),
            config.ollama.embedding_model.clone(),
        ));
        let store = Arc::new(InMemoryVectorStore::new(config.faq.embedding_dim));
        let matcher = Arc::new(FaqMatcher::new(store, embedder, config.faq.clone()));
        let describer = Arc::new(ImageDescriber::new(
            config.ollama.vision_model.clone(),
            config.image.clone(),
        ));

        Ok(Self {
            config,
            client,
            provider,
            matcher,
            describer,
        })
    }

    /// Fails early with a readable message when Ollama is not reachable.
    pub async fn check_ollama(&self) -> Result<(), FaqchatError> {
        match self.provider.health_check().await? {
            HealthStatus::Healthy => Ok(()),
            HealthStatus::Unhealthy(reason) => Err(FaqchatError::Provider {
                message: format!(
                    "cannot reach Ollama at {}: {reason}",
                    self.client.base_url()
                ),
                source: None,
            }),
        }
    }

    /// Installs the provider into the image describer.
    pub fn initialize_describer(&self) {
        self.describer.initialize(self.provider.clone());
    }

    /// Seeds the FAQ collection and reports how many entries are loaded.
    pub async fn seed_faq(&self) -> Result<(), FaqchatError> {
        let report = self.matcher.ensure_seeded().await?;
        let how = if report.created { "seeded" } else { "reused" };
        println!(
            "{} {} FAQ entries ({how})",
            "FAQ ready:".green(),
            report.records
        );
        Ok(())
    }

    /// Builds the tool registry offered to the chat model.
    pub fn tool_registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, self.matcher.clone(), self.describer.clone());
        info!(tools = registry.len(), "tool registry initialized");
        registry
    }
}

/// Pulls (unless `pull` is false) and describes each model in turn.
pub async fn prepare_models(
    client: &OllamaClient,
    models: &[&str],
    pull: bool,
) -> Result<(), FaqchatError> {
    for model in models {
        if pull {
            pull_model(client, model).await?;
        }
        let summary = describe_model(client, model).await?;
        print_summary(&summary);
    }
    Ok(())
}

async fn pull_model(client: &OllamaClient, model: &str) -> Result<(), FaqchatError> {
    println!("Preparing model {}", model.bold());
    let style = ProgressStyle::with_template(
        "{msg:<32} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({percent}%)",
    )
    .map_err(|e| FaqchatError::Internal(format!("invalid progress template: {e}")))?
    .progress_chars("=> ");

    let bar = ProgressBar::new(0);
    bar.set_style(style);

    let mut progress = client.pull(model).await?;
    while let Some(update) = progress.next().await {
        let update = match update {
            Ok(update) => update,
            Err(e) => {
                bar.abandon();
                return Err(e);
            }
        };
        bar.set_message(update.status.clone());
        if let Some(total) = update.total {
            bar.set_length(total);
        }
        if let Some(completed) = update.completed {
            bar.set_position(completed);
        }
    }
    bar.finish_and_clear();
    info!(model, "model pulled");
    Ok(())
}

fn print_summary(summary: &ModelSummary) {
    println!("{} {}", "Model:".bold(), summary.name);
    for (label, value) in summary_rows(summary) {
        println!("  {label:<width$}{value}", width = LABEL_WIDTH);
    }
}

/// Rows shown for a model. Optional facts appear only when known.
fn summary_rows(summary: &ModelSummary) -> Vec<(&'static str, String)> {
    let unknown = || "unknown".to_string();
    let mut rows = vec![
        (
            "Architecture",
            summary.architecture.clone().unwrap_or_else(unknown),
        ),
        (
            "Parameters",
            summary
                .parameter_count
                .map(group_digits)
                .unwrap_or_else(unknown),
        ),
        (
            "Quantization",
            summary.quantization.clone().unwrap_or_else(unknown),
        ),
    ];
    if let Some(languages) = &summary.languages {
        rows.push(("Languages", languages.clone()));
    }
    if let Some(context) = summary.context_length {
        rows.push(("Context length", group_digits(context)));
    }
    if let Some(embedding) = summary.embedding_length {
        rows.push(("Embedding length", group_digits(embedding)));
    }
    rows
}

/// Formats `n` with thousands separators.
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
