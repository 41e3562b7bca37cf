// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand entry points.

use faqchat_config::FaqchatConfig;
use faqchat_core::FaqchatError;

use crate::bootstrap::{prepare_models, App};
use crate::shell::run_shell;

/// `faqchat shell`: prepare every model, seed the FAQ, then chat.
pub async fn shell(config: FaqchatConfig) -> Result<(), FaqchatError> {
    let app = App::build(config)?;
    app.check_ollama().await?;

    let ollama = &app.config.ollama;
    prepare_models(
        &app.client,
        &[
            ollama.chat_model.as_str(),
            ollama.embedding_model.as_str(),
            ollama.vision_model.as_str(),
        ],
        ollama.pull_on_start,
    )
    .await?;

    app.seed_faq().await?;
    app.initialize_describer();
    run_shell(&app).await
}

/// `faqchat faq <question>`: print the matching FAQ entries as JSON.
pub async fn faq(config: FaqchatConfig, question: &str) -> Result<(), FaqchatError> {
    let app = App::build(config)?;
    app.check_ollama().await?;
    if app.config.ollama.pull_on_start {
        prepare_models(&app.client, &[app.config.ollama.embedding_model.as_str()], true).await?;
    }

    let results = app.matcher.find_faq(question).await?;
    let json = serde_json::to_string_pretty(&results)
        .map_err(|e| FaqchatError::Internal(format!("failed to serialize results: {e}")))?;
    println!("{json}");
    Ok(())
}

/// `faqchat describe <image>`: print one image description.
pub async fn describe(config: FaqchatConfig, image: &str) -> Result<(), FaqchatError> {
    let app = App::build(config)?;
    app.check_ollama().await?;
    if app.config.ollama.pull_on_start {
        prepare_models(&app.client, &[app.config.ollama.vision_model.as_str()], true).await?;
    }

    app.initialize_describer();
    let description = app.describer.describe(image).await?;
    println!("{description}");
    Ok(())
}

/// `faqchat models`: pull the configured models and print their details.
pub async fn models(config: FaqchatConfig) -> Result<(), FaqchatError> {
    let app = App::build(config)?;
    app.check_ollama().await?;

    let ollama = &app.config.ollama;
    prepare_models(
        &app.client,
        &[
            ollama.chat_model.as_str(),
            ollama.embedding_model.as_str(),
            ollama.vision_model.as_str(),
        ],
        ollama.pull_on_start,
    )
    .await
}
