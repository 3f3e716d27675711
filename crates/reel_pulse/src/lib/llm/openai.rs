use std::path::{Path, PathBuf};

use narration_sync::{TimingAccumulator, WordTiming};
use reqwest::Client;
use serde::Deserialize;

use crate::llm::analyst::{Analyst, ArticleRef};
use crate::llm::matcher::AssetMatcher;
use crate::speech::{Synthesizer, WordRecognizer};

pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_completion_request(
        &self,
        model_name: impl Into<String>,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, OpenAIError> {
        let body = serde_json::json!({
            "model": model_name.into(),
            "messages": [
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }

    async fn completion_text(
        &self,
        model_name: &str,
        prompt: String,
    ) -> Result<String, OpenAIError> {
        let response = self.send_completion_request(model_name, prompt).await?;
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| OpenAIError::Api {
                status: 0,
                message: "No content in response".into(),
            })
    }

    pub async fn send_speech_request(
        &self,
        text: impl Into<String>,
        voice: impl Into<String>,
        out_path: impl Into<PathBuf>,
    ) -> Result<(), OpenAIError> {
        let body = serde_json::json!({
            "model": "tts-1",
            "voice": voice.into(),
            "input": text.into(),
            "response_format": "wav"
        });

        let resp = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        let bytes = resp.bytes().await?;
        tokio::fs::write(out_path.into(), &bytes).await?;
        Ok(())
    }

    pub async fn send_transcribe_request(
        &self,
        file: impl Into<PathBuf>,
        model_name: impl Into<String>,
    ) -> Result<TranscriptionResponse, OpenAIError> {
        let audio_path = file.into();

        let bytes = tokio::fs::read(&audio_path).await?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("narration.wav")
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .text("model", model_name.into())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .part("file", part);

        let resp = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp.json::<TranscriptionResponse>().await?)
    }
}

/// Clips text to roughly `limit` tokens so a single completion request
/// stays inside the model's context window.
fn clip_to_token_limit(text: &str, limit: usize) -> String {
    let Ok(bpe) = another_tiktoken_rs::cl100k_base() else {
        return text.to_string();
    };
    let tokens = bpe.encode_with_special_tokens(text);
    if tokens.len() <= limit {
        return text.to_string();
    }

    let keep_chars = text.chars().count() * limit / tokens.len();
    tracing::warn!(
        tokens = tokens.len(),
        limit,
        "clipping article text to the context window"
    );
    text.chars().take(keep_chars).collect()
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionResponse {
    pub duration: f64,
    pub text: String,
    pub words: Option<Vec<TranscribedWord>>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl Analyst for OpenAIClient {
    const ANALYST_MODEL: &'static str = "gpt-4o-mini";
    type Error = OpenAIError;

    async fn summarize_article(
        &self,
        article: &ArticleRef<'_>,
    ) -> Result<Option<String>, OpenAIError> {
        let text = clip_to_token_limit(article.text, Self::CONTEXT_WINDOW_LIMIT);

        let relevance_prompt = format!(
            "You are a financial analyst specializing in evaluating news articles for their potential impact on a company's stock price.\n\
             Analyze the following article and determine whether it is relevant to the future stock price movement of the specified company.\n\
             Consider factors such as financial performance, market conditions, legal issues, management changes, or other significant events that could influence the stock price.\n\
             Respond with 'True' if the article is relevant, or 'False' if it is not.\n\
             Your response should be only 'True' or 'False'.\n\
             Company Name: {company}\n\
             Stock Symbol: {symbol}\n\
             Article Link: {url}\n\
             Article Text: {text}",
            company = article.company,
            symbol = article.symbol,
            url = article.url,
        );
        let verdict = self
            .completion_text(Self::ANALYST_MODEL, relevance_prompt)
            .await?;
        if verdict.trim().to_lowercase() != "true" {
            tracing::debug!(url = article.url, "article judged irrelevant");
            return Ok(None);
        }

        let summary_prompt = format!(
            "You are a financial analyst with expertise in assessing news impact on stock prices in the immediate term.\n\
             Please perform the following tasks:\n\
             1. **Summarize** the following news article related to {company} ({symbol}) in 2-3 sentences.\n\
             2. **Evaluate** the likely impact of this news on the company's stock price for the next trading day. Indicate whether the impact is **positive**, **negative**, or **neutral**.\n\
             3. **Explain** your reasoning in 1-2 sentences.\n\
             Provide your response in a clear and organized manner, numbering each part accordingly.\n\n\
             Article Link: {url}\n\n\
             Article Text:\n{text}\n",
            company = article.company,
            symbol = article.symbol,
            url = article.url,
        );
        let summary = self
            .completion_text(Self::ANALYST_MODEL, summary_prompt)
            .await?;
        Ok(Some(summary))
    }

    async fn opening_analysis(
        &self,
        stock_info: &str,
        company: &str,
        symbol: &str,
    ) -> Result<String, OpenAIError> {
        let prompt = format!(
            "You are a seasoned financial analyst and market commentator.\n\
             Based on the latest news and developments related to {company} ({symbol}), \
             provide a concise and insightful analysis of how the stock is likely to perform when the market opens today.\n\
             Your explanation should be professional, use clear language, and be suitable for an audio briefing to investors.\n\n\
             Latest News Summary:\n{stock_info}\n\n\
             Your analysis should include:\n\
             1. A prediction on whether the stock will go **up** or **down** at market open, and why.\n\
             2. An estimated percentage of the expected price movement.\n\
             3. Key factors from the news that support your prediction.\n\
             Please present your analysis in a single, well-structured paragraph."
        );
        self.completion_text(Self::ANALYST_MODEL, prompt).await
    }
}

impl AssetMatcher for OpenAIClient {
    type Error = OpenAIError;

    async fn match_assets(
        &self,
        sentences: &[String],
        asset_ids: &[String],
    ) -> Result<String, OpenAIError> {
        let prompt = format!(
            "You are selecting background video clips for a narrated market brief.\n\
             For each narration sentence below, pick the most fitting clip from the available list, or null if none fits.\n\
             Respond with only a JSON object mapping each sentence (verbatim) to a clip name or null, in the order the sentences are given.\n\n\
             Sentences:\n{sentences}\n\n\
             Available clips:\n{assets}",
            sentences = sentences.join("\n"),
            assets = asset_ids.join("\n"),
        );
        self.completion_text(Self::ANALYST_MODEL, prompt).await
    }
}

impl Synthesizer for OpenAIClient {
    const VOICE_MODEL: &'static str = "tts-1";
    type Error = OpenAIError;

    async fn synthesize(&self, text: &str, out_path: &Path) -> Result<(), OpenAIError> {
        self.send_speech_request(text, "alloy", out_path).await
    }
}

impl WordRecognizer for OpenAIClient {
    const RECOGNIZER_MODEL: &'static str = "whisper-1";
    type Error = OpenAIError;

    async fn recognize(&self, audio_path: &Path) -> Result<Vec<WordTiming>, OpenAIError> {
        let response = self
            .send_transcribe_request(audio_path, Self::RECOGNIZER_MODEL)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to transcribe narration"))?;

        let words = response.words.unwrap_or_default();
        Ok(TimingAccumulator::new().finalize(
            words
                .into_iter()
                .map(|w| WordTiming::new(w.word, w.start, w.end)),
        ))
    }
}
