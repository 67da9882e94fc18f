use std::path::PathBuf;
use std::sync::Arc;

use crate::ai::{CompletionClient, GroqClient};
use crate::config::Config;
use crate::error::AppError;
use crate::models::AnalysisRecord;
use crate::store::HistoryStore;

const SUMMARY_PROMPT: &str = r#"Please summarize the following customer service call transcript in 2-3 clear, concise sentences:

{transcript}

Focus on the main issue, how it was resolved, and the outcome."#;

const SENTIMENT_PROMPT: &str = r#"Analyze the sentiment of the customer in this call transcript and classify it as one of: Positive, Neutral, or Negative.

{transcript}

Consider the overall tone, satisfaction level, and emotional state of the customer throughout the conversation.
Respond with just one word: Positive, Neutral, or Negative."#;

const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 150;

const SENTIMENT_TEMPERATURE: f32 = 0.1;
const SENTIMENT_MAX_TOKENS: u32 = 10;

/// Example transcript for trying the tool without a real call log.
pub const SAMPLE_TRANSCRIPT: &str = "\
Agent: Hello, thank you for calling TechSupport Inc. How can I help you today?
Customer: Hi, I've been trying to book a time slot for a technician visit since yesterday, but every time I try to pay, the payment fails. It's really frustrating because I need this fixed urgently.
Agent: I'm sorry to hear about the payment issues you're experiencing. Let me check your account and see what might be causing this problem.
Customer: I've tried three different credit cards and none of them work. This is ridiculous! I'm a premium customer and I shouldn't have to deal with this.
Agent: I completely understand your frustration, and I apologize for the inconvenience. I can see there was a temporary issue with our payment gateway yesterday. Let me process your booking manually and waive the booking fee as an apology.
Customer: Oh, that would be great! Thank you so much. When can the technician come?
Agent: I can schedule you for tomorrow between 2-4 PM. Does that work for you?
Customer: Perfect! Thank you for resolving this so quickly.";

/// Everything the caller needs to display after one analysis.
pub struct AnalysisOutcome {
    pub summary: String,
    pub sentiment: String,
    pub status: String,
    pub history_path: Option<PathBuf>,
}

pub struct App {
    client: Arc<dyn CompletionClient>,
    store: HistoryStore,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(GroqClient::new(
            config.groq_api_key.clone(),
            config.model.clone(),
            config.request_timeout_secs,
        ));
        Self {
            client,
            store: HistoryStore::new(&config.history_path),
        }
    }

    /// Run the full analysis pipeline for one transcript.
    ///
    /// Never fails outward: remote and store errors degrade into the returned
    /// fields so the caller always has something to display.
    pub async fn analyze(&self, transcript: &str) -> AnalysisOutcome {
        if transcript.trim().is_empty() {
            return AnalysisOutcome {
                summary: String::new(),
                sentiment: String::new(),
                status: "Please enter a transcript to analyze.".to_string(),
                history_path: None,
            };
        }

        let (summary, sentiment) = self.run_remote_analysis(transcript).await;

        let record = AnalysisRecord::new(transcript, summary.clone(), sentiment.clone());
        let mut status = match self.store.append(&record) {
            Ok(()) => format!("Results saved to {}", self.store.path().display()),
            Err(e) => {
                tracing::error!("Failed to save analysis: {}", e);
                format!("Error saving results: {}", e)
            }
        };

        let history_path = match self.store.export() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Failed to refresh history export: {}", e);
                status.push_str(&format!(
                    "\nWarning: could not refresh history export: {}",
                    e
                ));
                Some(self.store.path().to_path_buf())
            }
        };

        AnalysisOutcome {
            summary,
            sentiment,
            status,
            history_path,
        }
    }

    /// Issue the two completion calls, one after the other.
    ///
    /// A failure on either call turns both display fields into placeholders;
    /// the record still gets written with them.
    async fn run_remote_analysis(&self, transcript: &str) -> (String, String) {
        let summary_prompt = SUMMARY_PROMPT.replace("{transcript}", transcript);
        let summary = match self
            .client
            .generate(&summary_prompt, SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS)
            .await
        {
            Ok(text) => text,
            Err(e) => return remote_failure(&e),
        };

        let sentiment_prompt = SENTIMENT_PROMPT.replace("{transcript}", transcript);
        match self
            .client
            .generate(&sentiment_prompt, SENTIMENT_TEMPERATURE, SENTIMENT_MAX_TOKENS)
            .await
        {
            Ok(sentiment) => (summary, sentiment),
            Err(e) => remote_failure(&e),
        }
    }

    /// Render the stored history for display.
    pub fn history_text(&self) -> String {
        match self.store.read_all() {
            Ok(records) => HistoryStore::render(&records),
            Err(e) => format!("Error reading history: {}", e),
        }
    }
}

fn remote_failure(error: &AppError) -> (String, String) {
    tracing::error!("Groq API call failed: {}", error);
    (
        format!("Error calling Groq API: {}", error),
        "Error".to_string(),
    )
}
