use super::dispatch::Reply;
use super::types::*;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const PARSE_MODE: &str = "HTML";

/// Minimal Telegram Bot API client over HTTPS + JSON.
pub struct TelegramApi {
    client: Client,
    base_url: String,
    poll_timeout_s: u64,
}

impl TelegramApi {
    pub fn new(api_base: &str, token: &str, poll_timeout_s: u64) -> Result<Self> {
        // Long polls hold the request open for poll_timeout_s.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_s + 15))
            .pool_max_idle_per_host(2)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            poll_timeout_s,
        })
    }

    /// Pre-flight check that the token is valid. Returns the bot account.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let req = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_s,
            allowed_updates: vec!["message".to_string(), "callback_query".to_string()],
        };
        self.call("getUpdates", &req).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let req = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            parse_mode: PARSE_MODE.to_string(),
            disable_web_page_preview: true,
            reply_markup,
        };
        self.call("sendMessage", &req).await
    }

    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let req = EditMessageTextRequest {
            chat_id,
            message_id,
            text: text.to_string(),
            parse_mode: PARSE_MODE.to_string(),
            disable_web_page_preview: true,
        };
        // Result is the edited Message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &req).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let req = AnswerCallbackQueryRequest {
            callback_query_id: callback_query_id.to_string(),
        };
        let _: bool = self.call("answerCallbackQuery", &req).await?;
        Ok(())
    }

    /// Deliver one dispatcher reply.
    pub async fn execute(&self, reply: Reply) -> Result<()> {
        match reply {
            Reply::Send { chat_id, text, keyboard } => {
                self.send_message(chat_id, &text, keyboard).await?;
            }
            Reply::Edit { chat_id, message_id, text } => {
                self.edit_message_text(chat_id, message_id, &text).await?;
            }
            Reply::AnswerCallback { callback_id } => {
                self.answer_callback_query(&callback_id).await?;
            }
        }
        Ok(())
    }

    /// POST a Bot API method. Errors never include the URL, which carries the token.
    async fn call<Req: Serialize, Res: DeserializeOwned>(&self, method: &str, req: &Req) -> Result<Res> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("{} request failed", method))?;

        let status = resp.status();
        let parsed: ApiResponse<Res> = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("failed to parse {} response ({})", method, status))?;

        if !parsed.ok {
            anyhow::bail!(
                "{} failed ({}): {}",
                method,
                status,
                parsed.description.unwrap_or_default()
            );
        }
        parsed
            .result
            .with_context(|| format!("{} returned ok without a result", method))
    }
}
