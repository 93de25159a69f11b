use super::render;
use super::types::{CallbackQuery, InlineKeyboardMarkup, Message, Update};
use crate::engine::CriteriaField;
use crate::feed::ListingSource;
use crate::pipeline::RankingPipeline;
use crate::session::SessionStore;

/// Something to send back to Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Send {
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
    AnswerCallback {
        callback_id: String,
    },
}

impl Reply {
    fn text(chat_id: i64, text: String) -> Self {
        Reply::Send { chat_id, text, keyboard: None }
    }
}

/// Routes chat updates to the criteria store and the ranking pipeline.
/// Updates are handled one at a time; a ranking run finishes before the
/// next update is looked at.
pub struct Dispatcher<S> {
    sessions: SessionStore,
    pipeline: RankingPipeline<S>,
    allowed_chat: Option<i64>,
}

impl<S: ListingSource> Dispatcher<S> {
    pub fn new(sessions: SessionStore, pipeline: RankingPipeline<S>, allowed_chat: Option<i64>) -> Self {
        Self {
            sessions,
            pipeline,
            allowed_chat,
        }
    }

    pub fn sessions(&mut self) -> &mut SessionStore {
        &mut self.sessions
    }

    pub async fn handle(&mut self, update: &Update) -> Vec<Reply> {
        if let Some(query) = &update.callback_query {
            return self.handle_callback(query).await;
        }
        if let Some(message) = &update.message {
            return self.handle_message(message).await;
        }
        Vec::new()
    }

    fn chat_allowed(&self, chat_id: i64) -> bool {
        match self.allowed_chat {
            Some(allowed) if allowed != chat_id => {
                tracing::debug!(chat_id, "ignoring update from other chat");
                false
            }
            _ => true,
        }
    }

    async fn handle_message(&mut self, message: &Message) -> Vec<Reply> {
        let chat_id = message.chat.id;
        if !self.chat_allowed(chat_id) {
            return Vec::new();
        }
        let Some(text) = message.text.as_deref() else {
            return Vec::new();
        };
        let user_id = message.from.as_ref().map_or(chat_id, |u| u.id);

        if let Some(command) = parse_command(text) {
            tracing::debug!(user_id, command, "command");
            return match command {
                "/start" => vec![Reply::text(chat_id, render::welcome_text())],
                "/menu" => vec![Reply::Send {
                    chat_id,
                    text: render::menu_text(),
                    keyboard: Some(render::menu_keyboard()),
                }],
                "/criteria" | "/criteres" => {
                    let text = render::criteria_text(self.sessions.criteria(user_id));
                    vec![Reply::text(chat_id, text)]
                }
                "/runonce" => {
                    let text = self.ranking_text(user_id).await;
                    vec![Reply::text(chat_id, text)]
                }
                _ => Vec::new(),
            };
        }

        match self.sessions.complete_edit(user_id, text) {
            None => Vec::new(),
            Some((field, Ok(value))) => vec![
                Reply::text(chat_id, render::updated_text(field, &value)),
                Reply::text(chat_id, render::criteria_text(self.sessions.criteria(user_id))),
            ],
            Some((_, Err(e))) => vec![Reply::text(chat_id, render::validation_text(&e))],
        }
    }

    async fn handle_callback(&mut self, query: &CallbackQuery) -> Vec<Reply> {
        let user_id = query.from.id;
        let chat_id = query.message.as_ref().map_or(user_id, |m| m.chat.id);
        if !self.chat_allowed(chat_id) {
            return Vec::new();
        }

        let mut replies = vec![Reply::AnswerCallback {
            callback_id: query.id.clone(),
        }];
        let data = query.data.as_deref().unwrap_or_default();

        let text = if data == render::SHOW_ADS {
            self.ranking_text(user_id).await
        } else if let Some(field) = data
            .strip_prefix(render::EDIT_PREFIX)
            .and_then(|key| key.parse::<CriteriaField>().ok())
        {
            self.sessions.begin_edit(user_id, field);
            render::edit_prompt(field)
        } else {
            tracing::debug!(user_id, data, "unknown callback data");
            return replies;
        };

        replies.push(match &query.message {
            Some(m) => Reply::Edit {
                chat_id,
                message_id: m.message_id,
                text,
            },
            None => Reply::text(chat_id, text),
        });
        replies
    }

    async fn ranking_text(&mut self, user_id: i64) -> String {
        // Snapshot so the run is unaffected by later edits.
        let criteria = self.sessions.criteria(user_id).clone();
        let result = self.pipeline.rank(&criteria).await;
        render::ranking_text(&result)
    }
}

/// "/menu@AutoRoiBot arg" -> "/menu"
fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    Some(first.split('@').next().unwrap_or(first))
}
