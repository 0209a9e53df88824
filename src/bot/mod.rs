//! Conversation controller.
//!
//! `AwaitingLeague` → (league text) → `AwaitingDate` → (date callback) →
//! fixtures sent, back to `AwaitingLeague`. `/start` and `/help` reset from
//! anywhere. Stray text gets the prompt for whichever phase the chat is in. The controller knows nothing about Telegram: it maps an
//! [`Incoming`] event to the [`Outgoing`] actions the transport must perform.

pub mod keyboards;
pub mod telegram;

use crate::error::SessionError;
use crate::models::{ConversationId, League, Phase, league_by_name};
use crate::service::FixtureService;
use crate::session::SessionStore;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use self::keyboards::{Keyboard, date_keyboard, league_keyboard, parse_date_payload};

pub const WELCOME_TEXT: &str = "⚽ Добро пожаловать в Football Schedule Bot!\n\
    Выберите лигу, затем выберите дату.\n\n\
    Команды:\n/start - Начать\n/help - Показать помощь";
pub const USE_MENU_TEXT: &str = "Пожалуйста, выберите лигу из меню или используйте /start.";
pub const PICK_LEAGUE_FIRST_TEXT: &str = "Сначала выберите лигу!";
pub const BAD_DATE_TEXT: &str = "Некорректная дата";
pub const PICK_AGAIN_TEXT: &str = "Выберите другую лигу или дату:";
pub const PICK_DATE_TEXT: &str = "Выберите дату или другую лигу из меню.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text {
        chat: ConversationId,
        text: String,
    },
    Callback {
        chat: ConversationId,
        query_id: String,
        data: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Message {
        chat: ConversationId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    /// Acknowledge a button press, optionally with a toast.
    CallbackAnswer {
        query_id: String,
        text: Option<String>,
    },
}

impl Outgoing {
    fn message(chat: ConversationId, text: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self::Message { chat, text: text.into(), keyboard }
    }

    fn answer(query_id: &str, text: Option<&str>) -> Self {
        Self::CallbackAnswer {
            query_id: query_id.to_string(),
            text: text.map(str::to_string),
        }
    }
}

pub struct Controller {
    store: Arc<SessionStore>,
    service: Arc<FixtureService>,
    leagues: &'static [League],
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Controller {
    pub fn new(store: Arc<SessionStore>, service: Arc<FixtureService>, leagues: &'static [League]) -> Self {
        Self {
            store,
            service,
            leagues,
            today: local_today,
        }
    }

    /// Replace the clock used for the today/tomorrow buttons.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn handle(&self, event: Incoming) -> Vec<Outgoing> {
        match event {
            Incoming::Text { chat, text } => self.on_text(chat, &text),
            Incoming::Callback { chat, query_id, data } => self.on_callback(chat, &query_id, &data).await,
        }
    }

    fn on_text(&self, chat: ConversationId, text: &str) -> Vec<Outgoing> {
        if let Some("start" | "help") = crate::utils::command_name(text) {
            self.store.reset(chat);
            return vec![Outgoing::message(chat, WELCOME_TEXT, Some(league_keyboard(self.leagues)))];
        }

        match league_by_name(text.trim()).filter(|l| self.leagues.contains(*l)) {
            Some(league) => {
                self.store.set_league(chat, league);
                info!(conversation = %chat, league = league.source_ref, sessions = self.store.len(), "league chosen");
                vec![Outgoing::message(
                    chat,
                    format!("Вы выбрали {}. Теперь выберите дату:", league.display_name),
                    Some(date_keyboard((self.today)())),
                )]
            }
            None => match self.store.get(chat).map(|s| s.phase) {
                // a league is picked and its date buttons are on screen; offer them again
                Some(Phase::AwaitingDate) => vec![Outgoing::message(
                    chat,
                    PICK_DATE_TEXT,
                    Some(date_keyboard((self.today)())),
                )],
                _ => vec![Outgoing::message(chat, USE_MENU_TEXT, None)],
            },
        }
    }

    async fn on_callback(&self, chat: ConversationId, query_id: &str, data: &str) -> Vec<Outgoing> {
        let date = match parse_date_payload(data) {
            Some(Ok(date)) => date,
            Some(Err(e)) => {
                warn!(conversation = %chat, "{}", e);
                return vec![Outgoing::answer(query_id, Some(BAD_DATE_TEXT))];
            }
            None => return vec![Outgoing::answer(query_id, None)],
        };

        // Clone the league out; the store is not touched again until the fetch is done.
        let league = match self.selected_league(chat) {
            Ok(league) => league,
            Err(e) => {
                warn!(%date, "{}", e);
                return vec![Outgoing::answer(query_id, Some(PICK_LEAGUE_FIRST_TEXT))];
            }
        };

        let fixtures = self.service.get_fixtures(&league, date).await;
        self.store.mark_awaiting_league(chat);

        vec![
            Outgoing::answer(query_id, None),
            Outgoing::message(chat, fixtures, None),
            Outgoing::message(chat, PICK_AGAIN_TEXT, Some(league_keyboard(self.leagues))),
        ]
    }

    fn selected_league(&self, chat: ConversationId) -> Result<League, SessionError> {
        self.store
            .get(chat)
            .and_then(|s| s.selected_league)
            .ok_or(SessionError::InvalidUserState(chat))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
