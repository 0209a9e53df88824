//! Telegram transport: teloxide updates in, controller actions out.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};
use tracing::{debug, info, warn};

use super::keyboards::Keyboard;
use super::{Controller, Incoming, Outgoing};
use crate::models::ConversationId;

/// Long-poll Telegram until Ctrl-C.
pub async fn serve(token: &SecretString, controller: Arc<Controller>) {
    let bot = Bot::new(token.expose_secret());

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    info!("bot started, polling for updates");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller])
        .default_handler(|upd| async move {
            debug!("unhandled update kind: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("bot stopped");
}

async fn on_message(bot: Bot, msg: Message, controller: Arc<Controller>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let event = Incoming::Text {
        chat: ConversationId(msg.chat.id.0),
        text: text.to_string(),
    };
    deliver(&bot, controller.handle(event).await).await
}

async fn on_callback(bot: Bot, q: CallbackQuery, controller: Arc<Controller>) -> ResponseResult<()> {
    let chat = q.message.as_ref().map(|m| m.chat().id);
    let (Some(chat), Some(data)) = (chat, q.data.clone()) else {
        warn!("callback {} without chat or payload", q.id);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let event = Incoming::Callback {
        chat: ConversationId(chat.0),
        query_id: q.id.clone(),
        data,
    };
    deliver(&bot, controller.handle(event).await).await
}

async fn deliver(bot: &Bot, actions: Vec<Outgoing>) -> ResponseResult<()> {
    let failed = send_all(actions, |action| send(bot, action)).await;
    if failed > 0 {
        warn!(failed, "some replies were not delivered");
    }
    Ok(())
}

async fn send(bot: &Bot, action: Outgoing) -> ResponseResult<()> {
    match action {
        Outgoing::Message { chat, text, keyboard } => {
            let req = bot.send_message(ChatId(chat.0), text);
            match keyboard {
                Some(kb) => req.reply_markup(markup(kb)).await?,
                None => req.await?,
            };
        }
        Outgoing::CallbackAnswer { query_id, text } => {
            let req = bot.answer_callback_query(query_id);
            match text {
                Some(t) => req.text(t).await?,
                None => req.await?,
            };
        }
    }
    Ok(())
}

/// Perform `actions` in order. A failed one is logged and the rest still go out.
/// Returns how many failed.
async fn send_all<F, Fut, E>(actions: Vec<Outgoing>, mut send: F) -> usize
where
    F: FnMut(Outgoing) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut failed = 0;
    for action in actions {
        let kind = match action {
            Outgoing::Message { .. } => "message",
            Outgoing::CallbackAnswer { .. } => "callback answer",
        };
        if let Err(e) = send(action).await {
            warn!("{} not delivered: {}", kind, e);
            failed += 1;
        }
    }
    failed
}

fn markup(kb: Keyboard) -> ReplyMarkup {
    match kb {
        Keyboard::Reply(rows) => ReplyMarkup::Keyboard(
            KeyboardMarkup::new(
                rows.into_iter()
                    .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>()),
            )
            .resize_keyboard(),
        ),
        Keyboard::Inline(rows) => ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(
            rows.into_iter().map(|row| {
                row.into_iter()
                    .map(|(label, data)| InlineKeyboardButton::callback(label, data))
                    .collect::<Vec<_>>()
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::keyboards::{date_keyboard, league_keyboard};
    use crate::models::LEAGUES;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_failed_send_does_not_drop_later_actions() {
        let chat = ConversationId(7);
        let actions = vec![
            Outgoing::CallbackAnswer { query_id: "q".to_string(), text: None },
            Outgoing::Message { chat, text: "fixtures".to_string(), keyboard: None },
            Outgoing::Message {
                chat,
                text: "again".to_string(),
                keyboard: Some(league_keyboard(LEAGUES)),
            },
        ];

        let mut attempted = Vec::new();
        let failed = send_all(actions.clone(), |action| {
            let stale = matches!(action, Outgoing::CallbackAnswer { .. });
            attempted.push(action);
            async move {
                if stale { Err("query is too old") } else { Ok(()) }
            }
        })
        .await;

        assert_eq!(failed, 1);
        assert_eq!(attempted, actions);
    }

    #[test]
    fn test_league_markup_is_reply_keyboard() {
        let ReplyMarkup::Keyboard(kb) = markup(league_keyboard(LEAGUES)) else {
            panic!("expected reply keyboard");
        };
        let count: usize = kb.keyboard.iter().map(|r| r.len()).sum();
        assert_eq!(count, LEAGUES.len());
        assert_eq!(kb.keyboard[0][0].text, LEAGUES[0].display_name);
    }

    #[test]
    fn test_date_markup_is_inline() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let ReplyMarkup::InlineKeyboard(kb) = markup(date_keyboard(today)) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(kb.inline_keyboard[0].len(), 2);
        assert_eq!(kb.inline_keyboard[0][0].text, "Сегодня");
    }
}
