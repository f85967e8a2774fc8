use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

mod config;
mod db;
mod error;
mod handlers;
mod lifecycle;
mod models;
mod stats;
mod store;

use teloxide::{
    dispatching::UpdateFilterExt,
    prelude::*,
    types::{CallbackQuery, MaybeInaccessibleMessage, PreCheckoutQuery},
};

use config::Config;
use handlers::{
    handle_callback_query, handle_message, pre_checkout_handler, successful_payment_handler,
    UserSession,
};

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let config = Config::load();
    let pool = db::connect(&config.database_url).await?;
    db::init_schema(&pool).await?;
    info!("database ready");

    let bot = Bot::from_env();
    let sessions = Arc::new(Mutex::new(HashMap::<i64, UserSession>::new()));

    let handler = dptree::entry()
        // Payment confirmations must win over the generic message branch.
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.successful_payment().is_some())
                .endpoint({
                    let pool = pool.clone();
                    move |bot: Bot, msg: Message| {
                        let pool = pool.clone();
                        async move {
                            if let Err(e) = successful_payment_handler(bot, msg, pool).await {
                                error!("payment handler failed: {}", e);
                            }
                            respond(())
                        }
                    }
                }),
        )
        .branch(Update::filter_pre_checkout_query().endpoint({
            let pool = pool.clone();
            move |q: PreCheckoutQuery, bot: Bot| {
                let pool = pool.clone();
                async move {
                    if let Err(e) = pre_checkout_handler(bot, q, pool).await {
                        error!("pre-checkout handler failed: {}", e);
                    }
                    respond(())
                }
            }
        }))
        .branch(Update::filter_message().endpoint({
            let pool = pool.clone();
            let sessions = sessions.clone();
            move |bot: Bot, msg: Message| {
                let pool = pool.clone();
                let sessions = sessions.clone();
                async move {
                    let mut sessions = sessions.lock().await;
                    let chat_id = msg.chat.id;
                    if let Err(e) = handle_message(msg, bot.clone(), pool, &mut sessions).await {
                        error!("message handler failed: {}", e);
                        let _ = bot.send_message(chat_id, e.user_message()).await;
                    }
                    respond(())
                }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let pool = pool.clone();
            let config = config.clone();
            let sessions = sessions.clone();
            move |q: CallbackQuery, bot: Bot| {
                let pool = pool.clone();
                let config = config.clone();
                let sessions = sessions.clone();
                async move {
                    let mut sessions = sessions.lock().await;
                    if let Some(wrapped) = q.message.clone() {
                        if let Some(message) = MaybeInaccessibleMessage::regular_message(&wrapped) {
                            let chat_id = message.chat.id;
                            if let Err(e) = handle_callback_query(
                                q.clone(),
                                bot.clone(),
                                message.clone(),
                                pool,
                                config,
                                &mut sessions,
                            )
                            .await
                            {
                                error!("callback handler failed: {}", e);
                                let _ = bot.send_message(chat_id, e.user_message()).await;
                            }
                        }
                    }
                    respond(())
                }
            }
        }));

    info!("starting dispatcher");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
