//! Simple IRC client example
//!
//! Connects, registers, joins a channel once the server welcomes us, greets
//! it and answers anyone who says hello. PING and CTCP VERSION/TIME/PING are
//! answered by the built-in handlers.
//!
//! Usage: `cargo run --example simple_client -- [host] [port] [#channel]`

use anyhow::Context;
use slirc_client::{connection, Client, ClientConfig, Event, EventKind, Outbox};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let hostname = args.next().unwrap_or_else(|| "irc.libera.chat".to_owned());
    let port = match args.next() {
        Some(port) => port.parse().context("port must be a number")?,
        None => 6667,
    };
    let channel = args.next().unwrap_or_else(|| "#example".to_owned());

    let config = ClientConfig {
        nickname: Some("slirc_example".to_owned()),
        ..ClientConfig::new(hostname, port)
    };

    let join = channel.clone();
    let mut client = Client::builder(config)
        .on(EventKind::Numeric(1), move |client, _| {
            info!(nick = %client.session().nickname, "registered, joining {}", join);
            client.send(&format!("JOIN {}", join))
        })
        .on(EventKind::Join, |client, _| {
            let ctx = client.context().clone();
            if ctx.nick.as_deref() == Some(client.session().nickname.as_str()) {
                if let Some(channel) = ctx.target {
                    client.msg(&channel, "Hello from slirc-client!")?;
                }
            }
            Ok(())
        })
        .on(EventKind::Privmsg, |client, event| {
            let Event::Privmsg(text) = event else {
                return Ok(());
            };
            let ctx = client.context().clone();
            if let (Some(nick), Some(target)) = (ctx.nick, ctx.target) {
                info!("<{}> {}: {}", nick, target, text);
                if text.to_lowercase().contains("hello") {
                    let reply_to = ctx.channel.unwrap_or(nick.clone());
                    client.msg(&reply_to, &format!("Hello there, {}!", nick))?;
                }
            }
            Ok(())
        })
        .on(EventKind::Disconnect, |_, _| {
            info!("connection closed");
            Ok(())
        })
        .build(Outbox::new())?;

    let stream = connection::connect(client.config(), None)
        .await
        .context("failed to connect")?;
    connection::run(stream, &mut client).await?;

    Ok(())
}
