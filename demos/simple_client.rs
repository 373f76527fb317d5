//! Simple interactive IRC client
//!
//! Connects, prints every inbound line and reads commands from stdin:
//!
//! ```text
//! cargo run --example simple_client -- irc.libera.chat 6667 slirc-demo
//! ```
//!
//! `/join`, `/part`, `/msg`, `/topic`, `/names`, `/list`, `/raw`, `/quit`;
//! anything else is said in the current channel.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use slirc_client::{ClientConfig, ClientError, Event, Session};

fn help() {
    println!("Commands:");
    println!("  /join <channel>         join a channel");
    println!("  /part [channel]         leave a channel (default: current)");
    println!("  /msg <target> <text>    private message");
    println!("  /topic [channel] [text] show or set a topic");
    println!("  /names [channel]        list channel members");
    println!("  /list                   list channels");
    println!("  /raw <line>             send a raw line");
    println!("  /quit                   disconnect");
}

async fn handle_input(session: &Session, input: &str) -> Result<bool, ClientError> {
    let Some(rest) = input.strip_prefix('/') else {
        session.say(input).await?;
        return Ok(true);
    };

    let (command, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();

    match command.to_lowercase().as_str() {
        "quit" | "exit" => return Ok(false),
        "join" if !args.is_empty() => session.join(args).await?,
        "part" | "leave" if args.is_empty() => session.leave_current().await?,
        "part" | "leave" => session.leave(args).await?,
        "msg" | "query" => match args.split_once(' ') {
            Some((target, text)) => session.send_message(target, text).await?,
            None => println!("usage: /msg <target> <text>"),
        },
        "topic" => match args.split_once(' ') {
            Some((channel, text)) => session.set_topic(channel, text).await?,
            None => {
                let channel = (!args.is_empty()).then_some(args);
                match session.topic(channel).await? {
                    Some(topic) => println!("Topic: {}", topic),
                    None => println!("Topic requested"),
                }
            }
        },
        "names" => {
            let channel = (!args.is_empty()).then_some(args);
            let members = session.members(channel).await?;
            if members.is_empty() {
                println!("Names requested");
            } else {
                println!("Members: {}", members.into_iter().collect::<Vec<_>>().join(", "));
            }
        }
        "list" => session.list().await?,
        "raw" if !args.is_empty() => session.send_raw(args).await?,
        _ => help(),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let defaults = ClientConfig::default();
    let host = args.next().unwrap_or(defaults.host);
    let port = match args.next() {
        Some(port) => port.parse()?,
        None => defaults.port,
    };
    let nick = args.next().unwrap_or(defaults.nickname);

    let (session, mut events) = Session::connect(ClientConfig::new(host, port, nick)).await?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                Event::RawLine(line) => println!("← {}", line),
                Event::Registered { nick } => println!("✓ Registered as {}", nick),
                Event::NamesComplete { channel, members } => {
                    println!("Users in {}: {}", channel, members.join(", "))
                }
                Event::Disconnected { reason } => {
                    println!("Disconnected: {}", reason);
                    break;
                }
                _ => {}
            }
        }
    });

    help();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match handle_input(&session, line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(ClientError::NotConnected) => break,
            Err(e) => eprintln!("error: {}", e),
        }
    }

    session.disconnect().await?;
    Ok(())
}
