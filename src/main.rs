use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use printboard::access::policy::AccessPolicy;
use printboard::channel::client::{ChannelClient, ChannelNotice};
use printboard::channel::models::{topic_for, INBOUND_EVENTS, OUTBOUND_EVENTS};
use printboard::cli::{Cli, Commands};
use printboard::config::models::Settings;
use printboard::kiosk::{Kiosk, TouchTarget};
use printboard::time_format;

#[tokio::main]
async fn main() -> Result<()> {
    colog::init();

    let cli = Cli::parse();
    let mut settings = printboard::config::loading::load_config()?;
    if cli.dev {
        warn!("Development mode: the free access window is always active.");
        settings.access.force_free_window = true;
    }

    let _sentry = settings.sentry_dsn.as_deref().filter(|dsn| !dsn.is_empty()).map(|dsn| {
        sentry::init((dsn, sentry::ClientOptions { release: sentry::release_name!(), ..Default::default() }))
    });

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&settings).await,
        Commands::Window { at } => {
            print_window(&settings, at.unwrap_or_else(|| Local::now().naive_local()));
            Ok(())
        },
        Commands::Topics => {
            for event in INBOUND_EVENTS {
                println!("in:  {}", topic_for(&settings.channel.root_topic, event));
            }
            for event in OUTBOUND_EVENTS {
                println!("out: {}", topic_for(&settings.channel.root_topic, event));
            }
            Ok(())
        },
    }
}

fn print_window(settings: &Settings, at: NaiveDateTime) {
    let policy = AccessPolicy::from_settings(&settings.access);
    match policy.window_for(at.weekday()) {
        Some(range) => println!(
            "{:?}: {} - {}",
            at.weekday(),
            time_format::minutes_to_time(range.start_minutes.into(), false, true),
            time_format::minutes_to_time(range.end_minutes.into(), false, true),
        ),
        None => println!("{:?}: no free access window", at.weekday()),
    }
    println!("Free access at {}: {}", at, policy.is_within_free_access_window(&at));
}

async fn run(settings: &Settings) -> Result<()> {
    let mut kiosk = Kiosk::new(AccessPolicy::from_settings(&settings.access), settings.input.debounce_time);
    let (channel, mut notices) = ChannelClient::connect(&settings.channel)?;
    let mut touches = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let wait = settings.board.refresh.duration_till_next_occurrence(&Local::now())?;

        tokio::select! {
            notice = notices.recv() => match notice {
                Some(ChannelNotice::Connected) => {
                    if let Err(e) = channel.subscribe().await {
                        error!("Could not subscribe to the channel: {}", e);
                    }
                },
                Some(ChannelNotice::Event(event)) => {
                    let now = Local::now().naive_local();
                    for command in kiosk.handle_inbound(event, &now) {
                        channel.emit(&command);
                    }
                    draw(&kiosk, &now);
                },
                None => bail!("Channel task stopped unexpectedly."),
            },
            line = touches.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {},
                Some(line) => match line.parse::<TouchTarget>() {
                    Ok(target) => {
                        let now = Local::now().naive_local();
                        for command in kiosk.handle_touch(target, std::time::Instant::now(), &now) {
                            channel.emit(&command);
                        }
                        draw(&kiosk, &now);
                    },
                    Err(e) => warn!("{}", e),
                },
                None => {
                    info!("Input closed, stopping.");
                    break;
                },
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping.");
                break;
            },
            _ = tokio::time::sleep(wait) => draw(&kiosk, &Local::now().naive_local()),
        }
    }

    for command in kiosk.shutdown() {
        channel.emit(&command);
    }
    Ok(())
}

fn draw(kiosk: &Kiosk, now: &NaiveDateTime) {
    if kiosk.fleet().is_empty() {
        println!("---- {} waiting for printer data ----", now.format("%a %H:%M"));
        return;
    }
    println!("---- {} ({} printers) ----", now.format("%a %H:%M"), kiosk.fleet().len());
    for line in kiosk.render(now) {
        println!("{}", line);
    }
}
