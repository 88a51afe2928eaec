use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::*;
use directories::BaseDirs;
use feels::api::FeelsApi;
use feels::backup::BackupInfo;
use feels::commands::{CmdMessage, CmdResult, MessageLevel};
use feels::config::FeelsConfig;
use feels::model::{Entry, EntrySummary, Visibility};
use feels::neighbors::Neighbor;
use feels::paths::Owner;
use feels::registry;
use feels::store::fs_backend::FsBackend;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry().with(layer).with(filter).init();
}

struct AppContext {
    api: FeelsApi<FsBackend>,
    users_file: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Write { date, text }) => handle_write(&mut ctx, date, text),
        Some(Commands::List { json }) => handle_list(&ctx, json),
        None => handle_list(&ctx, false),
        Some(Commands::Show { id }) => handle_show(&ctx, &id),
        Some(Commands::Path { id }) => handle_path(&ctx, &id),
        Some(Commands::Nopub { id }) => finish(ctx.api.toggle_visibility(&id)?),
        Some(Commands::Delete { id, yes }) => {
            confirm(yes, "delete", &id)?;
            finish(ctx.api.delete(&id)?)
        }
        Some(Commands::Bury { id, yes }) => {
            confirm(yes, "bury", &id)?;
            finish(ctx.api.bury(&id)?)
        }
        Some(Commands::Sync) => finish(ctx.api.sync()?),
        Some(Commands::Publishing { state, dir }) => {
            finish(ctx.api.set_publishing(state.is_on(), dir)?)
        }
        Some(Commands::Channel { channel, state }) => {
            finish(ctx.api.set_channel(channel.into(), state.is_on())?)
        }
        Some(Commands::Backup) => finish(ctx.api.backup()?),
        Some(Commands::Backups) => handle_backups(&ctx),
        Some(Commands::Restore { archive }) => finish(ctx.api.restore(&archive)?),
        Some(Commands::Feed { page, json }) => handle_feed(&ctx, page, json),
        Some(Commands::Neighbors { json }) => handle_neighbors(&ctx, json),
        Some(Commands::Browse { user, id }) => handle_browse(&ctx, &user, id.as_deref()),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let home = match &cli.home {
        Some(home) => home.clone(),
        None => BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| anyhow!("could not determine your home directory"))?,
    };
    let user = match &cli.user {
        Some(user) => user.clone(),
        None => home
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("could not determine a user name from {}", home.display()))?,
    };

    let owner = Owner::new(user, home);
    let config = FeelsConfig::load_for(&owner)
        .with_context(|| format!("reading {}", owner.config_file().display()))?;
    debug!(owner = %owner.name, ?config, "loaded settings");

    Ok(AppContext {
        api: FeelsApi::new(FsBackend::new(), owner, config),
        users_file: cli.users_file.clone(),
    })
}

fn confirm(yes: bool, action: &str, id: &str) -> Result<()> {
    if !yes {
        bail!("refusing to {} {} without --yes", action, id);
    }
    Ok(())
}

/// Print a command's messages; a command that reported an error fails the run.
fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        bail!("nothing was changed");
    }
    Ok(())
}

fn handle_write(ctx: &mut AppContext, date: Option<String>, text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading feels from stdin")?;
            buf
        }
    };

    let result = match date {
        Some(date) => ctx.api.post(&date, &text)?,
        None => ctx.api.post_today(&text)?,
    };
    finish(result)
}

fn handle_list(ctx: &AppContext, json: bool) -> Result<()> {
    let result = ctx.api.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result.summaries)?);
        return Ok(());
    }
    print_summaries(&result.summaries, false);
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.show(id)?;
    print_entries(&result.entries);
    Ok(())
}

fn handle_path(ctx: &AppContext, id: &str) -> Result<()> {
    let result = ctx.api.entry_path(id)?;
    for path in &result.paths {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_backups(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_backups()?;
    print_backups(&result.backups);
    print_messages(&result.messages);
    Ok(())
}

/// Everyone in the users file, or just you when there is none.
fn known_owners(ctx: &AppContext) -> Result<Vec<Owner>> {
    let owner = ctx.api.owner();
    let mut owners = match (&ctx.users_file, owner.home.parent()) {
        (Some(file), Some(home_root)) => registry::load_owners(&FsBackend::new(), file, home_root)?,
        _ => Vec::new(),
    };
    if owners.is_empty() {
        owners.push(owner.clone());
    }
    Ok(owners)
}

fn handle_feed(ctx: &AppContext, page: usize, json: bool) -> Result<()> {
    let owners = known_owners(ctx)?;
    let result = ctx.api.feed(&owners, page.saturating_sub(1))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result.feed)?);
        return Ok(());
    }
    if let Some(page) = &result.feed {
        print_summaries(&page.items, true);
        if !page.items.is_empty() {
            println!(
                "{}",
                format!("page {} of {}", page.page_index + 1, page.total_pages).dimmed()
            );
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_neighbors(ctx: &AppContext, json: bool) -> Result<()> {
    let result = ctx.api.neighbors(&known_owners(ctx)?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result.neighbors)?);
        return Ok(());
    }
    print_neighbors(&result.neighbors);
    print_messages(&result.messages);
    Ok(())
}

fn handle_browse(ctx: &AppContext, user: &str, id: Option<&str>) -> Result<()> {
    let name = user.trim_start_matches('~');
    let neighbor = known_owners(ctx)?
        .into_iter()
        .find(|o| o.name == name)
        .ok_or_else(|| anyhow!("~{} does not keep feels here", name))?;

    match id {
        Some(id) => print_entries(&ctx.api.read_neighbor(&neighbor, id)?.entries),
        None => {
            let result = ctx.api.neighbor_entries(&neighbor)?;
            print_summaries(&result.summaries, false);
            print_messages(&result.messages);
        }
    }
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_entries(entries: &[Entry]) {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!("{}", entry.id.display_date().bold());
        println!("--------------------------------");
        println!("{}", entry.body);
    }
}

const OWNER_WIDTH: usize = 16;
const DATE_WIDTH: usize = 20;
const TIME_WIDTH: usize = 14;

fn print_summaries(summaries: &[EntrySummary], with_owner: bool) {
    for summary in summaries {
        let owner = if with_owner {
            let name = truncate_to_width(&format!("~{}", summary.owner), OWNER_WIDTH);
            let padding = OWNER_WIDTH.saturating_sub(name.width());
            format!("  {}{}", name.cyan(), " ".repeat(padding))
        } else {
            String::new()
        };

        let date = format!("{:<width$}", summary.display_date, width = DATE_WIDTH);
        let words = format!("{:>6} words", summary.word_count);
        let marker = match summary.visibility {
            Visibility::Private => " (nopub)".yellow(),
            Visibility::Public => "".normal(),
        };

        println!(
            "{}  {}  {}{}  {}",
            owner,
            date,
            words.dimmed(),
            marker,
            format_time_ago(summary.modified_at).dimmed()
        );
    }
}

fn print_neighbors(neighbors: &[Neighbor]) {
    for neighbor in neighbors {
        let name = truncate_to_width(&format!("~{}", neighbor.name), OWNER_WIDTH);
        let padding = OWNER_WIDTH.saturating_sub(name.width());
        let last = match neighbor.last_modified {
            Some(at) => format_time_ago(at),
            None => format!("{:>width$}", "never", width = TIME_WIDTH),
        };
        println!(
            "  {}{}  {}  {}  {}",
            name.cyan(),
            " ".repeat(padding),
            format!("{:>4} feels", neighbor.entry_count).dimmed(),
            last.dimmed(),
            neighbor.publish_url.as_deref().unwrap_or_default()
        );
    }
}

fn print_backups(backups: &[BackupInfo]) {
    for backup in backups {
        println!(
            "  {}  {}",
            backup.file_name,
            format!("{:>8} KiB", backup.size.div_ceil(1024)).dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: chrono::DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
