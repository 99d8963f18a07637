//! CLI command implementations.

use crate::config::{Config, CONFIG_DIR, CONFIG_FILE};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sociogram_graph::{Community, IngestReport, Network, NetworkBuilder, User, UserId};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_dir = path.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&config_dir)?;
    fs::write(
        &config_path,
        serde_json::to_string_pretty(&Config::default())?,
    )?;

    println!("{} Initialized Sociogram in {}", "✓".green(), path.display());
    println!("  Run {} to check your dataset", "sociogram load".cyan());

    Ok(())
}

/// Ingest the configured dataset, with a spinner while it runs.
fn load_network(config: &Config) -> Result<(Network, IngestReport)> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Reading {}...", config.dataset.display()));
    debug!(
        "Loading {} ({:?} ingestion, {:?} traversal)",
        config.dataset.display(),
        config.policy,
        config.traversal
    );

    let mut builder = NetworkBuilder::new()
        .with_policy(config.policy)
        .with_strategy(config.traversal);
    let result = builder.ingest_file(&config.dataset);

    spinner.finish_and_clear();

    let report = result.map_err(|e| format!("{}: {}", config.dataset.display(), e))?;
    Ok((builder.build(), report))
}

/// Load the dataset and show what ingestion did.
pub fn load(config: &Config, json: bool) -> Result<()> {
    let start = Instant::now();
    let (network, report) = load_network(config)?;
    let elapsed = start.elapsed().as_millis();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Loaded {} users and {} friendships from {} lines in {}ms",
        "✓".green(),
        report.users_inserted.to_string().cyan(),
        report.edges_linked.to_string().cyan(),
        report.lines,
        elapsed
    );
    let duplicates = report.users_inserted - distinct_users(&network);
    if duplicates > 0 {
        println!("  {} {} duplicate user ids", "!".yellow(), duplicates);
    }

    if !report.skipped.is_empty() {
        println!(
            "\n{} {} malformed lines, {} unresolved edges:",
            "⚠".yellow(),
            report.malformed_lines,
            report.unresolved_edges
        );
        for skipped in report.skipped.iter().take(5) {
            println!(
                "  {} - {}",
                format!("line {}", skipped.line).red(),
                skipped.reason
            );
        }
        if report.skipped.len() > 5 {
            println!("  ... and {} more", report.skipped.len() - 5);
        }
    }

    Ok(())
}

fn distinct_users(network: &Network) -> usize {
    let mut ids: Vec<UserId> = network.users().map(User::id).collect();
    ids.dedup();
    ids.len()
}

fn ids(users: &[&User]) -> Vec<UserId> {
    users.iter().map(|u| u.id()).collect()
}

/// Users reported at exactly `depth` hops.
pub fn reach(config: &Config, user: UserId, depth: Option<usize>, json: bool) -> Result<()> {
    let (network, _) = load_network(config)?;
    let depth = depth.unwrap_or(config.depth);
    let start = network.search(user)?;
    let found = ids(&network.reachable_at_depth(start, depth));

    if json {
        let out = serde_json::json!({
            "user": user,
            "depth": depth,
            "reached": found,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_reach(user, depth, &found);
    Ok(())
}

fn print_reach(user: UserId, depth: usize, found: &[UserId]) {
    println!(
        "{}",
        format!("Friends at distance {} from user {}:", depth, user).bold()
    );
    if found.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for id in found {
        println!("  User ID: {}", id.to_string().cyan());
    }
}

/// Friends shared by two users.
pub fn common(config: &Config, a: UserId, b: UserId, json: bool) -> Result<()> {
    let (network, _) = load_network(config)?;
    let ua = network.search(a)?;
    let ub = network.search(b)?;
    let shared = network.common_friends(ua, ub);

    if json {
        let out = serde_json::json!({ "users": [a, b], "common": shared });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_common(a, b, &shared);
    Ok(())
}

fn print_common(a: UserId, b: UserId, shared: &[UserId]) {
    println!("{}", format!("Common friends of {} and {}:", a, b).bold());
    if shared.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for id in shared {
        println!("  -> {}", id.to_string().cyan());
    }
}

/// Connected components of the friendship graph.
pub fn communities(config: &Config, json: bool) -> Result<()> {
    let (network, _) = load_network(config)?;
    let found = network.detect_communities();

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    print_communities(&found);
    Ok(())
}

fn print_communities(communities: &[Community]) {
    println!("{}", format!("Communities ({}):", communities.len()).bold());
    for community in communities {
        let members: Vec<String> = community.members.iter().map(|id| id.to_string()).collect();
        println!("  {{ {} }}", members.join(" ").cyan());
    }
}

/// Users reachable from one user.
pub fn influence(config: &Config, user: UserId, json: bool) -> Result<()> {
    let (network, _) = load_network(config)?;
    let score = network.influence(network.search(user)?);

    if json {
        let out = serde_json::json!({ "user": user, "influence": score });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {}",
        format!("Influence of user {}:", user).bold(),
        score.to_string().cyan()
    );
    Ok(())
}

/// Every analysis in one run.
pub fn report(
    config: &Config,
    user: Option<UserId>,
    other: Option<UserId>,
    depth: Option<usize>,
) -> Result<()> {
    let (network, _) = load_network(config)?;
    let user = user.unwrap_or(config.report_user);
    let other = other.unwrap_or(config.report_other);
    let depth = depth.unwrap_or(config.depth);

    let primary = network.search(user)?;
    let secondary = network.search(other)?;

    print_reach(user, depth, &ids(&network.reachable_at_depth(primary, depth)));
    println!();
    print_common(user, other, &network.common_friends(primary, secondary));
    println!();
    print_communities(&network.detect_communities());
    println!();
    println!(
        "{} {}",
        format!("Influence of user {}:", user).bold(),
        network.influence(primary).to_string().cyan()
    );

    Ok(())
}

/// Directory and graph statistics.
pub fn stats(config: &Config, json: bool) -> Result<()> {
    let (network, _) = load_network(config)?;
    let stats = network.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Network statistics".bold());
    println!("  Users:        {}", stats.users.to_string().cyan());
    println!("  Friendships:  {}", stats.friendships.to_string().cyan());
    println!("  Friend links: {}", stats.friend_links);
    println!("  Tree height:  {}", stats.tree_height);
    println!("  Black height: {}", stats.black_height);

    Ok(())
}

/// Verify the directory's red-black invariants.
pub fn check(config: &Config) -> Result<()> {
    let (network, _) = load_network(config)?;
    let black_height = network.directory().validate()?;

    println!(
        "{} {} nodes, black height {}",
        "✓".green(),
        network.len(),
        black_height
    );
    Ok(())
}
