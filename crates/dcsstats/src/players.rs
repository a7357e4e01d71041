use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;

use dcsstats_sessions::{EndReason, Player, PlayerRoster, Sortie};

use crate::output::SessionReport;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read all sources and write the output files
    Build {
        /// Also write sorties.json with every reconstructed sortie
        #[arg(long)]
        sorties: bool,
    },

    /// List all players with their current name and play time
    Players {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sortie timeline of one player
    Sorties {
        /// Stable player id, as found in the session file names
        player_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct PlayerRow<'a> {
    id: &'a str,
    name: &'a str,
    sessions: usize,
    sorties: usize,
    play_time_secs: i64,
}

pub fn handle_players(roster: &PlayerRoster, json: bool) -> Result<()> {
    let rows: Vec<PlayerRow> = roster
        .players()
        .map(|p| PlayerRow {
            id: &p.id,
            name: &p.name,
            sessions: p.sessions.len(),
            sorties: p.sortie_count(),
            play_time_secs: p.total_play_time(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("{}", "No players found.".dimmed());
    } else {
        print_players_table(&rows);
    }

    Ok(())
}

pub fn handle_sorties(roster: &PlayerRoster, player_id: &str, json: bool) -> Result<()> {
    let Some(player) = roster.get(player_id) else {
        anyhow::bail!("No player with id '{}'", player_id);
    };

    if json {
        let sessions: Vec<SessionReport> = player.sessions.iter().map(SessionReport::new).collect();
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else {
        print_player_sorties(player);
    }

    Ok(())
}

fn print_players_table(rows: &[PlayerRow]) {
    println!(
        "{:<24} {:<24} {:<9} {:<8} {}",
        "ID".dimmed(),
        "NAME".dimmed(),
        "SESSIONS".dimmed(),
        "SORTIES".dimmed(),
        "PLAY TIME".dimmed(),
    );

    for row in rows {
        println!(
            "{:<24} {:<24} {:<9} {:<8} {}",
            row.id,
            row.name,
            row.sessions,
            row.sorties,
            format_duration(row.play_time_secs)
        );
    }
}

fn print_player_sorties(player: &Player) {
    println!("{}", "=== Player ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), player.id);
    println!("{}  {}", "Name:".dimmed(), player.name);
    println!(
        "{}  {}",
        "Play time:".dimmed(),
        format_duration(player.total_play_time())
    );

    for session in &player.sessions {
        println!();
        let started = session
            .started_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| session.session_start.to_string());
        println!(
            "{} {} {}",
            started.bright_white().bold(),
            session.mission_name,
            format!("[{}]", session.source).dimmed()
        );

        if session.sorties().is_empty() {
            println!("  {}", "no sorties".dimmed());
        }
        for (i, sortie) in session.sorties().iter().enumerate() {
            print_sortie(i + 1, sortie);
        }
    }
}

fn print_sortie(number: usize, sortie: &Sortie) {
    let reason = match sortie.end_reason {
        Some(reason @ (EndReason::Landing | EndReason::Disconnect)) => {
            format!("{:?}", reason).bright_green().to_string()
        }
        Some(reason @ EndReason::Eject) => format!("{:?}", reason).bright_yellow().to_string(),
        Some(reason) => format!("{:?}", reason).bright_red().to_string(),
        None => "open".bright_cyan().to_string(),
    };
    let plane = if sortie.plane.is_empty() {
        "?"
    } else {
        sortie.plane.as_str()
    };
    let duration = sortie
        .duration_secs()
        .map(format_duration)
        .unwrap_or_else(|| "...".to_string());

    println!(
        "  {:>2}. {:<14} {:<10} {:<8} kills: {}  friendly fire: {}",
        number,
        plane,
        reason,
        duration,
        sortie.kills.len(),
        sortie.friendly_fires.len()
    );
}

fn format_duration(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
