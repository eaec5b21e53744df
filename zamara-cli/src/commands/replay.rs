//! Replay summary

use crate::output;
use anyhow::{Context, Result};
use colored::*;
use zamara::{Player, Replay};

fn outcome(player: &Player) -> ColoredString {
    match player.outcome {
        1 => "Win".green(),
        2 => "Loss".red(),
        _ => "Unknown".dimmed(),
    }
}

fn player_line(player: &Player) -> String {
    let mut line = format!(
        "  {:20} {:8} team {}  {}  {}",
        player.name,
        player.actual_race.name(),
        player.team,
        player.color.to_hex(),
        outcome(player)
    );

    if player.chosen_race != player.actual_race {
        line.push_str(&format!(" (picked {})", player.chosen_race));
    }
    if player.player_type == zamara::replay::PlayerType::Computer {
        line.push_str(&format!(" [AI {}]", player.difficulty));
    }
    if player.handicap != 100 {
        line.push_str(&format!(" handicap {}%", player.handicap));
    }
    line
}

/// Summarize a replay
pub fn replay(replay_path: &str) -> Result<()> {
    let replay = Replay::open_path(replay_path)
        .with_context(|| format!("Failed to read replay: {}", replay_path))?;

    if !output::text_mode() {
        output::print_output(&replay)?;
        return Ok(());
    }

    output::heading(&replay.map_name);
    println!("  Played:   {}", replay.timestamp.format("%Y-%m-%d %H:%M:%S %:z"));
    println!("  Type:     {}", replay.game_type);
    println!("  Speed:    {}", replay.game_speed);
    println!("  Category: {}", replay.game_category);
    println!();

    output::heading(&format!("Players ({})", replay.players.len()));
    for player in &replay.players {
        println!("{}", player_line(player));
    }

    Ok(())
}
