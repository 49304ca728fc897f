//! Print a player's statistics from a running backend

use chess_stats_core::api::DEFAULT_API_BASE;
use chess_stats_core::{calculate_statistics, ApiClient, PlayerCache};

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let player_id = args.next().unwrap_or_else(|| {
        eprintln!("Usage: player_report <player_id> [api_base_url]");
        std::process::exit(1);
    });
    let base_url = args.next().unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let client = match ApiClient::new(base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };
    let players = PlayerCache::new(client.clone());

    let player = match players.get_by_id(&player_id).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to get player: {}", e);
            std::process::exit(1);
        }
    };
    println!("{} (@{}) - rating {}", player.name, player.username, player.rating);

    let games = match client.fetch_games_by_player_id(&player_id).await {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to fetch games: {}", e);
            std::process::exit(1);
        }
    };

    let stats = calculate_statistics(&games);
    println!();
    println!("Games: {}", stats.total_games);
    println!("Win/Loss/Draw: {}/{}/{}", stats.wins, stats.losses, stats.draws);
    println!("Win rate: {:.1}%", stats.win_rate);
    println!("Average rating: {}", stats.average_rating);
    println!("Rating change: {:+}", stats.rating_change);
    for (time_control, count) in stats.games_by_time_control.iter() {
        println!("  {:<10} {}", time_control.display_name(), count);
    }
    println!(
        "White/Black: {}/{}",
        stats.games_by_color.white, stats.games_by_color.black
    );

    println!("\nRecent games:\n");
    for game in stats.recent_games.iter() {
        let opponent = players
            .get_by_id(&game.opponent_id)
            .await
            .map(|p| p.name)
            .unwrap_or_else(|_| game.opponent_id.clone());
        println!(
            "  {} vs {} [{}] {} as {} ({:+})",
            game.date,
            opponent,
            game.result.as_str(),
            game.time_control.as_str(),
            game.color.as_str(),
            game.rating.change
        );
        if let Some(opening) = &game.opening {
            println!("    Opening: {}", opening);
        }
    }
}
