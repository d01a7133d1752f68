//! A line-oriented Clue-Less client.
//!
//! ```text
//! CLUELESS_WS_URL=ws://localhost:8081 cargo run -p text-client
//! > join alice
//! > select scarlet
//! > ready
//! ```
//!
//! Type `help` for the command list.

use clueless::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  join <name> [game]        join a lobby
  select <character>        pick a character
  unselect                  drop your pick
  ready | unready
  start                     start the game
  moves                     list legal destinations
  move <location>
  suggest <suspect> <weapon>
  accuse <suspect> <weapon> <room>
  show <card>               answer a disprove request
  end                       end your turn
  new [fresh]               new game, keeping players unless 'fresh'
  ping
  state | log | help | quit";

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), ClueError> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    let mut client =
        ClueClient::from_config(&config).with_identity_store(FileIdentityStore::session_scoped());
    tracing::info!(endpoint = %config.endpoint, "connecting");
    client.connect().await?;

    if let Some(identity) = client.identity() {
        println!("rejoining as {}", identity.name);
        let game = identity.game_id.clone();
        let name = identity.name.clone();
        client.join_lobby(&name, Some(game)).await?;
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                if !run_command(&mut client, line.trim()).await {
                    break;
                }
            }
            update = client.next_update() => {
                match update {
                    Some(update) => render(&client, &update),
                    None => {
                        println!("disconnected");
                        break;
                    }
                }
            }
        }
    }

    client.close().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

type Client = ClueClient<clueless::transport::WebSocketConnector>;

/// Runs one command line. Returns `false` to quit.
async fn run_command(client: &mut Client, line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let result = match words.as_slice() {
        [] => Ok(()),
        ["quit" | "exit"] => return false,
        ["help"] => {
            println!("{HELP}");
            Ok(())
        }
        ["state"] => {
            print_state(client.store());
            Ok(())
        }
        ["log"] => {
            client.store().event_log().iter().for_each(|l| println!("  {l}"));
            Ok(())
        }
        ["moves"] => {
            print_moves(client.store());
            Ok(())
        }
        ["join", name] => client.join_lobby(name, None).await,
        ["join", name, game] => client.join_lobby(name, Some(GameId::from(*game))).await,
        ["select", who] => match who.parse::<Character>() {
            Ok(character) => client.select_character(character).await,
            Err(e) => {
                println!("{e}");
                Ok(())
            }
        },
        ["unselect"] => client.unselect_character().await,
        ["ready"] => client.set_ready(true).await,
        ["unready"] => client.set_ready(false).await,
        ["start"] => client.start_game().await,
        ["move", to] => client.move_to(&to.to_ascii_uppercase()).await,
        ["suggest", suspect, weapon] => client.suggest(suspect, weapon).await,
        ["accuse", suspect, weapon, room] => client.accuse(suspect, weapon, room).await,
        ["show", card] => client.respond_to_disprove(card).await,
        ["end"] => client.end_turn().await,
        ["new"] => client.new_game(true).await,
        ["new", "fresh"] => client.new_game(false).await,
        ["ping"] => client.ping().await,
        _ => {
            println!("unknown command; try 'help'");
            Ok(())
        }
    };

    if let Err(e) = result {
        println!("! {e}");
        client.clear_error();
    }
    true
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn render(client: &Client, update: &Update) {
    let store = client.store();
    match update {
        Update::Applied => {}
        Update::Discarded(e) => println!("? ignored a message: {e}"),
        Update::Reconnected => println!("reconnected"),
        Update::Closed => println!("server closed the connection"),
        Update::ConnectionLost { attempts } => {
            println!("gave up after {attempts} reconnect attempts")
        }
    }

    if let Some(line) = store.event_log().latest() {
        println!("* {line}");
    }
    if let Some(error) = store.error() {
        println!("! {error}");
    }
    if let Some(prompt) = store.disprove_prompt() {
        println!(
            "{} suggests {} with the {} in the {}. show one of: {}",
            prompt.suggester,
            prompt.suspect,
            prompt.weapon,
            prompt.room,
            prompt.candidates.iter().collect::<Vec<_>>().join(", ")
        );
    }
    if let Some(result) = store.suggestion_result() {
        match (&result.disprover, &result.revealed_card) {
            (Some(who), Some(card)) => println!("{who} showed you {card}"),
            (Some(who), None) => println!("{who} is choosing a card to show"),
            (None, _) => println!("nobody could disprove your suggestion"),
        }
    }
}

fn print_state(store: &SessionStore) {
    println!("phase: {}  connection: {}", store.phase(), store.connection());
    if let Some(identity) = store.identity() {
        println!("you: {} in {}", identity.player_id, store.game_id());
    }

    if let Some(lobby) = store.lobby() {
        for player in &lobby.players {
            let character = lobby.selection_of(player).unwrap_or("-");
            let ready = if lobby.is_ready(player) { "ready" } else { "" };
            println!("  {:<12} {character:<8} {ready}", player.as_str());
        }
        println!("  available: {}", lobby.available.join(", "));
    }

    if let Some(game) = store.game() {
        for player in &game.players {
            let turn = if game.is_turn_of(&player.name) { ">" } else { " " };
            let location = player.location_id().unwrap_or("?");
            let status = if player.active { "" } else { "(out)" };
            println!("{turn} {:<12} {:<8} {location} {status}", player.name.as_str(), player.character);
        }
        if let Some(winner) = game.winner.as_ref().filter(|_| game.game_over) {
            println!("  winner: {winner}");
        }
    }
}

fn print_moves(store: &SessionStore) {
    let (Some(from), Some(game)) = (store.my_location(), store.game()) else {
        println!("not on the board");
        return;
    };
    let occupied = game.occupied_corridors();
    let moves: Vec<String> = valid_destinations(from, &occupied)
        .iter()
        .map(Location::id)
        .collect();
    if moves.is_empty() {
        println!("no legal moves from {from}");
    } else {
        println!("from {from}: {}", moves.join(", "));
    }
}
