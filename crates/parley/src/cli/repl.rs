//! Line-oriented console session.

use super::ConsoleEngine;
use parley::{
    EventBus, NpcChatService, NpcId, ParleyResult, PlayerId, Position, SessionEvent, StartOutcome,
};
use std::io::BufRead;
use tracing::{debug, warn};

const HELP: &str = "\
commands:
  join <player> [name] [x y z]   player enters the world
  leave <player>                 player disconnects
  spawn <player> [name]          spawn an NPC even with auto-spawn off
  say <npc> <player> <message>   talk to an NPC
  list                           tracked NPCs
  history <npc>                  one NPC's conversation
  status                         worker state and counters
  start | stop                   restart the extension
  quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A player joins
    Join {
        /// Player id
        player: String,
        /// Display name
        name: Option<String>,
        /// Where they appear
        position: Option<Position>,
    },
    /// A player leaves
    Leave(String),
    /// Spawn an NPC on demand
    Spawn {
        /// Player id
        player: String,
        /// Display name
        name: Option<String>,
    },
    /// A player speaks to an NPC
    Say {
        /// NPC addressed
        npc: NpcId,
        /// Who speaks
        player: String,
        /// What they say
        message: String,
    },
    /// List NPCs
    List,
    /// Show a conversation
    History(NpcId),
    /// Show worker state
    Status,
    /// Start the service
    Start,
    /// Stop the service
    Stop,
    /// Print usage
    Help,
    /// Leave the session
    Quit,
}

impl Command {
    /// Parse a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("join", [player, tail @ ..]) => {
                let (name, coordinates) = match tail {
                    [name, coordinates @ ..] if name.parse::<f64>().is_err() => {
                        (Some(name.to_string()), coordinates)
                    }
                    coordinates => (None, coordinates),
                };
                let position = match coordinates {
                    [] => None,
                    [x, y, z] => Some(Position::new(
                        parse_number(x)?,
                        parse_number(y)?,
                        parse_number(z)?,
                    )),
                    _ => return Err("join takes x, y and z together".to_string()),
                };
                Command::Join {
                    player: player.to_string(),
                    name,
                    position,
                }
            }
            ("leave", [player]) => Command::Leave(player.to_string()),
            ("spawn", [player]) => Command::Spawn {
                player: player.to_string(),
                name: None,
            },
            ("spawn", [player, name]) => Command::Spawn {
                player: player.to_string(),
                name: Some(name.to_string()),
            },
            ("say", [npc, player, message @ ..]) if !message.is_empty() => Command::Say {
                npc: parse_npc(npc)?,
                player: player.to_string(),
                message: message.join(" "),
            },
            ("list", []) => Command::List,
            ("history", [npc]) => Command::History(parse_npc(npc)?),
            ("status", []) => Command::Status,
            ("start", []) => Command::Start,
            ("stop", []) => Command::Stop,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            _ => return Err(format!("cannot parse '{}'; try help", line.trim())),
        };
        Ok(Some(command))
    }
}

fn parse_npc(word: &str) -> Result<NpcId, String> {
    word.parse()
        .map(NpcId)
        .map_err(|_| format!("'{}' is not an NPC id", word))
}

fn parse_number(word: &str) -> Result<f64, String> {
    word.parse()
        .map_err(|_| format!("'{}' is not a coordinate", word))
}

/// Read commands from `input` until it ends or `quit`.
///
/// Join, leave and say go through `bus` the way engine events would.
pub fn run_repl(
    service: &NpcChatService,
    bus: &EventBus,
    engine: &ConsoleEngine,
    input: impl BufRead,
) -> ParleyResult<()> {
    println!("{}", HELP);

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Console input failed");
                break;
            }
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        debug!(?command, "Console command");

        match command {
            Command::Join {
                player,
                name,
                position,
            } => {
                let player_id = PlayerId::new(player.as_str());
                if let Some(position) = position {
                    engine.place_player(&player_id, position);
                }
                bus.publish(&SessionEvent::PlayerJoined {
                    player_id,
                    username: name.unwrap_or(player),
                    position,
                });
            }
            Command::Leave(player) => {
                bus.publish(&SessionEvent::PlayerLeft {
                    player_id: PlayerId::new(player),
                });
            }
            Command::Spawn { player, name } => {
                let player_id = PlayerId::new(player.as_str());
                let username = name.unwrap_or(player);
                if service.spawn_npc_for(&player_id, &username).is_none() {
                    println!("no NPC spawned");
                }
            }
            Command::Say {
                npc,
                player,
                message,
            } => {
                bus.publish(&SessionEvent::Chat {
                    npc_id: npc,
                    player_id: PlayerId::new(player),
                    message,
                });
            }
            Command::List => {
                let npcs = service.npcs();
                if npcs.is_empty() {
                    println!("no NPCs");
                }
                for npc in npcs {
                    println!(
                        "[{}] {} ({}) for {} at ({:.1}, {:.1}, {:.1}), {} turns",
                        npc.id(),
                        npc.display_name(),
                        npc.personality(),
                        npc.owner_name(),
                        npc.position().x,
                        npc.position().y,
                        npc.position().z,
                        npc.history().len()
                    );
                }
            }
            Command::History(npc) => {
                for turn in service.history(npc) {
                    println!("  > {}", turn.player_message());
                    println!("  < {}", turn.npc_reply());
                }
            }
            Command::Status => {
                match service.status() {
                    Some(status) => println!(
                        "{} ({}), provider {}",
                        status.state,
                        status.detail,
                        service
                            .selected_provider()
                            .map_or("none".to_string(), |kind| kind.to_string())
                    ),
                    None => println!("stopped"),
                }
                match serde_json::to_string(&service.stats()) {
                    Ok(stats) => println!("{}", stats),
                    Err(e) => warn!(error = %e, "Cannot render counters"),
                }
            }
            Command::Start => match service.start()? {
                StartOutcome::Started { provider } => println!(
                    "started with {}",
                    provider.map_or("no provider".to_string(), |kind| kind.to_string())
                ),
                other => println!("{:?}", other),
            },
            Command::Stop => {
                let report = service.stop();
                println!(
                    "stopped: {} NPCs despawned, worker joined: {}",
                    report.despawned, report.worker_joined
                );
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_name_and_position() {
        let command = Command::parse("join 42 Alex 1 64 -3.5").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Join {
                player: "42".into(),
                name: Some("Alex".into()),
                position: Some(Position::new(1.0, 64.0, -3.5)),
            }
        );
    }

    #[test]
    fn test_join_with_position_only() {
        let command = Command::parse("join steve 0 70 0").unwrap().unwrap();
        assert!(matches!(
            command,
            Command::Join { name: None, position: Some(_), .. }
        ));
    }

    #[test]
    fn test_say_keeps_whole_message() {
        let command = Command::parse("say 3 steve hello there,  friend")
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            Command::Say {
                npc: NpcId(3),
                player: "steve".into(),
                message: "hello there, friend".into(),
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Command::parse("say x steve hi").is_err());
        assert!(Command::parse("say 1 steve").is_err());
        assert!(Command::parse("join steve 1 2").is_err());
        assert!(Command::parse("dance").is_err());
        assert_eq!(Command::parse("   ").unwrap(), None);
    }
}
