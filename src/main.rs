use anyhow::{Context, Result};
use combat::Direction;
use run::{DEFAULT_REGION, MetaUpgrade};
use save::SaveStore;
use std::io::{self, BufRead, Write};

use titan_depths::{GameAction, GameConfig, GameEngine, GameEvent, logging};

const CONFIG_PATH: &str = "titan_depths.json";

const HELP: &str = "\
in a run:  moves h j k l y u b n   wait .   descend >   pick up g
           e <id> equip   q <id> use   m <id> choose mutation   t <x> <y> travel   i inventory
between runs:  r [region] start a run   U <upgrade> buy an upgrade   p profile
? help   Q quit";

/// Commands accepted while no run is active
#[derive(Debug, PartialEq, Eq)]
enum CampCommand {
    Buy(MetaUpgrade),
    Enter(String),
    Profile,
}

fn parse_camp_command(line: &str) -> Option<CampCommand> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "U" => CampCommand::Buy(words.next()?.parse().ok()?),
        "r" => CampCommand::Enter(words.next().unwrap_or(DEFAULT_REGION).to_string()),
        "p" => CampCommand::Profile,
        _ => return None,
    };
    Some(command)
}

fn parse_command(line: &str) -> Option<GameAction> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let action = match head {
        "h" => GameAction::Move(Direction::West),
        "j" => GameAction::Move(Direction::South),
        "k" => GameAction::Move(Direction::North),
        "l" => GameAction::Move(Direction::East),
        "y" => GameAction::Move(Direction::NorthWest),
        "u" => GameAction::Move(Direction::NorthEast),
        "b" => GameAction::Move(Direction::SouthWest),
        "n" => GameAction::Move(Direction::SouthEast),
        "." => GameAction::Wait,
        ">" => GameAction::DescendStairs,
        "g" => GameAction::PickUp,
        "e" => GameAction::EquipItem(words.next()?.parse().ok()?),
        "q" => GameAction::UseItem(words.next()?.parse().ok()?),
        "m" => GameAction::ChooseMutation(words.next()?.to_string()),
        "t" => {
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            GameAction::MoveTo(x, y)
        }
        _ => return None,
    };
    Some(action)
}

fn print_events(events: &[GameEvent]) {
    for text in events.iter().filter_map(GameEvent::describe) {
        println!("{text}");
    }
}

fn print_status(engine: &GameEngine) {
    let Some(player) = engine.player() else {
        return;
    };
    let stats = player.stats;
    let floor = engine.run().map_or(0, |r| r.current_floor);
    let level = engine.player_state().map_or(1, |p| p.level);
    println!(
        "[floor {floor} | turn {} | lvl {level} | hp {}/{} | armor {}/{} | atk {} def {} | pos {}]",
        engine.turn(),
        stats.hp,
        stats.max_hp,
        stats.armor,
        stats.max_armor,
        stats.attack,
        stats.defense,
        player.position
    );
}

fn print_inventory(engine: &GameEngine) {
    let Some(state) = engine.player_state() else {
        return;
    };
    for item in state.inventory.items() {
        let marker = if state.is_equipped(item.id) { "*" } else { " " };
        println!("{marker} {:>4}  {} x{}", item.id, item.name(), item.quantity);
    }
    if let Some(choices) = state.pending_mutation_choices.front() {
        println!("Mutations on offer: {}", choices.join(", "));
    }
}

fn print_profile(engine: &GameEngine) {
    let profile = engine.profile();
    println!(
        "Titan Shards: {} | runs {} won {} | best floor {}",
        profile.titan_shards, profile.runs_started, profile.runs_won, profile.best_floor
    );
    for (upgrade, level, cost) in profile.upgrade_offers() {
        match cost {
            Some(cost) => println!("  {upgrade} lvl {level}, next costs {cost}"),
            None => println!("  {upgrade} lvl {level}, maxed"),
        }
    }
    let regions: Vec<&str> = profile.unlocked_regions.iter().map(String::as_str).collect();
    println!("Regions: {}", regions.join(", "));
}

fn main() -> Result<()> {
    logging::init();

    let config = GameConfig::load(CONFIG_PATH)?.from_env()?;
    let store = SaveStore::new(&config.save_dir, config.save_format)?;
    let profile = store.load_profile();

    let mut engine = match store.load_run() {
        Some(snapshot) => {
            println!("Resuming on floor {}.", snapshot.run.current_floor);
            let mut engine = GameEngine::resume(&config, snapshot, profile);
            let events = engine.take_events();
            print_events(&events);
            engine
        }
        None => {
            let engine = GameEngine::new(&config, profile);
            print_profile(&engine);
            engine
        }
    };
    println!("{HELP}");

    let stdin = io::stdin();
    loop {
        let in_run = engine.snapshot().is_some();
        if in_run {
            print_status(&engine);
        }
        print!("{}", if in_run { "> " } else { "camp> " });
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            "Q" => break,
            "?" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        if !in_run {
            match parse_camp_command(line) {
                Some(CampCommand::Buy(upgrade)) => {
                    match engine.profile_mut().purchase(upgrade) {
                        Ok(level) => println!("{upgrade} is now level {level}."),
                        Err(e) => println!("{e}"),
                    }
                    store.save_profile(engine.profile())?;
                }
                Some(CampCommand::Enter(region)) => {
                    let events = engine.start_new_run_in(&region, config.seed);
                    print_events(&events);
                    store.save_profile(engine.profile())?;
                    if let Some(snapshot) = engine.snapshot() {
                        store.save_run(&snapshot)?;
                    }
                }
                Some(CampCommand::Profile) => print_profile(&engine),
                None => println!("Unknown command. Type ? for help."),
            }
            continue;
        }

        if line == "i" {
            print_inventory(&engine);
            continue;
        }
        let Some(action) = parse_command(line) else {
            println!("Unknown command. Type ? for help.");
            continue;
        };

        let events = engine.process_action(action);
        print_events(&events);

        match engine.snapshot() {
            Some(snapshot) => store.save_run(&snapshot)?,
            None => {
                store.clear_run()?;
                store.save_profile(engine.profile())?;
                println!("Run over. Titan Shards: {}", engine.profile().titan_shards);
                print_profile(&engine);
            }
        }
    }

    store.save_profile(engine.profile())?;
    Ok(())
}
