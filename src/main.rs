//! Aberred Packs command line tool.
//!
//! Inspects pack search paths and resolves files through the active packs:
//! - `--list-packs` lists every pack found and whether it is active
//! - `--resolve PATH` prints every match of a relative path, winner first
//! - `--colors PATH` loads a colour table merged across the active packs
//!
//! Active packs come from the `[packs]` section of the configuration file
//! (default `./packs.ini`) unless `--packs` is given.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --list-packs
//! cargo run --release -- --packs Default,HighContrast --colors ui/colors.json
//! ```

use aberredpacks::assets::ColorsResource;
use aberredpacks::events::lifecycle::{ResourceLifecycle, SoftReloadRequested, soft_reload_observer};
use aberredpacks::resources::lifecyclebridge::setup_lifecycle_bridge;
use aberredpacks::systems::lifecycle::{poll_lifecycle_messages, update_lifecycle_messages};
use aberredpacks::{PackConfig, ResourceManager};
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;

const COLORS_ID: &str = "colors";

/// Aberred Packs
#[derive(Parser)]
#[command(version, about = "Resource pack overlay inspector for the Aberred Engine")]
struct Cli {
    /// Pack configuration file.
    #[arg(long, value_name = "PATH", default_value = "./packs.ini")]
    config: PathBuf,

    /// Packs to activate, lowest priority first. Overrides the config file.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    packs: Option<Vec<String>>,

    /// List every pack found in the search paths and exit.
    #[arg(long)]
    list_packs: bool,

    /// Print every match of a relative path, highest priority first.
    #[arg(long, value_name = "PATH")]
    resolve: Vec<String>,

    /// Load a colour table merged across the active packs and print it.
    #[arg(long, value_name = "PATH")]
    colors: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = PackConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}, using defaults", e);
    }
    if let Some(packs) = cli.packs {
        config.enabled = packs;
    }

    let mut manager = ResourceManager::from_config(&config);

    // Early-exit: list packs, nothing gets activated
    if cli.list_packs {
        let mut found = 0;
        for pack in manager.available_packs() {
            found += 1;
            let enabled = pack.id() == config.default_pack
                || config.enabled.iter().any(|name| name == pack.id());
            let active = if enabled {
                "*"
            } else {
                " "
            };
            let major = if pack.manifest.major { " major" } else { "" };
            println!(
                "{} {} (v{}{}) {} - {}",
                active,
                pack.id(),
                pack.manifest.version,
                major,
                pack.root.display(),
                pack.manifest.description
            );
        }
        if found == 0 {
            println!("No packs found in {:?}", config.search_paths);
        }
        return;
    }

    if let Err(e) = manager.add_configured_packs(&config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    let active: Vec<&str> = manager.loaded_packs().iter().map(|p| p.id()).collect();
    log::info!("Active packs: {}", active.join(", "));

    for relative in &cli.resolve {
        let matches: Vec<PathBuf> = manager.get_all_paths(relative).collect();
        if matches.is_empty() {
            println!("{relative}: not found");
            continue;
        }
        println!("{relative}:");
        for (i, path) in matches.iter().enumerate() {
            let marker = if i == 0 { "->" } else { "  " };
            println!("  {} {}", marker, path.display());
        }
    }

    let Some(colors) = cli.colors else {
        return;
    };
    if let Err(e) = manager.try_add_resource(COLORS_ID, ColorsResource::new(colors)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // --------------- ECS world + lifecycle bridge ---------------
    let mut world = World::new();
    world.insert_resource(manager);
    setup_lifecycle_bridge(&mut world);
    world.spawn(Observer::new(soft_reload_observer));
    world.flush();

    let mut update = Schedule::default();
    update.add_systems(
        (
            poll_lifecycle_messages,
            update_lifecycle_messages,
            log_lifecycle_messages,
        )
            .chain(),
    );

    let loaded = world.resource_mut::<ResourceManager>().load();
    update.run(&mut world);
    if let Err(e) = loaded {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // Nothing changed on disk, so this reports no work.
    world.trigger(SoftReloadRequested {});
    update.run(&mut world);

    let manager = world.resource::<ResourceManager>();
    if let Some(table) = manager.try_get_resource::<ColorsResource>(COLORS_ID) {
        let mut names: Vec<(&String, &String)> = table.colors().iter().collect();
        names.sort();
        for (name, value) in names {
            println!("{name} = {value}");
        }
    }
}

fn log_lifecycle_messages(mut reader: MessageReader<ResourceLifecycle>) {
    for message in reader.read() {
        log::debug!(target: "resources", "Lifecycle: {:?}", message);
    }
}
