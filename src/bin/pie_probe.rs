use anyhow::{anyhow, Result};
use kestrel_vr::cli::ProbeArgs;
use kestrel_vr::config::InteractionConfig;
use kestrel_vr::handlers::builtin_registry;
use kestrel_vr::menu::{populate, stick_angle, MenuEntry, Population, RadialMenu, Sector};
use serde_json::json;
use std::env;
use std::f32::consts::TAU;
use std::process;

const TABLE_DIRECTIONS: usize = 16;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if env::args().skip(1).any(|arg| matches!(arg.as_str(), "help" | "--help" | "-h")) {
        print_usage();
        return;
    }
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = ProbeArgs::parse_from_env()?;
    let mut config = match args.config_path() {
        Some(path) => InteractionConfig::load_or_default(path),
        None => InteractionConfig::default(),
    };
    config.apply_overrides(&args.config_overrides());

    let menu = RadialMenu::new(config.menu.clone()).into_handle();
    let registry = builtin_registry(&menu);
    let population = populate(args.menu(), &registry).map_err(|err| anyhow!("{err}"))?;

    let probes: Vec<(String, Option<f32>)> = if let Some(stick) = args.stick() {
        vec![(format!("stick {:.3},{:.3}", stick.x, stick.y), stick_angle(stick, config.menu.stick_deadzone))]
    } else if let Some(angle) = args.angle() {
        vec![(format!("angle {:.1}", angle.to_degrees()), Some(angle))]
    } else {
        (0..TABLE_DIRECTIONS)
            .map(|step| {
                let angle = step as f32 * TAU / TABLE_DIRECTIONS as f32;
                (format!("angle {:.1}", angle.to_degrees()), Some(angle))
            })
            .collect()
    };

    if args.json() {
        let rows: Vec<_> = probes
            .iter()
            .map(|(input, angle)| {
                let sector = angle.map(|angle| population.layout.resolve(angle));
                json!({
                    "input": input,
                    "angle_degrees": angle.map(f32::to_degrees),
                    "sector": sector.map(sector_label),
                    "item": sector.map(|sector| item_label(&population, sector)),
                })
            })
            .collect();
        let report = json!({
            "menu": population.menu.name(),
            "items": population.count(),
            "ring": population.layout.ring(),
            "probes": rows,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} ({} items, {}-sector ring{})",
        population.menu,
        population.count(),
        population.layout.ring(),
        if population.layout.has_exit() { ", exit" } else { "" }
    );
    for (input, angle) in &probes {
        match angle {
            Some(angle) => {
                let sector = population.layout.resolve(*angle);
                println!("  {input:<22} {:<8} {}", sector_label(sector), item_label(&population, sector));
            }
            None => println!("  {input:<22} no direction"),
        }
    }
    Ok(())
}

fn sector_label(sector: Sector) -> String {
    match sector {
        Sector::Item(index) => format!("item {index}"),
        Sector::Exit => "exit".to_string(),
        Sector::Empty => "empty".to_string(),
    }
}

fn item_label(population: &Population, sector: Sector) -> String {
    let Sector::Item(index) = sector else {
        return String::new();
    };
    match population.entries.get(index) {
        Some(MenuEntry::Handler { handler_type, .. }) => handler_type.name().to_string(),
        Some(MenuEntry::Command(command)) => (*command).to_string(),
        Some(MenuEntry::Tool(tool)) => format!("tool {}", tool.name()),
        Some(MenuEntry::Submenu(menu)) => format!("submenu {}", menu.name()),
        Some(MenuEntry::Placeholder) | None => "-".to_string(),
    }
}

fn print_usage() {
    eprintln!(
        "Pie Probe

Usage:
  pie_probe [--menu <name>] [--stick x,y | --angle <degrees>] [--config <path>] [--deadzone <len>] [--json on|off]

Resolves a stick direction against a radial menu table. Without --stick or --angle, prints
the sector hit by 16 evenly spaced directions, clockwise from up.
"
    );
}
