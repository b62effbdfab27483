mod simulation;

use anyhow::Result;
use clap::Parser;
use log::info;

#[derive(Parser)]
#[command(name = "city_sim")]
#[command(about = "Grid city traffic simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "200")]
    ticks: u64,

    /// RNG seed for a reproducible run; omit for a random run
    #[arg(long)]
    seed: Option<u64>,

    /// Print the map every N ticks (0 disables intermediate output)
    #[arg(long, default_value = "50")]
    report_every: u64,

    /// Ticks between car spawn attempts
    #[arg(long, default_value = "10")]
    spawn_interval: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut world = match cli.seed {
        Some(seed) => simulation::SimWorld::create_test_world_with_seed(seed)?,
        None => simulation::SimWorld::create_test_world()?,
    };

    world.set_spawn_interval(cli.spawn_interval)?;

    // One car per entry corner before the clock starts.
    world.spawn_corner_cars()?;

    println!("Running city simulation for {} ticks...", cli.ticks);
    println!("Initial state:");
    world.print_summary();
    world.draw_map();

    for _ in 0..cli.ticks {
        world.tick()?;

        if cli.report_every > 0 && world.current_tick() % cli.report_every == 0 {
            println!("--- After tick {} ---", world.current_tick());
            world.print_summary();
            world.draw_map();
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", world.current_tick());
    info!("Total cars spawned: {}", world.cars_spawned());
    info!("Total cars arrived: {}", world.cars_arrived());
    info!("Live cars: {}", world.live_car_count());
    if world.cars_spawned() > 0 {
        info!(
            "Arrival rate: {:.1}%",
            world.cars_arrived() as f32 / world.cars_spawned() as f32 * 100.0
        );
    }

    Ok(())
}
