//! Cloud Hopper entry point
//!
//! The browser build is driven from JavaScript through `platform::web`.
//! Natively this plays a headless game with a simple autopilot and logs the
//! result.
//!
//! Usage: `cloud-hopper [SEED] [MAX_TICKS] [ROOT_SOLVER]`

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use cloud_hopper::platform::{Clock, ManualClock, Session};
    use cloud_hopper::sim::{Aabb, Locomotion};
    use cloud_hopper::{Config, Error, RootSolver};

    /// Ticks of opening flight before diving
    const DIVE_AFTER_TICKS: u64 = 30;

    #[derive(Clone, Copy)]
    enum Plan {
        Idle,
        Charging { release_at_ms: f64, x: f64, y: f64 },
    }

    /// Highest cloud still ahead of the hero
    fn pick_target(hero: &Aabb, clouds: &[Aabb]) -> Option<Aabb> {
        clouds
            .iter()
            .filter(|c| c.x0 > hero.x1)
            .min_by(|a, b| a.y0.total_cmp(&b.y0))
            .copied()
    }

    /// Charge time for a 45° hop covering `distance` pixels
    fn hold_for(distance: f64, config: &Config) -> f64 {
        let speed = (distance.max(40.0) * config.gravity).sqrt() + 1.0;
        speed.min(config.max_launch_speed) * config.charge_scale_ms
    }

    /// Play until the hero dies or `max_ticks` elapse; returns the score
    pub fn run(seed: u64, max_ticks: u64, root_solver: RootSolver) -> Result<u64, Error> {
        let config = Config {
            root_solver,
            ..Config::default()
        };
        log::info!("Root solver: {}", root_solver.as_str());
        let frame_ms = 1000.0 / config.tick_hz;
        let frame_secs = config.tick_seconds();
        let mut session = Session::new(seed, config, ManualClock::default())?;
        let mut plan = Plan::Idle;

        while session.is_running() && session.state().current_step < max_ticks {
            let now_ms = session.clock_mut().now_ms();
            let state = session.state();
            let step = state.current_step;
            let locomotion = state.hero.locomotion;

            match locomotion {
                Locomotion::Flying if step == DIVE_AFTER_TICKS => session.press(),
                Locomotion::Standing => match plan {
                    Plan::Idle => {
                        let now = state.now();
                        let hero = state.hero.box_at(now)?;
                        let clouds = state
                            .clouds
                            .iter()
                            .map(|c| c.box_at(now))
                            .collect::<Result<Vec<_>, _>>()?;
                        if let Some(target) = pick_target(&hero, &clouds) {
                            let x = (target.x0 + target.x1) / 2.0;
                            let hold = hold_for(x - hero.x1, session.config());
                            log::debug!("Aiming at cloud top {:.0} from x={:.0}", target.y0, hero.x1);
                            session.press();
                            plan = Plan::Charging {
                                release_at_ms: now_ms + hold,
                                x,
                                y: target.y0,
                            };
                        }
                    }
                    Plan::Charging { release_at_ms, x, y } if now_ms >= release_at_ms => {
                        session.release(x, y);
                        plan = Plan::Idle;
                    }
                    Plan::Charging { .. } => {}
                },
                _ => plan = Plan::Idle,
            }

            session.advance(frame_secs)?;
            session.clock_mut().advance(frame_ms);
        }

        let state = session.state();
        log::info!(
            "Finished at step {} ({}), score {}",
            state.current_step,
            if state.hero.is_dead { "hero lost" } else { "tick budget spent" },
            state.score
        );
        Ok(state.score)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use cloud_hopper::RootSolver;

    fn parse_root_solver(s: &str) -> Result<RootSolver, String> {
        RootSolver::from_str(s)
            .ok_or_else(|| format!("unknown root solver `{s}` (expected closed-form or newton)"))
    }

    /// Headless cloud hopping with an autopilot
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Seed for cloud placement
        #[arg(default_value_t = 42)]
        pub seed: u64,
        /// Stop after this many ticks
        #[arg(default_value_t = 60 * 60 * 5)]
        pub max_ticks: u64,
        /// Collision root finder: closed-form or newton
        #[arg(value_parser = parse_root_solver, default_value = "closed-form")]
        pub root_solver: RootSolver,
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = cli::Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cloud Hopper (native, headless) starting...");

    match autopilot::run(args.seed, args.max_ticks, args.root_solver) {
        Ok(score) => println!("seed {}: score {}", args.seed, score),
        Err(err) => {
            log::error!("Simulation aborted: {}", err);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
