use std::cell::RefCell;
use std::rc::Rc;

use actuate::observer::LayoutAdapter;
use actuate::prelude::*;
use actuate::prng::Prng;
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let opts = match Options::parse(args.get(1..).unwrap_or_default()) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{msg}");
            print_help();
            std::process::exit(2);
        }
    };

    let result = match opts.command {
        Command::Help => {
            print_help();
            return;
        }
        Command::Layout => run_layout(&opts),
        Command::Run => run_demo(&opts),
    };

    if let Err(msg) = result {
        error!("{}", msg);
        std::process::exit(1);
    }
}

fn print_help() {
    println!("actuate (actuator aggregation demo)");
    println!("usage:");
    println!("  cargo run -- [--steps N] [--seed S] [--config manager.json]");
    println!("  cargo run -- layout [--config manager.json]");
    println!("  cargo run -- --help");
}

enum Command {
    Run,
    Layout,
    Help,
}

struct Options {
    command: Command,
    steps: usize,
    seed: u64,
    config: ManagerConfig,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = Options {
            command: Command::Run,
            steps: 200,
            seed: 7,
            config: ManagerConfig::default(),
        };

        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" | "-h" | "help" => opts.command = Command::Help,
                "layout" => opts.command = Command::Layout,
                "--steps" => opts.steps = parse_value(it.next(), "--steps")?,
                "--seed" => opts.seed = parse_value(it.next(), "--seed")?,
                "--config" => {
                    let path = it.next().ok_or("--config needs a path")?;
                    let text = std::fs::read_to_string(path)
                        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
                    opts.config = serde_json::from_str(&text)
                        .map_err(|e| format!("Failed to parse {}: {}", path, e))?;
                }
                other => return Err(format!("Unknown argument: {}", other)),
            }
        }
        Ok(opts)
    }
}

fn parse_value<T: std::str::FromStr>(v: Option<&String>, flag: &str) -> Result<T, String> {
    v.ok_or_else(|| format!("{} needs a value", flag))?
        .parse()
        .map_err(|_| format!("{} got an invalid value", flag))
}

// Demo actuators: a small discrete-only vehicle.

/// Throttle: 0 = brake, 1 = coast, 2 = accelerate.
/// Gear: 0 = reverse, 1 = neutral, 2 = drive. Reverse is masked while moving fast.
struct Drivetrain {
    spec: ActionSpec,
    speed: f32,
    gear: i32,
}

impl Actuator for Drivetrain {
    fn name(&self) -> &str {
        "drivetrain"
    }

    fn action_spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn write_discrete_action_mask(&mut self, mask: &mut MaskWriter<'_>) -> actuate::error::Result<()> {
        if self.speed.abs() > 2.0 {
            mask.set_action_enabled(1, 0, false)?;
        }
        Ok(())
    }

    fn on_action_received(&mut self, actions: ActionBuffers<'_>) {
        let throttle = actions.discrete[0];
        self.gear = actions.discrete[1];
        let dir = match self.gear {
            0 => -1.0,
            2 => 1.0,
            _ => 0.0,
        };
        match throttle {
            0 => self.speed *= 0.5,
            2 => self.speed += 0.5 * dir,
            _ => self.speed *= 0.95,
        }
    }

    fn reset_data(&mut self) {
        self.speed = 0.0;
        self.gear = 1;
    }
}

/// Steering receiver wrapped in a `VectorActuator`: 0 = left, 1 = straight, 2 = right.
#[derive(Default)]
struct Steering {
    heading: i32,
}

impl ActionReceiver for Steering {
    fn on_action_received(&mut self, actions: ActionBuffers<'_>) {
        self.heading += actions.discrete[0] - 1;
    }
}

/// Horn with a cooldown: it cannot sound twice in a row.
#[derive(Default)]
struct Horn {
    spec: ActionSpec,
    honked_last_step: bool,
    honks: u32,
}

impl Actuator for Horn {
    fn name(&self) -> &str {
        "horn"
    }

    fn action_spec(&self) -> &ActionSpec {
        &self.spec
    }

    fn write_discrete_action_mask(&mut self, mask: &mut MaskWriter<'_>) -> actuate::error::Result<()> {
        if self.honked_last_step {
            mask.set_action_enabled(0, 1, false)?;
        }
        Ok(())
    }

    fn on_action_received(&mut self, actions: ActionBuffers<'_>) {
        self.honked_last_step = actions.discrete[0] == 1;
        if self.honked_last_step {
            self.honks += 1;
        }
    }

    fn reset_data(&mut self) {
        self.honked_last_step = false;
    }
}

struct Vehicle {
    drivetrain: Rc<RefCell<Drivetrain>>,
    steering: Rc<RefCell<VectorActuator<Steering>>>,
    horn: Rc<RefCell<Horn>>,
}

fn build_manager(cfg: ManagerConfig) -> Result<(ActuatorManager, Vehicle), ActuatorError> {
    let vehicle = Vehicle {
        drivetrain: Rc::new(RefCell::new(Drivetrain {
            spec: ActionSpec::make_discrete(&[3, 3]),
            speed: 0.0,
            gear: 1,
        })),
        steering: Rc::new(RefCell::new(VectorActuator::new(
            Steering::default(),
            ActionSpec::make_discrete(&[3]),
            "steering",
        ))),
        horn: Rc::new(RefCell::new(Horn {
            spec: ActionSpec::make_discrete(&[2]),
            ..Horn::default()
        })),
    };

    // Registration order is irrelevant; freeze sorts by name.
    let mut manager = ActuatorManager::new(cfg);
    manager.push(vehicle.steering.clone())?;
    manager.push(vehicle.horn.clone())?;
    manager.push(vehicle.drivetrain.clone())?;
    Ok((manager, vehicle))
}

fn run_layout(opts: &Options) -> Result<(), String> {
    let (mut manager, _vehicle) = build_manager(opts.config).map_err(|e| e.to_string())?;
    manager.freeze().map_err(|e| e.to_string())?;

    let snapshot = LayoutAdapter::new(&manager).snapshot();
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn run_demo(opts: &Options) -> Result<(), String> {
    let (mut manager, vehicle) = build_manager(opts.config).map_err(|e| e.to_string())?;
    manager.freeze().map_err(|e| e.to_string())?;
    info!(
        actuators = manager.len(),
        branches = manager.num_discrete_actions(),
        values = manager.sum_of_discrete_branch_sizes(),
        "manager ready"
    );

    let mut rng = Prng::new(opts.seed);
    let mut continuous = vec![0.0f32; manager.num_continuous_actions()];
    let mut discrete = vec![0i32; manager.num_discrete_actions()];

    for t in 0..opts.steps {
        // Mask first so the random policy only samples permitted values.
        manager.write_action_mask().map_err(|e| e.to_string())?;
        rng.fill_continuous(&mut continuous);
        rng.sample_discrete(&mut discrete, manager.discrete_action_mask());

        manager
            .update_actions(&continuous, &discrete)
            .map_err(|e| e.to_string())?;
        manager.execute_actions().map_err(|e| e.to_string())?;

        if t % 50 == 0 {
            let d = vehicle.drivetrain.borrow();
            info!(
                t,
                speed = d.speed,
                gear = d.gear,
                heading = vehicle.steering.borrow().receiver().heading,
                honks = vehicle.horn.borrow().honks,
                "step"
            );
        }
    }

    manager.reset_data().map_err(|e| e.to_string())?;
    info!(steps = opts.steps, "episode finished");
    Ok(())
}
