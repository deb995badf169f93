//! Liquid cooler speed profile CLI
//!
//! Command-line interface for building, inspecting and following fan/pump
//! speed profiles.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use liquid_rust_devices::config::{DEFAULT_CRITICAL_TEMPERATURE, SpeedProfile};
use liquid_rust_devices::cooling::{
    ChannelPlan, ChannelSettings, ControlPoint, CoolingController, TempSource, interpolate_profile,
    normalize_profile,
};
use liquid_rust_devices::device;
use liquid_rust_devices::storage::{self, StoredProfile};
use liquid_rust_devices::utils::numeric::fraction_of_byte;
use liquid_rust_devices::utils::parsing::{
    parse_device_id, parse_profile_pairs, parse_speed_profile,
};
use liquid_rust_devices::utils::sensors::{SystemSensors, to_profile_temp};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Liquid cooler speed profile tool
#[derive(Parser, Debug)]
#[command(name = "liquid-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Show what is being configured
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show debug messages
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a profile given as TEMP DUTY pairs
    Normalize {
        /// Fail-safe temperature where duty is forced to 100%
        #[arg(short, long, default_value = "60", allow_hyphen_values = true)]
        critical: i32,

        /// Alternating temperature and duty values
        #[arg(allow_hyphen_values = true)]
        points: Vec<String>,
    },

    /// Interpolate the duty of a profile at a temperature
    Interpolate {
        /// Fail-safe temperature where duty is forced to 100%
        #[arg(short, long, default_value = "60", allow_hyphen_values = true)]
        critical: i32,

        /// Temperature to look up
        #[arg(short, long, allow_hyphen_values = true)]
        temp: i32,

        /// Skip normalization and interpolate the points as given
        #[arg(long)]
        raw: bool,

        /// Alternating temperature and duty values
        #[arg(allow_hyphen_values = true)]
        points: Vec<String>,
    },

    /// Express a ratio or a percentage as a fraction of 255
    Byte {
        /// Ratio in [0, 1]
        #[arg(short, long)]
        ratio: Option<f64>,

        /// Percentage in [0, 100]
        #[arg(short, long)]
        percentage: Option<f64>,
    },

    /// List supported devices
    Devices,

    /// Show the settings a device would receive for a profile
    Plan {
        /// Device as VID:PID in hex, e.g. 1e71:170e
        #[arg(short, long)]
        device: String,

        /// Which of several drivers sharing the id to use
        #[arg(long, default_value = "0")]
        pick: usize,

        /// Channel to configure, e.g. fan, pump or fan1
        #[arg(short, long, default_value = "fan")]
        channel: String,

        /// silent, performance, fixed:XX, a stored profile name, or TEMP DUTY pairs
        #[arg(required = true, allow_hyphen_values = true)]
        profile: Vec<String>,
    },

    /// Manage stored profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// List system temperature sensors
    Sensors,

    /// Follow a temperature sensor and print the resulting duty
    Watch {
        /// Profile to follow (defaults to config)
        #[arg(short, long)]
        profile: Option<String>,

        /// Temperature source: cpu or gpu (defaults to config)
        #[arg(short, long)]
        source: Option<String>,

        /// Update interval in seconds (defaults to config)
        #[arg(short = 'n', long)]
        interval: Option<u64>,

        /// Apply the limits of a device, as VID:PID in hex
        #[arg(short, long)]
        device: Option<String>,

        /// Device channel to follow
        #[arg(short, long, default_value = "fan")]
        channel: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Save a profile given as TEMP DUTY pairs
    Save {
        name: String,

        /// Fail-safe temperature where duty is forced to 100%
        #[arg(short, long, default_value = "60", allow_hyphen_values = true)]
        critical: i32,

        /// Alternating temperature and duty values
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,
    },

    /// Show a stored profile and its normalized curve
    Show { name: String },

    /// List stored profiles
    List,

    /// Delete a stored profile
    Delete { name: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.debug);

    match args.command {
        Command::Normalize { critical, points } => cmd_normalize(critical, &points),
        Command::Interpolate {
            critical,
            temp,
            raw,
            points,
        } => cmd_interpolate(critical, temp, raw, &points),
        Command::Byte { ratio, percentage } => cmd_byte(ratio, percentage),
        Command::Devices => cmd_devices(),
        Command::Plan {
            device,
            pick,
            channel,
            profile,
        } => cmd_plan(&device, pick, &channel, &profile),
        Command::Profile { action } => cmd_profile(action),
        Command::Sensors => cmd_sensors(),
        Command::Watch {
            profile,
            source,
            interval,
            device,
            channel,
        } => cmd_watch(profile, source, interval, device, &channel),
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_normalize(critical: i32, points: &[String]) -> Result<()> {
    let profile = parse_profile_pairs(points)?;
    let curve = normalize_profile(&profile, critical);
    println!("{}", curve);
    Ok(())
}

fn cmd_interpolate(critical: i32, temp: i32, raw: bool, points: &[String]) -> Result<()> {
    let profile = parse_profile_pairs(points)?;
    let duty = if raw {
        interpolate_profile(&profile, temp).context("Failed to interpolate")?
    } else {
        normalize_profile(&profile, critical).interpolate(temp)
    };
    println!("{}", duty);
    Ok(())
}

fn cmd_byte(ratio: Option<f64>, percentage: Option<f64>) -> Result<()> {
    let value = fraction_of_byte(ratio, percentage)?;
    println!("{} (0x{:02x})", value, value);
    Ok(())
}

fn cmd_devices() -> Result<()> {
    println!("{:<10} | {:<52} | Channels", "Id", "Device");
    println!("{}", "─".repeat(80));
    for entry in device::SUPPORTED_DEVICES {
        let controller = (entry.build)();
        let channels: Vec<String> = controller
            .channels()
            .iter()
            .map(|c| {
                if c.supports_profiles() {
                    format!("{}*", c)
                } else {
                    c.to_string()
                }
            })
            .collect();
        let channels = if channels.is_empty() {
            "-".to_string()
        } else {
            channels.join(", ")
        };
        println!("{:<10} | {:<52} | {}", entry.id(), entry.description, channels);
    }
    println!("{}", "─".repeat(80));
    println!("* = accepts speed profiles");
    Ok(())
}

fn cmd_plan(device_id: &str, pick: usize, channel: &str, profile: &[String]) -> Result<()> {
    let (vid, pid) = parse_device_id(device_id)?;
    let entry = device::find(vid, pid, pick)?;
    let mut controller = entry
        .open()
        .with_context(|| format!("Failed to open runtime storage for {}", entry.description))?;
    let (profile, _) = resolve_profile(profile)?;

    let plans = apply_profile(&mut controller, channel, &profile)
        .with_context(|| format!("Failed to apply {} profile to {}", profile, entry.description))?;

    println!("{} ({})", entry.description, entry.id());
    if let Some(sequence) = controller.sequence() {
        println!("  message sequence: {}", sequence);
    }
    for plan in &plans {
        print_plan(plan)?;
    }
    Ok(())
}

fn print_plan(plan: &ChannelPlan) -> Result<()> {
    match &plan.settings {
        ChannelSettings::Fixed(duty) => {
            println!("  {}: fixed {}%", plan.channel, duty);
        }
        ChannelSettings::Sampled(samples) => {
            println!("  {}: duty per liquid temperature", plan.channel);
            for p in samples {
                println!("    >= {:>3}°C  {:>3}%", p.temp, p.duty);
            }
        }
        ChannelSettings::Padded(points) => {
            println!("  {}: {} profile points", plan.channel, points.len());
            for p in points {
                let byte = fraction_of_byte(None, Some(f64::from(p.duty)))?;
                println!("    {:>3}°C  {:>3}%  (0x{:02x})", p.temp, p.duty, byte);
            }
        }
    }
    Ok(())
}

fn cmd_profile(action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Save {
            name,
            critical,
            points,
        } => {
            let points = parse_profile_pairs(&points)?;
            storage::ensure_config_exists().context("Failed to create config")?;
            let mut config = storage::load_config().context("Failed to load config")?;
            let stored = StoredProfile::new(points, critical);
            println!("Normalized: {}", stored.to_curve());
            config.set_profile(&name, stored);
            storage::save_config(&config).context("Failed to save config")?;
            println!("✅ Saved profile '{}'", name.to_lowercase());
        }
        ProfileAction::Show { name } => {
            let config = storage::load_config().context("Failed to load config")?;
            let stored = config.profile(&name)?;
            let raw: Vec<String> = stored.points.iter().map(ControlPoint::to_string).collect();
            println!("Profile:    {}", name.to_lowercase());
            println!("Points:     {}", raw.join(", "));
            println!("Critical:   {}°C", stored.critical_temperature);
            println!("Normalized: {}", stored.to_curve());
        }
        ProfileAction::List => {
            storage::ensure_config_exists().context("Failed to create config")?;
            let config = storage::load_config().context("Failed to load config")?;
            if config.profiles.is_empty() {
                println!("No stored profiles.");
            }
            for (name, stored) in &config.profiles {
                println!("{:<16} {}", name, stored.to_curve());
            }
        }
        ProfileAction::Delete { name } => {
            let mut config = storage::load_config().context("Failed to load config")?;
            config.remove_profile(&name)?;
            storage::save_config(&config).context("Failed to save config")?;
            println!("✅ Deleted profile '{}'", name.to_lowercase());
        }
    }
    Ok(())
}

fn cmd_sensors() -> Result<()> {
    let sensors = SystemSensors::new();
    let all_sensors = sensors.list_all();

    if all_sensors.is_empty() {
        println!("❌ No sensors detected. (Are you running with enough permissions?)");
        return Ok(());
    }

    println!("✅ Found {} sensors:\n", all_sensors.len());
    println!("{:<40} | {:<10} | {:<10}", "Label", "Temp", "Critical");
    println!("{}", "─".repeat(66));

    let cpu = sensors.find(TempSource::Cpu);
    let gpu = sensors.find(TempSource::Gpu);
    let fmt_temp = |t: Option<f32>| {
        t.map(|c| format!("{:.1}°C", c))
            .unwrap_or_else(|| "-".to_string())
    };

    for sensor in &all_sensors {
        let role = if cpu.as_ref().is_some_and(|s| s.label == sensor.label) {
            "cpu"
        } else if gpu.as_ref().is_some_and(|s| s.label == sensor.label) {
            "gpu"
        } else {
            ""
        };
        println!(
            "{:<40} | {:<10} | {:<10} {}",
            sensor.label,
            fmt_temp(sensor.temperature),
            fmt_temp(sensor.critical),
            role
        );
    }

    Ok(())
}

fn cmd_watch(
    profile: Option<String>,
    source: Option<String>,
    interval: Option<u64>,
    device_id: Option<String>,
    channel: &str,
) -> Result<()> {
    let config = storage::load_config().context("Failed to load config")?;
    let profile_name = profile.unwrap_or_else(|| config.watch.profile.clone());
    let source = TempSource::from(
        source
            .as_deref()
            .unwrap_or(config.watch.temperature_source.as_str()),
    );
    let interval_secs = interval.unwrap_or(config.watch.interval).max(1);
    let (profile, stored_critical) = resolve_profile(std::slice::from_ref(&profile_name))?;

    let duty_at: Box<dyn Fn(i32) -> liquid_rust_devices::Result<i32>> = match device_id {
        Some(id) => {
            let (vid, pid) = parse_device_id(&id)?;
            let entry = device::find(vid, pid, 0)?;
            let mut controller = (entry.build)();
            apply_profile(&mut controller, channel, &profile)
                .with_context(|| format!("Failed to apply profile to {}", entry.description))?;
            let channel = channel.to_string();
            Box::new(move |temp| controller.duty_for(&channel, temp))
        }
        None => {
            let critical = stored_critical.unwrap_or(DEFAULT_CRITICAL_TEMPERATURE);
            let curve = profile.to_curve(critical);
            Box::new(move |temp| Ok(curve.interpolate(temp)))
        }
    };

    let mut sensors = SystemSensors::new();

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!(
        "🌡️  Following {} temperature with profile '{}' every {}s (Ctrl+C to stop)\n",
        source, profile_name, interval_secs
    );

    while running.load(Ordering::SeqCst) {
        sensors.refresh();

        match sensors.temperature(source) {
            Some(celsius) => {
                let temp = to_profile_temp(celsius);
                let duty = duty_at(temp)?;
                println!("{}: {:.1}°C → {}%", source, celsius, duty);
            }
            None => {
                eprintln!("⚠️  No {} temperature sensor found", source);
            }
        }

        // Sleep in small steps so Ctrl+C is handled promptly
        for _ in 0..(interval_secs * 10) {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    println!("\n👋 Stopped.");
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn apply_profile(
    controller: &mut CoolingController,
    channel: &str,
    profile: &SpeedProfile,
) -> liquid_rust_devices::Result<Vec<ChannelPlan>> {
    match profile {
        SpeedProfile::Fixed(duty) => controller.set_fixed_speed(channel, *duty),
        other => {
            let points = other.points(controller.critical_temperature());
            controller.set_speed_profile(channel, &points)
        }
    }
}

/// Resolve profile arguments: a preset, `fixed:XX`, a stored profile name,
/// or explicit TEMP DUTY pairs.
///
/// Returns the profile and, for stored profiles, their critical temperature.
fn resolve_profile(args: &[String]) -> Result<(SpeedProfile, Option<i32>)> {
    if let [name] = args {
        if let Ok(profile) = parse_speed_profile(name) {
            return Ok((profile, None));
        }
        let config = storage::load_config().context("Failed to load config")?;
        let stored = config.profile(name)?;
        return Ok((
            SpeedProfile::Custom(stored.points.clone()),
            Some(stored.critical_temperature),
        ));
    }

    let points = parse_profile_pairs(args)?;
    Ok((SpeedProfile::Custom(points), None))
}
