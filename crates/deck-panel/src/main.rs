use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use deck_device::virtual_port;
use deck_device::{input, open_sender, send_best_effort, TransportChoice};
use deck_protocol::{DEFAULT_CHANNEL, MIDI_SERIAL_BAUD};

use deck_panel::config;
use deck_panel::exercise::{self, ExerciseProfile};
use deck_panel::feedback::{Applied, FeedbackEngine};
use deck_panel::layout::PanelLayout;
use deck_panel::surface::Surface;

#[derive(Parser, Debug)]
#[command(name = "midideck", about = "Virtual MIDI control surface")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "midideck_config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the surface from a MIDI input through the mapping table
    Run {
        /// MIDI input port (overrides and persists the configured device)
        #[arg(short, long)]
        device: Option<String>,

        /// Arm learn for a control id (e.g. "R3"); the next incoming CC
        /// or note becomes its mapping
        #[arg(long)]
        learn: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List MIDI input and output ports
    Ports,
    /// Play a synthetic sequence out the transport
    Exercise {
        /// Profile: sweep, scale, or full
        #[arg(long, default_value = "full")]
        profile: String,

        /// Gap between messages, in milliseconds
        #[arg(long, default_value_t = 15)]
        pacing_ms: u64,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output transport
    #[arg(long, value_enum, default_value_t = Transport::Virtual)]
    transport: Transport,

    /// Display name of the virtual output port
    #[arg(long, default_value = "midideck")]
    port_name: String,

    /// Serial device path (for --transport serial)
    #[arg(long, default_value = "/dev/ttyUSB0")]
    serial_path: String,

    /// Serial baud rate
    #[arg(long, default_value_t = MIDI_SERIAL_BAUD)]
    baud: u32,

    /// MIDI channel to emit on (0-15)
    #[arg(long, default_value_t = DEFAULT_CHANNEL)]
    channel: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Transport {
    Virtual,
    Serial,
    None,
}

impl OutputArgs {
    fn transport_choice(&self) -> TransportChoice {
        match self.transport {
            Transport::Virtual => TransportChoice::VirtualPort {
                port_name: self.port_name.clone(),
            },
            Transport::Serial => TransportChoice::Serial {
                path: self.serial_path.clone(),
                baud: self.baud,
            },
            Transport::None => TransportChoice::None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            ref device,
            ref learn,
            ref output,
        } => run(&cli.config, device.clone(), learn.clone(), output),
        Commands::Ports => ports(),
        Commands::Exercise {
            ref profile,
            pacing_ms,
            ref output,
        } => exercise_cmd(profile, pacing_ms, output),
    }
}

fn run(
    config_path: &Path,
    device: Option<String>,
    learn: Option<String>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let mut config = config::load(config_path);

    // A device given on the command line becomes the configured one.
    if let Some(device) = device {
        if config.midi_device.as_deref() != Some(device.as_str()) {
            config.midi_device = Some(device);
            if let Err(err) = config::save(config_path, &config) {
                warn!(error = %err, "Could not persist device selection");
            }
        }
    }

    let layout = PanelLayout::standard();
    let mut surface = Surface::new(&layout, output.channel);
    let mut sender = open_sender(&output.transport_choice());

    info!(
        sender = sender.name(),
        controls = layout.controls().len(),
        channel = surface.channel(),
        "Surface ready"
    );

    let (tx, rx) = mpsc::channel();
    let connection = match config.midi_device.as_deref() {
        Some(device) => match input::connect(device, tx) {
            Ok(conn) => conn,
            Err(err) => {
                warn!(device = %device, error = %err,
                    "MIDI input unavailable, surface has nothing to do");
                return Ok(());
            }
        },
        None => {
            warn!("No MIDI input configured (pass --device); surface has nothing to do");
            return Ok(());
        }
    };

    let mut engine = FeedbackEngine::new(learn);
    if engine.is_armed() {
        info!("Learn armed; the next CC or note will be captured");
    }

    info!(port = connection.port_name(), "Listening");

    while let Ok(msg) = rx.recv() {
        match engine.apply(&msg, &mut config, &mut surface) {
            Applied::Learned { control_id } => {
                info!(control = %control_id, "Mapping learned");
                if let Err(err) = config::save(config_path, &config) {
                    warn!(error = %err, "Could not persist learned mapping");
                }
            }
            Applied::Updated { emitted } => {
                for msg in emitted {
                    send_best_effort(sender.as_mut(), &msg.encode());
                }
            }
            Applied::Ignored => {}
        }
    }

    // Input went away (device unplugged); leave nothing sounding.
    for msg in surface.all_notes_off() {
        send_best_effort(sender.as_mut(), &msg.encode());
    }
    info!("MIDI input closed, surface stopped");
    Ok(())
}

fn ports() -> anyhow::Result<()> {
    let inputs = input::input_port_names()?;
    println!("MIDI inputs");
    println!("══════════════════════════════");
    if inputs.is_empty() {
        println!("  (none)");
    }
    for name in inputs {
        println!("  {}", name);
    }

    let outputs = virtual_port::output_port_names()?;
    println!("MIDI outputs");
    println!("══════════════════════════════");
    if outputs.is_empty() {
        println!("  (none)");
    }
    for name in outputs {
        println!("  {}", name);
    }
    Ok(())
}

fn exercise_cmd(profile: &str, pacing_ms: u64, output: &OutputArgs) -> anyhow::Result<()> {
    let profile = ExerciseProfile::from_str(profile);
    let layout = PanelLayout::standard();
    let mut surface = Surface::new(&layout, output.channel);
    let mut sender = open_sender(&output.transport_choice());

    let sent = exercise::run(
        profile,
        &layout,
        &mut surface,
        sender.as_mut(),
        Duration::from_millis(pacing_ms),
    );

    info!(messages = sent, sender = sender.name(), "Exercise complete");
    Ok(())
}
