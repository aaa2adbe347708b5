//! # UTI Thermometer Application Entry Point
//!
//! This binary crate wires the decode library to the Raspberry Pi: it captures the
//! UTI output from a GPIO line, decodes a temperature every few seconds, and reports
//! it to the console and to the files read by the web front end.
//! It supports both production mode (GPIO capture) and development mode (simulated signal).

// Test modules
#[cfg(test)]
mod tests;

#[cfg(all(target_os = "linux", feature = "hardware"))]
mod gpio_edges;

// Application dependencies
use anyhow::{anyhow, Context};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uti_pt100_lib::config::Config;
use uti_pt100_lib::curve::TemperatureCurve;
use uti_pt100_lib::decoder::Decoder;
use uti_pt100_lib::report::{load_last_reading, report_all, ConsoleSink, ReadingSink};
use uti_pt100_lib::sample_buffer::SampleBuffer;
use uti_pt100_lib::simulator::UtiSimulator;

/// Width of the ASCII gauge printed with `--gauge`
const GAUGE_WIDTH: usize = 40;

/// Command line options
#[derive(Debug, Default, PartialEq)]
pub struct Options {
    /// Decode a synthetic signal for this temperature instead of reading GPIO
    pub simulate: Option<f64>,
    /// Run a single measurement session and exit
    pub once: bool,
    /// Print the last saved reading and exit
    pub last: bool,
    /// Print an ASCII gauge under each reading
    pub gauge: bool,
    /// Configuration file instead of uti-config.toml
    pub config_path: Option<PathBuf>,
}

impl Options {
    /// Parse arguments, skipping the program name.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut options = Options::default();
        let mut args = args.into_iter().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--simulate" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--simulate needs a temperature in °C"))?;
                    let celsius = value
                        .parse()
                        .with_context(|| format!("invalid temperature '{}'", value))?;
                    options.simulate = Some(celsius);
                }
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--config needs a file path"))?;
                    options.config_path = Some(PathBuf::from(path));
                }
                "--once" => options.once = true,
                "--last" => options.last = true,
                "--gauge" => options.gauge = true,
                other => return Err(anyhow!("unknown argument '{}'", other)),
            }
        }
        Ok(options)
    }

    fn console(&self) -> ConsoleSink {
        if self.gauge {
            ConsoleSink::with_gauge(GAUGE_WIDTH)
        } else {
            ConsoleSink::default()
        }
    }
}

/// Something that can fill one sample buffer per measurement session.
trait BufferSource {
    async fn capture(&mut self, capacity: usize) -> anyhow::Result<SampleBuffer>;
}

/// Synthetic UTI signal for a fixed temperature.
struct SimulatedSource {
    simulator: UtiSimulator,
    curve: TemperatureCurve,
    celsius: f64,
}

impl BufferSource for SimulatedSource {
    async fn capture(&mut self, capacity: usize) -> anyhow::Result<SampleBuffer> {
        Ok(self.simulator.capture(&self.curve, self.celsius, capacity)?)
    }
}

/// UTI output on a GPIO line, reopened every session.
#[cfg(all(target_os = "linux", feature = "hardware"))]
struct GpioSource {
    config: uti_pt100_lib::config::GpioConfig,
}

#[cfg(all(target_os = "linux", feature = "hardware"))]
impl BufferSource for GpioSource {
    async fn capture(&mut self, capacity: usize) -> anyhow::Result<SampleBuffer> {
        let mut line = gpio_edges::EdgeLine::open(&self.config)?;
        line.capture(capacity).await
    }
}

/// Capture, decode and report every `interval_secs`, or once with `--once`.
///
/// Capture failures belong to the I/O layer and are logged; decode failures are
/// reported to the sinks like any other outcome.
async fn run<S: BufferSource>(
    source: &mut S,
    config: &Config,
    decoder: &Decoder,
    sinks: &mut [Box<dyn ReadingSink>],
    once: bool,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(config.report.interval_secs);
    loop {
        match source.capture(config.uti.capacity).await {
            Ok(buffer) => {
                let outcome = decoder.decode(&buffer);
                report_all(sinks, &outcome);
                if once {
                    return outcome.map(|_| ()).map_err(Into::into);
                }
            }
            Err(e) => {
                error!("Capture failed: {:#}", e);
                if once {
                    return Err(e);
                }
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let options = Options::parse(env::args())?;
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    // Show the last saved reading without touching the hardware
    if options.last {
        let reading = load_last_reading(&config.report.reading_file)?;
        options.console().report(&Ok(reading))?;
        return Ok(());
    }

    let decoder = Decoder::new(&config.uti, TemperatureCurve::pt100())?;

    let rt = tokio::runtime::Runtime::new()?;

    // Development mode: synthetic UTI signal, console output only
    if let Some(celsius) = options.simulate {
        info!("Simulating a PT100 at {:.2}°C", celsius);
        let mut source = SimulatedSource {
            simulator: UtiSimulator::new(config.uti.reference_resistance)
                .with_cycle_length(config.uti.cycle_length),
            curve: decoder.curve().clone(),
            celsius,
        };
        let mut sinks: Vec<Box<dyn ReadingSink>> = vec![Box::new(options.console())];
        return rt.block_on(run(&mut source, &config, &decoder, &mut sinks, options.once));
    }

    // Production mode: capture edges from the GPIO character device
    rt.block_on(run_hardware(&options, &config, &decoder))
}

/// Measure from the GPIO line, reporting to the console and the output files.
#[cfg(all(target_os = "linux", feature = "hardware"))]
async fn run_hardware(options: &Options, config: &Config, decoder: &Decoder) -> anyhow::Result<()> {
    use uti_pt100_lib::report::FileSink;

    info!(
        "Reading UTI on {} line {} every {}s",
        config.gpio.chip, config.gpio.line, config.report.interval_secs
    );
    let mut source = GpioSource {
        config: config.gpio.clone(),
    };
    let mut sinks: Vec<Box<dyn ReadingSink>> = vec![
        Box::new(options.console()),
        Box::new(FileSink::new(
            &config.report.temperature_file,
            &config.report.reading_file,
        )),
    ];
    run(&mut source, config, decoder, &mut sinks, options.once).await
}

#[cfg(all(target_os = "linux", not(feature = "hardware")))]
async fn run_hardware(_options: &Options, _config: &Config, _decoder: &Decoder) -> anyhow::Result<()> {
    eprintln!("GPIO capture support not enabled. Rebuild with --features hardware to read the UTI.");
    eprintln!("Use --simulate <celsius> to exercise the decoder without hardware.");
    Err(anyhow!("GPIO capture not enabled"))
}

#[cfg(not(target_os = "linux"))]
async fn run_hardware(_options: &Options, _config: &Config, _decoder: &Decoder) -> anyhow::Result<()> {
    eprintln!("Hardware mode is only available on Linux. Use --simulate <celsius> for development mode.");
    Err(anyhow!("Hardware mode not supported on this platform"))
}
