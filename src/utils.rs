use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

pub fn setup_logger() -> Result<()> {
    let colors = ColoredLevelConfig {
        trace: Color::Cyan,
        debug: Color::Magenta,
        info: Color::Green,
        warn: Color::Yellow,
        error: Color::BrightRed,
        ..ColoredLevelConfig::new()
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}",
                Local::now().format("[%H:%M:%S]"),
                colors.color(record.level()),
                message
            ));
        })
        .chain(std::io::stdout())
        .level(LevelFilter::Error)
        .level_for("clawvault", LevelFilter::Info)
        .apply()?;

    Ok(())
}
