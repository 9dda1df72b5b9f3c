use crate::error::Result;

/// Route `log` records to stderr; stdout carries prompts, deliveries and
/// the final report.
pub fn init(verbose: bool) -> Result<()> {
    let colors = fern::colors::ColoredLevelConfig::new();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
