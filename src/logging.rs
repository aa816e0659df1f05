use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle, WriteMode};
use log::error;

use crate::draft::store::data_dir;

pub fn init() -> LoggerHandle {
    let logger = Logger::try_with_env_or_str(
        "warn,captains_draft=debug,draft_model=debug,draft_bot=debug",
    )
    .expect("log config text")
    .log_to_file(FileSpec::default().directory(data_dir().join("logs")))
    .write_mode(WriteMode::BufferAndFlush)
    .duplicate_to_stderr(Duplicate::Warn) // stdout belongs to the draft feed
    .start()
    .expect("log init");

    let orig_hook = std::panic::take_hook();
    let logger_for_panic = logger.clone();
    std::panic::set_hook(Box::new(move |panic_info| {
        // the engine task must not die silently and leave the host waiting
        error!("Panic: {panic_info}");
        logger_for_panic.flush();
        orig_hook(panic_info);
        std::process::exit(1);
    }));
    logger
}
