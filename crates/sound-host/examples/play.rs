use log::{LevelFilter, Log, Metadata, Record};
use sound_core::{CallbackStatus, PlayCallback};
use sound_lib::{SoundConfig, SoundModule};
use std::thread;
use std::time::Duration;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() {
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

    let source = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: play <resource name or path to audio file>");
        std::process::exit(1);
    });

    println!("Creating sound module...");
    let module = match SoundModule::new(SoundConfig::load()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to create sound module: {}", e);
            return;
        }
    };

    println!("Preparing: {}", source);
    match module.prepare(&source, 1) {
        Ok(info) => println!("  Duration: {:.3}s", info.duration),
        Err(e) => {
            eprintln!("Failed to prepare: {}", e);
            return;
        }
    }

    let (callback, mut result) = PlayCallback::channel();
    if let Err(e) = module.play(1, callback) {
        eprintln!("Failed to play: {}", e);
        return;
    }

    for i in 0..5 {
        thread::sleep(Duration::from_secs(1));
        if let Ok(time) = module.get_current_time(1) {
            println!(
                "[{}s] Position: {:.3}s | Playing: {}",
                i + 1,
                time.position,
                time.is_playing
            );
        }
    }

    println!("\nPanning left...");
    let _ = module.set_volume(1, 1.0, 0.0);
    thread::sleep(Duration::from_secs(2));

    println!("Seeking back to 1s...");
    let _ = module.set_volume(1, 1.0, 1.0);
    let _ = module.set_current_time(1, 1.0);

    println!("Waiting for completion...");
    match result.wait(Duration::from_secs(600)) {
        CallbackStatus::Fired(ok) => println!("Finished (success: {})", ok),
        CallbackStatus::Dropped => println!("Callback dropped"),
        CallbackStatus::Pending => println!("Still playing, giving up"),
    }

    if let Err(e) = module.shutdown() {
        eprintln!("Shutdown reported errors: {}", e);
    }
}
