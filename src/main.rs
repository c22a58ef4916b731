mod app;
mod config;
mod debug;
mod ecs;
mod overlay;
mod pet;
mod platform;
mod render;
mod ticker;

fn main() {
    env_logger::init();
    log::info!("Screen Pets starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
