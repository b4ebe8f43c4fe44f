use futures::executor::block_on;
use log::{info, warn};
use playlist_core::config::default_config_path;
use playlist_core::{PlaylistSession, SessionConfig, SymphoniaMetadataLoader};
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let config_path = default_config_path();
    let config = SessionConfig::load_or_default(&config_path);
    info!("Playlist file: {}", config.playlist_path.display());

    let mut session = PlaylistSession::new(config);
    if let Err(e) = block_on(session.load(SymphoniaMetadataLoader)) {
        warn!("Could not restore the saved playlist: {}", e);
    }

    // Paths given on the command line are treated like a drop onto the playlist
    let dropped: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if !dropped.is_empty() {
        let added = block_on(session.add_paths_with(&dropped, SymphoniaMetadataLoader))?;
        if !added {
            info!("Nothing new to add");
        }
    }

    for (index, item) in session.playlist().iter().enumerate() {
        info!("{:>3}. {}", index + 1, item.title_or_name());
    }
    session.log_state();

    session.save()?;
    Ok(())
}
