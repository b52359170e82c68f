use hbnb_model::{ModelKind, Storage};
use strum::IntoEnumIterator;

mod config_path;

#[tokio::main]
async fn main() {
    let config_path = match config_path::get() {
        Ok(path) => path,
        Err(err) => panic!("{err}"),
    };
    let config = match hbnb_config::from_path(&config_path) {
        Ok(config) => config,
        Err(err) => panic!("{err:#}"),
    };

    if let Err(err) = hbnb_log::init(config.log().display_level(), config.log().level_filter()) {
        panic!("{err:#}");
    }

    hbnb_log::info(
        Some("🚀"),
        format!(
            "[HBNB] Starting with {} storage",
            config.storage().kind().to_str()
        ),
    );

    let storage = match Storage::open(config.storage()).await {
        Ok(storage) => storage,
        Err(err) => hbnb_log::panic(None, format!("[HBNB] Opening storage failed: {err}")),
    };

    let models = match storage.all(None).await {
        Ok(models) => models,
        Err(err) => {
            hbnb_log::error(None, format!("[HBNB] Loading stored objects failed: {err}"));
            Vec::new()
        }
    };
    for kind in ModelKind::iter() {
        let count = models.iter().filter(|model| *model.kind() == kind).count();
        if count > 0 {
            hbnb_log::info(Some("📦"), format!("[HBNB] {}: {count}", kind.to_str()));
        }
    }
    hbnb_log::info(None, format!("[HBNB] {} objects stored", models.len()));

    match storage.close().await {
        Ok(_) => hbnb_log::info(Some("👋"), "[HBNB] Turned off"),
        Err(err) => hbnb_log::warn(
            Some("👋"),
            format!("[HBNB] Turned off with error: {err}"),
        ),
    }
}
