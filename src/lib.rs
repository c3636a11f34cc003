mod utils;

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod db;
pub mod generation;
pub mod learning;
pub mod notes;
pub mod overlay;
pub mod settings;

#[cfg(feature = "desktop")]
mod events;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use tauri::{Emitter, Manager, State};

    use crate::{
        auth::{self, AuthBackend, AuthController, SupabaseClient},
        catalog::{self, Catalog},
        chat::{self, ChatController},
        config::AppConfig,
        db::Database,
        events::TauriEventSink,
        generation::build_generator,
        learning::{self, LearningController},
        notes::{self, Notepad},
        overlay::{self, OverlayController},
        settings::{GeneratorSettings, SettingsStore},
    };

    pub(crate) struct AppState {
        pub(crate) overlay: OverlayController,
        pub(crate) catalog: Arc<Catalog>,
        pub(crate) learning: LearningController,
        pub(crate) notes: Notepad,
        pub(crate) chat: ChatController,
        pub(crate) auth: AuthController,
        pub(crate) settings: SettingsStore,
    }

    #[tauri::command]
    fn get_generator_settings(state: State<AppState>) -> Result<GeneratorSettings, String> {
        state.settings.generator().map_err(|e| e.to_string())
    }

    /// Persists the generator choice. Applies from the next launch.
    #[tauri::command]
    fn set_generator_settings(
        settings: GeneratorSettings,
        state: State<AppState>,
        app_handle: tauri::AppHandle,
    ) -> Result<(), String> {
        state
            .settings
            .update_generator(settings.clone())
            .map_err(|e| e.to_string())?;

        app_handle
            .emit("generator-settings-updated", &settings)
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        let config = AppConfig::from_env();

        // Initialize logging (reads RUST_LOG env var)
        env_logger::Builder::from_default_env()
            .filter_level(config.log_level())
            .init();

        log::info!("IdeaPal starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(move |app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let database = Database::new(app_data_dir.join("ideapal.sqlite3"))?;
                    let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                    let generator_settings = settings_store.generator()?;

                    let generator = build_generator(
                        generator_settings.mode,
                        &config,
                        generator_settings.simulated(),
                    );
                    let sink = Arc::new(TauriEventSink::new(app.handle().clone()));

                    let catalog = Arc::new(Catalog::embedded()?);

                    let auth_backend = config.supabase.as_ref().map(|supabase| {
                        Arc::new(SupabaseClient::new(supabase)) as Arc<dyn AuthBackend>
                    });
                    if auth_backend.is_none() {
                        log::warn!("Supabase is not configured; sign-in is disabled");
                    }

                    app.manage(AppState {
                        overlay: OverlayController::new(generator.clone(), sink.clone()),
                        learning: LearningController::new(catalog.clone()),
                        catalog,
                        notes: Notepad::new(database.clone()),
                        chat: ChatController::new(generator, sink, database),
                        auth: AuthController::new(auth_backend),
                        settings: settings_store,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                // Doubt overlay
                overlay::commands::get_overlay,
                overlay::commands::capture_selection,
                overlay::commands::confirm_affordance,
                overlay::commands::dismiss_affordance,
                overlay::commands::open_doubt,
                overlay::commands::update_doubt_query,
                overlay::commands::submit_doubt_query,
                overlay::commands::close_doubt,
                overlay::commands::close_overlay,
                overlay::commands::set_overlay_viewport,
                overlay::commands::report_popup_bounds,
                // Catalog and learning
                catalog::commands::list_courses,
                catalog::commands::get_course,
                catalog::commands::search_courses,
                catalog::commands::get_trending_topics,
                learning::commands::get_learning_module,
                learning::commands::get_entry_module,
                learning::commands::get_quiz,
                learning::commands::apply_quiz_action,
                learning::commands::restart_quiz,
                // Notes and chat
                notes::commands::save_note,
                notes::commands::list_notes,
                notes::commands::delete_note,
                chat::commands::get_chat,
                chat::commands::send_chat_message,
                chat::commands::attach_chat_document,
                chat::commands::remove_chat_document,
                chat::commands::new_chat,
                chat::commands::get_chat_history,
                chat::commands::restore_chat,
                // Account
                auth::commands::get_auth_state,
                auth::commands::sign_in,
                auth::commands::sign_up,
                auth::commands::sign_out,
                auth::commands::save_profile,
                get_generator_settings,
                set_generator_settings,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
