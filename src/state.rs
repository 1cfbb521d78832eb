use crate::{
    auth::PortalSession,
    config::RuntimeConfiguration,
    crud::{CrudStore, memory::InMemoryCrudStore, postgres::PostgresCrudStore},
    error::PortalResult,
    maud_conveniences::render_nav,
};
use maud::{DOCTYPE, Markup, html};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct PortalState {
    store: Arc<dyn CrudStore>,
    config: RuntimeConfiguration,
}

impl PortalState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> PortalResult<Self> {
        let store: Arc<dyn CrudStore> = match config.db_config() {
            Some(db_config) => {
                Arc::new(PostgresCrudStore::connect(options, &db_config.get_db_path()).await?)
            }
            None => {
                warn!("No database configured, records will only be kept in memory");
                Arc::new(InMemoryCrudStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn CrudStore>, config: RuntimeConfiguration) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn CrudStore {
        &*self.store
    }

    pub fn store_handle(&self) -> Arc<dyn CrudStore> {
        Arc::clone(&self.store)
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, session: &PortalSession, markup: Markup) -> Markup {
        let nav = render_nav(session.user.as_ref());

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "PlaceRight" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (nav)
                    main class="w-full flex flex-col items-center px-4 pb-8" {
                        (markup)
                    }
                    div id="auth_modal" {}
                }
            }
        }
    }
}
